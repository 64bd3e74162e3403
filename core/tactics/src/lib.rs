//! 回合制戰棋核心
//!
//! 此函式庫只包含遊戲邏輯，不負責繪圖與輸入裝置：
//! - 地形網格與單位名冊
//! - 考慮地形成本的可移動範圍
//! - 命中、爆擊、追擊、反擊的戰鬥流程
//! - 階段狀態機與敵方 AI
//!
//! 外部渲染器只透過查詢介面與 [`event::GameEvent`] 事件流取得資料。

pub mod ai;
pub mod alias;
pub mod combat;
pub mod constants;
pub mod dice;
pub mod error;
pub mod event;
pub mod game;
pub mod grid;
pub mod input;
pub mod loader;
pub mod loader_schema;
pub mod movement;
pub mod query;
pub mod state;
pub mod unit;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
