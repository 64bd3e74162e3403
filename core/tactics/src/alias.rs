//! 型別別名

/// 棋盤座標分量
pub type Coord = usize;

/// 移動成本
pub type MovementCost = u32;

/// 單位唯一 ID（名冊內遞增配發）
pub type UnitId = u32;

/// 屬性數值
pub type Stat = i32;

/// 百分比機率（0..=100）
pub type Percent = i32;
