//! 遊戲常數定義

use crate::alias::{Coord, MovementCost, Percent, Stat};

/// 預設地圖寬度
pub const DEFAULT_COLS: Coord = 30;

/// 預設地圖高度
pub const DEFAULT_ROWS: Coord = 20;

/// 地圖格數上限
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// 每格成為森林的機率
pub const FOREST_PROBABILITY: f64 = 0.2;

/// 平地移動成本
pub const PLAIN_MOVEMENT_COST: MovementCost = 1;

/// 森林移動成本
pub const FOREST_MOVEMENT_COST: MovementCost = 2;

/// 森林提供的迴避加值
pub const FOREST_AVOID_BONUS: Percent = 20;

/// 森林提供的防禦加值
pub const FOREST_DEFENSE_BONUS: Stat = 1;

/// 速度差達此值即可追擊
pub const DOUBLE_ATTACK_SPEED_GAP: Stat = 4;

/// 爆擊傷害倍率
pub const CRIT_MULTIPLIER: Stat = 3;

/// 命中與爆擊擲骰上限（不含）
pub const ROLL_CEILING: u32 = 100;

/// 按住方向鍵時游標重複移動的間隔（毫秒）
pub const CURSOR_REPEAT_MS: u64 = 100;

// 單位預設屬性

pub const DEFAULT_HP: Stat = 20;
pub const DEFAULT_STR: Stat = 5;
pub const DEFAULT_MAG: Stat = 0;
pub const DEFAULT_DEX: Stat = 5;
pub const DEFAULT_SPD: Stat = 4;
pub const DEFAULT_LUK: Stat = 2;
pub const DEFAULT_DEF: Stat = 2;
pub const DEFAULT_RES: Stat = 1;
pub const DEFAULT_MOVE: MovementCost = 5;
