//! 遊戲設定檔的資料結構定義
//!
//! 所有欄位都有預設值，空白的 TOML 會得到原版的 30x20 隨機地圖與三人名冊。

use crate::alias::{Coord, Stat};
use crate::constants::{CURSOR_REPEAT_MS, DEFAULT_COLS, DEFAULT_ROWS, FOREST_PROBABILITY};
use crate::grid::Position;
use crate::unit::{Faction, Stats, UnitSpec};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

// ============================================================================
// 地圖
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub cols: Coord,
    pub rows: Coord,
    pub forest_probability: f64,
    /// 固定種子；未指定時每次隨機
    pub seed: Option<u64>,
    /// ASCII 配置圖；指定時忽略 cols/rows/forest_probability
    pub layout: Option<String>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            forest_probability: FOREST_PROBABILITY,
            seed: None,
            layout: None,
        }
    }
}

// ============================================================================
// 輸入與規則
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub cursor_repeat_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            cursor_repeat_ms: CURSOR_REPEAT_MS,
        }
    }
}

/// 戰鬥與敵方回合的結算方式
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResolveMode {
    /// 在同一次呼叫內全部解完
    #[default]
    Batch,
    /// 停在動畫階段，每次 `advance` 推進一步
    Stepped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub show_tutorial: bool,
    pub resolve: ResolveMode,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            show_tutorial: true,
            resolve: ResolveMode::Batch,
        }
    }
}

// ============================================================================
// 單位
// ============================================================================

/// 單位配置
///
/// 位置可以直接給座標，或給配置圖上的標記名稱（標記有多格時依序分配）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConfig {
    pub name: String,
    pub faction: Faction,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub hp: Option<Stat>,
}

impl UnitConfig {
    pub fn at(name: &str, faction: Faction, x: Coord, y: Coord) -> Self {
        Self {
            name: name.to_string(),
            faction,
            position: Some(Position::new(x, y)),
            marker: None,
            stats: Stats::default(),
            hp: None,
        }
    }

    pub(crate) fn to_spec(&self, pos: Position) -> UnitSpec {
        let spec = UnitSpec::new(self.name.clone(), pos, self.faction).with_stats(self.stats);
        match self.hp {
            Some(hp) => spec.with_hp(hp),
            None => spec,
        }
    }
}

/// 原版的預設名冊
pub fn default_units() -> Vec<UnitConfig> {
    vec![
        UnitConfig::at("Byleth", Faction::Player, 5, 5),
        UnitConfig::at("Edelgard", Faction::Player, 8, 5),
        UnitConfig::at("Bandit", Faction::Enemy, 12, 8),
    ]
}

// ============================================================================
// 頂層設定
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map: MapConfig,
    pub input: InputConfig,
    pub rules: RulesConfig,
    pub units: Vec<UnitConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            input: InputConfig::default(),
            rules: RulesConfig::default(),
            units: default_units(),
        }
    }
}
