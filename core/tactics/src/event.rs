//! 提供給渲染器的事件
//!
//! 核心只產生有序事件，不等待也不控制動畫時間。

use crate::alias::{Stat, UnitId};
use crate::grid::Position;
use crate::unit::Faction;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// 遊戲結局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Outcome {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// 單位移動（AI 或玩家確認落點）
    UnitMoved {
        unit: UnitId,
        from: Position,
        to: Position,
    },
    EngagementStarted {
        attacker: UnitId,
        defender: UnitId,
    },
    /// 一次攻擊；未命中時 `hit` 為 false 且傷害為 0
    Strike {
        attacker: UnitId,
        defender: UnitId,
        damage: Stat,
        is_crit: bool,
        hit: bool,
        defender_hp: Stat,
    },
    /// 單位死亡並已從名冊移除
    Death { unit: UnitId, name: String },
    EngagementEnded {
        attacker: UnitId,
        defender: UnitId,
    },
    TurnChanged { faction: Faction },
    Victory,
    Defeat,
}

impl GameEvent {
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            GameEvent::Victory => Some(Outcome::Victory),
            GameEvent::Defeat => Some(Outcome::Defeat),
            _ => None,
        }
    }
}

impl From<Outcome> for GameEvent {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Victory => GameEvent::Victory,
            Outcome::Defeat => GameEvent::Defeat,
        }
    }
}
