//! 單位與名冊
//!
//! 名冊以插入順序保存單位，AI 依此順序行動。
//! 單位死亡後立即從名冊移除，其他地方只保存 [`UnitId`]。

use crate::alias::{MovementCost, Stat, UnitId};
use crate::constants::*;
use crate::error::{Result, RosterError};
use crate::grid::Position;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// 陣營
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    #[default]
    Player,
    Enemy,
}

impl Faction {
    pub fn opponent(self) -> Faction {
        match self {
            Faction::Player => Faction::Enemy,
            Faction::Enemy => Faction::Player,
        }
    }
}

/// 基礎屬性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub max_hp: Stat,
    pub str: Stat,
    pub mag: Stat,
    pub dex: Stat,
    pub spd: Stat,
    pub luk: Stat,
    pub def: Stat,
    pub res: Stat,
    #[serde(rename = "move")]
    pub mov: MovementCost,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            max_hp: DEFAULT_HP,
            str: DEFAULT_STR,
            mag: DEFAULT_MAG,
            dex: DEFAULT_DEX,
            spd: DEFAULT_SPD,
            luk: DEFAULT_LUK,
            def: DEFAULT_DEF,
            res: DEFAULT_RES,
            mov: DEFAULT_MOVE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub pos: Position,
    pub faction: Faction,
    pub hp: Stat,
    pub stats: Stats,
    pub has_moved: bool,
    /// 本回合已行動（渲染為灰色）
    pub is_engaged: bool,
}

impl Unit {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// 扣血並夾在 [0, max_hp]，回傳實際扣除量
    pub fn take_damage(&mut self, damage: Stat) -> Stat {
        let before = self.hp;
        self.hp = (self.hp - damage.max(0)).clamp(0, self.stats.max_hp);
        before - self.hp
    }

    pub fn is_hostile_to(&self, other: &Unit) -> bool {
        self.faction != other.faction
    }

    fn reset_turn_flags(&mut self) {
        self.has_moved = false;
        self.is_engaged = false;
    }
}

/// 新增單位所需資料
#[derive(Debug, Clone)]
pub struct UnitSpec {
    pub name: String,
    pub pos: Position,
    pub faction: Faction,
    pub stats: Stats,
    /// 未指定時為滿血
    pub hp: Option<Stat>,
}

impl UnitSpec {
    pub fn new(name: impl Into<String>, pos: Position, faction: Faction) -> Self {
        Self {
            name: name.into(),
            pos,
            faction,
            stats: Stats::default(),
            hp: None,
        }
    }

    pub fn with_stats(mut self, stats: Stats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_hp(mut self, hp: Stat) -> Self {
        self.hp = Some(hp);
        self
    }
}

/// 單位名冊
#[derive(Debug, Clone, Default)]
pub struct Roster {
    units: Vec<Unit>,
    next_id: UnitId,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入單位；同一格不可有兩個單位
    pub fn spawn(&mut self, spec: UnitSpec) -> Result<UnitId> {
        if let Some(occupant) = self.unit_at(spec.pos) {
            return Err(RosterError::PositionOccupied {
                occupant: occupant.name.clone(),
                x: spec.pos.x,
                y: spec.pos.y,
            }
            .into());
        }
        if spec.stats.max_hp <= 0 {
            return Err(RosterError::InvalidStats {
                name: spec.name,
                reason: format!("max_hp 必須大於 0，實際為 {}", spec.stats.max_hp),
            }
            .into());
        }
        let hp = spec.hp.unwrap_or(spec.stats.max_hp);
        if !(1..=spec.stats.max_hp).contains(&hp) {
            return Err(RosterError::InvalidStats {
                name: spec.name,
                reason: format!("hp {} 不在 1..={} 範圍內", hp, spec.stats.max_hp),
            }
            .into());
        }

        let id = self.next_id;
        self.next_id += 1;
        self.units.push(Unit {
            id,
            name: spec.name,
            pos: spec.pos,
            faction: spec.faction,
            hp,
            stats: spec.stats,
            has_moved: false,
            is_engaged: false,
        });
        Ok(id)
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.get(id).is_some()
    }

    pub fn unit_at(&self, pos: Position) -> Option<&Unit> {
        self.units.iter().find(|u| u.pos == pos)
    }

    /// 依插入順序
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    pub fn of_faction(&self, faction: Faction) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(move |u| u.faction == faction)
    }

    pub fn count(&self, faction: Faction) -> usize {
        self.of_faction(faction).count()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// 該陣營是否全員已行動（無單位時也成立）
    pub fn all_moved(&self, faction: Faction) -> bool {
        self.of_faction(faction).all(|u| u.has_moved)
    }

    /// 新回合開始：重設該陣營的行動旗標
    pub fn reset_faction(&mut self, faction: Faction) {
        self.units
            .iter_mut()
            .filter(|u| u.faction == faction)
            .for_each(Unit::reset_turn_flags);
    }

    /// 移動單位；目的地不可有其他單位
    pub fn move_unit(&mut self, id: UnitId, to: Position) -> Result<Position> {
        if let Some(occupant) = self.unit_at(to).filter(|u| u.id != id) {
            return Err(RosterError::PositionOccupied {
                occupant: occupant.name.clone(),
                x: to.x,
                y: to.y,
            }
            .into());
        }
        let unit = self.get_mut(id).ok_or(RosterError::UnitNotFound(id))?;
        let from = unit.pos;
        unit.pos = to;
        Ok(from)
    }

    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let index = self.units.iter().position(|u| u.id == id)?;
        Some(self.units.remove(index))
    }

    /// 與 `pos` 上下左右相鄰的敵對單位（依名冊順序）
    pub fn adjacent_hostiles(&self, faction: Faction, pos: Position) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| u.faction != faction && u.pos.is_adjacent(pos))
            .map(|u| u.id)
            .collect()
    }
}
