//! 給渲染器的唯讀查詢

use crate::alias::{Percent, Stat, UnitId};
use crate::combat::Forecast;
use crate::dice::Dice;
use crate::event::Outcome;
use crate::game::Game;
use crate::grid::{Grid, Position, Terrain};
use crate::movement::ReachableSet;
use crate::state::{Menu, Phase};
use crate::unit::{Faction, Unit};
use serde::{Deserialize, Serialize};

/// 游標所在格的資訊面板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileInfo {
    pub pos: Position,
    pub terrain: Terrain,
    pub defense: Stat,
    pub avoid: Percent,
    pub unit: Option<UnitSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub id: UnitId,
    pub name: String,
    pub faction: Faction,
    pub hp: Stat,
    pub max_hp: Stat,
}

impl From<&Unit> for UnitSummary {
    fn from(unit: &Unit) -> Self {
        Self {
            id: unit.id,
            name: unit.name.clone(),
            faction: unit.faction,
            hp: unit.hp,
            max_hp: unit.stats.max_hp,
        }
    }
}

impl<D: Dice> Game<D> {
    pub fn grid(&self) -> &Grid {
        &self.state().grid
    }

    pub fn terrain_at(&self, pos: Position) -> Option<Terrain> {
        self.state().grid.terrain_at(pos)
    }

    pub fn unit_at(&self, pos: Position) -> Option<&Unit> {
        self.state().roster.unit_at(pos)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.state().roster.get(id)
    }

    /// 依名冊順序
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.state().roster.iter()
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    pub fn turn(&self) -> Faction {
        self.state().turn
    }

    pub fn cursor(&self) -> Position {
        self.state().cursor
    }

    pub fn selected_unit(&self) -> Option<&Unit> {
        self.state().selected.and_then(|id| self.unit(id))
    }

    pub fn target_unit(&self) -> Option<&Unit> {
        self.state().target.and_then(|id| self.unit(id))
    }

    /// 選取單位的可移動範圍（UnitMove 之後有效）
    pub fn reachable(&self) -> Option<&ReachableSet> {
        self.state().reachable.as_ref()
    }

    /// 從選取單位原位到游標的路徑，游標不在範圍內時為 None
    pub fn path_preview(&self) -> Option<Vec<Position>> {
        self.reachable()?.path_to(self.cursor())
    }

    pub fn menu(&self) -> Option<&Menu> {
        self.state().menu.as_ref()
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        self.state().forecast.as_ref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state().outcome
    }

    /// 資訊面板：地形名稱與加值，有單位時附上名稱與血量
    pub fn inspect(&self, pos: Position) -> Option<TileInfo> {
        let terrain = self.terrain_at(pos)?;
        let bonus = self.state().grid.bonus_at(pos);
        Some(TileInfo {
            pos,
            terrain,
            defense: bonus.defense,
            avoid: bonus.avoid,
            unit: self.unit_at(pos).map(UnitSummary::from),
        })
    }

    /// 攻擊目標選擇時要標示的格子：與選取單位相鄰的敵對單位
    pub fn attackable_targets(&self) -> Vec<UnitId> {
        self.selected_unit()
            .map(|unit| self.state().roster.adjacent_hostiles(unit.faction, unit.pos))
            .unwrap_or_default()
    }
}
