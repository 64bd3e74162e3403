//! 敵方 AI
//!
//! 貪婪策略：鎖定最近的對手，走到可移動範圍內最接近它的格子，相鄰就攻擊。
//! 同距離時取名冊中較前面的對手、BFS 中較早發現的格子。

use crate::alias::{Coord, UnitId};
use crate::combat::Engagement;
use crate::dice::Dice;
use crate::error::{Result, RosterError};
use crate::event::GameEvent;
use crate::grid::{Grid, Position};
use crate::movement::{ReachableSet, reachable_set};
use crate::unit::{Faction, Roster, Unit};
use std::collections::VecDeque;

/// 單一單位的行動計畫
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiPlan {
    pub unit: UnitId,
    /// 追擊對象（場上沒有對手時為 None）
    pub target: Option<UnitId>,
    pub destination: Position,
    /// 移動後要攻擊的相鄰對手
    pub attack: Option<UnitId>,
}

/// 曼哈頓距離最近的對手；同距離取名冊順序較前者
pub fn nearest_opponent(roster: &Roster, unit: &Unit) -> Option<(UnitId, Coord)> {
    let mut best: Option<(UnitId, Coord)> = None;
    for other in roster.of_faction(unit.faction.opponent()) {
        let dist = unit.pos.distance(other.pos);
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((other.id, dist));
        }
    }
    best
}

/// 在可移動範圍中挑出最接近目標的空格
///
/// 依 BFS 發現順序掃描，只有嚴格更近才取代，因此同距離保留先發現的格子；
/// 沒有任何格子比原地更近時留在原地。
pub fn choose_destination(
    unit: &Unit,
    target: Position,
    reachable: &ReachableSet,
    roster: &Roster,
) -> Position {
    let mut best = unit.pos;
    let mut best_dist = unit.pos.distance(target);
    for &cell in reachable.cells() {
        if roster.unit_at(cell).is_some_and(|other| other.id != unit.id) {
            continue;
        }
        let dist = cell.distance(target);
        if dist < best_dist {
            best = cell;
            best_dist = dist;
        }
    }
    best
}

/// 為單位產生行動計畫，不改變任何狀態
pub fn plan_action(roster: &Roster, grid: &Grid, unit_id: UnitId) -> Result<AiPlan> {
    let unit = roster
        .get(unit_id)
        .ok_or(RosterError::UnitNotFound(unit_id))?;

    let Some((target, _)) = nearest_opponent(roster, unit) else {
        return Ok(AiPlan {
            unit: unit_id,
            target: None,
            destination: unit.pos,
            attack: None,
        });
    };
    let target_pos = roster
        .get(target)
        .map(|t| t.pos)
        .ok_or(RosterError::UnitNotFound(target))?;

    let reachable = reachable_set(unit, roster, grid)?;
    let destination = choose_destination(unit, target_pos, &reachable, roster);
    let attack = roster
        .adjacent_hostiles(unit.faction, destination)
        .into_iter()
        .next();

    Ok(AiPlan {
        unit: unit_id,
        target: Some(target),
        destination,
        attack,
    })
}

/// 依計畫移動、攻擊並標記已行動
pub fn execute_plan<D: Dice + ?Sized>(
    roster: &mut Roster,
    grid: &Grid,
    plan: &AiPlan,
    dice: &mut D,
) -> Result<Vec<GameEvent>> {
    let mut events = Vec::new();
    let from = roster.move_unit(plan.unit, plan.destination)?;
    if from != plan.destination {
        events.push(GameEvent::UnitMoved {
            unit: plan.unit,
            from,
            to: plan.destination,
        });
    }

    if let Some(defender) = plan.attack {
        if let Some(engagement) = Engagement::new(roster, grid, plan.unit, defender) {
            events.extend(engagement.resolve(roster, dice));
        }
    }

    // 反擊可能讓單位陣亡
    if let Some(unit) = roster.get_mut(plan.unit) {
        unit.has_moved = true;
        unit.is_engaged = true;
    }
    Ok(events)
}

/// 一整個 AI 回合：依名冊順序逐一行動
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiTurn {
    faction: Faction,
    queue: VecDeque<UnitId>,
}

impl AiTurn {
    /// 以回合開始時的名冊順序建立行動佇列
    pub fn begin(roster: &Roster, faction: Faction) -> Self {
        Self {
            faction,
            queue: roster.of_faction(faction).map(|u| u.id).collect(),
        }
    }

    pub fn faction(&self) -> Faction {
        self.faction
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// 讓下一個仍存活的單位行動；本回合中途陣亡的單位直接略過
    pub fn step<D: Dice + ?Sized>(
        &mut self,
        roster: &mut Roster,
        grid: &Grid,
        dice: &mut D,
    ) -> Result<Vec<GameEvent>> {
        while let Some(unit_id) = self.queue.pop_front() {
            if !roster.contains(unit_id) {
                continue;
            }
            let plan = plan_action(roster, grid, unit_id)?;
            tracing::debug!(?plan, "ai action");
            return execute_plan(roster, grid, &plan, dice);
        }
        Ok(Vec::new())
    }
}
