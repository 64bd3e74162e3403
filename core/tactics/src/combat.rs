//! 戰鬥系統
//!
//! - 數值公式：傷害、命中、爆擊、追擊，每場交戰開始時雙向各算一次
//! - 交戰流程：攻擊 → 反擊 → 攻方追擊 → 守方追擊，順序固定
//! - 任一方 HP 歸零即結束交戰並從名冊移除
//!
//! [`Engagement`] 可逐步推進（一次一擊），也可用 [`resolve_engagement`] 一次解完，
//! 兩者走同一套邏輯。

use crate::alias::{Percent, Stat, UnitId};
use crate::constants::{CRIT_MULTIPLIER, DOUBLE_ATTACK_SPEED_GAP};
use crate::dice::Dice;
use crate::event::GameEvent;
use crate::grid::{Grid, TerrainBonus};
use crate::unit::{Roster, Stats};
use serde::{Deserialize, Serialize};

/// 單向戰鬥數值（攻擊者對防守者）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub damage: Stat,
    pub hit: Percent,
    pub crit: Percent,
    pub doubles: bool,
}

/// 計算單向戰鬥數值，`defender_bonus` 為防守者腳下地形的加值
pub fn combat_stats(attacker: &Stats, defender: &Stats, defender_bonus: TerrainBonus) -> CombatStats {
    let damage = (attacker.str - (defender.def + defender_bonus.defense)).max(0);
    let accuracy = attacker.dex * 3 + attacker.luk;
    let avoid = defender.spd * 2 + defender.luk + defender_bonus.avoid;
    let hit = (accuracy - avoid).clamp(0, 100);
    let crit = ((attacker.dex + attacker.luk).div_euclid(2) - defender.luk).max(0);
    let doubles = attacker.spd - defender.spd >= DOUBLE_ATTACK_SPEED_GAP;
    CombatStats {
        damage,
        hit,
        crit,
        doubles,
    }
}

/// 一次攻擊的擲骰結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrikeRoll {
    pub hit: bool,
    pub is_crit: bool,
    pub damage: Stat,
}

/// 命中機制：先擲命中，命中後再擲爆擊
pub fn roll_strike<D: Dice + ?Sized>(stats: &CombatStats, dice: &mut D) -> StrikeRoll {
    let hit_roll = dice.roll_percent();
    if Percent::try_from(hit_roll).map_or(true, |roll| roll >= stats.hit) {
        return StrikeRoll {
            hit: false,
            is_crit: false,
            damage: 0,
        };
    }
    let crit_roll = dice.roll_percent();
    let is_crit = Percent::try_from(crit_roll).is_ok_and(|roll| roll < stats.crit);
    let damage = if is_crit {
        stats.damage * CRIT_MULTIPLIER
    } else {
        stats.damage
    };
    StrikeRoll {
        hit: true,
        is_crit,
        damage,
    }
}

/// 戰鬥預測（不改變任何狀態，只供顯示）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forecast {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub attack: CombatStats,
    pub counter: CombatStats,
    pub attacker_hp: Stat,
    pub defender_hp: Stat,
    /// 假設攻方第一擊（與追擊）命中且不爆擊時，守方剩餘 HP
    pub projected_defender_hp: Stat,
}

pub fn forecast(
    roster: &Roster,
    grid: &Grid,
    attacker: UnitId,
    defender: UnitId,
) -> Option<Forecast> {
    let atk = roster.get(attacker)?;
    let def = roster.get(defender)?;
    let attack = combat_stats(&atk.stats, &def.stats, grid.bonus_at(def.pos));
    let counter = combat_stats(&def.stats, &atk.stats, grid.bonus_at(atk.pos));
    let strikes = if attack.doubles { 2 } else { 1 };
    Some(Forecast {
        attacker,
        defender,
        attack,
        counter,
        attacker_hp: atk.hp,
        defender_hp: def.hp,
        projected_defender_hp: (def.hp - attack.damage * strikes).max(0),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Attacker,
    Defender,
}

/// 交戰步驟：(出手方, 是否需要追擊資格)
const SEQUENCE: [(Side, bool); 4] = [
    (Side::Attacker, false),
    (Side::Defender, false),
    (Side::Attacker, true),
    (Side::Defender, true),
];

/// 進行中的交戰
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engagement {
    attacker: UnitId,
    defender: UnitId,
    attack: CombatStats,
    counter: CombatStats,
    next: usize,
    started: bool,
    finished: bool,
}

impl Engagement {
    /// 雙方必須存在、敵對且上下左右相鄰
    pub fn new(roster: &Roster, grid: &Grid, attacker: UnitId, defender: UnitId) -> Option<Self> {
        let atk = roster.get(attacker)?;
        let def = roster.get(defender)?;
        if !atk.is_hostile_to(def) || !atk.pos.is_adjacent(def.pos) {
            return None;
        }
        Some(Self {
            attacker,
            defender,
            attack: combat_stats(&atk.stats, &def.stats, grid.bonus_at(def.pos)),
            counter: combat_stats(&def.stats, &atk.stats, grid.bonus_at(atk.pos)),
            next: 0,
            started: false,
            finished: false,
        })
    }

    pub fn attacker(&self) -> UnitId {
        self.attacker
    }

    pub fn defender(&self) -> UnitId {
        self.defender
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn participants(&self, side: Side) -> (UnitId, UnitId, CombatStats) {
        match side {
            Side::Attacker => (self.attacker, self.defender, self.attack),
            Side::Defender => (self.defender, self.attacker, self.counter),
        }
    }

    fn is_applicable(&self, index: usize) -> bool {
        let (side, needs_double) = SEQUENCE[index];
        !needs_double || self.participants(side).2.doubles
    }

    fn has_next(&self) -> bool {
        (self.next..SEQUENCE.len()).any(|i| self.is_applicable(i))
    }

    fn finish(&mut self, events: &mut Vec<GameEvent>) {
        self.finished = true;
        events.push(GameEvent::EngagementEnded {
            attacker: self.attacker,
            defender: self.defender,
        });
    }

    /// 推進一擊，回傳這一步產生的事件
    ///
    /// 第一步會先送出 `EngagementStarted`；最後一步會附帶 `EngagementEnded`。
    /// 已結束的交戰回傳空事件。
    pub fn step<D: Dice + ?Sized>(&mut self, roster: &mut Roster, dice: &mut D) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        if !self.started {
            self.started = true;
            events.push(GameEvent::EngagementStarted {
                attacker: self.attacker,
                defender: self.defender,
            });
        }

        while self.next < SEQUENCE.len() {
            let index = self.next;
            self.next += 1;
            if !self.is_applicable(index) {
                continue;
            }
            let (striker, target, stats) = self.participants(SEQUENCE[index].0);
            let Some(target_unit) = roster.get_mut(target) else {
                break;
            };
            let roll = roll_strike(&stats, dice);
            if roll.hit {
                target_unit.take_damage(roll.damage);
            }
            let remaining = target_unit.hp;
            tracing::debug!(
                striker,
                target,
                hit = roll.hit,
                crit = roll.is_crit,
                damage = roll.damage,
                remaining,
                "strike"
            );
            events.push(GameEvent::Strike {
                attacker: striker,
                defender: target,
                damage: roll.damage,
                is_crit: roll.is_crit,
                hit: roll.hit,
                defender_hp: remaining,
            });

            if remaining == 0 {
                if let Some(dead) = roster.remove(target) {
                    tracing::info!(unit = dead.id, name = %dead.name, "unit defeated");
                    events.push(GameEvent::Death {
                        unit: dead.id,
                        name: dead.name,
                    });
                }
                self.finish(&mut events);
                return events;
            }
            if !self.has_next() {
                self.finish(&mut events);
            }
            return events;
        }

        self.finish(&mut events);
        events
    }

    /// 一次解完剩餘步驟
    pub fn resolve<D: Dice + ?Sized>(mut self, roster: &mut Roster, dice: &mut D) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while !self.finished {
            events.extend(self.step(roster, dice));
        }
        events
    }
}

/// 批次模式：直接解完一場交戰；雙方不合法時不產生事件
pub fn resolve_engagement<D: Dice + ?Sized>(
    roster: &mut Roster,
    grid: &Grid,
    attacker: UnitId,
    defender: UnitId,
    dice: &mut D,
) -> Vec<GameEvent> {
    match Engagement::new(roster, grid, attacker, defender) {
        Some(engagement) => engagement.resolve(roster, dice),
        None => Vec::new(),
    }
}
