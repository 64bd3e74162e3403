//! 戰鬥流程測試

use tactics::combat::{Engagement, combat_stats, forecast, resolve_engagement};
use tactics::dice::{RngDice, ScriptedDice};
use tactics::event::GameEvent;
use tactics::grid::{Position, TerrainBonus};
use tactics::loader::load_from_ascii;
use tactics::unit::{Faction, Roster, Stats, UnitSpec};

fn spawn(roster: &mut Roster, name: &str, pos: Position, faction: Faction, stats: Stats) -> u32 {
    roster
        .spawn(UnitSpec::new(name, pos, faction).with_stats(stats))
        .unwrap()
}

#[test]
fn test_lethal_first_strike_ends_engagement() {
    let (grid, _) = load_from_ascii("A D").unwrap();
    let mut roster = Roster::new();
    let attacker_stats = Stats {
        max_hp: 20,
        str: 10,
        def: 0,
        spd: 1,
        dex: 1,
        luk: 0,
        ..Stats::default()
    };
    let defender_stats = Stats {
        max_hp: 1,
        def: 0,
        spd: 0,
        luk: 0,
        ..Stats::default()
    };
    let a = spawn(&mut roster, "A", Position::new(0, 0), Faction::Player, attacker_stats);
    let d = spawn(&mut roster, "D", Position::new(1, 0), Faction::Enemy, defender_stats);

    // 命中 3%、爆擊 0%：擲 0 命中，第二顆骰不會爆擊
    let events = resolve_engagement(&mut roster, &grid, a, d, &mut ScriptedDice::always(0));
    assert_eq!(
        events,
        vec![
            GameEvent::EngagementStarted {
                attacker: a,
                defender: d
            },
            GameEvent::Strike {
                attacker: a,
                defender: d,
                damage: 10,
                is_crit: false,
                hit: true,
                defender_hp: 0,
            },
            GameEvent::Death {
                unit: d,
                name: "D".to_string()
            },
            GameEvent::EngagementEnded {
                attacker: a,
                defender: d
            },
        ]
    );
    assert!(!roster.contains(d));
    assert_eq!(roster.get(a).unwrap().hp, 20, "沒有反擊");
}

#[test]
fn test_double_attack_adds_one_strike() {
    let (grid, _) = load_from_ascii("A D").unwrap();
    let mut roster = Roster::new();
    let fast = Stats {
        spd: 8,
        ..Stats::default()
    };
    let a = spawn(&mut roster, "A", Position::new(0, 0), Faction::Player, fast);
    let d = spawn(&mut roster, "D", Position::new(1, 0), Faction::Enemy, Stats::default());

    let events = resolve_engagement(&mut roster, &grid, a, d, &mut ScriptedDice::always(99));
    let strikes: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Strike { attacker, .. } => Some(*attacker),
            _ => None,
        })
        .collect();
    assert_eq!(strikes, vec![a, d, a]);
}

fn strikers(events: &[GameEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::Strike { attacker, .. } => Some(*attacker),
            _ => None,
        })
        .collect()
}

#[test]
fn test_faster_defender_strikes_twice() {
    let (grid, _) = load_from_ascii("A D").unwrap();
    let mut roster = Roster::new();
    let fast = Stats {
        spd: 8,
        ..Stats::default()
    };
    let a = spawn(&mut roster, "A", Position::new(0, 0), Faction::Player, Stats::default());
    let d = spawn(&mut roster, "D", Position::new(1, 0), Faction::Enemy, fast);

    let events = resolve_engagement(&mut roster, &grid, a, d, &mut ScriptedDice::always(99));
    assert_eq!(strikers(&events), vec![a, d, d]);
    assert_eq!(roster.get(a).unwrap().hp, 20);
    assert_eq!(roster.get(d).unwrap().hp, 20);
}

#[test]
fn test_counter_kill_skips_defender_double() {
    let (grid, _) = load_from_ascii("A D").unwrap();
    let mut roster = Roster::new();
    let a = roster
        .spawn(UnitSpec::new("A", Position::new(0, 0), Faction::Player).with_hp(1))
        .unwrap();
    let fast = Stats {
        spd: 8,
        ..Stats::default()
    };
    let d = spawn(&mut roster, "D", Position::new(1, 0), Faction::Enemy, fast);

    // 攻方落空（99）；守方命中 7% 擲 0 命中，爆擊 1% 擲 99 不爆擊，3 點傷害致命
    let mut dice = ScriptedDice::new([99, 0, 99]);
    let events = resolve_engagement(&mut roster, &grid, a, d, &mut dice);
    assert_eq!(strikers(&events), vec![a, d], "攻方陣亡後守方不再追擊");
    assert!(events.contains(&GameEvent::Death {
        unit: a,
        name: "A".to_string()
    }));
    assert!(!roster.contains(a));
    assert_eq!(dice.remaining(), 0);
}

#[test]
fn test_counter_kills_attacker() {
    let (grid, _) = load_from_ascii("A D").unwrap();
    let mut roster = Roster::new();
    let a = roster
        .spawn(UnitSpec::new("A", Position::new(0, 0), Faction::Player).with_hp(1))
        .unwrap();
    let brute = Stats {
        str: 10,
        dex: 40,
        ..Stats::default()
    };
    let d = spawn(&mut roster, "D", Position::new(1, 0), Faction::Enemy, brute);

    // 攻方落空（99），守方命中（0）後爆擊骰 99 不爆擊
    let mut dice = ScriptedDice::new([99, 0, 99]);
    let events = resolve_engagement(&mut roster, &grid, a, d, &mut dice);
    assert!(matches!(
        events[2],
        GameEvent::Strike {
            damage: 8,
            defender_hp: 0,
            ..
        }
    ));
    assert!(events.contains(&GameEvent::Death {
        unit: a,
        name: "A".to_string()
    }));
    assert!(!roster.contains(a));
    assert!(matches!(events.last(), Some(GameEvent::EngagementEnded { .. })));
}

#[test]
fn test_forest_defender_in_forecast() {
    let (grid, _) = load_from_ascii("A D^").unwrap();
    let mut roster = Roster::new();
    let a = spawn(&mut roster, "A", Position::new(0, 0), Faction::Player, Stats::default());
    let d = spawn(&mut roster, "D", Position::new(1, 0), Faction::Enemy, Stats::default());
    let preview = forecast(&roster, &grid, a, d).unwrap();
    let plain = combat_stats(&Stats::default(), &Stats::default(), TerrainBonus::default());
    assert_eq!(preview.attack.damage, plain.damage - 1);
    assert_eq!(preview.attack.hit, (plain.hit - 20).max(0));
    assert_eq!(preview.counter, plain, "攻方站在平地");
    assert_eq!(preview.projected_defender_hp, 18);
    assert_eq!(roster.get(d).unwrap().hp, 20, "預測不改變狀態");
}

#[test]
fn test_hp_stays_in_range_over_many_engagements() {
    let (grid, _) = load_from_ascii("A D").unwrap();
    let mut dice = RngDice::seeded(7);
    for _ in 0..200 {
        let mut roster = Roster::new();
        let a = spawn(&mut roster, "A", Position::new(0, 0), Faction::Player, Stats::default());
        let d = spawn(&mut roster, "D", Position::new(1, 0), Faction::Enemy, Stats::default());
        let Some(engagement) = Engagement::new(&roster, &grid, a, d) else {
            panic!("相鄰敵對單位必可交戰");
        };
        let events = engagement.resolve(&mut roster, &mut dice);
        for event in &events {
            if let GameEvent::Strike {
                damage,
                defender_hp,
                ..
            } = event
            {
                assert!(*damage >= 0);
                assert!((0..=20).contains(defender_hp));
            }
        }
        for unit in roster.iter() {
            assert!((1..=unit.stats.max_hp).contains(&unit.hp));
        }
    }
}
