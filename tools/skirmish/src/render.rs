//! 終端輸出：ASCII 地圖與事件文字

use tactics::dice::Dice;
use tactics::event::GameEvent;
use tactics::game::Game;
use tactics::grid::{Position, Terrain};
use tactics::unit::Faction;

/// 玩家單位用大寫首字母、敵方用小寫；地形 `.` 平地、`^` 森林
pub fn board<D: Dice>(game: &Game<D>) -> String {
    let grid = game.grid();
    let mut out = String::with_capacity((grid.cols() * 2 + 1) * grid.rows());
    for y in 0..grid.rows() {
        let row: Vec<String> = (0..grid.cols())
            .map(|x| {
                let pos = Position::new(x, y);
                if let Some(unit) = game.unit_at(pos) {
                    let initial = unit.name.chars().next().unwrap_or('?');
                    return match unit.faction {
                        Faction::Player => initial.to_ascii_uppercase().to_string(),
                        Faction::Enemy => initial.to_ascii_lowercase().to_string(),
                    };
                }
                match game.terrain_at(pos) {
                    Some(Terrain::Forest) => "^".to_string(),
                    _ => ".".to_string(),
                }
            })
            .collect();
        out.push_str(&row.join(" "));
        out.push('\n');
    }
    out
}

fn name_of<D: Dice>(game: &Game<D>, id: u32) -> String {
    game.unit(id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| format!("#{id}"))
}

/// 事件的一行說明
pub fn describe<D: Dice>(game: &Game<D>, event: &GameEvent) -> String {
    match event {
        GameEvent::UnitMoved { unit, from, to } => format!(
            "{} moves ({}, {}) -> ({}, {})",
            name_of(game, *unit),
            from.x,
            from.y,
            to.x,
            to.y
        ),
        GameEvent::EngagementStarted { attacker, defender } => format!(
            "{} engages {}",
            name_of(game, *attacker),
            name_of(game, *defender)
        ),
        GameEvent::Strike {
            attacker,
            damage,
            is_crit,
            hit,
            defender_hp,
            ..
        } => {
            if !hit {
                format!("  {} misses", name_of(game, *attacker))
            } else if *is_crit {
                format!(
                    "  {} CRITS for {} (hp {})",
                    name_of(game, *attacker),
                    damage,
                    defender_hp
                )
            } else {
                format!(
                    "  {} hits for {} (hp {})",
                    name_of(game, *attacker),
                    damage,
                    defender_hp
                )
            }
        }
        GameEvent::Death { name, .. } => format!("  {name} is defeated"),
        GameEvent::EngagementEnded { .. } => "  engagement over".to_string(),
        GameEvent::TurnChanged { faction } => format!("== {faction} phase =="),
        GameEvent::Victory => "Victory!".to_string(),
        GameEvent::Defeat => "Defeat...".to_string(),
    }
}
