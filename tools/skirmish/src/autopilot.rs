//! 玩家方自動操作
//!
//! 每次只看當前狀態決定下一個操作意圖，走和真人一樣的輸入路徑。
//! 移動與攻擊目標沿用敵方 AI 的貪婪策略。

use tactics::ai::plan_action;
use tactics::dice::Dice;
use tactics::game::Game;
use tactics::grid::Position;
use tactics::input::Intent;
use tactics::state::{MenuAction, Phase};
use tactics::unit::Faction;

/// 游標移到 `to` 的意圖；已在目標上時為 None
fn cursor_toward(from: Position, to: Position) -> Option<Intent> {
    if from == to {
        return None;
    }
    Some(Intent::MoveCursor {
        dx: to.x as isize - from.x as isize,
        dy: to.y as isize - from.y as isize,
    })
}

/// 下一個操作；動畫中或沒有事可做時為 None
pub fn next_intent<D: Dice>(game: &Game<D>) -> Option<Intent> {
    let cursor = game.cursor();
    match game.phase() {
        Phase::Tutorial | Phase::Forecast => Some(Intent::Confirm),
        Phase::Map => {
            let unit = game
                .units()
                .find(|u| u.faction == Faction::Player && !u.has_moved)?;
            Some(cursor_toward(cursor, unit.pos).unwrap_or(Intent::Confirm))
        }
        Phase::UnitMove => {
            let unit = game.selected_unit()?;
            let state = game.state();
            let plan = plan_action(&state.roster, &state.grid, unit.id).ok()?;
            Some(cursor_toward(cursor, plan.destination).unwrap_or(Intent::Confirm))
        }
        Phase::Menu => {
            let menu = game.menu()?;
            let wanted = if menu.options().contains(&MenuAction::Attack) {
                MenuAction::Attack
            } else {
                MenuAction::Wait
            };
            if menu.selected() == Some(wanted) {
                Some(Intent::Confirm)
            } else {
                Some(Intent::NavigateMenu(1))
            }
        }
        Phase::UnitAttack => {
            let target = game.attackable_targets().first().copied()?;
            let target_pos = game.unit(target)?.pos;
            Some(cursor_toward(cursor, target_pos).unwrap_or(Intent::Confirm))
        }
        Phase::Animation => None,
    }
}
