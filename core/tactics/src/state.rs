//! 遊戲狀態
//!
//! [`GameState`] 是唯一的可變狀態，由 [`crate::game::Game`] 持有並修改。

use crate::ai::AiTurn;
use crate::alias::UnitId;
use crate::combat::{Engagement, Forecast};
use crate::event::Outcome;
use crate::grid::{Grid, Position};
use crate::movement::ReachableSet;
use crate::unit::{Faction, Roster};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// 互動階段
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum Phase {
    /// 開場說明，只能往 Map 走
    Tutorial,
    #[default]
    Map,
    UnitMove,
    Menu,
    UnitAttack,
    Forecast,
    /// 戰鬥或敵方回合結算中，不接受輸入
    Animation,
}

/// 行動選單的選項
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum MenuAction {
    Attack,
    Wait,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    options: Vec<MenuAction>,
    selected: usize,
}

impl Menu {
    /// 有相鄰敵人時才有攻擊選項；待機永遠存在
    pub fn for_destination(can_attack: bool) -> Self {
        let mut options = Vec::with_capacity(2);
        if can_attack {
            options.push(MenuAction::Attack);
        }
        options.push(MenuAction::Wait);
        Self {
            options,
            selected: 0,
        }
    }

    pub fn options(&self) -> &[MenuAction] {
        &self.options
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<MenuAction> {
        self.options.get(self.selected).copied()
    }

    /// 循環移動選取項目
    pub fn navigate(&mut self, delta: i32) {
        let Ok(len) = i64::try_from(self.options.len()) else {
            return;
        };
        if len == 0 {
            return;
        }
        let next = (i64::try_from(self.selected).unwrap_or(0) + i64::from(delta)).rem_euclid(len);
        self.selected = usize::try_from(next).unwrap_or(0);
    }

    pub fn reset_selection(&mut self) {
        self.selected = 0;
    }
}

/// 動畫階段中等待推進的工作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// 玩家發起的交戰，結束後收尾行動單位
    Engagement(Engagement),
    /// 敵方回合
    EnemyTurn(AiTurn),
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub grid: Grid,
    pub roster: Roster,
    pub turn: Faction,
    pub phase: Phase,
    pub cursor: Position,
    pub selected: Option<UnitId>,
    pub reachable: Option<ReachableSet>,
    pub original_position: Option<Position>,
    pub target: Option<UnitId>,
    pub menu: Option<Menu>,
    pub forecast: Option<Forecast>,
    pub outcome: Option<Outcome>,
    pub pending: Option<Pending>,
}

impl GameState {
    pub fn new(grid: Grid, roster: Roster, show_tutorial: bool) -> Self {
        Self {
            grid,
            roster,
            turn: Faction::Player,
            phase: if show_tutorial {
                Phase::Tutorial
            } else {
                Phase::Map
            },
            cursor: Position::default(),
            selected: None,
            reachable: None,
            original_position: None,
            target: None,
            menu: None,
            forecast: None,
            outcome: None,
            pending: None,
        }
    }

    /// 清除選取相關的暫存
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.reachable = None;
        self.original_position = None;
        self.target = None;
        self.menu = None;
        self.forecast = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_options() {
        let menu = Menu::for_destination(true);
        assert_eq!(menu.options(), &[MenuAction::Attack, MenuAction::Wait]);
        let menu = Menu::for_destination(false);
        assert_eq!(menu.options(), &[MenuAction::Wait]);
        assert_eq!(menu.selected(), Some(MenuAction::Wait));
    }

    #[test]
    fn test_menu_navigation_wraps() {
        let mut menu = Menu::for_destination(true);
        menu.navigate(-1);
        assert_eq!(menu.selected(), Some(MenuAction::Wait));
        menu.navigate(1);
        assert_eq!(menu.selected(), Some(MenuAction::Attack));
        menu.navigate(3);
        assert_eq!(menu.selected_index(), 1);
        menu.reset_selection();
        assert_eq!(menu.selected_index(), 0);
    }
}
