//! 回合與階段狀態機
//!
//! [`Game`] 是唯一會修改名冊的地方：接收操作意圖、切換階段、驅動戰鬥與敵方 AI，
//! 並把結果以有序事件回傳給渲染器。
//!
//! 戰鬥與敵方回合一律先掛成待處理工作（[`Pending`]）。批次模式在同一次呼叫內
//! 推進到底；逐步模式停在 `Animation`，由外部呼叫 [`Game::advance`] 一步一步推進。

use crate::ai::AiTurn;
use crate::combat::{Engagement, forecast};
use crate::dice::{Dice, RngDice};
use crate::error::{Rejection, Result};
use crate::event::{GameEvent, Outcome};
use crate::grid::Grid;
use crate::input::{ButtonSet, InputState, Intent};
use crate::loader::build_world;
use crate::loader_schema::{GameConfig, ResolveMode};
use crate::movement::reachable_set;
use crate::state::{GameState, Menu, MenuAction, Pending, Phase};
use crate::unit::{Faction, Roster};
use rand::SeedableRng;
use rand::rngs::StdRng;

pub type IntentResult = std::result::Result<Vec<GameEvent>, Rejection>;

pub struct Game<D: Dice = RngDice<StdRng>> {
    state: GameState,
    dice: D,
    mode: ResolveMode,
    input: InputState,
    show_tutorial: bool,
    /// 重設用的初始地圖與名冊
    initial: (Grid, Roster),
}

impl Game<RngDice<StdRng>> {
    /// 依設定建立遊戲；地圖與擲骰共用同一個亂數來源，固定種子可重現整場遊戲
    pub fn from_config(config: &GameConfig) -> Result<Self> {
        let mut rng = match config.map.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (grid, roster) = build_world(config, &mut rng)?;
        tracing::info!(
            cols = grid.cols(),
            rows = grid.rows(),
            units = roster.len(),
            mode = %config.rules.resolve,
            "world built"
        );
        Ok(Game::new(grid, roster, RngDice::new(rng))
            .with_mode(config.rules.resolve)
            .with_tutorial(config.rules.show_tutorial)
            .with_cursor_repeat(config.input.cursor_repeat_ms))
    }
}

impl<D: Dice> Game<D> {
    /// 以批次模式、無開場說明建立遊戲，玩家先攻
    pub fn new(grid: Grid, roster: Roster, dice: D) -> Self {
        Self {
            state: GameState::new(grid.clone(), roster.clone(), false),
            dice,
            mode: ResolveMode::Batch,
            input: InputState::default(),
            show_tutorial: false,
            initial: (grid, roster),
        }
    }

    pub fn with_mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_tutorial(mut self, show: bool) -> Self {
        self.show_tutorial = show;
        self.state.phase = if show { Phase::Tutorial } else { Phase::Map };
        self
    }

    pub fn with_cursor_repeat(mut self, repeat_ms: u64) -> Self {
        self.input = InputState::new(repeat_ms);
        self
    }

    pub fn mode(&self) -> ResolveMode {
        self.mode
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn dice_mut(&mut self) -> &mut D {
        &mut self.dice
    }

    /// 回到初始地圖與名冊，解除終局狀態
    pub fn reset(&mut self) {
        let (grid, roster) = self.initial.clone();
        self.state = GameState::new(grid, roster, self.show_tutorial);
        self.input = InputState::new(self.input.repeat_ms());
        tracing::info!("game reset");
    }

    /// 是否有戰鬥或敵方回合尚未推進完
    pub fn is_busy(&self) -> bool {
        self.state.pending.is_some()
    }

    // ------------------------------------------------------------------------
    // 輸入
    // ------------------------------------------------------------------------

    /// 以按住的按鍵與經過時間驅動；被拒絕的意圖直接略過
    pub fn update(&mut self, held: ButtonSet, dt_ms: u64) -> Vec<GameEvent> {
        self.input.set_menu_open(self.state.phase == Phase::Menu);
        let intents = self.input.update(held, dt_ms);
        let mut events = Vec::new();
        for intent in intents {
            if let Ok(more) = self.apply(intent) {
                events.extend(more);
            }
        }
        events
    }

    /// 套用一個操作意圖
    ///
    /// 被拒絕時狀態完全不變。
    pub fn apply(&mut self, intent: Intent) -> IntentResult {
        let mut events = self.dispatch(intent).inspect_err(|rejection| {
            tracing::debug!(?intent, %rejection, "intent rejected");
        })?;
        if self.mode == ResolveMode::Batch {
            events.extend(self.run_to_idle());
        }
        Ok(events)
    }

    fn dispatch(&mut self, intent: Intent) -> IntentResult {
        if self.state.outcome.is_some() {
            return Err(Rejection::GameOver);
        }
        if self.is_busy() {
            return Err(Rejection::Busy);
        }
        if self.state.turn != Faction::Player {
            return Err(Rejection::NotPlayerTurn);
        }
        match intent {
            Intent::MoveCursor { dx, dy } => self.move_cursor(dx, dy),
            Intent::Confirm => self.confirm(),
            Intent::Cancel => self.cancel(),
            Intent::NavigateMenu(delta) => self.navigate_menu(delta),
        }
    }

    fn reject(&self, reason: &'static str) -> IntentResult {
        Err(Rejection::InvalidIntent {
            phase: self.state.phase,
            reason,
        })
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.state.phase != phase {
            tracing::debug!(from = %self.state.phase, to = %phase, "phase change");
            self.state.phase = phase;
        }
    }

    fn move_cursor(&mut self, dx: isize, dy: isize) -> IntentResult {
        match self.state.phase {
            Phase::Map | Phase::UnitMove | Phase::UnitAttack => {
                self.state.cursor = self.state.grid.clamp_offset(self.state.cursor, dx, dy);
                Ok(Vec::new())
            }
            _ => self.reject("此階段游標不可移動"),
        }
    }

    fn navigate_menu(&mut self, delta: i32) -> IntentResult {
        if self.state.phase != Phase::Menu {
            return self.reject("沒有開啟的選單");
        }
        let Some(menu) = self.state.menu.as_mut() else {
            return self.reject("沒有開啟的選單");
        };
        menu.navigate(delta);
        Ok(Vec::new())
    }

    // ------------------------------------------------------------------------
    // 確認
    // ------------------------------------------------------------------------

    fn confirm(&mut self) -> IntentResult {
        match self.state.phase {
            Phase::Tutorial => {
                self.set_phase(Phase::Map);
                Ok(Vec::new())
            }
            Phase::Map => self.select_unit(),
            Phase::UnitMove => self.commit_move(),
            Phase::Menu => self.choose_menu_action(),
            Phase::UnitAttack => self.choose_target(),
            Phase::Forecast => self.start_engagement(),
            Phase::Animation => Err(Rejection::Busy),
        }
    }

    fn select_unit(&mut self) -> IntentResult {
        let Some(unit) = self.state.roster.unit_at(self.state.cursor) else {
            return self.reject("游標下沒有單位");
        };
        if unit.faction != Faction::Player {
            return self.reject("不能選取敵方單位");
        }
        if unit.has_moved {
            return self.reject("單位本回合已行動");
        }
        let Ok(reachable) = reachable_set(unit, &self.state.roster, &self.state.grid) else {
            return self.reject("無法計算可移動範圍");
        };
        let (id, pos) = (unit.id, unit.pos);
        tracing::debug!(unit = id, cells = reachable.len(), "unit selected");

        self.state.selected = Some(id);
        self.state.original_position = Some(pos);
        self.state.reachable = Some(reachable);
        self.set_phase(Phase::UnitMove);
        Ok(Vec::new())
    }

    fn commit_move(&mut self) -> IntentResult {
        let Some(id) = self.state.selected else {
            return self.reject("沒有選取單位");
        };
        let to = self.state.cursor;
        if !self.state.reachable.as_ref().is_some_and(|r| r.contains(to)) {
            return self.reject("超出可移動範圍");
        }
        if self.state.roster.unit_at(to).is_some_and(|u| u.id != id) {
            return self.reject("目的地已有單位");
        }
        let Some(faction) = self.state.roster.get(id).map(|u| u.faction) else {
            return self.reject("選取的單位不存在");
        };
        let Ok(from) = self.state.roster.move_unit(id, to) else {
            return self.reject("無法移動到目的地");
        };

        let mut events = Vec::new();
        if from != to {
            events.push(GameEvent::UnitMoved { unit: id, from, to });
        }
        let can_attack = !self.state.roster.adjacent_hostiles(faction, to).is_empty();
        self.state.menu = Some(Menu::for_destination(can_attack));
        self.set_phase(Phase::Menu);
        Ok(events)
    }

    fn choose_menu_action(&mut self) -> IntentResult {
        match self.state.menu.as_ref().and_then(Menu::selected) {
            Some(MenuAction::Wait) => Ok(self.finalize()),
            Some(MenuAction::Attack) => {
                self.set_phase(Phase::UnitAttack);
                Ok(Vec::new())
            }
            None => self.reject("選單沒有選項"),
        }
    }

    fn choose_target(&mut self) -> IntentResult {
        let Some(id) = self.state.selected else {
            return self.reject("沒有選取單位");
        };
        let Some(attacker) = self.state.roster.get(id) else {
            return self.reject("選取的單位不存在");
        };
        let Some(target) = self.state.roster.unit_at(self.state.cursor) else {
            return self.reject("游標下沒有目標");
        };
        if !attacker.is_hostile_to(target) || !attacker.pos.is_adjacent(target.pos) {
            return self.reject("目標必須是相鄰的敵人");
        }
        let target_id = target.id;
        self.state.target = Some(target_id);
        self.state.forecast = forecast(&self.state.roster, &self.state.grid, id, target_id);
        self.set_phase(Phase::Forecast);
        Ok(Vec::new())
    }

    fn start_engagement(&mut self) -> IntentResult {
        let (Some(attacker), Some(defender)) = (self.state.selected, self.state.target) else {
            return self.reject("沒有攻擊目標");
        };
        let Some(engagement) =
            Engagement::new(&self.state.roster, &self.state.grid, attacker, defender)
        else {
            return self.reject("無法與目標交戰");
        };
        tracing::debug!(attacker, defender, "engagement queued");
        self.state.pending = Some(Pending::Engagement(engagement));
        self.set_phase(Phase::Animation);
        Ok(Vec::new())
    }

    // ------------------------------------------------------------------------
    // 取消
    // ------------------------------------------------------------------------

    fn cancel(&mut self) -> IntentResult {
        match self.state.phase {
            Phase::Tutorial => {
                self.set_phase(Phase::Map);
                Ok(Vec::new())
            }
            Phase::UnitMove => {
                self.state.clear_selection();
                self.set_phase(Phase::Map);
                Ok(Vec::new())
            }
            Phase::Menu => self.undo_move(),
            Phase::UnitAttack => {
                self.state.target = None;
                if let Some(menu) = self.state.menu.as_mut() {
                    menu.reset_selection();
                }
                self.set_phase(Phase::Menu);
                Ok(Vec::new())
            }
            Phase::Forecast => {
                self.state.target = None;
                self.state.forecast = None;
                self.set_phase(Phase::UnitAttack);
                Ok(Vec::new())
            }
            Phase::Map => self.reject("沒有可取消的操作"),
            Phase::Animation => Err(Rejection::Busy),
        }
    }

    /// 選單中取消：單位回到原位，游標跟著回去
    fn undo_move(&mut self) -> IntentResult {
        let (Some(id), Some(original)) = (self.state.selected, self.state.original_position)
        else {
            return self.reject("沒有可復原的移動");
        };
        let Ok(from) = self.state.roster.move_unit(id, original) else {
            return self.reject("原位已被佔據");
        };
        let mut events = Vec::new();
        if from != original {
            events.push(GameEvent::UnitMoved {
                unit: id,
                from,
                to: original,
            });
        }
        self.state.cursor = original;
        self.state.menu = None;
        self.set_phase(Phase::UnitMove);
        Ok(events)
    }

    // ------------------------------------------------------------------------
    // 推進待處理工作
    // ------------------------------------------------------------------------

    /// 推進一步：交戰中的一擊，或敵方一個單位的行動
    ///
    /// 沒有待處理工作時回傳空事件。
    pub fn advance(&mut self) -> Vec<GameEvent> {
        let Some(pending) = self.state.pending.take() else {
            return Vec::new();
        };
        match pending {
            Pending::Engagement(mut engagement) => {
                let mut events = engagement.step(&mut self.state.roster, &mut self.dice);
                if engagement.is_finished() {
                    events.extend(self.finalize());
                } else {
                    self.state.pending = Some(Pending::Engagement(engagement));
                }
                events
            }
            Pending::EnemyTurn(turn) => self.step_enemy_turn(turn),
        }
    }

    /// 推進到沒有待處理工作為止
    pub fn run_to_idle(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        while self.is_busy() {
            events.extend(self.advance());
        }
        events
    }

    fn step_enemy_turn(&mut self, mut turn: AiTurn) -> Vec<GameEvent> {
        let mut events = turn
            .step(&mut self.state.roster, &self.state.grid, &mut self.dice)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ai action skipped");
                Vec::new()
            });

        if let Some(outcome) = self.check_outcome() {
            events.push(outcome.into());
            return events;
        }
        if turn.is_done() {
            events.extend(self.end_turn());
        } else {
            self.state.pending = Some(Pending::EnemyTurn(turn));
        }
        events
    }

    // ------------------------------------------------------------------------
    // 回合結束
    // ------------------------------------------------------------------------

    /// 收尾行動單位（若仍存活），清除選取並檢查回合是否結束
    fn finalize(&mut self) -> Vec<GameEvent> {
        if let Some(unit) = self
            .state
            .selected
            .and_then(|id| self.state.roster.get_mut(id))
        {
            unit.has_moved = true;
            unit.is_engaged = true;
        }
        self.state.clear_selection();
        self.set_phase(Phase::Map);

        if let Some(outcome) = self.check_outcome() {
            return vec![outcome.into()];
        }
        if self.state.roster.all_moved(self.state.turn) {
            return self.end_turn();
        }
        Vec::new()
    }

    /// 先判斷戰敗再判斷勝利；結局只會產生一次
    fn check_outcome(&mut self) -> Option<Outcome> {
        if self.state.outcome.is_some() {
            return None;
        }
        let outcome = if self.state.roster.count(Faction::Player) == 0 {
            Outcome::Defeat
        } else if self.state.roster.count(Faction::Enemy) == 0 {
            Outcome::Victory
        } else {
            return None;
        };
        tracing::info!(%outcome, "game over");
        self.state.outcome = Some(outcome);
        self.state.pending = None;
        self.state.clear_selection();
        self.set_phase(Phase::Map);
        Some(outcome)
    }

    /// 換邊：重設新陣營的行動旗標；輪到敵方時排入 AI 回合
    fn end_turn(&mut self) -> Vec<GameEvent> {
        let next = self.state.turn.opponent();
        self.state.turn = next;
        self.state.roster.reset_faction(next);
        tracing::info!(faction = %next, "turn changed");

        if next == Faction::Enemy {
            self.state.pending = Some(Pending::EnemyTurn(AiTurn::begin(
                &self.state.roster,
                Faction::Enemy,
            )));
            self.set_phase(Phase::Animation);
        } else {
            self.set_phase(Phase::Map);
        }
        vec![GameEvent::TurnChanged { faction: next }]
    }
}
