//! 測試輔助：ScenarioBuilder 與游標操作
//!
//! 用 ASCII art 視覺化定義戰場，取代手寫 TOML 字串。

use crate::dice::{Dice, ScriptedDice};
use crate::error::Result;
use crate::event::GameEvent;
use crate::game::{Game, IntentResult};
use crate::grid::Position;
use crate::input::Intent;
use crate::loader::build_world;
use crate::loader_schema::{GameConfig, MapConfig, ResolveMode, RulesConfig, UnitConfig};
use crate::unit::{Faction, Stats};
use rand::SeedableRng;
use rand::rngs::StdRng;

struct MarkerDef {
    marker: String,
    name: String,
    faction: Faction,
    stats: Stats,
    hp: Option<i32>,
}

/// 用 ASCII art 建立測試戰場
///
/// # 使用範例
///
/// ```ignore
/// let game = ScenarioBuilder::from_ascii("
///   P . . ^
///   . . . E
/// ")
/// .unit("P", "Byleth", Faction::Player)
/// .unit("E", "Bandit", Faction::Enemy)
/// .build(ScriptedDice::always(0))?;
/// ```
pub struct ScenarioBuilder {
    ascii: String,
    markers: Vec<MarkerDef>,
    mode: ResolveMode,
    show_tutorial: bool,
}

impl ScenarioBuilder {
    pub fn from_ascii(ascii: &str) -> Self {
        Self {
            ascii: ascii.to_string(),
            markers: Vec::new(),
            mode: ResolveMode::Batch,
            show_tutorial: false,
        }
    }

    /// 標記的每一格各放一個預設屬性的單位
    pub fn unit(self, marker: &str, name: &str, faction: Faction) -> Self {
        self.unit_with(marker, name, faction, Stats::default())
    }

    pub fn unit_with(mut self, marker: &str, name: &str, faction: Faction, stats: Stats) -> Self {
        self.markers.push(MarkerDef {
            marker: marker.to_string(),
            name: name.to_string(),
            faction,
            stats,
            hp: None,
        });
        self
    }

    /// 最後一個加入的單位以指定血量開場
    pub fn hp(mut self, hp: i32) -> Self {
        if let Some(last) = self.markers.last_mut() {
            last.hp = Some(hp);
        }
        self
    }

    pub fn mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn tutorial(mut self, show: bool) -> Self {
        self.show_tutorial = show;
        self
    }

    /// 組出對應的遊戲設定
    pub fn to_config(&self) -> Result<GameConfig> {
        let (_, markers) = crate::loader::load_from_ascii(&self.ascii)?;
        let units = self
            .markers
            .iter()
            .flat_map(|def| {
                let count = markers.get(&def.marker).map_or(0, Vec::len);
                (0..count.max(1)).map(move |_| UnitConfig {
                    name: def.name.clone(),
                    faction: def.faction,
                    position: None,
                    marker: Some(def.marker.clone()),
                    stats: def.stats,
                    hp: def.hp,
                })
            })
            .collect();
        Ok(GameConfig {
            map: MapConfig {
                layout: Some(self.ascii.clone()),
                ..MapConfig::default()
            },
            rules: RulesConfig {
                show_tutorial: self.show_tutorial,
                resolve: self.mode,
            },
            units,
            ..GameConfig::default()
        })
    }

    pub fn build<D: Dice>(self, dice: D) -> Result<Game<D>> {
        let config = self.to_config()?;
        // 配置圖不會用到亂數
        let (grid, roster) = build_world(&config, &mut StdRng::seed_from_u64(0))?;
        Ok(Game::new(grid, roster, dice)
            .with_mode(self.mode)
            .with_tutorial(self.show_tutorial))
    }

    /// 擲骰永遠為 0：必定命中，爆擊率大於 0 時必定爆擊
    pub fn build_scripted(self) -> Result<Game<ScriptedDice>> {
        self.build(ScriptedDice::always(0))
    }
}

/// 把游標直接移到 `pos`
pub fn cursor_to<D: Dice>(game: &mut Game<D>, pos: Position) -> IntentResult {
    let cursor = game.cursor();
    let dx = pos.x as isize - cursor.x as isize;
    let dy = pos.y as isize - cursor.y as isize;
    game.apply(Intent::MoveCursor { dx, dy })
}

/// 游標移到 `pos` 後按確認
pub fn click<D: Dice>(game: &mut Game<D>, pos: Position) -> IntentResult {
    cursor_to(game, pos)?;
    game.apply(Intent::Confirm)
}

/// 選取 `from` 的單位，移到 `to` 並待機
pub fn move_and_wait<D: Dice>(
    game: &mut Game<D>,
    from: Position,
    to: Position,
) -> IntentResult {
    let mut events = click(game, from)?;
    events.extend(click(game, to)?);
    while game.menu().and_then(|m| m.selected()) != Some(crate::state::MenuAction::Wait) {
        game.apply(Intent::NavigateMenu(1))?;
    }
    events.extend(game.apply(Intent::Confirm)?);
    Ok(events)
}

/// 選取 `from` 的單位，移到 `to` 後攻擊 `target`，回傳確認戰鬥後的事件
pub fn move_and_attack<D: Dice>(
    game: &mut Game<D>,
    from: Position,
    to: Position,
    target: Position,
) -> IntentResult {
    click(game, from)?;
    click(game, to)?;
    // Attack 一定是第一個選項
    game.apply(Intent::Confirm)?;
    click(game, target)?;
    game.apply(Intent::Confirm)
}

pub fn count_events(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}
