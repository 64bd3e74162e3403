//! 事件節奏
//!
//! 核心不等待任何時間；這裡依事件種類決定播放後要停多久。

use std::thread;
use std::time::Duration;
use tactics::event::GameEvent;
use tactics::unit::Faction;

/// 敵方每個單位行動後、以及敵方回合開始前的停頓
pub const AI_PAUSE_MS: u64 = 500;
/// 一次攻擊的撞擊動畫
pub const STRIKE_PAUSE_MS: u64 = 250;

#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    realtime: bool,
}

impl Pacer {
    pub fn new(realtime: bool) -> Self {
        Self { realtime }
    }

    pub fn pause_for(event: &GameEvent) -> Duration {
        let ms = match event {
            GameEvent::TurnChanged {
                faction: Faction::Enemy,
            } => AI_PAUSE_MS,
            GameEvent::Strike { .. } => STRIKE_PAUSE_MS,
            _ => 0,
        };
        Duration::from_millis(ms)
    }

    /// 敵方單位行動完的停頓
    pub fn ai_step(&self) {
        self.sleep(Duration::from_millis(AI_PAUSE_MS));
    }

    pub fn after(&self, event: &GameEvent) {
        self.sleep(Self::pause_for(event));
    }

    fn sleep(&self, duration: Duration) {
        if self.realtime && !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}
