//! 擲骰來源
//!
//! 戰鬥只需要 [0, 100) 的均勻整數。正式遊戲用 [`RngDice`] 包住 `rand` 的亂數產生器，
//! 測試與重播用 [`ScriptedDice`] 依序吐出預先寫好的點數。

use crate::constants::ROLL_CEILING;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;

pub trait Dice {
    /// 擲一次 [0, 100) 的點數
    fn roll_percent(&mut self) -> u32;
}

/// 以 `rand::Rng` 擲骰
#[derive(Debug, Clone)]
pub struct RngDice<R: Rng> {
    rng: R,
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

impl RngDice<StdRng> {
    /// 固定種子，可重現整場戰鬥
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> Dice for RngDice<R> {
    fn roll_percent(&mut self) -> u32 {
        self.rng.random_range(0..ROLL_CEILING)
    }
}

/// 依序回傳預設點數；用完後重複 `fallback`
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u32>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback: 0,
        }
    }

    /// 每次都擲出同一個點數
    pub fn always(value: u32) -> Self {
        Self {
            rolls: VecDeque::new(),
            fallback: value,
        }
    }

    pub fn with_fallback(mut self, fallback: u32) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl Dice for ScriptedDice {
    fn roll_percent(&mut self) -> u32 {
        self.rolls.pop_front().unwrap_or(self.fallback)
    }
}
