//! 輸入去抖動
//!
//! 把「目前按住哪些鍵」加上經過時間轉成離散的操作意圖：
//! 確認、取消、選單上下只在按下瞬間觸發；方向鍵按住時每隔固定時間移動一次游標。

use crate::constants::CURSOR_REPEAT_MS;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// 實體按鍵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
}

impl Button {
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// 同一時間按住的按鍵集合
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn contains(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub fn insert(&mut self, button: Button) {
        self.0 |= button.bit();
    }

    pub fn remove(&mut self, button: Button) {
        self.0 &= !button.bit();
    }

    pub fn with(mut self, button: Button) -> Self {
        self.insert(button);
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// 上一幀沒按、這一幀按下
    fn pressed_since(self, previous: ButtonSet, button: Button) -> bool {
        self.contains(button) && !previous.contains(button)
    }
}

impl FromIterator<Button> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = Button>>(iter: I) -> Self {
        let mut set = ButtonSet::empty();
        for button in iter {
            set.insert(button);
        }
        set
    }
}

/// 狀態機接受的操作意圖
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    MoveCursor { dx: isize, dy: isize },
    Confirm,
    Cancel,
    /// -1 往上、+1 往下，超出範圍時循環
    NavigateMenu(i32),
}

/// 按鍵去抖動狀態
#[derive(Debug, Clone)]
pub struct InputState {
    previous: ButtonSet,
    repeat_ms: u64,
    since_cursor_move: u64,
    menu_open: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new(CURSOR_REPEAT_MS)
    }
}

impl InputState {
    pub fn new(repeat_ms: u64) -> Self {
        Self {
            previous: ButtonSet::empty(),
            repeat_ms,
            // 第一次按下方向鍵立即移動
            since_cursor_move: repeat_ms,
            menu_open: false,
        }
    }

    pub fn repeat_ms(&self) -> u64 {
        self.repeat_ms
    }

    /// 選單開啟時上下鍵改為選單導覽，游標凍結
    pub fn set_menu_open(&mut self, open: bool) {
        self.menu_open = open;
    }

    /// 依本幀按住的鍵與距上一幀的毫秒數產生意圖
    pub fn update(&mut self, held: ButtonSet, dt_ms: u64) -> Vec<Intent> {
        let mut intents = Vec::new();
        let previous = self.previous;
        self.previous = held;

        if !self.menu_open {
            self.since_cursor_move = self.since_cursor_move.saturating_add(dt_ms);
            if self.since_cursor_move >= self.repeat_ms {
                if let Some((dx, dy)) = cursor_offset(held) {
                    intents.push(Intent::MoveCursor { dx, dy });
                    self.since_cursor_move = 0;
                }
            }
        }

        if held.pressed_since(previous, Button::Confirm) {
            intents.push(Intent::Confirm);
        }
        if held.pressed_since(previous, Button::Cancel) {
            intents.push(Intent::Cancel);
        }

        if self.menu_open {
            if held.pressed_since(previous, Button::Up) {
                intents.push(Intent::NavigateMenu(-1));
            }
            if held.pressed_since(previous, Button::Down) {
                intents.push(Intent::NavigateMenu(1));
            }
        }
        intents
    }
}

/// 上優先於下、左優先於右；垂直與水平可同時成立形成斜向
fn cursor_offset(held: ButtonSet) -> Option<(isize, isize)> {
    let dy = if held.contains(Button::Up) {
        -1
    } else if held.contains(Button::Down) {
        1
    } else {
        0
    };
    let dx = if held.contains(Button::Left) {
        -1
    } else if held.contains(Button::Right) {
        1
    } else {
        0
    };
    (dx != 0 || dy != 0).then_some((dx, dy))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(buttons: &[Button]) -> ButtonSet {
        buttons.iter().copied().collect()
    }

    #[test]
    fn test_confirm_fires_once_per_press() {
        let mut input = InputState::default();
        let confirm = held(&[Button::Confirm]);
        assert_eq!(input.update(confirm, 16), vec![Intent::Confirm]);
        assert!(input.update(confirm, 16).is_empty(), "按住不重複觸發");
        assert!(input.update(ButtonSet::empty(), 16).is_empty());
        assert_eq!(input.update(confirm, 16), vec![Intent::Confirm]);
    }

    #[test]
    fn test_cursor_repeat_interval() {
        let mut input = InputState::new(100);
        let right = held(&[Button::Right]);
        assert_eq!(input.update(right, 16), vec![Intent::MoveCursor { dx: 1, dy: 0 }]);
        let mut moves = 0;
        for _ in 0..12 {
            moves += input.update(right, 16).len();
        }
        // 192ms 內只會再移動一次（第 7 幀累積 112ms）
        assert_eq!(moves, 1);
    }

    #[test]
    fn test_direction_priority_and_diagonal() {
        let mut input = InputState::default();
        let intents = input.update(held(&[Button::Up, Button::Down, Button::Right]), 0);
        assert_eq!(intents, vec![Intent::MoveCursor { dx: 1, dy: -1 }]);

        let mut input = InputState::default();
        let intents = input.update(held(&[Button::Left, Button::Right]), 0);
        assert_eq!(intents, vec![Intent::MoveCursor { dx: -1, dy: 0 }]);
    }

    #[test]
    fn test_menu_navigation_on_press_edge() {
        let mut input = InputState::default();
        input.set_menu_open(true);
        let down = held(&[Button::Down]);
        assert_eq!(input.update(down, 500), vec![Intent::NavigateMenu(1)]);
        assert!(input.update(down, 500).is_empty());
        assert_eq!(input.update(held(&[Button::Up]), 16), vec![Intent::NavigateMenu(-1)]);
    }

    #[test]
    fn test_button_set() {
        let mut set = ButtonSet::empty().with(Button::Cancel);
        assert!(set.contains(Button::Cancel));
        assert!(!set.contains(Button::Confirm));
        set.remove(Button::Cancel);
        assert!(set.is_empty());
    }
}
