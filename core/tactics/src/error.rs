//! 錯誤處理系統
//!
//! 建構期錯誤（地圖、名冊、設定載入）走 [`Error`]，帶 context 鏈。
//! 遊戲中的非法操作走 [`Rejection`]：狀態不變，呼叫端可忽略。

use crate::alias::{Coord, UnitId};
use crate::state::Phase;
use thiserror::Error as ThisError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 頂層錯誤，包含原始錯誤和 context 鏈
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    contexts: Vec<String>,
}

/// 錯誤種類
#[derive(Debug, ThisError)]
pub enum ErrorKind {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// 地圖錯誤
#[derive(Debug, ThisError)]
pub enum GridError {
    #[error("位置超出地圖邊界: ({x}, {y}) 邊界 ({width}, {height})")]
    OutOfBounds {
        x: Coord,
        y: Coord,
        width: Coord,
        height: Coord,
    },
    #[error("地圖尺寸不可為零: {cols}x{rows}")]
    EmptyGrid { cols: Coord, rows: Coord },
    #[error("森林機率必須介於 0 與 1 之間: {0}")]
    InvalidProbability(f64),
    #[error("第 {y} 列長度 {actual} 與第一列 {expected} 不一致")]
    RaggedRow {
        y: Coord,
        expected: Coord,
        actual: Coord,
    },
    #[error("地圖過大: {cols}x{rows} 超過 {max} 格")]
    TooLarge { cols: Coord, rows: Coord, max: usize },
}

/// 格式載入錯誤
#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("解析失敗: {0}")]
    ParseError(String),
    #[error("{format} 反序列化失敗: {reason}")]
    DeserializeError { format: String, reason: String },
    #[error("配置圖缺少標記: {marker}")]
    MissingMarker { marker: String },
    #[error("單位 {unit} 沒有指定位置或標記")]
    MissingPosition { unit: String },
}

/// 名冊錯誤
#[derive(Debug, ThisError)]
pub enum RosterError {
    #[error("位置 ({x}, {y}) 已有單位 {occupant}")]
    PositionOccupied {
        occupant: String,
        x: Coord,
        y: Coord,
    },
    #[error("單位不存在: {0}")]
    UnitNotFound(UnitId),
    #[error("單位 {name} 屬性不合法: {reason}")]
    InvalidStats { name: String, reason: String },
    #[error("名冊不可為空")]
    EmptyRoster,
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// 添加錯誤上下文，自動記錄呼叫位置
    #[track_caller]
    pub fn context<C: Into<String>>(mut self, context: C) -> Self {
        let loc = std::panic::Location::caller();
        let msg = format!("{} [{}:{}]", context.into(), loc.file(), loc.line());
        self.contexts.push(msg);
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        for ctx in &self.contexts {
            write!(f, "\n  {}", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl<E: Into<ErrorKind>> From<E> for Error {
    fn from(error: E) -> Self {
        Self {
            kind: error.into(),
            contexts: Vec::new(),
        }
    }
}

/// Result 擴展 trait，用於添加錯誤上下文
pub trait Context<T> {
    fn context<C: Into<String>>(self, context: C) -> Result<T>;
}

impl<T> Context<T> for Result<T> {
    #[track_caller]
    fn context<C: Into<String>>(self, context: C) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(e) => Err(e.context(context)),
        }
    }
}

/// 操作被拒絕的原因（狀態未改變）
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Rejection {
    #[error("遊戲已結束，需重設才能繼續")]
    GameOver,
    #[error("動畫進行中，暫不接受輸入")]
    Busy,
    #[error("目前不是玩家回合")]
    NotPlayerTurn,
    #[error("{phase} 階段不接受此操作: {reason}")]
    InvalidIntent { phase: Phase, reason: &'static str },
}
