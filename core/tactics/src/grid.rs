//! 地形網格
//!
//! 地圖建立後不可變更。越界查詢一律回傳 `None`。

use crate::alias::{Coord, MovementCost, Percent, Stat};
use crate::constants::{
    FOREST_AVOID_BONUS, FOREST_DEFENSE_BONUS, FOREST_MOVEMENT_COST, MAX_GRID_CELLS,
    PLAIN_MOVEMENT_COST,
};
use crate::error::{GridError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// 地圖位置（座標）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: Coord,
    pub y: Coord,
}

impl Position {
    pub fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    /// 曼哈頓距離
    pub fn distance(self, other: Position) -> Coord {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// 是否上下左右相鄰
    pub fn is_adjacent(self, other: Position) -> bool {
        self.distance(other) == 1
    }
}

/// 地形種類
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize,
)]
pub enum Terrain {
    #[default]
    Plain,
    Forest,
}

/// 站在地形上的單位獲得的戰鬥修正
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainBonus {
    pub avoid: Percent,
    pub defense: Stat,
}

pub fn movement_cost(terrain: Terrain) -> MovementCost {
    match terrain {
        Terrain::Plain => PLAIN_MOVEMENT_COST,
        Terrain::Forest => FOREST_MOVEMENT_COST,
    }
}

pub fn combat_modifiers(terrain: Terrain) -> TerrainBonus {
    match terrain {
        Terrain::Plain => TerrainBonus::default(),
        Terrain::Forest => TerrainBonus {
            avoid: FOREST_AVOID_BONUS,
            defense: FOREST_DEFENSE_BONUS,
        },
    }
}

/// 固定大小的地形網格（以列為主序儲存）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: Coord,
    rows: Coord,
    cells: Vec<Terrain>,
}

impl Grid {
    /// 由逐列地形建立網格，每列長度必須一致
    pub fn from_rows(rows: Vec<Vec<Terrain>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(GridError::EmptyGrid {
                cols: width,
                rows: height,
            }
            .into());
        }
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(GridError::RaggedRow {
                y,
                expected: width,
                actual: row.len(),
            }
            .into());
        }
        Ok(Self {
            cols: width,
            rows: height,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// 全平地網格
    pub fn plain(cols: Coord, rows: Coord) -> Result<Self> {
        Self::from_rows(vec![vec![Terrain::Plain; cols]; rows])
    }

    /// 隨機產生地圖：每格獨立以 `forest_probability` 機率成為森林
    ///
    /// 傳入固定種子的 rng 即可重現同一張地圖。
    pub fn generate<R: Rng>(
        cols: Coord,
        rows: Coord,
        forest_probability: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&forest_probability) {
            return Err(GridError::InvalidProbability(forest_probability).into());
        }
        if cols == 0 || rows == 0 {
            return Err(GridError::EmptyGrid { cols, rows }.into());
        }
        let cell_count = cols
            .checked_mul(rows)
            .filter(|&n| n <= MAX_GRID_CELLS)
            .ok_or(GridError::TooLarge {
                cols,
                rows,
                max: MAX_GRID_CELLS,
            })?;
        let cells = (0..cell_count)
            .map(|_| {
                if rng.random_bool(forest_probability) {
                    Terrain::Forest
                } else {
                    Terrain::Plain
                }
            })
            .collect();
        Ok(Self { cols, rows, cells })
    }

    pub fn cols(&self) -> Coord {
        self.cols
    }

    pub fn rows(&self) -> Coord {
        self.rows
    }

    /// 驗證位置是否在地圖邊界內
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.cols && pos.y < self.rows
    }

    pub fn terrain_at(&self, pos: Position) -> Option<Terrain> {
        if !self.contains(pos) {
            return None;
        }
        self.cells.get(pos.y * self.cols + pos.x).copied()
    }

    /// 越界位置沒有加值
    pub fn bonus_at(&self, pos: Position) -> TerrainBonus {
        self.terrain_at(pos)
            .map(combat_modifiers)
            .unwrap_or_default()
    }

    /// 驗證位置在邊界內，否則回傳 OutOfBounds
    pub fn check_bounds(&self, pos: Position) -> Result<()> {
        if self.contains(pos) {
            return Ok(());
        }
        Err(GridError::OutOfBounds {
            x: pos.x,
            y: pos.y,
            width: self.cols,
            height: self.rows,
        }
        .into())
    }

    /// 將游標類的位移夾在地圖內
    pub fn clamp_offset(&self, pos: Position, dx: isize, dy: isize) -> Position {
        let clamp = |value: Coord, delta: isize, len: Coord| -> Coord {
            let moved = value.saturating_add_signed(delta);
            moved.min(len.saturating_sub(1))
        };
        Position {
            x: clamp(pos.x, dx, self.cols),
            y: clamp(pos.y, dy, self.rows),
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |y| (0..self.cols).map(move |x| Position { x, y }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use strum::IntoEnumIterator;

    #[test]
    fn test_movement_cost() {
        assert_eq!(movement_cost(Terrain::Plain), 1);
        assert_eq!(movement_cost(Terrain::Forest), 2);
    }

    #[test]
    fn test_combat_modifiers() {
        for terrain in Terrain::iter() {
            let bonus = combat_modifiers(terrain);
            match terrain {
                Terrain::Plain => assert_eq!(bonus, TerrainBonus::default()),
                Terrain::Forest => {
                    assert_eq!(bonus.avoid, 20);
                    assert_eq!(bonus.defense, 1);
                }
            }
        }
    }

    #[test]
    fn test_terrain_at_out_of_bounds() {
        let grid = Grid::plain(3, 2).unwrap();
        assert_eq!(grid.terrain_at(Position::new(2, 1)), Some(Terrain::Plain));
        assert_eq!(grid.terrain_at(Position::new(3, 0)), None);
        assert_eq!(grid.terrain_at(Position::new(0, 2)), None);
        assert_eq!(grid.bonus_at(Position::new(9, 9)), TerrainBonus::default());
        assert!(grid.check_bounds(Position::new(3, 0)).is_err());
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![vec![Terrain::Plain; 3], vec![Terrain::Plain; 2]];
        let err = Grid::from_rows(rows).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Grid(GridError::RaggedRow {
                y: 1,
                expected: 3,
                actual: 2
            })
        ));
        assert!(Grid::from_rows(vec![]).is_err());
    }

    #[test]
    fn test_generate_rejects_oversized() {
        let mut rng = StdRng::seed_from_u64(1);
        let overflow = Grid::generate(usize::MAX, 2, 0.2, &mut rng).unwrap_err();
        assert!(matches!(
            overflow.kind(),
            ErrorKind::Grid(GridError::TooLarge { .. })
        ));
        assert!(Grid::generate(MAX_GRID_CELLS + 1, 1, 0.2, &mut rng).is_err());
        assert!(Grid::generate(MAX_GRID_CELLS, 1, 0.0, &mut rng).is_ok());
    }

    #[test]
    fn test_generate_is_reproducible() {
        let a = Grid::generate(30, 20, 0.2, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = Grid::generate(30, 20, 0.2, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);

        let forests = a
            .positions()
            .filter(|p| a.terrain_at(*p) == Some(Terrain::Forest))
            .count();
        // 600 格、p=0.2，期望 120；放寬範圍避免偶發失敗
        assert!((60..=180).contains(&forests), "森林數量 {forests} 偏離期望");
    }

    #[test]
    fn test_generate_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let all_plain = Grid::generate(4, 4, 0.0, &mut rng).unwrap();
        assert!(all_plain.positions().all(|p| all_plain.terrain_at(p) == Some(Terrain::Plain)));
        let all_forest = Grid::generate(4, 4, 1.0, &mut rng).unwrap();
        assert!(
            all_forest
                .positions()
                .all(|p| all_forest.terrain_at(p) == Some(Terrain::Forest))
        );
        assert!(Grid::generate(4, 4, 1.5, &mut rng).is_err());
    }

    #[test]
    fn test_clamp_offset() {
        let grid = Grid::plain(5, 4).unwrap();
        let origin = Position::new(0, 0);
        assert_eq!(grid.clamp_offset(origin, -1, -1), origin);
        assert_eq!(grid.clamp_offset(origin, 1, 1), Position::new(1, 1));
        assert_eq!(
            grid.clamp_offset(Position::new(4, 3), 1, 1),
            Position::new(4, 3)
        );
    }
}
