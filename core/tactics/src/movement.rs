//! 移動邏輯

use crate::alias::MovementCost;
use crate::error::{GridError, Result};
use crate::grid::{Grid, Position, movement_cost};
use crate::unit::{Faction, Roster, Unit};
use std::collections::{HashMap, VecDeque};

/// 移動方向（四方向）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// 展開鄰居的固定順序，決定可移動範圍的發現順序
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

/// 計算從當前位置往指定方向移動一格後的位置，檢查地圖邊界
///
/// 返回 `None` 當新位置超出地圖邊界
pub fn step_in_direction(grid: &Grid, pos: Position, direction: Direction) -> Option<Position> {
    let new_pos = match direction {
        Direction::Up => Position {
            x: pos.x,
            y: pos.y.checked_sub(1)?,
        },
        Direction::Down => Position {
            x: pos.x,
            y: pos.y + 1,
        },
        Direction::Left => Position {
            x: pos.x.checked_sub(1)?,
            y: pos.y,
        },
        Direction::Right => Position {
            x: pos.x + 1,
            y: pos.y,
        },
    };

    grid.contains(new_pos).then_some(new_pos)
}

/// 移動者（位置 + 陣營 + 移動力）
#[derive(Debug, Clone, Copy)]
pub struct Mover {
    pub pos: Position,
    pub faction: Faction,
    pub budget: MovementCost,
}

impl From<&Unit> for Mover {
    fn from(unit: &Unit) -> Self {
        Self {
            pos: unit.pos,
            faction: unit.faction,
            budget: unit.stats.mov,
        }
    }
}

/// 可到達位置的資訊（含成本與前驅節點）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReachableInfo {
    pub cost: MovementCost,
    pub prev: Position, // 上一個位置（起點的前驅是自己）
}

/// 可移動範圍
///
/// `cells` 依 BFS 首次發現順序排列，第一個永遠是起點。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReachableSet {
    origin: Position,
    order: Vec<Position>,
    info: HashMap<Position, ReachableInfo>,
}

impl ReachableSet {
    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn cells(&self) -> &[Position] {
        &self.order
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.info.contains_key(&pos)
    }

    pub fn cost_to(&self, pos: Position) -> Option<MovementCost> {
        self.info.get(&pos).map(|i| i.cost)
    }

    pub fn info(&self, pos: Position) -> Option<ReachableInfo> {
        self.info.get(&pos).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 從起點到 `to` 的路徑（含兩端），供渲染移動箭頭
    pub fn path_to(&self, to: Position) -> Option<Vec<Position>> {
        let mut path = Vec::new();
        let mut current = to;
        while current != self.origin {
            let info = self.info.get(&current)?;
            path.push(current);
            current = info.prev;
        }
        path.push(self.origin);
        path.reverse();
        Some(path)
    }
}

/// 計算給定移動力預算內可到達的所有位置
///
/// 以 FIFO 佇列做成本感知的廣度優先展開：
/// 1. 起點成本 0，永遠包含在結果內
/// 2. 鄰居必須在地圖內、累積成本 <= 預算、不被敵軍佔據
/// 3. 已以更低或相同成本到達的位置不再展開；更便宜的路線會重新展開
///
/// # 碰撞規則：
/// - 友軍（相同 Faction）可穿越，且不在此過濾（落點佔據由呼叫端檢查）
/// - 敵軍（不同 Faction）不可穿越，也不會出現在結果內
pub fn reachable_positions<F>(
    grid: &Grid,
    mover: Mover,
    get_occupant_faction: F,
) -> Result<ReachableSet>
where
    F: Fn(Position) -> Option<Faction>,
{
    let from = mover.pos;

    // Fail fast：驗證起點在地圖內
    if !grid.contains(from) {
        return Err(GridError::OutOfBounds {
            x: from.x,
            y: from.y,
            width: grid.cols(),
            height: grid.rows(),
        }
        .into());
    }

    let mut info = HashMap::from([(
        from,
        ReachableInfo {
            cost: 0,
            prev: from,
        },
    )]);
    let mut order = vec![from];
    let mut queue = VecDeque::from([(from, 0)]);

    while let Some((pos, cost)) = queue.pop_front() {
        // 跳過過時的隊列項（已有更優路徑）
        if info.get(&pos).is_some_and(|known| cost > known.cost) {
            continue;
        }

        for direction in DIRECTIONS {
            let Some(next) = step_in_direction(grid, pos, direction) else {
                continue;
            };
            let Some(terrain) = grid.terrain_at(next) else {
                continue;
            };
            let new_cost = cost + movement_cost(terrain);
            if new_cost > mover.budget {
                continue;
            }
            if !is_passable(mover.faction, get_occupant_faction(next)) {
                continue;
            }

            match info.get(&next) {
                Some(known) if known.cost <= new_cost => continue,
                Some(_) => {}
                None => order.push(next),
            }
            info.insert(
                next,
                ReachableInfo {
                    cost: new_cost,
                    prev: pos,
                },
            );
            queue.push_back((next, new_cost));
        }
    }

    Ok(ReachableSet {
        origin: from,
        order,
        info,
    })
}

/// 以名冊佔據狀況計算單位的可移動範圍
pub fn reachable_set(unit: &Unit, roster: &Roster, grid: &Grid) -> Result<ReachableSet> {
    reachable_positions(grid, Mover::from(unit), |pos| {
        roster
            .unit_at(pos)
            .filter(|other| other.id != unit.id)
            .map(|other| other.faction)
    })
}

/// 碰撞檢測：檢查位置是否可通行
fn is_passable(mover_faction: Faction, occupant: Option<Faction>) -> bool {
    match occupant {
        None => true,
        Some(faction) => faction == mover_faction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Terrain;

    #[test]
    fn test_step_in_direction_edges() {
        let grid = Grid::plain(2, 2).unwrap();
        let origin = Position::new(0, 0);
        assert_eq!(step_in_direction(&grid, origin, Direction::Up), None);
        assert_eq!(step_in_direction(&grid, origin, Direction::Left), None);
        assert_eq!(
            step_in_direction(&grid, origin, Direction::Right),
            Some(Position::new(1, 0))
        );
        let corner = Position::new(1, 1);
        assert_eq!(step_in_direction(&grid, corner, Direction::Down), None);
        assert_eq!(step_in_direction(&grid, corner, Direction::Right), None);
    }

    #[test]
    fn test_discovery_order_is_bfs() {
        let grid = Grid::plain(3, 3).unwrap();
        let mover = Mover {
            pos: Position::new(1, 1),
            faction: Faction::Player,
            budget: 1,
        };
        let set = reachable_positions(&grid, mover, |_| None).unwrap();
        assert_eq!(
            set.cells(),
            &[
                Position::new(1, 1),
                Position::new(1, 0),
                Position::new(1, 2),
                Position::new(0, 1),
                Position::new(2, 1),
            ]
        );
    }

    #[test]
    fn test_cheaper_route_reexpands() {
        // (4,0) 先經由三格森林以成本 7 發現，之後繞下方平地只要 6，
        // 必須重新展開才能以成本 7 到達 (5,0)
        //   x: 0 1 2 3 4 5
        //   y0 . ^ ^ ^ . .
        //   y1 . . . . . ^
        let p = Terrain::Plain;
        let f = Terrain::Forest;
        let grid = Grid::from_rows(vec![vec![p, f, f, f, p, p], vec![p, p, p, p, p, f]]).unwrap();
        let mover = Mover {
            pos: Position::new(0, 0),
            faction: Faction::Player,
            budget: 7,
        };
        let set = reachable_positions(&grid, mover, |_| None).unwrap();
        assert_eq!(set.cost_to(Position::new(4, 0)), Some(6));
        assert_eq!(set.cost_to(Position::new(5, 0)), Some(7));
        assert_eq!(
            set.path_to(Position::new(4, 0)),
            Some(vec![
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(1, 1),
                Position::new(2, 1),
                Position::new(3, 1),
                Position::new(4, 1),
                Position::new(4, 0),
            ])
        );
        let unique: std::collections::HashSet<_> = set.cells().iter().collect();
        assert_eq!(unique.len(), set.len(), "同一格只記錄一次");
    }

    #[test]
    fn test_out_of_bound_origin() {
        let grid = Grid::plain(2, 2).unwrap();
        let mover = Mover {
            pos: Position::new(2, 0),
            faction: Faction::Player,
            budget: 5,
        };
        assert!(reachable_positions(&grid, mover, |_| None).is_err());
    }
}
