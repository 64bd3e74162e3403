//! 可移動範圍與戰鬥數值的性質測試

use proptest::prelude::*;
use tactics::combat::combat_stats;
use tactics::grid::{Grid, Position, Terrain, TerrainBonus, movement_cost};
use tactics::movement::{Mover, reachable_positions};
use tactics::unit::{Faction, Stats};

fn grid_strategy() -> impl Strategy<Value = Grid> {
    (2usize..8, 2usize..8).prop_flat_map(|(cols, rows)| {
        prop::collection::vec(prop::bool::weighted(0.3), cols * rows).prop_map(move |forest| {
            let cells: Vec<Vec<Terrain>> = forest
                .chunks(cols)
                .map(|row| {
                    row.iter()
                        .map(|&f| if f { Terrain::Forest } else { Terrain::Plain })
                        .collect()
                })
                .collect();
            Grid::from_rows(cells).unwrap()
        })
    })
}

proptest! {
    #[test]
    fn reachable_cells_respect_budget_and_blockers(
        grid in grid_strategy(),
        budget in 0u32..8,
        seed in any::<u64>(),
    ) {
        let cells: Vec<Position> = grid.positions().collect();
        let origin = cells[(seed as usize) % cells.len()];
        let blocker = cells[(seed as usize / 7) % cells.len()];
        let mover = Mover { pos: origin, faction: Faction::Player, budget };
        let occupant = |p: Position| (p == blocker && p != origin).then_some(Faction::Enemy);

        let set = reachable_positions(&grid, mover, occupant).unwrap();
        prop_assert_eq!(set.cells().first(), Some(&origin));
        prop_assert_eq!(set.cost_to(origin), Some(0));
        for &cell in set.cells() {
            let cost = set.cost_to(cell).unwrap();
            prop_assert!(cost <= budget);
            prop_assert!(cell == origin || cell != blocker);

            // 路徑上的地形成本加總等於記錄的成本
            let path = set.path_to(cell).unwrap();
            let walked: u32 = path[1..]
                .iter()
                .map(|&p| movement_cost(grid.terrain_at(p).unwrap()))
                .sum();
            prop_assert_eq!(walked, cost);
            prop_assert!(path.windows(2).all(|w| w[0].is_adjacent(w[1])));
        }
    }

    #[test]
    fn combat_numbers_stay_in_range(
        atk in (0i32..40, 0i32..40, 0i32..40, 0i32..40),
        def in (0i32..40, 0i32..40, 0i32..40),
        forest in any::<bool>(),
    ) {
        let attacker = Stats { str: atk.0, dex: atk.1, luk: atk.2, spd: atk.3, ..Stats::default() };
        let defender = Stats { def: def.0, spd: def.1, luk: def.2, ..Stats::default() };
        let bonus = if forest {
            tactics::grid::combat_modifiers(Terrain::Forest)
        } else {
            TerrainBonus::default()
        };
        let stats = combat_stats(&attacker, &defender, bonus);
        prop_assert!(stats.damage >= 0);
        prop_assert!((0..=100).contains(&stats.hit));
        prop_assert!(stats.crit >= 0);
        prop_assert_eq!(stats.doubles, atk.3 - def.1 >= 4);
    }
}
