// src/simulation/rules.rs
//! Concrete seeding and update rules: random seeding and the Conway update.

use rand::Rng;

use super::grid::Grid;
use super::traits::{InitialStateRule, UpdateRule};
use crate::error::EngineError;

/// Seeds each cell independently alive with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct RandomSeed {
    probability: f64,
}

impl RandomSeed {
    /// Creates a random seeding rule.
    ///
    /// Rejects probabilities outside [0, 1] (including NaN) before any grid
    /// or device work happens.
    pub fn new(probability: f64) -> Result<Self, EngineError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(EngineError::InvalidProbability(probability));
        }
        Ok(Self { probability })
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl InitialStateRule for RandomSeed {
    fn seed(&self, size: u32) -> Grid {
        let mut rng = rand::rng();
        let cells = (0..(size as usize) * (size as usize))
            .map(|_| u32::from(rng.random_bool(self.probability)))
            .collect();
        Grid::from_cells(size, cells)
    }
}

/// Conway's Game of Life update on a toroidal grid.
///
/// A cell is alive in the next generation when it has exactly three live
/// neighbors, or when it is alive now and has exactly two. Neighbors are the
/// 8 toroidally wrapped cells around it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConwayRule;

impl UpdateRule for ConwayRule {
    fn step_into(&self, current: &Grid, next: &mut Grid) {
        debug_assert_eq!(current.size(), next.size());
        let n = current.size() as i64;
        for y in 0..n {
            for x in 0..n {
                let mut live = 0u32;
                for dy in -1..=1i64 {
                    for dx in -1..=1i64 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        live += current.get_wrapped(x + dx, y + dy);
                    }
                }
                let cell = current.get(x as u32, y as u32);
                let born = live == 3 || (cell == 1 && live == 2);
                next.set(x as u32, y as u32, u32::from(born));
            }
        }
    }

    fn shader_source(&self) -> &str {
        include_str!("conway.wgsl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from_coords(size: u32, coords: &[(u32, u32)]) -> Grid {
        let mut grid = Grid::new(size);
        for &(x, y) in coords {
            grid.set(x, y, 1);
        }
        grid
    }

    #[test]
    fn test_lone_cell_dies_without_births() {
        // A single live cell at the origin has zero live neighbors, and each
        // of its wrap-neighbors sees exactly one live cell. Nothing survives.
        for size in [3u32, 5, 8] {
            let grid = grid_from_coords(size, &[(0, 0)]);
            let next = ConwayRule.next(&grid);
            assert_eq!(next.live_count(), 0, "size {size}");
        }
    }

    #[test]
    fn test_block_is_still_life() {
        let block = grid_from_coords(6, &[(2, 2), (3, 2), (2, 3), (3, 3)]);
        let mut grid = block.clone();
        for _ in 0..10 {
            grid = ConwayRule.next(&grid);
            assert_eq!(grid, block);
        }
    }

    #[test]
    fn test_blinker_oscillates_with_period_two() {
        let horizontal = grid_from_coords(7, &[(2, 3), (3, 3), (4, 3)]);
        let vertical = grid_from_coords(7, &[(3, 2), (3, 3), (3, 4)]);

        let after_one = ConwayRule.next(&horizontal);
        assert_eq!(after_one, vertical);
        let after_two = ConwayRule.next(&after_one);
        assert_eq!(after_two, horizontal);
    }

    #[test]
    fn test_degenerate_one_by_one_grid() {
        // On a 1x1 torus every neighbor wraps back to the cell itself, so a
        // live cell counts eight neighbors and dies of overpopulation.
        let grid = grid_from_coords(1, &[(0, 0)]);
        assert_eq!(ConwayRule.next(&grid).live_count(), 0);
        let empty = Grid::new(1);
        assert_eq!(ConwayRule.next(&empty).live_count(), 0);
    }

    #[test]
    fn test_update_is_independent_of_iteration_order() {
        // Recompute the rule walking the cells backwards. Any dependence on
        // values written during the same pass would make the orders diverge.
        let mut grid = Grid::new(9);
        for i in 0..81u32 {
            if i % 3 == 0 || i % 7 == 0 {
                grid.set(i % 9, i / 9, 1);
            }
        }

        let forward = ConwayRule.next(&grid);

        let n = grid.size() as i64;
        let mut backward = Grid::new(grid.size());
        for y in (0..n).rev() {
            for x in (0..n).rev() {
                let mut live = 0u32;
                for dy in -1..=1i64 {
                    for dx in -1..=1i64 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        live += grid.get_wrapped(x + dx, y + dy);
                    }
                }
                let cell = grid.get(x as u32, y as u32);
                let born = live == 3 || (cell == 1 && live == 2);
                backward.set(x as u32, y as u32, u32::from(born));
            }
        }

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_seed_probability_extremes() {
        let all_dead = RandomSeed::new(0.0).unwrap().seed(16);
        assert_eq!(all_dead.live_count(), 0);

        let all_alive = RandomSeed::new(1.0).unwrap().seed(16);
        assert_eq!(all_alive.live_count(), 256);
    }

    #[test]
    fn test_seed_rejects_invalid_probability() {
        assert!(matches!(
            RandomSeed::new(-0.1),
            Err(EngineError::InvalidProbability(_))
        ));
        assert!(matches!(
            RandomSeed::new(1.5),
            Err(EngineError::InvalidProbability(_))
        ));
        assert!(matches!(
            RandomSeed::new(f64::NAN),
            Err(EngineError::InvalidProbability(_))
        ));
    }
}
