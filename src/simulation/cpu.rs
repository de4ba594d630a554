// src/simulation/cpu.rs
//! CPU reference engine
//!
//! Implements the same advance/snapshot/reset contract as the GPU engine
//! using two host-side grids keyed by generation parity. Exists both as a
//! fallback for machines without a compute adapter and as the reference
//! against which the GPU kernel is checked for equivalence.

use super::grid::{Grid, Snapshot};
use super::pair_indices;
use super::rules::{ConwayRule, RandomSeed};
use super::traits::{InitialStateRule, UpdateRule};
use crate::error::EngineError;

/// Game of Life engine running entirely on the host.
pub struct CpuLifeEngine {
    size: u32,
    rule: ConwayRule,
    seed: RandomSeed,
    // Ping-pong pair indexed by generation parity, mirroring the device
    // buffer layout of the GPU engine.
    buffers: [Grid; 2],
    generation: u64,
}

impl CpuLifeEngine {
    /// Creates an engine seeded with the given live-cell probability.
    pub fn new(size: u32, seed_probability: f64) -> Result<Self, EngineError> {
        if size == 0 {
            return Err(EngineError::InvalidGridSize(size));
        }
        let seed = RandomSeed::new(seed_probability)?;
        let initial = seed.seed(size);
        Ok(Self::with_initial_state(initial, seed))
    }

    /// Creates an engine from an explicit generation-zero grid.
    pub fn from_grid(initial: Grid) -> Result<Self, EngineError> {
        if initial.size() == 0 {
            return Err(EngineError::InvalidGridSize(0));
        }
        let seed = RandomSeed::new(0.0)?;
        Ok(Self::with_initial_state(initial, seed))
    }

    fn with_initial_state(initial: Grid, seed: RandomSeed) -> Self {
        let size = initial.size();
        Self {
            size,
            rule: ConwayRule,
            seed,
            buffers: [initial, Grid::new(size)],
            generation: 0,
        }
    }

    /// Grid dimension N.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Ticks applied since construction or the last reset.
    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    /// Index of the buffer holding the authoritative current generation.
    pub fn live_buffer_index(&self) -> usize {
        (self.generation % 2) as usize
    }

    /// The current generation as a read-only view.
    pub fn snapshot(&self) -> Snapshot<'_> {
        let live = &self.buffers[self.live_buffer_index()];
        Snapshot::new(self.size, live.cells())
    }

    /// Performs exactly one generation step and returns the new snapshot.
    pub fn advance(&mut self) -> Result<Snapshot<'_>, EngineError> {
        let (read, _) = pair_indices(self.generation);
        let [a, b] = &mut self.buffers;
        let (source, destination) = if read == 0 { (&*a, b) } else { (&*b, a) };
        self.rule.step_into(source, destination);
        self.generation += 1;
        Ok(self.snapshot())
    }

    /// Re-seeds the grid and rewinds the generation counter to zero.
    ///
    /// Leaves the engine indistinguishable from a freshly constructed one
    /// with the same seed distribution.
    pub fn reset(&mut self, seed_probability: f64) -> Result<(), EngineError> {
        self.seed = RandomSeed::new(seed_probability)?;
        self.buffers[0] = self.seed.seed(self.size);
        self.buffers[1].clear();
        self.generation = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_cells(size: u32, coords: &[(u32, u32)]) -> CpuLifeEngine {
        let mut grid = Grid::new(size);
        for &(x, y) in coords {
            grid.set(x, y, 1);
        }
        CpuLifeEngine::from_grid(grid).unwrap()
    }

    #[test]
    fn test_generation_counter_tracks_advances() {
        let mut engine = CpuLifeEngine::new(16, 0.5).unwrap();
        assert_eq!(engine.current_generation(), 0);
        for expected in 1..=5 {
            engine.advance().unwrap();
            assert_eq!(engine.current_generation(), expected);
        }
        engine.reset(0.5).unwrap();
        assert_eq!(engine.current_generation(), 0);
    }

    #[test]
    fn test_reset_with_zero_probability_clears_grid() {
        let mut engine = CpuLifeEngine::new(16, 1.0).unwrap();
        engine.advance().unwrap();
        engine.reset(0.0).unwrap();
        assert_eq!(engine.snapshot().live_count(), 0);
        assert_eq!(engine.current_generation(), 0);
    }

    #[test]
    fn test_live_buffer_alternates_and_returns() {
        let mut engine = CpuLifeEngine::new(8, 0.5).unwrap();
        let start = engine.live_buffer_index();
        engine.advance().unwrap();
        assert_ne!(engine.live_buffer_index(), start);
        engine.advance().unwrap();
        // Two steps later the same physical buffer is the source again
        assert_eq!(engine.live_buffer_index(), start);
    }

    #[test]
    fn test_blinker_through_engine() {
        let mut engine = engine_with_cells(7, &[(2, 3), (3, 3), (4, 3)]);
        let initial = engine.snapshot().to_grid();

        engine.advance().unwrap();
        assert!(engine.snapshot().alive(3, 2));
        assert!(engine.snapshot().alive(3, 3));
        assert!(engine.snapshot().alive(3, 4));
        assert_eq!(engine.snapshot().live_count(), 3);

        engine.advance().unwrap();
        assert_eq!(engine.snapshot().to_grid(), initial);
    }

    #[test]
    fn test_block_survives_many_ticks() {
        let mut engine = engine_with_cells(6, &[(1, 1), (2, 1), (1, 2), (2, 2)]);
        let initial = engine.snapshot().to_grid();
        for _ in 0..25 {
            engine.advance().unwrap();
            assert_eq!(engine.snapshot().to_grid(), initial);
        }
    }

    #[test]
    fn test_glider_wraps_around_the_torus() {
        // A glider translates one cell diagonally every 4 generations, so on
        // a 16x16 torus it crosses both edges and returns to its starting
        // configuration after 64 ticks.
        let mut engine = engine_with_cells(16, &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
        let initial = engine.snapshot().to_grid();
        for _ in 0..64 {
            engine.advance().unwrap();
            assert_eq!(engine.snapshot().live_count(), 5);
        }
        assert_eq!(engine.snapshot().to_grid(), initial);
    }

    #[test]
    fn test_rejects_zero_dimension() {
        assert!(matches!(
            CpuLifeEngine::new(0, 0.5),
            Err(EngineError::InvalidGridSize(0))
        ));
    }

    #[test]
    fn test_rejects_invalid_probability() {
        assert!(matches!(
            CpuLifeEngine::new(8, 1.01),
            Err(EngineError::InvalidProbability(_))
        ));
        let mut engine = CpuLifeEngine::new(8, 0.5).unwrap();
        assert!(matches!(
            engine.reset(-0.5),
            Err(EngineError::InvalidProbability(_))
        ));
    }
}
