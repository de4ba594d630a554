// src/simulation/traits.rs
//! Core simulation traits
//!
//! Defines the seeding and update interfaces the engines are built against.

use super::grid::Grid;

/// Produces the generation-zero grid for a given dimension.
pub trait InitialStateRule {
    /// Builds a fresh N x N starting grid.
    fn seed(&self, size: u32) -> Grid;
}

/// One full application of an automaton rule to every cell of a grid.
///
/// A rule has two forms: a host-side reference implementation and a WGSL
/// compute kernel. Both must produce bit-identical output for the same input
/// grid, for every dimension N >= 1. The reference form reads only from
/// `current`, never from partially written output, which is the same
/// constraint the double-buffered GPU path enforces structurally.
pub trait UpdateRule {
    /// Computes the next generation of `current` into `next`.
    ///
    /// Both grids must share the same dimension; `next`'s prior contents are
    /// overwritten entirely.
    fn step_into(&self, current: &Grid, next: &mut Grid);

    /// Convenience form that allocates the output grid.
    fn next(&self, current: &Grid) -> Grid {
        let mut next = Grid::new(current.size());
        self.step_into(current, &mut next);
        next
    }

    /// WGSL source of the equivalent compute kernel.
    ///
    /// The kernel contract: one invocation per cell, 8x8 workgroups, a
    /// bounds check before any write, and the destination written at the
    /// cell's linear offset.
    fn shader_source(&self) -> &str;
}
