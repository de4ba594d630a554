// src/lib.rs
//! Petri
//!
//! A GPU-accelerated Conway's Game of Life engine built on wgpu and winit.
//!
//! The simulation state lives in a pair of device-resident storage buffers
//! that alternate between source and destination each generation. A compute
//! shader applies the update rule, the result is read back into host memory,
//! and the windowing layer blits that snapshot to the display. A CPU
//! implementation of the same update contract is provided for reference and
//! for environments without a compute-capable adapter.

pub mod app;
pub mod error;
pub mod gfx;
pub mod simulation;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{LifeConfig, PetriApp};
pub use error::EngineError;
pub use simulation::{CpuLifeEngine, GpuLifeEngine, Snapshot};

/// Creates a default Petri application instance
pub fn default() -> PetriApp {
    PetriApp::new(LifeConfig::default())
}
