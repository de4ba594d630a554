//! # Conway's Game of Life - GPU Implementation
//!
//! Evolves a toroidal Game of Life grid on the GPU and blits each generation
//! to the window, scaled to fill it.
//!
//! ## Controls
//!
//! - `Space` re-seeds the grid and restarts from generation zero
//! - `Escape` quits
//!
//! ## Usage
//!
//! Run with: `cargo run --example life`

use petri::{LifeConfig, PetriApp};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let app = PetriApp::new(LifeConfig {
        grid_size: 256,
        seed_probability: 0.3,
        generations_per_second: 30.0,
    });

    app.run();

    Ok(())
}
