//! # Conway's Game of Life - CPU Reference
//!
//! Headless run of the CPU reference engine. Useful on machines without a
//! compute-capable adapter, and as a quick sanity check of the update rule.
//!
//! ## Usage
//!
//! Run with: `cargo run --example life_cpu`

use petri::simulation::CpuLifeEngine;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut engine = CpuLifeEngine::new(128, 0.3)?;
    println!(
        "generation {:4}: {} live cells",
        engine.current_generation(),
        engine.snapshot().live_count()
    );

    for _ in 0..200 {
        engine.advance()?;
        if engine.current_generation() % 20 == 0 {
            println!(
                "generation {:4}: {} live cells",
                engine.current_generation(),
                engine.snapshot().live_count()
            );
        }
    }

    Ok(())
}
