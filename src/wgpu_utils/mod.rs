// src/wgpu_utils/mod.rs
//! Shared wgpu plumbing
//!
//! Device acquisition and bind group layout helpers used by both the compute
//! engine and the surface renderer.

pub mod binding_types;
pub mod context;

pub use context::GpuContext;
