//! Engine error types.

use thiserror::Error;

/// Errors surfaced by the simulation engine and its GPU plumbing.
///
/// Device-level failures are always returned to the immediate caller and
/// never retried internally, so the generation counter can only move in
/// lockstep with the buffer contents.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No compute-capable GPU adapter was found.
    #[error("no suitable GPU adapter found")]
    AdapterNotFound,

    /// The adapter refused to hand out a device.
    #[error("failed to request GPU device: {0}")]
    DeviceRequestFailed(#[from] wgpu::RequestDeviceError),

    /// The window surface could not be created or configured.
    #[error("failed to create rendering surface: {0}")]
    SurfaceCreationFailed(String),

    /// Grid dimension was zero.
    #[error("grid dimension must be at least 1, got {0}")]
    InvalidGridSize(u32),

    /// Seed probability outside the closed interval [0, 1].
    #[error("seed probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),

    /// The device rejected or failed to complete a command submission.
    /// The generation counter and buffer parity are unchanged.
    #[error("compute dispatch failed: {0}")]
    DispatchFailed(String),

    /// Mapping or copying the staging buffer failed. No partial generation
    /// is ever exposed.
    #[error("readback of simulation state failed: {0}")]
    ReadbackFailed(String),
}
