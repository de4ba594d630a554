// src/wgpu_utils/context.rs
//! Owned GPU device acquisition.

use std::sync::Arc;

use crate::error::EngineError;

/// Owns the wgpu instance, adapter, device and queue for compute-only use.
///
/// The device and queue are shared handles so an engine can outlive the
/// context that produced them. Everything is torn down when the last handle
/// drops; there are no process-wide globals.
pub struct GpuContext {
    #[allow(dead_code)]
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
}

impl GpuContext {
    /// Acquires an adapter and device with no surface attached.
    pub fn headless() -> Result<Self, EngineError> {
        pollster::block_on(Self::headless_async())
    }

    /// Async form of [`GpuContext::headless`].
    pub async fn headless_async() -> Result<Self, EngineError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| EngineError::AdapterNotFound)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Petri Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        log::info!("using adapter: {}", adapter.get_info().name);

        Ok(Self {
            instance,
            adapter,
            device: device.into(),
            queue: queue.into(),
        })
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }

    /// Human-readable adapter description.
    pub fn adapter_info(&self) -> String {
        format!("{:?}", self.adapter.get_info())
    }
}
