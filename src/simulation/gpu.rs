// src/simulation/gpu.rs
//! GPU engine
//!
//! Double-buffered compute-shader implementation of the Game of Life. Each
//! `advance` dispatches the update kernel once over the whole grid, reading
//! the generation selected by parity and writing the other buffer, then
//! copies the result into a persistent staging buffer and maps it so the
//! host always holds the freshly computed generation.

use std::sync::{mpsc, Arc};

use wgpu::{BindGroup, Buffer, ComputePipeline, Device, Queue};

use super::grid::{Grid, Snapshot};
use super::pair_indices;
use super::rules::{ConwayRule, RandomSeed};
use super::traits::{InitialStateRule, UpdateRule};
use crate::error::EngineError;
use crate::wgpu_utils::{binding_types, GpuContext};

/// Kernel tile edge length. Dispatches round the grid dimension up to a
/// multiple of this, and the kernel bounds-checks the overhang.
pub const WORKGROUP_SIZE: u32 = 8;

/// Uniform block handed to the kernel. Padded to 16 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct GridParams {
    size: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
}

/// Two device-resident cell buffers that alternate between source and
/// destination each generation.
///
/// The pair is an array indexed by generation parity, never two free-standing
/// buffers, so the alternation invariant is a single index computation. Each
/// parity has a pre-built bind group wiring that parity's source buffer to
/// the read binding and the other buffer to the write binding.
pub struct DeviceBufferPair {
    buffers: [Buffer; 2],
    bind_groups: [BindGroup; 2],
    byte_size: u64,
}

impl DeviceBufferPair {
    /// Allocates both cell buffers and their parity bind groups.
    pub fn new(
        device: &Device,
        layout: &wgpu::BindGroupLayout,
        params: &Buffer,
        size: u32,
    ) -> Self {
        let byte_size = (size as u64) * (size as u64) * std::mem::size_of::<u32>() as u64;

        let buffers = [0u32, 1].map(|slot| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("Cell Buffer {slot}")),
                size: byte_size,
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_DST
                    | wgpu::BufferUsages::COPY_SRC,
                mapped_at_creation: false,
            })
        });

        let bind_groups = [0u64, 1].map(|parity| {
            let (read, write) = pair_indices(parity);
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&format!("Cell Bind Group {read}->{write}")),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: params.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: buffers[read].as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: buffers[write].as_entire_binding(),
                    },
                ],
            })
        });

        Self {
            buffers,
            bind_groups,
            byte_size,
        }
    }

    /// The (source, destination) buffers for a step of the given parity.
    /// Even parity reads buffer 0 and writes buffer 1, odd the reverse.
    pub fn pair_for(&self, parity: u64) -> (&Buffer, &Buffer) {
        let (read, write) = pair_indices(parity);
        (&self.buffers[read], &self.buffers[write])
    }

    /// The pre-wired bind group for a step of the given parity.
    pub fn bind_group_for(&self, parity: u64) -> &BindGroup {
        &self.bind_groups[(parity % 2) as usize]
    }

    /// Writes a new generation-zero grid into buffer 0 and zero-fills
    /// buffer 1, so parity 0 designates buffer 0 as the first source.
    pub fn reset(&self, queue: &Queue, grid: &Grid) {
        queue.write_buffer(&self.buffers[0], 0, bytemuck::cast_slice(grid.cells()));
        let zeros = vec![0u32; grid.cells().len()];
        queue.write_buffer(&self.buffers[1], 0, bytemuck::cast_slice(&zeros));
    }

    /// Size of one grid's worth of cells in bytes.
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }
}

/// Game of Life engine running the update rule on a compute device.
pub struct GpuLifeEngine {
    device: Arc<Device>,
    queue: Arc<Queue>,
    size: u32,
    seed: RandomSeed,
    pipeline: ComputePipeline,
    buffers: DeviceBufferPair,
    // Host-mappable landing zone for readback, reused every tick
    staging: Buffer,
    // Host copy of the most recently computed generation
    state: Grid,
    generation: u64,
}

impl GpuLifeEngine {
    /// Creates an engine on an existing device, seeded with the given
    /// live-cell probability.
    pub fn new(
        device: Arc<Device>,
        queue: Arc<Queue>,
        size: u32,
        seed_probability: f64,
    ) -> Result<Self, EngineError> {
        if size == 0 {
            return Err(EngineError::InvalidGridSize(size));
        }
        let seed = RandomSeed::new(seed_probability)?;
        let rule = ConwayRule;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Conway Compute Shader"),
            source: wgpu::ShaderSource::Wgsl(rule.shader_source().into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Conway Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: binding_types::uniform(),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: binding_types::storage_buffer_read_only(),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: binding_types::storage_buffer_read_write(),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Conway Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Conway Compute Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        // The bind groups keep the uniform resource alive after this handle
        // drops at the end of construction.
        let params = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Grid Params"),
            size: std::mem::size_of::<GridParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(
            &params,
            0,
            bytemuck::bytes_of(&GridParams {
                size,
                _pad0: 0,
                _pad1: 0,
                _pad2: 0,
            }),
        );

        let buffers = DeviceBufferPair::new(&device, &bind_group_layout, &params, size);

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Conway Staging Buffer"),
            size: buffers.byte_size(),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let state = seed.seed(size);
        buffers.reset(&queue, &state);
        log::debug!(
            "seeded {size}x{size} grid with {} live cells",
            state.live_count()
        );

        Ok(Self {
            device,
            queue,
            size,
            seed,
            pipeline,
            buffers,
            staging,
            state,
            generation: 0,
        })
    }

    /// Creates an engine on its own freshly acquired adapter and device.
    /// Intended for compute-only use without a window.
    pub fn headless(size: u32, seed_probability: f64) -> Result<Self, EngineError> {
        let context = GpuContext::headless()?;
        Self::new(
            context.device().clone(),
            context.queue().clone(),
            size,
            seed_probability,
        )
    }

    /// Grid dimension N.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Ticks applied since construction or the last reset.
    pub fn current_generation(&self) -> u64 {
        self.generation
    }

    /// The current generation as a read-only view of the host copy.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(self.size, self.state.cells())
    }

    /// Performs exactly one generation step and returns the new snapshot.
    ///
    /// The dispatch reads the buffer selected by the current parity and
    /// writes the other one; the destination is then copied into the staging
    /// buffer and mapped. The generation counter only advances after the
    /// readback has fully completed, so a failure leaves the engine exactly
    /// where it was and the call can be retried.
    pub fn advance(&mut self) -> Result<Snapshot<'_>, EngineError> {
        let parity = self.generation % 2;
        let (_, write) = self.buffers.pair_for(parity);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Conway Step Encoder"),
            });
        {
            let mut compute_pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Conway Compute Pass"),
                timestamp_writes: None,
            });
            compute_pass.set_pipeline(&self.pipeline);
            compute_pass.set_bind_group(0, self.buffers.bind_group_for(parity), &[]);

            let workgroups = (self.size + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
            compute_pass.dispatch_workgroups(workgroups, workgroups, 1);
        }
        encoder.copy_buffer_to_buffer(write, 0, &self.staging, 0, self.buffers.byte_size());

        self.queue.submit(std::iter::once(encoder.finish()));

        // Synchronize the submission before touching the staging buffer. A
        // stalled or lost device surfaces here, with counter and parity
        // untouched.
        self.device
            .poll(wgpu::MaintainBase::Wait)
            .map_err(|e| EngineError::DispatchFailed(format!("device poll failed: {e:?}")))?;

        self.read_staging()?;
        self.generation += 1;
        if self.generation % 50 == 0 {
            log::debug!(
                "generation {}: {} live cells",
                self.generation,
                self.state.live_count()
            );
        }
        Ok(self.snapshot())
    }

    /// Re-seeds the grid and rewinds the generation counter to zero.
    pub fn reset(&mut self, seed_probability: f64) -> Result<(), EngineError> {
        self.seed = RandomSeed::new(seed_probability)?;
        self.state = self.seed.seed(self.size);
        self.buffers.reset(&self.queue, &self.state);
        self.generation = 0;
        log::debug!(
            "reset {0}x{0} grid with {1} live cells",
            self.size,
            self.state.live_count()
        );
        Ok(())
    }

    /// Maps the staging buffer and copies it into the host grid, then
    /// unmaps so the buffer is reusable by the next step.
    fn read_staging(&mut self) -> Result<(), EngineError> {
        let buffer_slice = self.staging.slice(..);
        let (tx, rx) = mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        self.device
            .poll(wgpu::MaintainBase::Wait)
            .map_err(|e| EngineError::ReadbackFailed(format!("device poll failed: {e:?}")))?;

        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(EngineError::ReadbackFailed(e.to_string())),
            Err(_) => {
                return Err(EngineError::ReadbackFailed(
                    "map callback never resolved".into(),
                ))
            }
        }

        {
            let data = buffer_slice.get_mapped_range();
            self.state
                .cells_mut()
                .copy_from_slice(bytemuck::cast_slice(&data));
        }
        self.staging.unmap();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workgroup_count_covers_grid_edges() {
        for (size, expected) in [(1u32, 1u32), (8, 1), (9, 2), (64, 8), (65, 9)] {
            let workgroups = (size + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE;
            assert_eq!(workgroups, expected);
            assert!(workgroups * WORKGROUP_SIZE >= size);
        }
    }

    #[test]
    fn test_grid_params_layout() {
        assert_eq!(std::mem::size_of::<GridParams>(), 16);
    }
}
