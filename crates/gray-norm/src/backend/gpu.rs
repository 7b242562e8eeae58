//! GPU backend: the same pipeline arithmetic as [`super::CpuBackend`],
//! run as wgpu compute kernels.
//!
//! The scalar field lives in a device buffer between operations; only the
//! reduction partials and the final 16-bit values are read back. Every
//! handoff to the device is synchronous -- the host blocks on submission
//! results before the pipeline continues.

use wgpu::util::DeviceExt;

use crate::backend::NormBackend;
use crate::error::NormError;
use crate::pipeline::{CENTER_OFFSET, CHANNEL_WEIGHTS};
use crate::raster::RgbRaster;

/// Threads per workgroup; must match `@workgroup_size` in `normalize.wgsl`.
const WORKGROUP_SIZE: u32 = 256;

/// wgpu guarantees at least this many workgroups per dispatch dimension.
const MAX_GROUPS_PER_DIM: u32 = 65_535;

/// Uniform parameter block shared by all three kernels.
///
/// Field order and padding match the WGSL `Params` struct (32 bytes).
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Params {
    weights: [f32; 3],
    offset: f32,
    pixel_count: u32,
    minv: f32,
    scale: f32,
    _pad0: u32,
}

/// A scalar field resident in device memory.
pub struct GpuField {
    buffer: wgpu::Buffer,
    len: u32,
}

/// wgpu compute implementation of the array operations.
pub struct GpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    project_pipeline: wgpu::ComputePipeline,
    reduce_pipeline: wgpu::ComputePipeline,
    rescale_pipeline: wgpu::ComputePipeline,
    adapter_info: wgpu::AdapterInfo,
}

impl GpuBackend {
    /// Probe for a GPU adapter and build the compute pipelines.
    ///
    /// Returns `None` when no adapter is available or the adapter refuses
    /// a device -- the caller falls back to the CPU.
    pub fn acquire() -> Option<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = match pollster::block_on(instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            },
        )) {
            Ok(adapter) => adapter,
            Err(e) => {
                tracing::debug!(error = %e, "GPU adapter request failed");
                return None;
            }
        };

        let (device, queue) = match pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("gray-norm device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                ..Default::default()
            },
        )) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::debug!(error = %e, "GPU adapter refused device request");
                return None;
            }
        };

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("normalize.wgsl"),
            source: wgpu::ShaderSource::Wgsl(include_str!("normalize.wgsl").into()),
        });

        let compute_pipeline = |label, entry_point| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: None,
                module: &shader,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            })
        };
        let project_pipeline = compute_pipeline("project", "project");
        let reduce_pipeline = compute_pipeline("reduce-min-max", "reduce_min_max");
        let rescale_pipeline = compute_pipeline("rescale", "rescale");

        let adapter_info = adapter.get_info();
        tracing::debug!(adapter = %adapter_info.name, backend = ?adapter_info.backend, "GPU backend ready");

        Some(Self {
            device,
            queue,
            project_pipeline,
            reduce_pipeline,
            rescale_pipeline,
            adapter_info,
        })
    }

    pub fn describe(&self) -> String {
        format!(
            "{} ({:?}, {:?})",
            self.adapter_info.name, self.adapter_info.device_type, self.adapter_info.backend
        )
    }

    fn params_buffer(&self, pixel_count: u32, minv: f32, scale: f32) -> wgpu::Buffer {
        let params = Params {
            weights: CHANNEL_WEIGHTS,
            offset: CENTER_OFFSET,
            pixel_count,
            minv,
            scale,
            _pad0: 0,
        };
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("params"),
                contents: bytemuck::bytes_of(&params),
                usage: wgpu::BufferUsages::UNIFORM,
            })
    }

    /// Submit one compute pass of `pipeline` over `group_count` workgroups.
    fn dispatch(
        &self,
        pipeline: &wgpu::ComputePipeline,
        entries: &[wgpu::BindGroupEntry<'_>],
        group_count: u32,
        label: &str,
    ) {
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &pipeline.get_bind_group_layout(0),
            entries,
        });

        let (groups_x, groups_y) = dispatch_dims(group_count);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(label),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        self.queue.submit(Some(encoder.finish()));
    }

    /// Copy `size` bytes out of `source` and block until they are mapped.
    fn read_back(&self, source: &wgpu::Buffer, size: u64) -> Result<Vec<u8>, NormError> {
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("staging"),
            size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("read-back"),
            });
        encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
        self.queue.submit(Some(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device
            .poll(wgpu::PollType::Wait)
            .map_err(|e| NormError::Gpu(format!("device poll failed: {e}")))?;
        rx.recv()
            .map_err(|_| NormError::Gpu("map callback dropped".into()))?
            .map_err(|e| NormError::Gpu(format!("buffer map failed: {e}")))?;

        let data = slice.get_mapped_range().to_vec();
        staging.unmap();
        Ok(data)
    }
}

impl NormBackend for GpuBackend {
    type Field = GpuField;

    fn project(&self, raster: &RgbRaster<'_>) -> Result<GpuField, NormError> {
        let pixel_count = raster.pixel_count() as u32;

        // Pad the packed RGB bytes to a word boundary for array<u32> access.
        let mut bytes = raster.pixels().to_vec();
        bytes.resize(bytes.len().div_ceil(4) * 4, 0);
        let src = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("rgb-source"),
                contents: &bytes,
                usage: wgpu::BufferUsages::STORAGE,
            });

        let field = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("scalar-field"),
            size: u64::from(pixel_count) * 4,
            usage: wgpu::BufferUsages::STORAGE,
            mapped_at_creation: false,
        });

        let params = self.params_buffer(pixel_count, 0.0, 0.0);
        self.dispatch(
            &self.project_pipeline,
            &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: src.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: field.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
            ],
            pixel_count.div_ceil(WORKGROUP_SIZE),
            "project",
        );

        Ok(GpuField {
            buffer: field,
            len: pixel_count,
        })
    }

    fn min_max(&self, field: &GpuField) -> Result<(f32, f32), NormError> {
        let group_count = field.len.div_ceil(WORKGROUP_SIZE);
        let (groups_x, groups_y) = dispatch_dims(group_count);
        // The 2D grid may carry trailing groups past `group_count`; they
        // write sentinel pairs, which fold away below.
        let partial_count = u64::from(groups_x) * u64::from(groups_y);

        let partials = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("reduction-partials"),
            size: partial_count * 8,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let params = self.params_buffer(field.len, 0.0, 0.0);
        self.dispatch(
            &self.reduce_pipeline,
            &[
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: field.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: partials.as_entire_binding(),
                },
            ],
            group_count,
            "reduce-min-max",
        );

        let data = self.read_back(&partials, partial_count * 8)?;
        let pairs: Vec<[f32; 2]> = bytemuck::pod_collect_to_vec(&data);

        let mut minv = f32::INFINITY;
        let mut maxv = f32::NEG_INFINITY;
        for [lo, hi] in pairs {
            minv = minv.min(lo);
            maxv = maxv.max(hi);
        }
        Ok((minv, maxv))
    }

    fn rescale(&self, field: GpuField, minv: f32, scale: f32) -> Result<Vec<u16>, NormError> {
        let out = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("normalized-values"),
            size: u64::from(field.len) * 4,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let params = self.params_buffer(field.len, minv, scale);
        self.dispatch(
            &self.rescale_pipeline,
            &[
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: field.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: out.as_entire_binding(),
                },
            ],
            field.len.div_ceil(WORKGROUP_SIZE),
            "rescale",
        );

        let data = self.read_back(&out, u64::from(field.len) * 4)?;
        let words: Vec<u32> = bytemuck::pod_collect_to_vec(&data);
        Ok(words.into_iter().map(|w| w as u16).collect())
    }
}

/// Split a linear workgroup count into a `(x, y)` grid within the
/// per-dimension dispatch limit.
fn dispatch_dims(group_count: u32) -> (u32, u32) {
    if group_count <= MAX_GROUPS_PER_DIM {
        (group_count.max(1), 1)
    } else {
        (
            MAX_GROUPS_PER_DIM,
            group_count.div_ceil(MAX_GROUPS_PER_DIM),
        )
    }
}
