//! WebGPU render context management
//!
//! Owns the device, queue and adapter. Surfaces are created by the caller
//! and configured through [`RenderContext::create_surface_configuration`].

use crate::error::RenderError;
use crate::graphics::gbuffer::{GBUFFER_BYTES_PER_SAMPLE, GBUFFER_TARGETS};
use std::sync::Arc;
use tracing::info;

/// Main rendering context for the engine
pub struct RenderContext {
    /// WebGPU instance
    pub instance: wgpu::Instance,
    /// WebGPU device for creating GPU resources
    pub device: Arc<wgpu::Device>,
    /// Command queue for submitting GPU work
    pub queue: Arc<wgpu::Queue>,
    adapter: wgpu::Adapter,
    /// Adapter information for debugging
    pub adapter_info: wgpu::AdapterInfo,
}

impl RenderContext {
    /// Request a high-performance adapter and a device able to hold the
    /// G-buffer's eight color attachments
    pub async fn new(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self, RenderError> {
        Self::with_options(instance, compatible_surface, false).await
    }

    pub async fn with_options(
        instance: wgpu::Instance,
        compatible_surface: Option<&wgpu::Surface<'_>>,
        force_fallback_adapter: bool,
    ) -> Result<Self, RenderError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter,
            })
            .await?;

        let adapter_info = adapter.get_info();
        info!(
            gpu_name = %adapter_info.name,
            backend = ?adapter_info.backend,
            "GPU adapter selected"
        );

        let required_limits = Self::required_limits(&adapter.limits())?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits,
                label: Some("Render Device"),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self {
            instance,
            device: Arc::new(device),
            queue: Arc::new(queue),
            adapter,
            adapter_info,
        })
    }

    /// The adapter's limits with the G-buffer's attachment budget, or an
    /// error naming the first limit the adapter cannot meet
    pub fn required_limits(available: &wgpu::Limits) -> Result<wgpu::Limits, RenderError> {
        let color_attachments = GBUFFER_TARGETS.len() as u32;
        let checks = [
            (
                "max_color_attachments",
                available.max_color_attachments,
                color_attachments,
            ),
            (
                "max_color_attachment_bytes_per_sample",
                available.max_color_attachment_bytes_per_sample,
                GBUFFER_BYTES_PER_SAMPLE,
            ),
        ];
        for (name, available, required) in checks {
            if available < required {
                return Err(RenderError::UnsupportedLimit {
                    name,
                    available,
                    required,
                });
            }
        }

        Ok(wgpu::Limits {
            max_color_attachments: color_attachments,
            max_color_attachment_bytes_per_sample: GBUFFER_BYTES_PER_SAMPLE,
            ..available.clone()
        })
    }

    /// Create initial surface configuration for a given surface
    pub fn create_surface_configuration(
        &self,
        surface: &wgpu::Surface,
        width: u32,
        height: u32,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(&self.adapter);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: self.get_preferred_format(surface),
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    /// Get the preferred surface format for a given surface
    pub fn get_preferred_format(&self, surface: &wgpu::Surface) -> wgpu::TextureFormat {
        let surface_caps = surface.get_capabilities(&self.adapter);
        surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb)
    }

    pub fn limits(&self) -> wgpu::Limits {
        self.device.limits()
    }

    /// Create a command encoder for recording GPU commands
    pub fn create_command_encoder(&self, label: Option<&str>) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label })
    }

    /// Submit command buffers to the GPU queue
    pub fn submit<I: IntoIterator<Item = wgpu::CommandBuffer>>(&self, command_buffers: I) {
        self.queue.submit(command_buffers);
    }
}
