//! Main renderer implementation
//!
//! Each frame runs three passes, each submitted on its own: shadow maps for
//! every light, the G-buffer for deferred renderables, then the composite
//! quad followed by forward renderables. The frame ends by waiting for the
//! GPU, which is what the GPU time in [`FrameTimings`] measures.

mod composite_pass;
mod gbuffer_pass;
mod pipelines;
mod shadow_pass;

pub use pipelines::RendererPipelines;

use crate::config::RendererConfig;
use crate::core::Camera;
use crate::error::RenderError;
use crate::graphics::bindings::BindingSet;
use crate::graphics::buffer_set::BufferSet;
use crate::graphics::context::RenderContext;
use crate::graphics::defaults::ResourceDefaults;
use crate::graphics::gbuffer::GBuffer;
use crate::graphics::mesh::MeshData;
use crate::graphics::pipeline::{PipelineState, DEPTH_FORMAT};
use crate::graphics::render_target::RenderTarget;
use crate::graphics::texture::{create_comparison_sampler, GpuTexture};
use crate::graphics::uniform::{
    CameraUniform, LightProjectionUniform, ResolveSettingsUniform, UniformBuffer,
};
use crate::input::InputState;
use crate::scene::{
    DirectionalLight, LightSettings, MeshRenderable, RenderMode, Scene, SHADOW_FORMAT,
};
use glam::Vec3;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};

/// Wall-clock cost of the last frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTimings {
    /// Recording and submitting the three passes
    pub cpu_ms: f64,
    /// Waiting for the submitted work to finish
    pub gpu_ms: f64,
}

/// What the composite pass shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum DebugView {
    #[default]
    Lit = 0,
    Albedo = 1,
    Emissive = 2,
    MetallicRoughness = 3,
    Normals = 4,
    WorldPosition = 5,
    Bitangents = 6,
    VertexNormals = 7,
    Tangents = 8,
}

impl DebugView {
    pub const ALL: [DebugView; 9] = [
        DebugView::Lit,
        DebugView::Albedo,
        DebugView::Emissive,
        DebugView::MetallicRoughness,
        DebugView::Normals,
        DebugView::WorldPosition,
        DebugView::Bitangents,
        DebugView::VertexNormals,
        DebugView::Tangents,
    ];

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u32 {
        self as u32
    }
}

/// Where the composite pass writes
pub enum RenderOutput {
    Surface {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Offscreen(RenderTarget),
}

impl RenderOutput {
    pub fn format(&self) -> wgpu::TextureFormat {
        match self {
            RenderOutput::Surface { config, .. } => config.format,
            RenderOutput::Offscreen(target) => target.format(),
        }
    }
}

/// Stand-ins bound when the scene has no light
struct ShadowFallback {
    depth: GpuTexture,
    projection_view: wgpu::Buffer,
    sampler: wgpu::Sampler,
}

/// Main renderer that manages all rendering operations
pub struct Renderer {
    context: Arc<RenderContext>,
    defaults: Arc<ResourceDefaults>,
    config: RendererConfig,
    camera: Camera,
    output: RenderOutput,
    size: (u32, u32),
    pending_resize: Option<(u32, u32)>,
    /// Depth of the composited output, shared by the quad and forward draws
    depth: GpuTexture,
    gbuffer: GBuffer,
    pipelines: RendererPipelines,
    quad: BufferSet,
    quad_camera: wgpu::Buffer,
    light_uniform: wgpu::Buffer,
    settings_uniform: wgpu::Buffer,
    shadow_fallback: ShadowFallback,
    light_settings: LightSettings,
    debug_view: DebugView,
    last_timings: FrameTimings,
}

impl Renderer {
    /// Render into an off-screen texture of the given size
    pub fn offscreen(
        context: Arc<RenderContext>,
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> Result<Self, RenderError> {
        let target = RenderTarget::new(
            &context.device,
            width,
            height,
            RenderTarget::DEFAULT_FORMAT,
        );
        Self::new(context, RenderOutput::Offscreen(target), width, height, config)
    }

    /// Render into a window surface, configuring it for the given size
    pub fn for_surface(
        context: Arc<RenderContext>,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> Result<Self, RenderError> {
        let surface_config = context.create_surface_configuration(&surface, width, height);
        surface.configure(&context.device, &surface_config);
        let output = RenderOutput::Surface {
            surface,
            config: surface_config,
        };
        Self::new(context, output, width, height, config)
    }

    fn new(
        context: Arc<RenderContext>,
        output: RenderOutput,
        width: u32,
        height: u32,
        config: RendererConfig,
    ) -> Result<Self, RenderError> {
        let (width, height) = (width.max(1), height.max(1));
        info!(width, height, format = ?output.format(), "Initializing renderer");

        let device = &context.device;
        let defaults = Arc::new(ResourceDefaults::new(
            context.device.clone(),
            context.queue.clone(),
        ));
        let pipelines = RendererPipelines::new(device, output.format())?;

        let quad = BufferSet::from_mesh_data(&MeshData::fullscreen_quad(), &defaults)?;
        let quad_camera = CameraUniform::default().create_buffer(device, Some("Composite Camera Uniform"));
        let light_settings = config.light;
        let light_uniform = light_settings
            .to_uniform(Vec3::Y, false)
            .create_buffer(device, Some("Light Uniform"));
        let debug_view = DebugView::from_index(config.debug_view).unwrap_or_default();
        let settings_uniform = ResolveSettingsUniform {
            debug_view: debug_view.index(),
            ..Default::default()
        }
        .create_buffer(device, Some("Resolve Settings Uniform"));

        let shadow_fallback = ShadowFallback {
            depth: GpuTexture::depth(device, "Fallback Shadow Map", 1, 1, SHADOW_FORMAT),
            projection_view: LightProjectionUniform::default()
                .create_buffer(device, Some("Fallback Projection View Uniform")),
            sampler: create_comparison_sampler(device, "Fallback Shadow Sampler"),
        };

        Ok(Self {
            camera: Camera::new(width, height, config.camera.clone()),
            depth: GpuTexture::depth(device, "Depth Texture", width, height, DEPTH_FORMAT),
            gbuffer: GBuffer::new(device, width, height),
            context,
            defaults,
            config,
            output,
            size: (width, height),
            pending_resize: None,
            pipelines,
            quad,
            quad_camera,
            light_uniform,
            settings_uniform,
            shadow_fallback,
            light_settings,
            debug_view,
            last_timings: FrameTimings::default(),
        })
    }

    /// Upload `mesh` and pair it with the pipeline for `mode`
    pub fn create_mesh(
        &self,
        mesh: &MeshData,
        mode: RenderMode,
    ) -> Result<MeshRenderable, RenderError> {
        let pipeline = self.pipelines.for_mesh(mode, mesh.double_sided).clone();
        MeshRenderable::from_mesh_data(&self.defaults, pipeline, mesh, mode)
    }

    /// Directional light using the shared shadow pipeline
    pub fn create_directional_light(
        &self,
        id: impl Into<String>,
        direction: Vec3,
    ) -> Result<DirectionalLight, RenderError> {
        DirectionalLight::new(
            &self.context.device,
            id,
            direction,
            self.pipelines.shadow.clone(),
            &self.config.shadow,
        )
    }

    /// Render one frame
    ///
    /// A pending resize is applied before any pass runs.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        input: &InputState,
        delta_ms: f32,
    ) -> Result<FrameTimings, RenderError> {
        if let Some((width, height)) = self.pending_resize.take() {
            self.apply_resize(width, height);
        }
        self.camera.update(input, delta_ms);

        let cpu_start = Instant::now();
        let queue = &self.context.queue;
        for renderable in scene.renderables() {
            renderable.write_camera(queue, &self.camera);
        }

        self.shadow_pass(scene)?;
        self.gbuffer_pass(scene)?;

        let (frame, target) = match &self.output {
            RenderOutput::Surface { surface, .. } => {
                let frame = surface.get_current_texture()?;
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                (Some(frame), view)
            }
            RenderOutput::Offscreen(target) => (None, target.view().clone()),
        };
        self.composite_pass(scene, &target)?;
        let cpu_ms = cpu_start.elapsed().as_secs_f64() * 1000.0;

        let gpu_start = Instant::now();
        self.context.device.poll(wgpu::PollType::Wait)?;
        let gpu_ms = gpu_start.elapsed().as_secs_f64() * 1000.0;

        if let Some(frame) = frame {
            frame.present();
        }

        self.last_timings = FrameTimings { cpu_ms, gpu_ms };
        debug!(cpu_ms, gpu_ms, "Frame rendered");
        Ok(self.last_timings)
    }

    /// Update the camera now and reallocate targets before the next frame
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_size(width, height);
        self.pending_resize = Some((width, height));
    }

    fn apply_resize(&mut self, width: u32, height: u32) {
        info!(width, height, "Reallocating render targets");
        let device = &self.context.device;

        self.depth.destroy();
        self.depth = GpuTexture::depth(device, "Depth Texture", width, height, DEPTH_FORMAT);
        self.gbuffer.resize(device, width, height);

        match &mut self.output {
            RenderOutput::Surface { surface, config } => {
                config.width = width;
                config.height = height;
                surface.configure(device, config);
            }
            RenderOutput::Offscreen(target) => target.resize(device, width, height),
        }
        self.size = (width, height);
    }

    /// Configure the surface again after it was lost or became outdated
    pub fn reconfigure_surface(&mut self) {
        if let RenderOutput::Surface { surface, config } = &self.output {
            debug!("Reconfiguring surface");
            surface.configure(&self.context.device, config);
        }
    }

    pub fn set_debug_view(&mut self, view: DebugView) {
        self.debug_view = view;
        ResolveSettingsUniform {
            debug_view: view.index(),
            ..Default::default()
        }
        .update_buffer(&self.context.queue, &self.settings_uniform);
    }

    pub fn debug_view(&self) -> DebugView {
        self.debug_view
    }

    pub fn set_light_settings(&mut self, settings: LightSettings) {
        self.light_settings = settings;
    }

    pub fn light_settings(&self) -> &LightSettings {
        &self.light_settings
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn context(&self) -> &Arc<RenderContext> {
        &self.context
    }

    pub fn defaults(&self) -> &Arc<ResourceDefaults> {
        &self.defaults
    }

    pub fn pipelines(&self) -> &RendererPipelines {
        &self.pipelines
    }

    pub fn output(&self) -> &RenderOutput {
        &self.output
    }

    pub fn gbuffer(&self) -> &GBuffer {
        &self.gbuffer
    }

    pub fn depth_size(&self) -> (u32, u32) {
        self.depth.size()
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn last_timings(&self) -> FrameTimings {
        self.last_timings
    }

    fn command_encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.context.create_command_encoder(Some(label))
    }
}

/// Bind everything a draw needs and issue it
///
/// Fails without drawing if the buffers or bindings do not match what the
/// pipeline was built for.
fn draw(
    pass: &mut wgpu::RenderPass<'_>,
    device: &wgpu::Device,
    pipeline: &PipelineState,
    bindings: &BindingSet<'_>,
    buffers: &BufferSet,
    renderable: &str,
) -> Result<(), RenderError> {
    let realized = pipeline.realize(device);
    let vertex_buffers = buffers.resolve(pipeline.vertex_layout(), renderable)?;
    let bind_groups = bindings.create_bind_groups(device, pipeline.id(), realized)?;

    pass.set_pipeline(&realized.pipeline);
    for (index, group) in bind_groups.iter().enumerate() {
        pass.set_bind_group(index as u32, group, &[]);
    }
    for (slot, buffer) in vertex_buffers.into_iter().enumerate() {
        pass.set_vertex_buffer(slot as u32, buffer.slice(..));
    }
    pass.set_index_buffer(buffers.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
    pass.draw_indexed(0..buffers.index_count(), 0, 0..1);

    trace!(renderable, pipeline = pipeline.id(), "Draw");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_view_indices() {
        for (index, view) in DebugView::ALL.iter().enumerate() {
            assert_eq!(view.index(), index as u32);
            assert_eq!(DebugView::from_index(index as u32), Some(*view));
        }
        assert_eq!(DebugView::from_index(9), None);
        assert_eq!(DebugView::default(), DebugView::Lit);
    }
}
