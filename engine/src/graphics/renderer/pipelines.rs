//! The fixed set of pipelines the renderer draws with

use crate::error::RenderError;
use crate::graphics::gbuffer::GBuffer;
use crate::graphics::pipeline::{BindingSignature, PipelineState};
use crate::graphics::vertex_layout::VertexLayout;
use crate::scene::{RenderMode, SHADOW_FORMAT};
use crate::shaders::ShaderProgram;
use std::sync::Arc;

const FILTERABLE: wgpu::TextureSampleType = wgpu::TextureSampleType::Float { filterable: true };
const UNFILTERABLE: wgpu::TextureSampleType = wgpu::TextureSampleType::Float { filterable: false };

/// Pipelines shared by every renderable and light
///
/// Mesh pipelines come in a back-face culled and a double-sided variant.
pub struct RendererPipelines {
    pub gbuffer: Arc<PipelineState>,
    pub gbuffer_double_sided: Arc<PipelineState>,
    pub forward: Arc<PipelineState>,
    pub forward_double_sided: Arc<PipelineState>,
    pub composite: Arc<PipelineState>,
    pub shadow: Arc<PipelineState>,
}

impl RendererPipelines {
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
    ) -> Result<Self, RenderError> {
        let gbuffer_shader = ShaderProgram::GBuffer.create_module(device);
        let forward_shader = ShaderProgram::Forward.create_module(device);
        let canonical = VertexLayout::canonical()?;

        let gbuffer = |id: &str, cull| {
            Arc::new(
                PipelineState::new(
                    id,
                    gbuffer_shader.clone(),
                    canonical.clone(),
                    Self::gbuffer_signature(),
                )
                .with_color_targets(GBuffer::color_target_states())
                .with_cull_mode(cull),
            )
        };
        let forward = |id: &str, cull| {
            Arc::new(
                PipelineState::new(
                    id,
                    forward_shader.clone(),
                    canonical.clone(),
                    Self::forward_signature(),
                )
                .with_color_format(output_format)
                .with_cull_mode(cull),
            )
        };

        let mut composite = PipelineState::new(
            ShaderProgram::Deferred.id(),
            ShaderProgram::Deferred.create_module(device),
            VertexLayout::position_tex_coord()?,
            Self::composite_signature(),
        )
        .with_color_format(output_format);
        // The quad carries the G-buffer depth, so it must always land
        composite.set_depth_compare(wgpu::CompareFunction::Always)?;

        let shadow = PipelineState::new(
            ShaderProgram::Shadow.id(),
            ShaderProgram::Shadow.create_module(device),
            VertexLayout::position_only()?,
            BindingSignature::new(2),
        )
        .with_depth_format(SHADOW_FORMAT);

        Ok(Self {
            gbuffer: gbuffer("gbuffer", Some(wgpu::Face::Back)),
            gbuffer_double_sided: gbuffer("gbuffer_double_sided", None),
            forward: forward("forward", Some(wgpu::Face::Back)),
            forward_double_sided: forward("forward_double_sided", None),
            composite: Arc::new(composite),
            shadow: Arc::new(shadow),
        })
    }

    /// Camera and material uniforms, five material textures and samplers
    pub fn gbuffer_signature() -> BindingSignature {
        BindingSignature::new(2)
            .with_textures(FILTERABLE, 5)
            .with_samplers(wgpu::SamplerBindingType::Filtering, 5)
    }

    /// Camera, light, material and light projection uniforms; material
    /// textures plus the shadow map; material samplers plus a comparison one
    pub fn forward_signature() -> BindingSignature {
        BindingSignature::new(4)
            .with_textures(FILTERABLE, 5)
            .with_textures(wgpu::TextureSampleType::Depth, 1)
            .with_samplers(wgpu::SamplerBindingType::Filtering, 5)
            .with_samplers(wgpu::SamplerBindingType::Comparison, 1)
    }

    /// Camera, light, settings and light projection uniforms; eight G-buffer
    /// targets, G-buffer depth and the shadow map; the shadow sampler
    pub fn composite_signature() -> BindingSignature {
        BindingSignature::new(4)
            .with_textures(UNFILTERABLE, 8)
            .with_textures(wgpu::TextureSampleType::Depth, 2)
            .with_samplers(wgpu::SamplerBindingType::Comparison, 1)
    }

    pub fn for_mesh(&self, mode: RenderMode, double_sided: bool) -> &Arc<PipelineState> {
        match (mode, double_sided) {
            (RenderMode::Deferred, false) => &self.gbuffer,
            (RenderMode::Deferred, true) => &self.gbuffer_double_sided,
            (RenderMode::Forward, false) => &self.forward,
            (RenderMode::Forward, true) => &self.forward_double_sided,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_group_sizes() {
        assert_eq!(RendererPipelines::gbuffer_signature().group_sizes(), vec![2, 5, 5]);
        assert_eq!(RendererPipelines::forward_signature().group_sizes(), vec![4, 6, 6]);
        assert_eq!(RendererPipelines::composite_signature().group_sizes(), vec![4, 10, 1]);
    }
}
