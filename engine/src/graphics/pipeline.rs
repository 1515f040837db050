//! Render pipeline abstraction
//!
//! A [`PipelineState`] describes a shader plus its fixed-function state and
//! the shape of its bind groups. It is realized into a `wgpu::RenderPipeline`
//! at most once, on first use, and shared between renderables through `Arc`.

use crate::error::RenderError;
use crate::graphics::vertex_layout::VertexLayout;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;

/// Depth format of the primary and G-buffer depth targets
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// Kinds of resources bound in each group
///
/// Groups are enumerated uniforms, then textures, then samplers. Empty
/// groups are skipped, so a pipeline without textures binds its samplers at
/// group 1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BindingSignature {
    pub uniforms: usize,
    pub textures: Vec<wgpu::TextureSampleType>,
    pub samplers: Vec<wgpu::SamplerBindingType>,
}

impl BindingSignature {
    pub fn new(uniforms: usize) -> Self {
        Self {
            uniforms,
            ..Self::default()
        }
    }

    pub fn with_textures(
        mut self,
        sample_type: wgpu::TextureSampleType,
        count: usize,
    ) -> Self {
        self.textures.extend(std::iter::repeat(sample_type).take(count));
        self
    }

    pub fn with_samplers(mut self, binding: wgpu::SamplerBindingType, count: usize) -> Self {
        self.samplers.extend(std::iter::repeat(binding).take(count));
        self
    }

    /// Number of bindings in each non-empty group, in group order
    pub fn group_sizes(&self) -> Vec<usize> {
        [self.uniforms, self.textures.len(), self.samplers.len()]
            .into_iter()
            .filter(|&count| count > 0)
            .collect()
    }

    fn layout_entries(&self) -> Vec<Vec<wgpu::BindGroupLayoutEntry>> {
        let uniforms = (0..self.uniforms)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding: binding as u32,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            })
            .collect::<Vec<_>>();

        let textures = self
            .textures
            .iter()
            .enumerate()
            .map(|(binding, &sample_type)| wgpu::BindGroupLayoutEntry {
                binding: binding as u32,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type,
                },
                count: None,
            })
            .collect::<Vec<_>>();

        let samplers = self
            .samplers
            .iter()
            .enumerate()
            .map(|(binding, &ty)| wgpu::BindGroupLayoutEntry {
                binding: binding as u32,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(ty),
                count: None,
            })
            .collect::<Vec<_>>();

        [uniforms, textures, samplers]
            .into_iter()
            .filter(|entries| !entries.is_empty())
            .collect()
    }
}

/// The GPU objects produced by realizing a [`PipelineState`]
#[derive(Debug)]
pub struct RealizedPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layouts: Vec<wgpu::BindGroupLayout>,
    pub group_sizes: Vec<usize>,
}

/// Shader and fixed-function description of a render pipeline
#[derive(Debug)]
pub struct PipelineState {
    id: String,
    shader: Arc<wgpu::ShaderModule>,
    vertex_entry: String,
    fragment_entry: String,
    vertex_layout: VertexLayout,
    primitive: wgpu::PrimitiveState,
    depth_stencil: Option<wgpu::DepthStencilState>,
    color_targets: Option<Vec<wgpu::ColorTargetState>>,
    sample_count: u32,
    signature: BindingSignature,
    realized: OnceCell<RealizedPipeline>,
}

impl PipelineState {
    /// Triangle list, CCW, no culling, `Depth24Plus` with writes and `Less`,
    /// no color targets until [`with_color_targets`](Self::with_color_targets)
    pub fn new(
        id: impl Into<String>,
        shader: Arc<wgpu::ShaderModule>,
        vertex_layout: VertexLayout,
        signature: BindingSignature,
    ) -> Self {
        Self {
            id: id.into(),
            shader,
            vertex_entry: "vs_main".to_string(),
            fragment_entry: "fs_main".to_string(),
            vertex_layout,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            color_targets: None,
            sample_count: 1,
            signature,
            realized: OnceCell::new(),
        }
    }

    pub fn with_color_targets(mut self, targets: Vec<wgpu::ColorTargetState>) -> Self {
        self.color_targets = Some(targets);
        self
    }

    /// Single opaque color target of the given format
    pub fn with_color_format(self, format: wgpu::TextureFormat) -> Self {
        self.with_color_targets(vec![wgpu::ColorTargetState {
            format,
            blend: Some(wgpu::BlendState::REPLACE),
            write_mask: wgpu::ColorWrites::ALL,
        }])
    }

    pub fn with_depth_stencil(mut self, depth_stencil: Option<wgpu::DepthStencilState>) -> Self {
        self.depth_stencil = depth_stencil;
        self
    }

    pub fn with_depth_format(mut self, format: wgpu::TextureFormat) -> Self {
        if let Some(depth) = self.depth_stencil.as_mut() {
            depth.format = format;
        }
        self
    }

    pub fn with_cull_mode(mut self, cull_mode: Option<wgpu::Face>) -> Self {
        self.primitive.cull_mode = cull_mode;
        self
    }

    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.sample_count = count;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vertex_layout(&self) -> &VertexLayout {
        &self.vertex_layout
    }

    pub fn signature(&self) -> &BindingSignature {
        &self.signature
    }

    pub fn primitive(&self) -> &wgpu::PrimitiveState {
        &self.primitive
    }

    pub fn depth_stencil(&self) -> Option<&wgpu::DepthStencilState> {
        self.depth_stencil.as_ref()
    }

    pub fn color_targets(&self) -> Option<&[wgpu::ColorTargetState]> {
        self.color_targets.as_deref()
    }

    pub fn is_depth_only(&self) -> bool {
        self.color_targets.is_none()
    }

    pub fn is_realized(&self) -> bool {
        self.realized.get().is_some()
    }

    pub fn set_depth_write_enabled(&mut self, enabled: bool) -> Result<(), RenderError> {
        self.depth_stencil_mut()?.depth_write_enabled = enabled;
        Ok(())
    }

    pub fn set_depth_compare(&mut self, compare: wgpu::CompareFunction) -> Result<(), RenderError> {
        self.depth_stencil_mut()?.depth_compare = compare;
        Ok(())
    }

    fn depth_stencil_mut(&mut self) -> Result<&mut wgpu::DepthStencilState, RenderError> {
        if self.is_realized() {
            return Err(RenderError::PipelineRealized(self.id.clone()));
        }
        self.depth_stencil
            .as_mut()
            .ok_or_else(|| RenderError::NoDepthStencil(self.id.clone()))
    }

    /// Build the GPU pipeline on first call and return the cached one after
    pub fn realize(&self, device: &wgpu::Device) -> &RealizedPipeline {
        self.realized.get_or_init(|| self.build(device))
    }

    fn build(&self, device: &wgpu::Device) -> RealizedPipeline {
        info!(pipeline = %self.id, "Realizing render pipeline");

        let bind_group_layouts: Vec<wgpu::BindGroupLayout> = self
            .signature
            .layout_entries()
            .iter()
            .enumerate()
            .map(|(group, entries)| {
                device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(&format!("{} Bind Group Layout {group}", self.id)),
                    entries,
                })
            })
            .collect();
        let layout_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{} Pipeline Layout", self.id)),
            bind_group_layouts: &layout_refs,
            push_constant_ranges: &[],
        });

        let buffers = self.vertex_layout.buffer_layouts();
        let targets: Vec<Option<wgpu::ColorTargetState>> = self
            .color_targets
            .iter()
            .flatten()
            .cloned()
            .map(Some)
            .collect();

        let fragment = self.color_targets.as_ref().map(|_| wgpu::FragmentState {
            module: &self.shader,
            entry_point: Some(self.fragment_entry.as_str()),
            targets: &targets,
            compilation_options: Default::default(),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.id.as_str()),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some(self.vertex_entry.as_str()),
                buffers: &buffers,
                compilation_options: Default::default(),
            },
            fragment,
            primitive: self.primitive,
            depth_stencil: self.depth_stencil.clone(),
            multisample: wgpu::MultisampleState {
                count: self.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        RealizedPipeline {
            pipeline,
            bind_group_layouts,
            group_sizes: self.signature.group_sizes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_sizes_skip_empty_groups() {
        let shadow = BindingSignature::new(2);
        assert_eq!(shadow.group_sizes(), vec![2]);

        let gbuffer = BindingSignature::new(2)
            .with_textures(wgpu::TextureSampleType::Float { filterable: true }, 5)
            .with_samplers(wgpu::SamplerBindingType::Filtering, 5);
        assert_eq!(gbuffer.group_sizes(), vec![2, 5, 5]);

        let samplers_only =
            BindingSignature::new(0).with_samplers(wgpu::SamplerBindingType::Comparison, 1);
        assert_eq!(samplers_only.group_sizes(), vec![1]);
    }

    #[test]
    fn test_layout_entries_are_numbered_per_group() {
        let signature = BindingSignature::new(1)
            .with_textures(wgpu::TextureSampleType::Depth, 2)
            .with_samplers(wgpu::SamplerBindingType::Comparison, 1);
        let groups = signature.layout_entries();

        assert_eq!(groups.len(), 3);
        let bindings: Vec<u32> = groups[1].iter().map(|entry| entry.binding).collect();
        assert_eq!(bindings, vec![0, 1]);
        assert!(matches!(
            groups[2][0].ty,
            wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison)
        ));
    }
}
