//! Borrowed views over the resources a draw binds
//!
//! Passes compose a [`BindingSet`] from a renderable's material plus any
//! pass-owned resources (light uniforms, shadow maps) without touching the
//! renderable itself.

use crate::error::RenderError;
use crate::graphics::pipeline::RealizedPipeline;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct BindingSet<'a> {
    pub uniforms: Vec<&'a wgpu::Buffer>,
    pub textures: Vec<&'a wgpu::TextureView>,
    pub samplers: Vec<&'a wgpu::Sampler>,
}

impl<'a> BindingSet<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_uniform(&mut self, buffer: &'a wgpu::Buffer) -> &mut Self {
        self.uniforms.push(buffer);
        self
    }

    /// Insert a uniform at `index`, shifting later ones
    pub fn insert_uniform(&mut self, index: usize, buffer: &'a wgpu::Buffer) -> &mut Self {
        let index = index.min(self.uniforms.len());
        self.uniforms.insert(index, buffer);
        self
    }

    pub fn push_texture(&mut self, view: &'a wgpu::TextureView) -> &mut Self {
        self.textures.push(view);
        self
    }

    pub fn push_sampler(&mut self, sampler: &'a wgpu::Sampler) -> &mut Self {
        self.samplers.push(sampler);
        self
    }

    /// Number of bindings in each non-empty group, in group order
    pub fn group_sizes(&self) -> Vec<usize> {
        [self.uniforms.len(), self.textures.len(), self.samplers.len()]
            .into_iter()
            .filter(|&count| count > 0)
            .collect()
    }

    /// Check the set against the group shape a pipeline was built with
    pub fn validate(&self, pipeline_id: &str, expected: &[usize]) -> Result<(), RenderError> {
        let actual = self.group_sizes();
        if actual.len() != expected.len() {
            return Err(RenderError::BindGroupCountMismatch {
                pipeline: pipeline_id.to_string(),
                expected: expected.len(),
                actual: actual.len(),
            });
        }
        for (group, (&expected, &actual)) in expected.iter().zip(&actual).enumerate() {
            if expected != actual {
                return Err(RenderError::BindGroupMismatch {
                    pipeline: pipeline_id.to_string(),
                    group,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Create one bind group per non-empty resource list
    pub fn create_bind_groups(
        &self,
        device: &wgpu::Device,
        pipeline_id: &str,
        realized: &RealizedPipeline,
    ) -> Result<Vec<wgpu::BindGroup>, RenderError> {
        self.validate(pipeline_id, &realized.group_sizes)?;

        let uniforms = self
            .uniforms
            .iter()
            .map(|buffer| buffer.as_entire_binding())
            .collect::<Vec<_>>();
        let textures = self
            .textures
            .iter()
            .map(|&view| wgpu::BindingResource::TextureView(view))
            .collect::<Vec<_>>();
        let samplers = self
            .samplers
            .iter()
            .map(|&sampler| wgpu::BindingResource::Sampler(sampler))
            .collect::<Vec<_>>();

        let groups = [uniforms, textures, samplers]
            .into_iter()
            .filter(|resources| !resources.is_empty())
            .zip(&realized.bind_group_layouts)
            .enumerate()
            .map(|(group, (resources, layout))| {
                let entries = resources
                    .into_iter()
                    .enumerate()
                    .map(|(binding, resource)| wgpu::BindGroupEntry {
                        binding: binding as u32,
                        resource,
                    })
                    .collect::<Vec<_>>();
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("{pipeline_id} Bind Group {group}")),
                    layout,
                    entries: &entries,
                })
            })
            .collect::<Vec<_>>();

        trace!(pipeline = pipeline_id, groups = groups.len(), "Created bind groups");
        Ok(groups)
    }
}
