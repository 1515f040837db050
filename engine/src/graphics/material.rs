//! Materials: textures, samplers, uniform buffers and scalar factors
//!
//! A material created through [`Material::create`] always has a texture and
//! sampler for every [`TextureSlot`]; slots the description leaves empty are
//! filled from [`ResourceDefaults`].

use crate::graphics::bindings::BindingSet;
use crate::graphics::defaults::ResourceDefaults;
use crate::graphics::pipeline::PipelineState;
use crate::graphics::texture::GpuTexture;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Semantic texture attachments, in canonical binding order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureSlot {
    Color,
    Normal,
    Emissive,
    MetallicRoughness,
    Occlusion,
}

impl TextureSlot {
    pub const COUNT: usize = 5;

    pub const ALL: [TextureSlot; Self::COUNT] = [
        TextureSlot::Color,
        TextureSlot::Normal,
        TextureSlot::Emissive,
        TextureSlot::MetallicRoughness,
        TextureSlot::Occlusion,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            TextureSlot::Color => "color",
            TextureSlot::Normal => "normal",
            TextureSlot::Emissive => "emissive",
            TextureSlot::MetallicRoughness => "metallic_roughness",
            TextureSlot::Occlusion => "occlusion",
        }
    }

    /// Fill of the default 1x1 texture. Normal and metallic-roughness are
    /// zero; the shaders gate the normal map on a flag and clamp roughness.
    pub fn default_color(self) -> [u8; 4] {
        match self {
            TextureSlot::Normal | TextureSlot::MetallicRoughness => [0, 0, 0, 0],
            TextureSlot::Color | TextureSlot::Emissive | TextureSlot::Occlusion => [255; 4],
        }
    }

    /// Color data is authored in sRGB, everything else is linear
    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            TextureSlot::Color | TextureSlot::Emissive => wgpu::TextureFormat::Rgba8UnormSrgb,
            _ => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    pub(crate) fn is_anisotropic(self) -> bool {
        matches!(
            self,
            TextureSlot::Color | TextureSlot::Normal | TextureSlot::MetallicRoughness
        )
    }
}

/// Scalar material factors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialFactors {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
    pub occlusion_strength: f32,
}

impl Default for MaterialFactors {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            metallic: 1.0,
            roughness: 1.0,
            emissive: [0.0, 0.0, 0.0],
            occlusion_strength: 1.0,
        }
    }
}

impl MaterialFactors {
    /// Dielectric surface of a flat color
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            base_color: [r, g, b, 1.0],
            metallic: 0.0,
            roughness: 0.8,
            ..Self::default()
        }
    }

    pub fn with_metallic_roughness(mut self, metallic: f32, roughness: f32) -> Self {
        self.metallic = metallic;
        self.roughness = roughness;
        self
    }

    pub fn with_emissive(mut self, emissive: [f32; 3]) -> Self {
        self.emissive = emissive;
        self
    }
}

/// What a caller supplies to [`Material::create`]; everything is optional
#[derive(Debug, Clone, Default)]
pub struct MaterialDesc {
    pub textures: HashMap<TextureSlot, Arc<GpuTexture>>,
    pub samplers: HashMap<TextureSlot, Arc<wgpu::Sampler>>,
    pub uniform_buffers: Vec<Arc<wgpu::Buffer>>,
    pub factors: Option<MaterialFactors>,
}

impl MaterialDesc {
    pub fn with_texture(mut self, slot: TextureSlot, texture: Arc<GpuTexture>) -> Self {
        self.textures.insert(slot, texture);
        self
    }

    pub fn with_sampler(mut self, slot: TextureSlot, sampler: Arc<wgpu::Sampler>) -> Self {
        self.samplers.insert(slot, sampler);
        self
    }

    pub fn with_uniform_buffer(mut self, buffer: Arc<wgpu::Buffer>) -> Self {
        self.uniform_buffers.push(buffer);
        self
    }

    pub fn with_factors(mut self, factors: MaterialFactors) -> Self {
        self.factors = Some(factors);
        self
    }
}

/// Per-renderable bundle of GPU resources bound with a pipeline
///
/// Uniform slot 0 is the camera/transform uniform. When the material has
/// semantic slots, textures and samplers `0..5` follow [`TextureSlot::ALL`]
/// and any extras come after them.
#[derive(Debug, Clone)]
pub struct Material {
    pipeline: Arc<PipelineState>,
    uniform_buffers: Vec<Arc<wgpu::Buffer>>,
    textures: Vec<Arc<GpuTexture>>,
    samplers: Vec<Arc<wgpu::Sampler>>,
    semantic_slots: bool,
    provided: [bool; TextureSlot::COUNT],
    factors: MaterialFactors,
}

impl Material {
    /// Merge `desc` over the defaults so every semantic slot resolves
    pub fn create(
        pipeline: Arc<PipelineState>,
        desc: MaterialDesc,
        defaults: &ResourceDefaults,
    ) -> Self {
        let resources = defaults.get();
        let provided = TextureSlot::ALL.map(|slot| desc.textures.contains_key(&slot));

        let textures = TextureSlot::ALL
            .iter()
            .map(|slot| {
                desc.textures
                    .get(slot)
                    .unwrap_or_else(|| resources.texture(*slot))
                    .clone()
            })
            .collect();
        let samplers = TextureSlot::ALL
            .iter()
            .map(|slot| {
                desc.samplers
                    .get(slot)
                    .unwrap_or_else(|| resources.sampler(*slot))
                    .clone()
            })
            .collect();

        debug!(
            pipeline = pipeline.id(),
            provided = ?provided,
            "Created material"
        );

        Self {
            pipeline,
            uniform_buffers: desc.uniform_buffers,
            textures,
            samplers,
            semantic_slots: true,
            provided,
            factors: desc.factors.unwrap_or_default(),
        }
    }

    /// Material without semantic slots, bound exactly as given
    pub fn raw(
        pipeline: Arc<PipelineState>,
        uniform_buffers: Vec<Arc<wgpu::Buffer>>,
        textures: Vec<Arc<GpuTexture>>,
        samplers: Vec<Arc<wgpu::Sampler>>,
    ) -> Self {
        Self {
            pipeline,
            uniform_buffers,
            textures,
            samplers,
            semantic_slots: false,
            provided: [false; TextureSlot::COUNT],
            factors: MaterialFactors::default(),
        }
    }

    pub fn pipeline(&self) -> &Arc<PipelineState> {
        &self.pipeline
    }

    pub fn has_semantic_slots(&self) -> bool {
        self.semantic_slots
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<&Arc<GpuTexture>> {
        self.semantic_slots
            .then(|| self.textures.get(slot.index()))
            .flatten()
    }

    pub fn sampler(&self, slot: TextureSlot) -> Option<&Arc<wgpu::Sampler>> {
        self.semantic_slots
            .then(|| self.samplers.get(slot.index()))
            .flatten()
    }

    /// Whether the slot holds a real texture rather than a default
    pub fn is_provided(&self, slot: TextureSlot) -> bool {
        self.provided[slot.index()]
    }

    pub fn textures(&self) -> &[Arc<GpuTexture>] {
        &self.textures
    }

    pub fn samplers(&self) -> &[Arc<wgpu::Sampler>] {
        &self.samplers
    }

    pub fn uniform_buffers(&self) -> &[Arc<wgpu::Buffer>] {
        &self.uniform_buffers
    }

    pub fn uniform_buffer(&self, slot: usize) -> Option<&Arc<wgpu::Buffer>> {
        self.uniform_buffers.get(slot)
    }

    pub fn factors(&self) -> &MaterialFactors {
        &self.factors
    }

    pub fn set_factors(&mut self, factors: MaterialFactors) {
        self.factors = factors;
    }

    pub fn swap_pipeline(&mut self, pipeline: Arc<PipelineState>) -> Arc<PipelineState> {
        std::mem::replace(&mut self.pipeline, pipeline)
    }

    pub fn swap_textures(&mut self, textures: Vec<Arc<GpuTexture>>) -> Vec<Arc<GpuTexture>> {
        std::mem::replace(&mut self.textures, textures)
    }

    pub fn swap_samplers(&mut self, samplers: Vec<Arc<wgpu::Sampler>>) -> Vec<Arc<wgpu::Sampler>> {
        std::mem::replace(&mut self.samplers, samplers)
    }

    pub fn swap_uniform_buffers(
        &mut self,
        buffers: Vec<Arc<wgpu::Buffer>>,
    ) -> Vec<Arc<wgpu::Buffer>> {
        std::mem::replace(&mut self.uniform_buffers, buffers)
    }

    /// Replace one semantic texture, returning the previous one
    pub fn swap_texture(
        &mut self,
        slot: TextureSlot,
        texture: Arc<GpuTexture>,
    ) -> Option<Arc<GpuTexture>> {
        if !self.semantic_slots {
            return None;
        }
        let current = self.textures.get_mut(slot.index())?;
        Some(std::mem::replace(current, texture))
    }

    /// Replace one semantic sampler, returning the previous one
    pub fn swap_sampler(
        &mut self,
        slot: TextureSlot,
        sampler: Arc<wgpu::Sampler>,
    ) -> Option<Arc<wgpu::Sampler>> {
        if !self.semantic_slots {
            return None;
        }
        let current = self.samplers.get_mut(slot.index())?;
        Some(std::mem::replace(current, sampler))
    }

    /// Borrowed view in uniforms → textures → samplers order
    pub fn bindings(&self) -> BindingSet<'_> {
        BindingSet {
            uniforms: self.uniform_buffers.iter().map(|b| b.as_ref()).collect(),
            textures: self.textures.iter().map(|t| &t.view).collect(),
            samplers: self.samplers.iter().map(|s| s.as_ref()).collect(),
        }
    }
}

/// Two materials are equal when they reference the same GPU objects
impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        fn same<T>(a: &[Arc<T>], b: &[Arc<T>]) -> bool {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
        }

        Arc::ptr_eq(&self.pipeline, &other.pipeline)
            && same(&self.uniform_buffers, &other.uniform_buffers)
            && same(&self.textures, &other.textures)
            && same(&self.samplers, &other.samplers)
            && self.semantic_slots == other.semantic_slots
            && self.provided == other.provided
            && self.factors == other.factors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_order_is_canonical() {
        let names: Vec<&str> = TextureSlot::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "color",
                "normal",
                "emissive",
                "metallic_roughness",
                "occlusion"
            ]
        );
        for (index, slot) in TextureSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), index);
        }
    }

    #[test]
    fn test_default_colors() {
        assert_eq!(TextureSlot::Color.default_color(), [255; 4]);
        assert_eq!(TextureSlot::Occlusion.default_color(), [255; 4]);
        assert_eq!(TextureSlot::Emissive.default_color(), [255; 4]);
        assert_eq!(TextureSlot::MetallicRoughness.default_color(), [0; 4]);
        assert_eq!(TextureSlot::Normal.default_color(), [0; 4]);
    }

    #[test]
    fn test_default_factors() {
        let factors = MaterialFactors::default();
        assert_eq!(factors.base_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(factors.metallic, 1.0);
        assert_eq!(factors.roughness, 1.0);
        assert_eq!(factors.emissive, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_factor_presets() {
        let red = MaterialFactors::from_rgb(1.0, 0.0, 0.0).with_emissive([0.5, 0.0, 0.0]);
        assert_eq!(red.base_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(red.metallic, 0.0);
        assert_eq!(red.emissive, [0.5, 0.0, 0.0]);
    }
}
