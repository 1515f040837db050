//! Geometry buffer for deferred shading
//!
//! Eight `Rgba16Float` color targets plus a depth target, all sized to the
//! output. Reallocated as a whole on resize.

use crate::graphics::pipeline::DEPTH_FORMAT;
use crate::graphics::texture::GpuTexture;
use std::sync::Arc;
use tracing::info;

pub const GBUFFER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Color targets in shader output order
pub const GBUFFER_TARGETS: [&str; 8] = [
    "albedo",
    "emissive",
    "ao_metallic_roughness",
    "normal",
    "world_position",
    "bitangent",
    "vertex_normal",
    "tangent",
];

/// Bytes per sample across all color targets
pub const GBUFFER_BYTES_PER_SAMPLE: u32 = 8 * GBUFFER_TARGETS.len() as u32;

pub struct GBuffer {
    targets: Vec<Arc<GpuTexture>>,
    depth: Arc<GpuTexture>,
    size: (u32, u32),
}

impl GBuffer {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        info!(width, height, "Allocating G-buffer");

        let targets = GBUFFER_TARGETS
            .iter()
            .map(|name| {
                Arc::new(GpuTexture::new_2d(
                    device,
                    &format!("G-buffer {name}"),
                    width,
                    height,
                    GBUFFER_FORMAT,
                    wgpu::TextureUsages::RENDER_ATTACHMENT
                        | wgpu::TextureUsages::TEXTURE_BINDING
                        | wgpu::TextureUsages::COPY_SRC,
                ))
            })
            .collect();

        let depth = Arc::new(GpuTexture::depth(
            device,
            "G-buffer Depth",
            width,
            height,
            DEPTH_FORMAT,
        ));

        Self {
            targets,
            depth,
            size: (width, height),
        }
    }

    /// Destroy every target and allocate new ones at the given size
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.destroy();
        *self = Self::new(device, width, height);
    }

    pub fn destroy(&self) {
        for target in &self.targets {
            target.destroy();
        }
        self.depth.destroy();
    }

    pub fn targets(&self) -> &[Arc<GpuTexture>] {
        &self.targets
    }

    pub fn depth(&self) -> &Arc<GpuTexture> {
        &self.depth
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Color target states for the G-buffer pipeline
    pub fn color_target_states() -> Vec<wgpu::ColorTargetState> {
        GBUFFER_TARGETS
            .iter()
            .map(|_| wgpu::ColorTargetState {
                format: GBUFFER_FORMAT,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })
            .collect()
    }

    /// Textures the lighting resolve samples: every color target, then depth
    pub fn resolve_textures(&self) -> impl Iterator<Item = &GpuTexture> {
        self.targets
            .iter()
            .chain(std::iter::once(&self.depth))
            .map(|texture| texture.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_layout() {
        assert_eq!(GBUFFER_TARGETS.len(), 8);
        assert_eq!(GBUFFER_BYTES_PER_SAMPLE, 64);
        let states = GBuffer::color_target_states();
        assert_eq!(states.len(), 8);
        assert!(states.iter().all(|s| s.format == GBUFFER_FORMAT));
    }
}
