//! Fallback GPU resources for absent material and vertex data
//!
//! Every material is bound with the same pipeline layout, so slots a mesh
//! does not provide are filled with neutral 1x1 textures, linear samplers and
//! one-vertex zero buffers. The set is created once per device on first use
//! and read-only afterwards.

use crate::graphics::material::TextureSlot;
use crate::graphics::texture::{GpuTexture, SamplerSpec};
use crate::graphics::vertex_layout::attribute;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::info;
use wgpu::util::DeviceExt;

/// Context object owning the lazily created default resources of a device
pub struct ResourceDefaults {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    resources: OnceCell<DefaultResources>,
}

/// The default resources themselves
pub struct DefaultResources {
    textures: [Arc<GpuTexture>; TextureSlot::COUNT],
    samplers: [Arc<wgpu::Sampler>; TextureSlot::COUNT],
    position: Arc<wgpu::Buffer>,
    tex_coord: Arc<wgpu::Buffer>,
    normal: Arc<wgpu::Buffer>,
    tangent: Arc<wgpu::Buffer>,
}

impl ResourceDefaults {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            resources: OnceCell::new(),
        }
    }

    /// Returns the defaults, creating them on the first call
    pub fn get(&self) -> &DefaultResources {
        self.resources
            .get_or_init(|| DefaultResources::create(&self.device, &self.queue))
    }

    pub fn is_initialized(&self) -> bool {
        self.resources.get().is_some()
    }

    pub fn device(&self) -> &Arc<wgpu::Device> {
        &self.device
    }

    pub fn queue(&self) -> &Arc<wgpu::Queue> {
        &self.queue
    }
}

impl DefaultResources {
    fn create(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        info!("Creating default material and vertex resources");

        let textures = TextureSlot::ALL.map(|slot| {
            Arc::new(GpuTexture::solid(
                device,
                queue,
                &format!("Default {} Texture", slot.name()),
                slot.default_color(),
            ))
        });

        let samplers = TextureSlot::ALL.map(|slot| {
            let spec = if slot.is_anisotropic() {
                SamplerSpec::anisotropic(16)
            } else {
                SamplerSpec::default()
            };
            Arc::new(spec.create_sampler(device, &format!("Default {} Sampler", slot.name())))
        });

        Self {
            textures,
            samplers,
            position: zero_buffer(device, attribute::POSITION, 3),
            tex_coord: zero_buffer(device, attribute::TEX_COORD, 2),
            normal: zero_buffer(device, attribute::NORMAL, 3),
            tangent: zero_buffer(device, attribute::TANGENT, 4),
        }
    }

    pub fn texture(&self, slot: TextureSlot) -> &Arc<GpuTexture> {
        &self.textures[slot.index()]
    }

    pub fn sampler(&self, slot: TextureSlot) -> &Arc<wgpu::Sampler> {
        &self.samplers[slot.index()]
    }

    /// Zero buffer for a canonical vertex attribute
    pub fn vertex_buffer(&self, name: &str) -> Option<&Arc<wgpu::Buffer>> {
        match name {
            attribute::POSITION => Some(&self.position),
            attribute::TEX_COORD => Some(&self.tex_coord),
            attribute::NORMAL => Some(&self.normal),
            attribute::TANGENT => Some(&self.tangent),
            _ => None,
        }
    }
}

/// One vertex worth of zeroed floats
fn zero_buffer(device: &wgpu::Device, name: &str, components: usize) -> Arc<wgpu::Buffer> {
    let zeros = vec![0.0f32; components];
    Arc::new(
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("Default {name} Buffer")),
            contents: bytemuck::cast_slice(&zeros),
            usage: wgpu::BufferUsages::VERTEX,
        }),
    )
}
