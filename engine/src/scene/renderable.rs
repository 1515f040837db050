//! Capabilities of things the renderer draws
//!
//! Everything with a model matrix is a [`Placement`]. Meshes add a buffer
//! set and a material ([`Renderable`]); lights add a depth target and a
//! projection-view uniform ([`LightSource`]).

use crate::config::ShadowConfig;
use crate::core::{Camera, Transform};
use crate::error::RenderError;
use crate::graphics::bindings::BindingSet;
use crate::graphics::buffer_set::BufferSet;
use crate::graphics::defaults::ResourceDefaults;
use crate::graphics::material::{Material, MaterialDesc, TextureSlot};
use crate::graphics::mesh::MeshData;
use crate::graphics::pipeline::PipelineState;
use crate::graphics::texture::GpuTexture;
use crate::graphics::uniform::{CameraUniform, MaterialFlags, MaterialUniform, UniformBuffer};
use crate::graphics::vertex_layout::attribute;
use glam::{Mat4, Vec3};
use std::sync::Arc;
use tracing::debug;

/// Which pass draws a renderable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Written into the G-buffer and lit by the composite pass
    #[default]
    Deferred,
    /// Drawn with its own pipeline after the composite quad
    Forward,
}

pub trait Placement {
    fn transform(&self) -> &Transform;

    fn transform_mut(&mut self) -> &mut Transform;

    fn model_matrix(&self) -> Mat4 {
        self.transform().matrix()
    }

    fn set_translation(&mut self, translation: Vec3) {
        self.transform_mut().translation = translation;
    }

    fn set_rotation_degrees(&mut self, degrees: Vec3) {
        self.transform_mut().rotation_degrees = degrees;
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.transform_mut().scale = scale;
    }

    fn set_origin(&mut self, origin: Vec3) {
        self.transform_mut().origin = origin;
    }
}

pub trait Renderable: Placement {
    fn id(&self) -> &str;

    fn buffers(&self) -> &BufferSet;

    fn material(&self) -> &Material;

    /// Replace the material, returning the previous one
    fn swap_material(&mut self, material: Material) -> Material;

    /// Camera/transform uniform, always uniform slot 0 of the material
    fn camera_buffer(&self) -> &wgpu::Buffer;

    fn cast_shadows(&self) -> bool;

    fn receive_shadows(&self) -> bool;

    fn mode(&self) -> RenderMode;

    fn bindings(&self) -> BindingSet<'_> {
        self.material().bindings()
    }

    /// Write the camera uniform for this renderable's model matrix
    fn write_camera(&self, queue: &wgpu::Queue, camera: &Camera) {
        let model = self.model_matrix();
        CameraUniform::new(camera.projection(), camera.view(), model, camera.position())
            .update_buffer(queue, self.camera_buffer());
    }

    /// Run `f` with `material` swapped in, restoring the original after
    fn with_material<R>(&mut self, material: Material, f: impl FnOnce(&Self) -> R) -> (R, Material)
    where
        Self: Sized,
    {
        let original = self.swap_material(material);
        let result = f(self);
        let substitute = self.swap_material(original);
        (result, substitute)
    }
}

pub trait LightSource: Placement {
    fn id(&self) -> &str;

    /// Unit vector from the scene towards the light
    fn direction(&self) -> Vec3;

    /// Depth-only pipeline used to render shadow casters
    fn pipeline(&self) -> &Arc<PipelineState>;

    fn depth_texture(&self) -> &GpuTexture;

    fn projection_view_buffer(&self) -> &wgpu::Buffer;

    fn comparison_sampler(&self) -> &wgpu::Sampler;

    /// Projection-view computed by the last [`update`](Self::update)
    fn projection_view(&self) -> Mat4;

    /// Refit to `camera` and upload the new projection-view
    fn update(&mut self, queue: &wgpu::Queue, camera: &Camera, shadow: &ShadowConfig) -> Mat4;
}

/// A mesh primitive uploaded to the GPU
pub struct MeshRenderable {
    id: String,
    transform: Transform,
    material: Material,
    buffers: BufferSet,
    camera_buffer: Arc<wgpu::Buffer>,
    cast_shadows: bool,
    receive_shadows: bool,
    mode: RenderMode,
}

impl MeshRenderable {
    /// Wrap already uploaded resources
    ///
    /// A material without uniforms gets a fresh camera uniform in slot 0.
    pub fn new(
        device: &wgpu::Device,
        id: impl Into<String>,
        buffers: BufferSet,
        mut material: Material,
        mode: RenderMode,
    ) -> Self {
        let id = id.into();
        let camera_buffer = match material.uniform_buffer(0) {
            Some(buffer) => buffer.clone(),
            None => {
                let buffer = Arc::new(camera_uniform_buffer(device, &id));
                material.swap_uniform_buffers(vec![buffer.clone()]);
                buffer
            }
        };
        Self {
            id,
            transform: Transform::default(),
            material,
            buffers,
            camera_buffer,
            cast_shadows: true,
            receive_shadows: true,
            mode,
        }
    }

    /// Upload `mesh` and build its material over `pipeline`
    ///
    /// Uniform slot 0 is the camera uniform, slot 1 the material factors.
    pub fn from_mesh_data(
        defaults: &ResourceDefaults,
        pipeline: Arc<PipelineState>,
        mesh: &MeshData,
        mode: RenderMode,
    ) -> Result<Self, RenderError> {
        let buffers = BufferSet::from_mesh_data(mesh, defaults)?;
        let device = defaults.device();
        let queue = defaults.queue();

        let mut desc = MaterialDesc::default().with_factors(mesh.factors);
        for slot in TextureSlot::ALL {
            if let Some(image) = mesh.images.get(&slot).filter(|image| image.is_valid()) {
                let texture = GpuTexture::from_image(
                    device,
                    queue,
                    &format!("{} {} Texture", mesh.id, slot.name()),
                    image,
                    slot.texture_format(),
                );
                desc = desc.with_texture(slot, Arc::new(texture));
            }
            if let Some(spec) = mesh.samplers.get(&slot) {
                let sampler =
                    spec.create_sampler(device, &format!("{} {} Sampler", mesh.id, slot.name()));
                desc = desc.with_sampler(slot, Arc::new(sampler));
            }
        }

        let camera_buffer = Arc::new(camera_uniform_buffer(device, &mesh.id));
        let flags = MaterialFlags {
            normal_map: desc.textures.contains_key(&TextureSlot::Normal),
            metallic_roughness_map: desc.textures.contains_key(&TextureSlot::MetallicRoughness),
            tangents: buffers.has_attribute(attribute::TANGENT),
            tex_coords: buffers.has_attribute(attribute::TEX_COORD),
            receive_shadows: true,
        };
        let material_buffer = Arc::new(
            MaterialUniform::new(&mesh.factors, flags)
                .create_buffer(device, Some(&format!("{} Material Uniform", mesh.id))),
        );
        desc = desc
            .with_uniform_buffer(camera_buffer.clone())
            .with_uniform_buffer(material_buffer);

        let material = Material::create(pipeline, desc, defaults);
        debug!(renderable = %mesh.id, ?mode, "Created renderable");

        Ok(Self {
            id: mesh.id.clone(),
            transform: Transform::default(),
            material,
            buffers,
            camera_buffer,
            cast_shadows: true,
            receive_shadows: true,
            mode,
        })
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn set_cast_shadows(&mut self, cast: bool) {
        self.cast_shadows = cast;
    }

    /// Toggle shadow reception, rewriting the material flags when known
    pub fn set_receive_shadows(&mut self, queue: &wgpu::Queue, receive: bool) {
        self.receive_shadows = receive;
        if let Some(buffer) = self.material.uniform_buffer(1) {
            let flags = MaterialFlags {
                normal_map: self.material.is_provided(TextureSlot::Normal),
                metallic_roughness_map: self.material.is_provided(TextureSlot::MetallicRoughness),
                tangents: self.buffers.has_attribute(attribute::TANGENT),
                tex_coords: self.buffers.has_attribute(attribute::TEX_COORD),
                receive_shadows: receive,
            };
            MaterialUniform::new(self.material.factors(), flags).update_buffer(queue, buffer);
        }
    }
}

fn camera_uniform_buffer(device: &wgpu::Device, id: &str) -> wgpu::Buffer {
    CameraUniform::default().create_buffer(device, Some(&format!("{id} Camera Uniform")))
}

impl Placement for MeshRenderable {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

impl Renderable for MeshRenderable {
    fn id(&self) -> &str {
        &self.id
    }

    fn buffers(&self) -> &BufferSet {
        &self.buffers
    }

    fn material(&self) -> &Material {
        &self.material
    }

    fn swap_material(&mut self, material: Material) -> Material {
        std::mem::replace(&mut self.material, material)
    }

    fn camera_buffer(&self) -> &wgpu::Buffer {
        &self.camera_buffer
    }

    fn cast_shadows(&self) -> bool {
        self.cast_shadows
    }

    fn receive_shadows(&self) -> bool {
        self.receive_shadows
    }

    fn mode(&self) -> RenderMode {
        self.mode
    }
}
