//! Directional light with a fitted shadow map

use crate::config::ShadowConfig;
use crate::core::{Camera, Transform};
use crate::error::RenderError;
use crate::graphics::pipeline::PipelineState;
use crate::graphics::texture::{create_comparison_sampler, GpuTexture};
use crate::graphics::uniform::{LightProjectionUniform, LightUniform, UniformBuffer};
use crate::scene::renderable::{LightSource, Placement};
use crate::scene::shadow::fit_light_to_frustum;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Format of every shadow depth target
pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Light parameters the composite and forward shaders read
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSettings {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
    pub radius: f32,
}

impl Default for LightSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 28.0, 161.0],
            color: [1.0, 1.0, 1.0],
            intensity: 0.5,
            radius: 1000.0,
        }
    }
}

impl LightSettings {
    /// Pack into the shader layout; `direction` points towards the light
    pub fn to_uniform(&self, direction: Vec3, shadows_enabled: bool) -> LightUniform {
        let [x, y, z] = self.position;
        let [r, g, b] = self.color;
        LightUniform {
            position: [x, y, z, 1.0],
            color: [r, g, b, 1.0],
            intensity_radius: [
                self.intensity,
                self.radius,
                if shadows_enabled { 1.0 } else { 0.0 },
                0.0,
            ],
            direction: direction.normalize_or_zero().extend(0.0).to_array(),
        }
    }
}

pub struct DirectionalLight {
    id: String,
    transform: Transform,
    direction: Vec3,
    pipeline: Arc<PipelineState>,
    depth_texture: GpuTexture,
    projection_view: Mat4,
    projection_view_buffer: wgpu::Buffer,
    comparison_sampler: wgpu::Sampler,
}

impl DirectionalLight {
    /// Allocate the shadow map and its uniforms
    ///
    /// `pipeline` must be a depth-only pipeline targeting [`SHADOW_FORMAT`].
    pub fn new(
        device: &wgpu::Device,
        id: impl Into<String>,
        direction: Vec3,
        pipeline: Arc<PipelineState>,
        shadow: &ShadowConfig,
    ) -> Result<Self, RenderError> {
        let id = id.into();
        let max_size = device.limits().max_texture_dimension_2d;
        if shadow.map_size == 0 || shadow.map_size > max_size {
            return Err(RenderError::UnsupportedLimit {
                name: "max_texture_dimension_2d",
                available: max_size,
                required: shadow.map_size,
            });
        }

        let depth_texture = GpuTexture::depth(
            device,
            &format!("{id} Shadow Map"),
            shadow.map_size,
            shadow.map_size,
            SHADOW_FORMAT,
        );
        let projection_view_buffer = LightProjectionUniform::default()
            .create_buffer(device, Some(&format!("{id} Projection View Uniform")));
        let comparison_sampler =
            create_comparison_sampler(device, &format!("{id} Shadow Sampler"));

        info!(light = %id, map_size = shadow.map_size, "Created directional light");

        Ok(Self {
            id,
            transform: Transform::default(),
            direction: direction.try_normalize().unwrap_or(Vec3::Y),
            pipeline,
            depth_texture,
            projection_view: Mat4::IDENTITY,
            projection_view_buffer,
            comparison_sampler,
        })
    }

    pub fn set_direction(&mut self, direction: Vec3) {
        if let Some(direction) = direction.try_normalize() {
            self.direction = direction;
        }
    }
}

impl Placement for DirectionalLight {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

impl LightSource for DirectionalLight {
    fn id(&self) -> &str {
        &self.id
    }

    fn direction(&self) -> Vec3 {
        self.direction
    }

    fn pipeline(&self) -> &Arc<PipelineState> {
        &self.pipeline
    }

    fn depth_texture(&self) -> &GpuTexture {
        &self.depth_texture
    }

    fn projection_view_buffer(&self) -> &wgpu::Buffer {
        &self.projection_view_buffer
    }

    fn comparison_sampler(&self) -> &wgpu::Sampler {
        &self.comparison_sampler
    }

    fn projection_view(&self) -> Mat4 {
        self.projection_view
    }

    fn update(&mut self, queue: &wgpu::Queue, camera: &Camera, shadow: &ShadowConfig) -> Mat4 {
        let fit = fit_light_to_frustum(
            camera.view(),
            camera.fov(),
            camera.aspect(),
            shadow.near,
            shadow.far,
            self.direction,
            shadow.z_multiplier,
        );
        self.projection_view = fit.projection_view();
        LightProjectionUniform::new(self.projection_view)
            .update_buffer(queue, &self.projection_view_buffer);

        debug!(
            light = %self.id,
            center = ?fit.center,
            min = ?fit.bounds_min,
            max = ?fit.bounds_max,
            "Fitted shadow frustum"
        );
        self.projection_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_uniform_packing() {
        let settings = LightSettings {
            intensity: 2.0,
            radius: 50.0,
            ..LightSettings::default()
        };
        let uniform = settings.to_uniform(Vec3::new(0.0, 2.0, 0.0), true);
        assert_eq!(uniform.position, [0.0, 28.0, 161.0, 1.0]);
        assert_eq!(uniform.intensity_radius, [2.0, 50.0, 1.0, 0.0]);
        assert_eq!(uniform.direction, [0.0, 1.0, 0.0, 0.0]);

        let unshadowed = settings.to_uniform(Vec3::Y, false);
        assert_eq!(unshadowed.intensity_radius[2], 0.0);
    }
}
