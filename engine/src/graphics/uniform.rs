//! GPU uniform buffer types
//!
//! Provides uniform buffer structures that match the WGSL shader definitions.
//! These structures are used to pass data from the CPU to the GPU.

use crate::graphics::material::MaterialFactors;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Per-draw camera and transform data
///
/// Matches the `Camera` struct shared by every shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    /// Inverse-transpose of the model matrix
    pub normal_matrix: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
}

impl CameraUniform {
    pub fn new(projection: Mat4, view: Mat4, model: Mat4, camera_position: Vec3) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
            camera_position: camera_position.extend(1.0).to_array(),
        }
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, Mat4::IDENTITY, Vec3::ZERO)
    }
}

/// Light parameters used by the lighting resolve and forward shading
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable, PartialEq)]
pub struct LightUniform {
    pub position: [f32; 4],
    pub color: [f32; 4],
    /// intensity, radius, shadows enabled (0 or 1), unused
    pub intensity_radius: [f32; 4],
    /// Direction pointing towards the light
    pub direction: [f32; 4],
}

/// Material factors plus texture presence flags
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable, PartialEq)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub emissive: [f32; 4],
    /// metallic, roughness, occlusion strength, metallic-roughness map present
    pub mroz: [f32; 4],
    /// normal map, tangents, tex coords, receive shadows
    pub flags: [u32; 4],
}

/// Which optional inputs a material can rely on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaterialFlags {
    pub normal_map: bool,
    pub metallic_roughness_map: bool,
    pub tangents: bool,
    pub tex_coords: bool,
    pub receive_shadows: bool,
}

impl MaterialUniform {
    pub fn new(factors: &MaterialFactors, flags: MaterialFlags) -> Self {
        let [er, eg, eb] = factors.emissive;
        Self {
            base_color: factors.base_color,
            emissive: [er, eg, eb, 0.0],
            mroz: [
                factors.metallic,
                factors.roughness,
                factors.occlusion_strength,
                if flags.metallic_roughness_map { 1.0 } else { 0.0 },
            ],
            flags: [
                flags.normal_map as u32,
                flags.tangents as u32,
                flags.tex_coords as u32,
                flags.receive_shadows as u32,
            ],
        }
    }
}

/// Settings of the deferred lighting resolve
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable, Default, PartialEq)]
pub struct ResolveSettingsUniform {
    pub debug_view: u32,
    pub _padding: [u32; 3],
}

/// Light projection-view matrix used for shadow mapping
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct LightProjectionUniform {
    pub projection_view: [[f32; 4]; 4],
}

impl LightProjectionUniform {
    pub fn new(projection_view: Mat4) -> Self {
        Self {
            projection_view: projection_view.to_cols_array_2d(),
        }
    }
}

impl Default for LightProjectionUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

/// Helper trait for creating GPU buffers from uniform types
pub trait UniformBuffer: Pod {
    /// Create a GPU buffer containing this uniform data
    fn create_buffer(&self, device: &wgpu::Device, label: Option<&str>) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;

        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label,
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    /// Update an existing buffer with new data
    fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}

impl UniformBuffer for CameraUniform {}
impl UniformBuffer for LightUniform {}
impl UniformBuffer for MaterialUniform {}
impl UniformBuffer for ResolveSettingsUniform {}
impl UniformBuffer for LightProjectionUniform {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn test_uniform_sizes_match_shader_layouts() {
        assert_eq!(mem::size_of::<CameraUniform>(), 272);
        assert_eq!(mem::size_of::<LightUniform>(), 64);
        assert_eq!(mem::size_of::<MaterialUniform>(), 64);
        assert_eq!(mem::size_of::<ResolveSettingsUniform>(), 16);
        assert_eq!(mem::size_of::<LightProjectionUniform>(), 64);
    }

    #[test]
    fn test_normal_matrix_is_inverse_transpose() {
        let model = Mat4::from_scale(Vec3::new(2.0, 4.0, 1.0));
        let uniform = CameraUniform::new(Mat4::IDENTITY, Mat4::IDENTITY, model, Vec3::ZERO);
        let normal = Mat4::from_cols_array_2d(&uniform.normal_matrix);

        assert!((normal.x_axis.x - 0.5).abs() < 1e-6);
        assert!((normal.y_axis.y - 0.25).abs() < 1e-6);
        assert!((normal.z_axis.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_camera_position_is_homogeneous() {
        let uniform = CameraUniform::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::new(1.0, 2.0, 3.0),
        );
        assert_eq!(uniform.camera_position, [1.0, 2.0, 3.0, 1.0]);
    }

    #[test]
    fn test_material_uniform_packing() {
        let factors = MaterialFactors::default().with_metallic_roughness(0.25, 0.75);
        let flags = MaterialFlags {
            normal_map: true,
            receive_shadows: true,
            ..MaterialFlags::default()
        };
        let uniform = MaterialUniform::new(&factors, flags);

        assert_eq!(uniform.mroz, [0.25, 0.75, 1.0, 0.0]);
        assert_eq!(uniform.flags, [1, 0, 0, 1]);

        let mapped = MaterialUniform::new(
            &factors,
            MaterialFlags {
                metallic_roughness_map: true,
                ..flags
            },
        );
        assert_eq!(mapped.mroz[3], 1.0);
        assert_eq!(mapped.flags, uniform.flags);
    }
}
