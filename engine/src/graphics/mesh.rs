//! Mesh data handed to the renderer and primitive generators
//!
//! [`MeshData`] is the loader hand-off: flat attribute arrays, 32-bit
//! indices, optional decoded images and material factors. The generators
//! produce the same shape for common shapes like cubes, spheres and planes.

use crate::error::RenderError;
use crate::graphics::material::{MaterialFactors, TextureSlot};
use crate::graphics::texture::{ImageData, SamplerSpec};
use glam::{Vec2, Vec3};
use std::collections::HashMap;

/// One mesh primitive as produced by an asset loader
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub id: String,
    /// xyz triples
    pub positions: Vec<f32>,
    pub indices: Vec<u32>,
    /// xyz triples
    pub normals: Option<Vec<f32>>,
    /// xyzw quadruples, w is the bitangent sign
    pub tangents: Option<Vec<f32>>,
    /// uv pairs
    pub tex_coords: Option<Vec<f32>>,
    pub images: HashMap<TextureSlot, ImageData>,
    pub samplers: HashMap<TextureSlot, SamplerSpec>,
    pub factors: MaterialFactors,
    pub double_sided: bool,
}

impl MeshData {
    pub fn new(id: impl Into<String>, positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self {
            id: id.into(),
            positions,
            indices,
            ..Self::default()
        }
    }

    pub fn with_factors(mut self, factors: MaterialFactors) -> Self {
        self.factors = factors;
        self
    }

    pub fn with_image(mut self, slot: TextureSlot, image: ImageData) -> Self {
        self.images.insert(slot, image);
        self
    }

    pub fn with_sampler(mut self, slot: TextureSlot, sampler: SamplerSpec) -> Self {
        self.samplers.insert(slot, sampler);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Check array sizes and index bounds
    pub fn validate(&self) -> Result<(), RenderError> {
        let invalid = |reason: String| RenderError::InvalidMesh {
            id: self.id.clone(),
            reason,
        };

        if self.positions.is_empty() || self.positions.len() % 3 != 0 {
            return Err(invalid(format!(
                "position array length {} is not a non-zero multiple of 3",
                self.positions.len()
            )));
        }
        if self.indices.is_empty() {
            return Err(invalid("index array is empty".to_string()));
        }

        let vertices = self.vertex_count();
        if let Some(index) = self.indices.iter().find(|&&i| i as usize >= vertices) {
            return Err(invalid(format!(
                "index {index} out of range for {vertices} vertices"
            )));
        }

        for (name, data, components) in [
            ("normal", &self.normals, 3),
            ("tangent", &self.tangents, 4),
            ("tex_coord", &self.tex_coords, 2),
        ] {
            if let Some(data) = data {
                if data.len() != vertices * components {
                    return Err(invalid(format!(
                        "{name} array has {} values, expected {}",
                        data.len(),
                        vertices * components
                    )));
                }
            }
        }

        if let Some((slot, _)) = self.images.iter().find(|(_, image)| !image.is_valid()) {
            return Err(invalid(format!(
                "{} image size does not match its pixel data",
                slot.name()
            )));
        }

        Ok(())
    }

    /// Derive per-vertex tangents from normals and texture coordinates
    ///
    /// The mesh is validated first. Does nothing when either input is
    /// missing.
    pub fn generate_tangents(&mut self) -> Result<(), RenderError> {
        self.validate()?;
        self.compute_tangents();
        Ok(())
    }

    /// Tangent derivation proper; indices must already be in range
    fn compute_tangents(&mut self) {
        let (Some(normals), Some(tex_coords)) = (&self.normals, &self.tex_coords) else {
            return;
        };

        let vertices = self.vertex_count();
        let position = |i: usize| Vec3::from_slice(&self.positions[i * 3..i * 3 + 3]);
        let uv = |i: usize| Vec2::from_slice(&tex_coords[i * 2..i * 2 + 2]);

        let mut tangents = vec![Vec3::ZERO; vertices];
        let mut bitangents = vec![Vec3::ZERO; vertices];

        for triangle in self.indices.chunks_exact(3) {
            let [a, b, c] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            let edge1 = position(b) - position(a);
            let edge2 = position(c) - position(a);
            let duv1 = uv(b) - uv(a);
            let duv2 = uv(c) - uv(a);

            let det = duv1.x * duv2.y - duv2.x * duv1.y;
            if det.abs() < f32::EPSILON {
                continue;
            }
            let r = 1.0 / det;
            let tangent = (edge1 * duv2.y - edge2 * duv1.y) * r;
            let bitangent = (edge2 * duv1.x - edge1 * duv2.x) * r;

            for vertex in [a, b, c] {
                tangents[vertex] += tangent;
                bitangents[vertex] += bitangent;
            }
        }

        let mut packed = Vec::with_capacity(vertices * 4);
        for vertex in 0..vertices {
            let normal = Vec3::from_slice(&normals[vertex * 3..vertex * 3 + 3]);
            // Gram-Schmidt against the normal
            let tangent = (tangents[vertex] - normal * normal.dot(tangents[vertex]))
                .try_normalize()
                .unwrap_or_else(|| normal.any_orthonormal_vector());
            let sign = if normal.cross(tangent).dot(bitangents[vertex]) < 0.0 {
                -1.0
            } else {
                1.0
            };
            packed.extend_from_slice(&[tangent.x, tangent.y, tangent.z, sign]);
        }

        self.tangents = Some(packed);
    }

    /// Square on the XY plane facing +Z
    pub fn quad(id: impl Into<String>, size: f32) -> Self {
        let half = size * 0.5;
        let mut builder = PrimitiveBuilder::default();
        builder.vertex([-half, -half, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]);
        builder.vertex([half, -half, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]);
        builder.vertex([half, half, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]);
        builder.vertex([-half, half, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]);
        builder.quad_indices(0);
        builder.finish(id)
    }

    /// Quad covering clip space, with uv (0,0) at the top left
    pub fn fullscreen_quad() -> Self {
        let mut builder = PrimitiveBuilder::default();
        builder.vertex([-1.0, -1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0]);
        builder.vertex([1.0, -1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 1.0]);
        builder.vertex([1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]);
        builder.vertex([-1.0, 1.0, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]);
        builder.quad_indices(0);
        let mut mesh = builder.finish("fullscreen_quad");
        mesh.tangents = None;
        mesh
    }

    /// Cube centered at the origin with side length `size`
    pub fn cube(id: impl Into<String>, size: f32) -> Self {
        let half = size * 0.5;

        let positions = [
            [-half, -half, -half], // 0: left bottom back
            [half, -half, -half],  // 1: right bottom back
            [half, half, -half],   // 2: right top back
            [-half, half, -half],  // 3: left top back
            [-half, -half, half],  // 4: left bottom front
            [half, -half, half],   // 5: right bottom front
            [half, half, half],    // 6: right top front
            [-half, half, half],   // 7: left top front
        ];

        // Four vertices per face so normals and uvs stay flat
        let faces: [([usize; 4], [f32; 3]); 6] = [
            ([4, 5, 6, 7], [0.0, 0.0, 1.0]),
            ([1, 0, 3, 2], [0.0, 0.0, -1.0]),
            ([7, 6, 2, 3], [0.0, 1.0, 0.0]),
            ([0, 1, 5, 4], [0.0, -1.0, 0.0]),
            ([5, 1, 2, 6], [1.0, 0.0, 0.0]),
            ([0, 4, 7, 3], [-1.0, 0.0, 0.0]),
        ];
        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

        let mut builder = PrimitiveBuilder::default();
        for (corners, normal) in faces {
            let base = builder.vertex_count();
            for (corner, uv) in corners.iter().zip(uvs) {
                builder.vertex(positions[*corner], normal, uv);
            }
            builder.quad_indices(base);
        }
        builder.finish(id)
    }

    /// Plane on the XZ plane facing +Y
    pub fn plane(id: impl Into<String>, width: f32, depth: f32) -> Self {
        let half_width = width * 0.5;
        let half_depth = depth * 0.5;

        let mut builder = PrimitiveBuilder::default();
        builder.vertex([-half_width, 0.0, half_depth], [0.0, 1.0, 0.0], [0.0, 1.0]);
        builder.vertex([half_width, 0.0, half_depth], [0.0, 1.0, 0.0], [1.0, 1.0]);
        builder.vertex([half_width, 0.0, -half_depth], [0.0, 1.0, 0.0], [1.0, 0.0]);
        builder.vertex([-half_width, 0.0, -half_depth], [0.0, 1.0, 0.0], [0.0, 0.0]);
        builder.quad_indices(0);
        builder.finish(id)
    }

    /// UV sphere
    ///
    /// # Arguments
    /// * `radius` - Radius of the sphere
    /// * `sectors` - Number of longitude divisions (minimum 3)
    /// * `stacks` - Number of latitude divisions (minimum 2)
    pub fn sphere(id: impl Into<String>, radius: f32, sectors: u32, stacks: u32) -> Self {
        let sectors = sectors.max(3);
        let stacks = stacks.max(2);

        let sector_step = 2.0 * std::f32::consts::PI / sectors as f32;
        let stack_step = std::f32::consts::PI / stacks as f32;

        let mut builder = PrimitiveBuilder::default();
        for i in 0..=stacks {
            let stack_angle = std::f32::consts::PI / 2.0 - i as f32 * stack_step;
            let xy = radius * stack_angle.cos();
            let y = radius * stack_angle.sin();

            for j in 0..=sectors {
                let sector_angle = j as f32 * sector_step;
                let x = xy * sector_angle.cos();
                let z = xy * sector_angle.sin();

                builder.vertex(
                    [x, y, z],
                    [x / radius, y / radius, z / radius],
                    [j as f32 / sectors as f32, i as f32 / stacks as f32],
                );
            }
        }

        for i in 0..stacks {
            for j in 0..sectors {
                let first = i * (sectors + 1) + j;
                let second = first + sectors + 1;
                builder.indices.extend_from_slice(&[first, first + 1, second]);
                builder.indices.extend_from_slice(&[second, first + 1, second + 1]);
            }
        }

        builder.finish(id)
    }
}

#[derive(Default)]
struct PrimitiveBuilder {
    positions: Vec<f32>,
    normals: Vec<f32>,
    tex_coords: Vec<f32>,
    indices: Vec<u32>,
}

impl PrimitiveBuilder {
    fn vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) {
        self.positions.extend_from_slice(&position);
        self.normals.extend_from_slice(&normal);
        self.tex_coords.extend_from_slice(&uv);
    }

    fn vertex_count(&self) -> u32 {
        (self.positions.len() / 3) as u32
    }

    /// Two CCW triangles over four consecutive vertices
    fn quad_indices(&mut self, base: u32) {
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn finish(self, id: impl Into<String>) -> MeshData {
        let mut mesh = MeshData {
            id: id.into(),
            positions: self.positions,
            indices: self.indices,
            normals: Some(self.normals),
            tex_coords: Some(self.tex_coords),
            ..MeshData::default()
        };
        mesh.compute_tangents();
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal_at(mesh: &MeshData, vertex: usize) -> Vec3 {
        Vec3::from_slice(&mesh.normals.as_ref().unwrap()[vertex * 3..vertex * 3 + 3])
    }

    fn position_at(mesh: &MeshData, vertex: usize) -> Vec3 {
        Vec3::from_slice(&mesh.positions[vertex * 3..vertex * 3 + 3])
    }

    #[test]
    fn test_cube_counts() {
        let cube = MeshData::cube("cube", 1.0);
        assert_eq!(cube.vertex_count(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert!(cube.validate().is_ok());
    }

    #[test]
    fn test_cube_winding_faces_outwards() {
        let cube = MeshData::cube("cube", 2.0);
        for triangle in cube.indices.chunks_exact(3) {
            let [a, b, c] = [
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            ];
            let face_normal =
                (position_at(&cube, b) - position_at(&cube, a))
                    .cross(position_at(&cube, c) - position_at(&cube, a));
            assert!(face_normal.dot(normal_at(&cube, a)) > 0.0);
        }
    }

    #[test]
    fn test_plane_is_flat_and_faces_up() {
        let plane = MeshData::plane("ground", 10.0, 10.0);
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.indices.len(), 6);
        for vertex in 0..plane.vertex_count() {
            assert_eq!(position_at(&plane, vertex).y, 0.0);
        }

        let face_normal = (position_at(&plane, 1) - position_at(&plane, 0))
            .cross(position_at(&plane, 2) - position_at(&plane, 0));
        assert!(face_normal.y > 0.0);
    }

    #[test]
    fn test_sphere_counts() {
        let sphere = MeshData::sphere("ball", 1.0, 16, 8);
        assert_eq!(sphere.vertex_count(), (16 + 1) * (8 + 1));
        assert_eq!(sphere.indices.len(), 16 * 8 * 6);
        assert!(sphere.validate().is_ok());
    }

    #[test]
    fn test_sphere_normals_are_unit() {
        let sphere = MeshData::sphere("ball", 3.0, 8, 4);
        for vertex in 0..sphere.vertex_count() {
            assert!((normal_at(&sphere, vertex).length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_generated_tangents_follow_u() {
        let quad = MeshData::quad("quad", 1.0);
        let tangents = quad.tangents.as_ref().unwrap();
        assert_eq!(tangents.len(), quad.vertex_count() * 4);
        for vertex in 0..quad.vertex_count() {
            let t = &tangents[vertex * 4..vertex * 4 + 4];
            assert!((t[0] - 1.0).abs() < 1e-5, "tangent {t:?}");
            assert!(t[1].abs() < 1e-5);
            assert_eq!(t[3].abs(), 1.0);
        }
    }

    #[test]
    fn test_fullscreen_quad_covers_clip_space() {
        let quad = MeshData::fullscreen_quad();
        assert!(quad.tangents.is_none());
        for vertex in 0..quad.vertex_count() {
            let p = position_at(&quad, vertex);
            assert_eq!(p.x.abs(), 1.0);
            assert_eq!(p.y.abs(), 1.0);
        }
    }

    #[test]
    fn test_validation_rejects_out_of_range_index() {
        let mesh = MeshData::new("bad", vec![0.0; 9], vec![0, 1, 3]);
        let err = mesh.validate().unwrap_err();
        assert!(matches!(err, RenderError::InvalidMesh { ref id, .. } if id == "bad"));
    }

    #[test]
    fn test_validation_rejects_bad_attribute_length() {
        let mut mesh = MeshData::new("bad", vec![0.0; 9], vec![0, 1, 2]);
        mesh.normals = Some(vec![0.0; 6]);
        assert!(mesh.validate().is_err());

        let mut mesh = MeshData::new("bad", vec![0.0; 8], vec![0, 1, 2]);
        assert!(mesh.validate().is_err());
        mesh.positions.clear();
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_tangents_require_valid_indices() {
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mut mesh = MeshData::new("loose", positions, vec![0, 1, 7]);
        mesh.normals = Some([0.0, 0.0, 1.0].repeat(3));
        mesh.tex_coords = Some(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        let err = mesh.generate_tangents().unwrap_err();
        assert!(matches!(err, RenderError::InvalidMesh { ref id, .. } if id == "loose"));
        assert!(mesh.tangents.is_none());

        mesh.indices = vec![0, 1, 2];
        mesh.generate_tangents().unwrap();
        let tangents = mesh.tangents.as_ref().unwrap();
        assert_eq!(tangents.len(), 12);
        assert!((Vec3::from_slice(&tangents[0..3]) - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_validation_rejects_bad_image() {
        let mesh = MeshData::quad("quad", 1.0)
            .with_image(TextureSlot::Color, ImageData::new(2, 2, vec![0; 4]));
        assert!(mesh.validate().is_err());
    }
}
