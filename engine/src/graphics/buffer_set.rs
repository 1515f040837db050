//! Per-renderable vertex and index buffers
//!
//! Buffers are keyed by attribute name. Attributes a mesh lacks are filled
//! with the one-vertex zero buffers from [`ResourceDefaults`], so any layout
//! built from the canonical attributes resolves against any buffer set.

use crate::error::RenderError;
use crate::graphics::defaults::ResourceDefaults;
use crate::graphics::mesh::MeshData;
use crate::graphics::vertex_layout::{attribute, VertexLayout};
use std::sync::Arc;
use tracing::info;
use wgpu::util::DeviceExt;

const OPTIONAL_ATTRIBUTES: [&str; 3] =
    [attribute::TEX_COORD, attribute::NORMAL, attribute::TANGENT];

#[derive(Debug, Clone)]
pub struct BufferSet {
    /// Canonical attributes first, then extras, in insertion order
    buffers: Vec<(String, Arc<wgpu::Buffer>)>,
    provided: Vec<String>,
    index_buffer: Arc<wgpu::Buffer>,
    index_count: u32,
}

impl BufferSet {
    /// Assemble a buffer set, filling absent optional attributes with defaults
    pub fn create(
        position: Arc<wgpu::Buffer>,
        tex_coord: Option<Arc<wgpu::Buffer>>,
        normal: Option<Arc<wgpu::Buffer>>,
        tangent: Option<Arc<wgpu::Buffer>>,
        index_buffer: Arc<wgpu::Buffer>,
        index_count: u32,
        defaults: &ResourceDefaults,
    ) -> Self {
        let resources = defaults.get();
        let mut buffers = vec![(attribute::POSITION.to_string(), position)];
        let mut provided = vec![attribute::POSITION.to_string()];

        for (name, buffer) in OPTIONAL_ATTRIBUTES.into_iter().zip([tex_coord, normal, tangent]) {
            let buffer = match buffer {
                Some(buffer) => {
                    provided.push(name.to_string());
                    buffer
                }
                None => match resources.vertex_buffer(name) {
                    Some(fallback) => fallback.clone(),
                    None => continue,
                },
            };
            buffers.push((name.to_string(), buffer));
        }

        Self {
            buffers,
            provided,
            index_buffer,
            index_count,
        }
    }

    /// Upload a validated mesh
    pub fn from_mesh_data(
        mesh: &MeshData,
        defaults: &ResourceDefaults,
    ) -> Result<Self, RenderError> {
        mesh.validate()?;
        let device = defaults.device();

        let upload = |name: &str, data: &[f32]| {
            Arc::new(
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{} {name} Buffer", mesh.id)),
                    contents: bytemuck::cast_slice(data),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            )
        };

        let position = upload(attribute::POSITION, &mesh.positions);
        let tex_coord = mesh
            .tex_coords
            .as_deref()
            .map(|data| upload(attribute::TEX_COORD, data));
        let normal = mesh
            .normals
            .as_deref()
            .map(|data| upload(attribute::NORMAL, data));
        let tangent = mesh
            .tangents
            .as_deref()
            .map(|data| upload(attribute::TANGENT, data));

        let index_buffer = Arc::new(device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} Index Buffer", mesh.id)),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        ));

        info!(
            mesh = %mesh.id,
            vertices = mesh.vertex_count(),
            indices = mesh.indices.len(),
            "Uploaded mesh to GPU"
        );

        Ok(Self::create(
            position,
            tex_coord,
            normal,
            tangent,
            index_buffer,
            mesh.index_count(),
            defaults,
        ))
    }

    /// Add a non-canonical vertex buffer, replacing any with the same name
    pub fn with_extra(mut self, name: impl Into<String>, buffer: Arc<wgpu::Buffer>) -> Self {
        let name = name.into();
        self.buffers.retain(|(existing, _)| *existing != name);
        self.provided.push(name.clone());
        self.buffers.push((name, buffer));
        self
    }

    pub fn buffer(&self, name: &str) -> Option<&Arc<wgpu::Buffer>> {
        self.buffers
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, buffer)| buffer)
    }

    /// Whether the attribute came from mesh data rather than a default
    pub fn has_attribute(&self, name: &str) -> bool {
        self.provided.iter().any(|existing| existing == name)
    }

    /// Attribute names in canonical order
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.buffers.iter().map(|(name, _)| name.as_str())
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Buffers in the slot order of `layout`
    pub fn resolve(
        &self,
        layout: &VertexLayout,
        renderable: &str,
    ) -> Result<Vec<&wgpu::Buffer>, RenderError> {
        layout
            .attribute_names()
            .map(|name| {
                self.buffer(name).map(|buffer| buffer.as_ref()).ok_or_else(|| {
                    RenderError::MissingVertexAttribute {
                        renderable: renderable.to_string(),
                        attribute: name.to_string(),
                    }
                })
            })
            .collect()
    }
}
