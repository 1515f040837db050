//! Declarative vertex layouts
//!
//! Each attribute lives in its own vertex buffer (no interleaving). Shader
//! locations are handed out sequentially in declaration order, and skipped
//! attributes do not consume a location.

use tracing::trace;

/// Canonical vertex attribute names
pub mod attribute {
    pub const POSITION: &str = "position";
    pub const TEX_COORD: &str = "tex_coord";
    pub const NORMAL: &str = "normal";
    pub const TANGENT: &str = "tangent";
}

const CANONICAL_ATTRIBUTES: [(&str, wgpu::VertexFormat); 4] = [
    (attribute::POSITION, wgpu::VertexFormat::Float32x3),
    (attribute::TEX_COORD, wgpu::VertexFormat::Float32x2),
    (attribute::NORMAL, wgpu::VertexFormat::Float32x3),
    (attribute::TANGENT, wgpu::VertexFormat::Float32x4),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VertexLayoutError {
    #[error("vertex layout is frozen; cannot add attribute `{0}`")]
    Frozen(String),

    #[error("vertex attribute `{0}` is declared twice")]
    Duplicate(String),
}

/// One attribute and the buffer that carries it
#[derive(Debug, Clone, PartialEq)]
pub struct VertexSlot {
    name: String,
    stride: wgpu::BufferAddress,
    attribute: [wgpu::VertexAttribute; 1],
}

impl VertexSlot {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> u32 {
        self.attribute[0].shader_location
    }

    pub fn format(&self) -> wgpu::VertexFormat {
        self.attribute[0].format
    }

    pub fn stride(&self) -> wgpu::BufferAddress {
        self.stride
    }
}

/// Builder that assigns shader locations and strides
#[derive(Debug, Clone)]
pub struct VertexLayoutBuilder {
    slots: Vec<VertexSlot>,
    step_mode: wgpu::VertexStepMode,
    frozen: bool,
}

impl VertexLayoutBuilder {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            step_mode: wgpu::VertexStepMode::Vertex,
            frozen: false,
        }
    }

    /// Use per-instance stepping for every buffer in this layout
    pub fn per_instance(mut self) -> Self {
        self.step_mode = wgpu::VertexStepMode::Instance;
        self
    }

    /// Append an attribute unless `skip` is set
    ///
    /// Fails once [`end`](Self::end) has been called.
    pub fn add(
        &mut self,
        name: &str,
        format: wgpu::VertexFormat,
        skip: bool,
    ) -> Result<&mut Self, VertexLayoutError> {
        if self.frozen {
            return Err(VertexLayoutError::Frozen(name.to_string()));
        }
        if skip {
            trace!(attribute = name, "Skipping vertex attribute");
            return Ok(self);
        }
        if self.slots.iter().any(|slot| slot.name == name) {
            return Err(VertexLayoutError::Duplicate(name.to_string()));
        }

        let location = self.slots.len() as u32;
        self.slots.push(VertexSlot {
            name: name.to_string(),
            stride: format.size(),
            attribute: [wgpu::VertexAttribute {
                format,
                offset: 0,
                shader_location: location,
            }],
        });
        trace!(attribute = name, location, "Added vertex attribute");
        Ok(self)
    }

    /// Freeze the builder and return the finished layout
    pub fn end(&mut self) -> VertexLayout {
        self.frozen = true;
        VertexLayout {
            slots: self.slots.clone(),
            step_mode: self.step_mode,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

impl Default for VertexLayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A frozen, ordered set of single-attribute vertex buffers
#[derive(Debug, Clone, PartialEq)]
pub struct VertexLayout {
    slots: Vec<VertexSlot>,
    step_mode: wgpu::VertexStepMode,
}

impl VertexLayout {
    /// position, tex_coord, normal, tangent
    pub fn canonical() -> Result<Self, VertexLayoutError> {
        Self::canonical_subset([true; 4])
    }

    /// Layout used by depth-only passes
    pub fn position_only() -> Result<Self, VertexLayoutError> {
        Self::canonical_subset([true, false, false, false])
    }

    /// position and tex_coord, used by the full-screen quad
    pub fn position_tex_coord() -> Result<Self, VertexLayoutError> {
        Self::canonical_subset([true, true, false, false])
    }

    /// Canonical attributes in order, skipping the ones not kept
    fn canonical_subset(keep: [bool; 4]) -> Result<Self, VertexLayoutError> {
        let mut builder = VertexLayoutBuilder::new();
        for ((name, format), keep) in CANONICAL_ATTRIBUTES.into_iter().zip(keep) {
            builder.add(name, format, !keep)?;
        }
        Ok(builder.end())
    }

    pub fn slots(&self) -> &[VertexSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Attribute names in buffer-slot order
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.name.as_str())
    }

    pub fn location_of(&self, name: &str) -> Option<u32> {
        self.slots
            .iter()
            .find(|slot| slot.name == name)
            .map(VertexSlot::location)
    }

    /// Buffer layouts in slot order, ready for a `wgpu::VertexState`
    pub fn buffer_layouts(&self) -> Vec<wgpu::VertexBufferLayout<'_>> {
        self.slots
            .iter()
            .map(|slot| wgpu::VertexBufferLayout {
                array_stride: slot.stride,
                step_mode: self.step_mode,
                attributes: &slot.attribute,
            })
            .collect()
    }
}
