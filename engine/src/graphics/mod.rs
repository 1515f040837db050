//! Graphics module
//!
//! GPU resource wrappers, materials and pipelines, and the deferred
//! renderer that ties them together.

pub mod bindings;
pub mod buffer_set;
pub mod context;
pub mod defaults;
pub mod gbuffer;
pub mod material;
pub mod mesh;
pub mod pipeline;
pub mod render_target;
pub mod renderer;
pub mod texture;
pub mod uniform;
pub mod vertex_layout;

// Re-export commonly used types
pub use bindings::BindingSet;
pub use buffer_set::BufferSet;
pub use context::RenderContext;
pub use defaults::ResourceDefaults;
pub use gbuffer::GBuffer;
pub use material::{Material, MaterialDesc, MaterialFactors, TextureSlot};
pub use mesh::MeshData;
pub use pipeline::{BindingSignature, PipelineState};
pub use render_target::RenderTarget;
pub use renderer::{DebugView, FrameTimings, RenderOutput, Renderer, RendererPipelines};
pub use texture::{GpuTexture, ImageData, SamplerSpec};
pub use uniform::UniformBuffer;
pub use vertex_layout::{VertexLayout, VertexLayoutBuilder};
