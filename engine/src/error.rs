//! Error types for the renderer
//!
//! Initialization faults (adapter, device, limits, surface) are fatal and
//! reported once. Resource-contract violations indicate a broken defaulting
//! invariant and are surfaced immediately instead of skipping the draw.

use crate::graphics::vertex_layout::VertexLayoutError;

/// Errors raised while creating or driving the renderer
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no compatible graphics adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to acquire a device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("adapter limit `{name}` is {available}, renderer requires {required}")]
    UnsupportedLimit {
        name: &'static str,
        available: u32,
        required: u32,
    },

    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("failed to create window: {0}")]
    CreateWindow(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("waiting for GPU completion failed: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("renderable `{renderable}` has no buffer for vertex attribute `{attribute}`")]
    MissingVertexAttribute {
        renderable: String,
        attribute: String,
    },

    #[error("pipeline `{pipeline}` expects {expected} bind groups, got {actual}")]
    BindGroupCountMismatch {
        pipeline: String,
        expected: usize,
        actual: usize,
    },

    #[error("pipeline `{pipeline}` expects {expected} bindings in group {group}, got {actual}")]
    BindGroupMismatch {
        pipeline: String,
        group: usize,
        expected: usize,
        actual: usize,
    },

    #[error("pipeline `{0}` is already realized and can no longer be modified")]
    PipelineRealized(String),

    #[error("pipeline `{0}` has no depth-stencil state")]
    NoDepthStencil(String),

    #[error("invalid mesh `{id}`: {reason}")]
    InvalidMesh { id: String, reason: String },

    #[error(transparent)]
    Layout(#[from] VertexLayoutError),
}

/// Errors raised while loading renderer configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl RenderError {
    /// Whether the error came from a lost or outdated swapchain, which the
    /// application recovers from by reconfiguring the surface
    pub fn is_surface_outdated(&self) -> bool {
        matches!(
            self,
            RenderError::Surface(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)
        )
    }
}
