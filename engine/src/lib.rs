//! Umbra: a deferred-shading renderer on wgpu
//!
//! Meshes are written into an eight-target G-buffer, lit by a full-screen
//! composite pass with a frustum-fitted directional shadow map, and forward
//! renderables are drawn on top against the same depth.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod graphics;
pub mod input;
pub mod scene;
pub mod shaders;

// Re-export commonly used types
pub mod prelude {
    pub use crate::core::{Camera, Transform};

    // Math types
    pub use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

    pub use crate::graphics::{
        DebugView, FrameTimings, ImageData, Material, MaterialDesc, MaterialFactors, MeshData,
        PipelineState, RenderContext, Renderer, SamplerSpec, TextureSlot,
    };

    pub use crate::scene::{
        DirectionalLight, LightSettings, LightSource, MeshRenderable, Placement, RenderMode,
        Renderable, Scene,
    };

    pub use crate::config::{CameraConfig, RendererConfig, ShadowConfig};
    pub use crate::error::{ConfigError, RenderError};

    pub use crate::app::{EngineApp, EngineBuilder, EngineConfig};

    pub use crate::input::InputState;

    pub use wgpu;
    pub use winit;
}

const DEFAULT_LOG_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn";

/// Initialize logging for the engine
///
/// `RUST_LOG` wins over the built-in filter. Calling this more than once is
/// harmless.
pub fn init_logging() {
    init_logging_with(None);
}

/// Initialize logging with an explicit filter, falling back to `RUST_LOG`
/// and then the built-in default
pub fn init_logging_with(filter: Option<&str>) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = match filter {
        Some(filter) => tracing_subscriber::EnvFilter::new(filter),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
