//! Scene contents: renderables, lights and shadow fitting

pub mod light;
pub mod renderable;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod shadow;

pub use light::{DirectionalLight, LightSettings, SHADOW_FORMAT};
pub use renderable::{LightSource, MeshRenderable, Placement, RenderMode, Renderable};
pub use scene::Scene;
pub use shadow::{fit_light_to_frustum, FrustumFit};
