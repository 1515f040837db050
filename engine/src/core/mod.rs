//! Core scene math: camera and model transforms

pub mod camera;
pub mod transform;

pub use camera::Camera;
pub use transform::Transform;
