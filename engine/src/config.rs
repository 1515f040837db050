//! Configuration types for the renderer
//!
//! Every tunable constant lives here so it can be overridden from a JSON
//! file. Missing fields fall back to their defaults.

use crate::error::ConfigError;
use crate::scene::LightSettings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Free-flight camera tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane; the far plane is infinite
    pub near: f32,
    /// Radians of rotation per pixel of pointer movement per millisecond
    pub rotation_speed: f32,
    /// World units per millisecond
    pub move_speed: f32,
    /// Speed multiplier while Shift is held
    pub sprint_multiplier: f32,
    /// Maximum absolute pitch in radians
    pub pitch_limit: f32,
    /// Initial world position
    pub position: [f32; 3],
    /// Initial look direction
    pub look: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            rotation_speed: 0.001,
            move_speed: 0.22,
            sprint_multiplier: 8.0,
            pitch_limit: 1.55334,
            position: [4.0, 120.0, 230.0],
            look: [0.0, 0.0, -1.0],
        }
    }
}

/// Directional shadow mapping parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    /// Width and height of the square shadow depth target
    pub map_size: u32,
    /// Near plane of the camera frustum slice the light is fitted to
    pub near: f32,
    /// Far plane of the camera frustum slice the light is fitted to
    pub far: f32,
    /// Factor pushing the light-space depth range away from zero
    pub z_multiplier: f32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: 4096,
            near: 0.1,
            far: 100.0,
            z_multiplier: 10.0,
        }
    }
}

/// Top-level renderer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub camera: CameraConfig,
    pub shadow: ShadowConfig,
    /// Clear color of the composited output
    pub clear_color: [f64; 4],
    /// Initial light settings
    pub light: LightSettings,
    /// Initial deferred debug view index (0 = lit)
    pub debug_view: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            shadow: ShadowConfig::default(),
            clear_color: [0.5294, 0.8039, 0.9725, 1.0],
            light: LightSettings::default(),
            debug_view: 0,
        }
    }
}

impl RendererConfig {
    /// Parse a configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str(json)?;
        debug!(?config, "Parsed renderer config");
        Ok(config)
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = ?path, "Loading renderer config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RendererConfig::default();
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.camera.pitch_limit, 1.55334);
        assert_eq!(config.shadow.z_multiplier, 10.0);
        assert_eq!(config.shadow.map_size, 4096);
        assert_eq!(config.debug_view, 0);
    }

    #[test]
    fn test_partial_override() {
        let config =
            RendererConfig::from_json_str(r#"{ "shadow": { "map_size": 1024 } }"#).unwrap();
        assert_eq!(config.shadow.map_size, 1024);
        // Untouched fields keep their defaults
        assert_eq!(config.shadow.z_multiplier, 10.0);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = RendererConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let err = RendererConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_file_round_trip() {
        let mut config = RendererConfig::default();
        config.camera.fov_degrees = 70.0;
        config.debug_view = 3;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("renderer.json");
        std::fs::write(&path, config.to_json_string().unwrap()).unwrap();

        let loaded = RendererConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_clear_color_conversion() {
        let color = RendererConfig::default().clear_color();
        assert_eq!(color.r, 0.5294);
        assert_eq!(color.a, 1.0);
    }
}
