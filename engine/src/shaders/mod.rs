//! Shader sources
//!
//! Every program is compiled with `common.wgsl` prepended, which declares the
//! uniform blocks and the lighting helpers.

use std::sync::Arc;
use tracing::debug;

pub const COMMON: &str = include_str!("common.wgsl");

/// The fixed set of programs the renderer builds pipelines from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderProgram {
    GBuffer,
    Deferred,
    Shadow,
    Forward,
}

impl ShaderProgram {
    pub const ALL: [ShaderProgram; 4] = [
        ShaderProgram::GBuffer,
        ShaderProgram::Deferred,
        ShaderProgram::Shadow,
        ShaderProgram::Forward,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ShaderProgram::GBuffer => "gbuffer",
            ShaderProgram::Deferred => "deferred",
            ShaderProgram::Shadow => "shadow",
            ShaderProgram::Forward => "forward",
        }
    }

    fn body(self) -> &'static str {
        match self {
            ShaderProgram::GBuffer => include_str!("gbuffer.wgsl"),
            ShaderProgram::Deferred => include_str!("deferred.wgsl"),
            ShaderProgram::Shadow => include_str!("shadow.wgsl"),
            ShaderProgram::Forward => include_str!("forward.wgsl"),
        }
    }

    /// Full WGSL source including the shared declarations
    pub fn source(self) -> String {
        format!("{COMMON}\n{}", self.body())
    }

    pub fn create_module(self, device: &wgpu::Device) -> Arc<wgpu::ShaderModule> {
        debug!(shader = self.id(), "Compiling shader");
        Arc::new(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(self.id()),
            source: wgpu::ShaderSource::Wgsl(self.source().into()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_include_common_declarations() {
        for program in ShaderProgram::ALL {
            let source = program.source();
            assert!(source.starts_with(COMMON));
            assert!(source.contains("fn vs_main"), "{} lacks vs_main", program.id());
        }
    }

    #[test]
    fn test_fragment_entry_points() {
        assert!(!ShaderProgram::Shadow.source().contains("fn fs_main"));
        for program in [
            ShaderProgram::GBuffer,
            ShaderProgram::Deferred,
            ShaderProgram::Forward,
        ] {
            assert!(program.source().contains("fn fs_main"));
        }
    }

    #[test]
    fn test_surface_vectors_are_normalized_with_fallback() {
        // Meshes without normals or tangents feed zero vectors
        for program in [ShaderProgram::GBuffer, ShaderProgram::Forward] {
            let source = program.source();
            for raw in ["normalize(in.normal)", "normalize(in.tangent", "normalize(normal)"] {
                let bare = source
                    .match_indices(raw)
                    .any(|(at, _)| !source[..at].ends_with("safe_"));
                assert!(!bare, "{} calls {raw} without a fallback", program.id());
            }
        }
    }
}
