//! Shader Loading Utilities
//!
//! Provides utilities for loading and compiling WGSL shaders for the render
//! pipeline. Supports both embedded (compile-time) and runtime shader loading;
//! the engine ships with all shaders embedded, runtime loading exists for
//! shader iteration during development.

use std::path::Path;

/// Shader source that can be either embedded at compile time or loaded at runtime.
pub enum ShaderSource {
    /// Embedded shader source (faster, no file I/O at runtime)
    Embedded(&'static str),
    /// Runtime-loaded shader source
    Runtime(String),
}

impl ShaderSource {
    /// Get the shader source as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            ShaderSource::Embedded(s) => s,
            ShaderSource::Runtime(s) => s.as_str(),
        }
    }
}

/// Load a shader from the filesystem at runtime.
pub fn load_shader_file(path: impl AsRef<Path>) -> Result<ShaderSource, std::io::Error> {
    let source = std::fs::read_to_string(path)?;
    Ok(ShaderSource::Runtime(source))
}

/// Create a wgpu shader module from the given source.
pub fn create_shader_module(
    device: &wgpu::Device,
    label: &str,
    source: &ShaderSource,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.as_str().into()),
    })
}

/// Embedded shaders compiled into the binary.
pub mod embedded {
    /// Grid cell color + shadow-depth shader (entry points `vs_main`,
    /// `vs_shadow`, `fs_main`)
    pub const CELL: &str = include_str!("../../shaders/cell.wgsl");

    /// Offscreen id-color picking shader
    pub const PICKING: &str = include_str!("../../shaders/picking.wgsl");

    /// Loading indicator cube shader
    pub const LOADING: &str = include_str!("../../shaders/loading.wgsl");
}
