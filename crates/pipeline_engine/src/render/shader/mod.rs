//! Shader modules: SPIR-V validation and the shader registry

pub mod shader_manager;
pub mod spirv;

pub use shader_manager::{ShaderManager, SHADER_EXTENSION};
pub use spirv::{EntryPoint, SpirvModule, SPIRV_MAGIC};
