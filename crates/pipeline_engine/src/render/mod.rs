//! # Rendering Resources
//!
//! Shader modules and graphics pipelines, owned by two registries.
//!
//! ## Architecture
//!
//! - **ShaderManager**: validated SPIR-V modules keyed by string identifier
//! - **PipelineManager**: pipelines built from descriptions, keyed by [`PipelineId`]
//! - **GraphicsBackend**: the seam through which modules and pipelines are created
//!
//! Pipelines resolve their shader references once, at creation time. After
//! that they no longer depend on the shader registry.

pub mod backend;
pub mod error;
pub mod pipeline;
pub mod shader;

#[cfg(test)]
mod tests;

pub use backend::{
    BackendError, BackendResult, GraphicsBackend, HeadlessBackend, HeadlessFeatures, HeadlessPipeline,
    HeadlessShaderModule, PipelineRequest, ResolvedStage,
};
pub use error::{PipelineError, PipelineResult};
pub use pipeline::{FixedFunctionState, ManagedPipeline, PipelineDescription, PipelineId, PipelineManager, ShaderStage};
pub use shader::{ShaderManager, SpirvModule};
