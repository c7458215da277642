//! # Pipeline Engine
//!
//! GPU pipeline resource registries: compiled shader modules keyed by name,
//! graphics pipelines keyed by id, and loaders that read pipeline
//! descriptions from disk.
//!
//! ## Features
//!
//! - **Shader Registry**: SPIR-V validation, entry point reflection, named lookup
//! - **Pipeline Registry**: monotonic ids, resolution of shader references at creation
//! - **Description Loaders**: versioned JSON and RON documents behind one trait
//! - **Headless Backend**: full validation without a GPU, for tools and tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pipeline_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = HeadlessBackend::new();
//!     let mut shaders = ShaderManager::new();
//!     shaders.load_directory(&backend, "target/shaders")?;
//!
//!     let mut pipelines = PipelineManager::new();
//!     let loader = LoaderFormat::Json.create_loader();
//!     let id = pipelines.create_from_file(&backend, &shaders, loader.as_ref(), "resources/pipelines/basic.json")?;
//!     println!("created pipeline {id}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::must_use_candidate)]

pub mod core;

pub mod foundation;
pub mod assets;
pub mod render;
pub mod config;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{Config, ConfigError, RegistryConfig};
    pub use crate::assets::{JsonLoader, LoaderFormat, PipelineLoader, RonLoader};
    pub use crate::render::{
        GraphicsBackend, HeadlessBackend, HeadlessFeatures, ManagedPipeline, PipelineDescription, PipelineError,
        PipelineId, PipelineManager, PipelineResult, ShaderManager, ShaderStage,
    };
    pub use crate::render::pipeline::{BlendMode, FixedFunctionState, ShaderStageRef};
}
