//! Asset loading
//!
//! Pipeline descriptions live on disk as versioned JSON or RON documents.
//! [`PipelineLoader`] hides which one is in use.

pub mod json_loader;
pub mod pipeline_loader;
pub mod pipeline_schema;
pub mod ron_loader;

pub use json_loader::JsonLoader;
pub use pipeline_loader::{load_directory, pipeline_files, LoaderFormat, PipelineLoader};
pub use pipeline_schema::{PipelineFile, PIPELINE_SCHEMA_VERSION};
pub use ron_loader::RonLoader;
