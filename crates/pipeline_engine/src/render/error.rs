//! Error type shared by the shader registry, pipeline registry and loaders

use std::path::PathBuf;
use thiserror::Error;

use super::pipeline::PipelineId;

/// Result alias used by every registry and loader operation
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failures reported by registries, loaders and the graphics backend
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No shader registered under the identifier
    #[error("Shader not found: {0}")]
    ShaderNotFound(String),

    /// No pipeline registered under the id
    #[error("Pipeline not found: {0}")]
    PipelineNotFound(PipelineId),

    /// A shader with this identifier is already registered
    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    /// File could not be read
    #[error("IO error reading {path:?}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Description content is malformed for the loader's format
    #[error("Parse error in {path:?}: {message}")]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// Shader binary was rejected
    #[error("Shader '{identifier}' failed to compile: {message}")]
    Compilation {
        /// Identifier the shader was loaded under
        identifier: String,
        /// What went wrong
        message: String,
    },

    /// Description references a shader that is not registered
    #[error("Pipeline references unknown shader '{shader}' for {stage} stage")]
    UnresolvedShaderReference {
        /// Missing shader identifier
        shader: String,
        /// Stage that referenced it
        stage: String,
    },

    /// The graphics layer refused to create the pipeline
    #[error("Pipeline construction failed: {0}")]
    Construction(String),

    /// A description could not be written out
    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl PipelineError {
    /// True for both shader and pipeline lookup misses
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ShaderNotFound(_) | Self::PipelineNotFound(_))
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse { path: path.into(), message: message.into() }
    }
}
