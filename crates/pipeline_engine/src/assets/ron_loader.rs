//! RON pipeline description loader
//!
//! Same schema as the JSON loader, written in RON syntax:
//!
//! ```ron
//! (
//!     version: 1,
//!     name: Some("sky"),
//!     stages: [(stage: vertex, shader: "sky_vert"), (stage: fragment, shader: "sky_frag")],
//!     depth: (write: false),
//! )
//! ```

use std::path::Path;

use crate::render::error::{PipelineError, PipelineResult};
use crate::render::pipeline::PipelineDescription;
use super::pipeline_loader::{finish, read_source, PipelineLoader};
use super::pipeline_schema::PipelineFile;

/// Reads pipeline descriptions written as RON
#[derive(Debug, Clone, Copy, Default)]
pub struct RonLoader;

impl RonLoader {
    /// Create a RON loader
    pub fn new() -> Self {
        Self
    }

    /// Parse a description from RON text; `origin` is only used in errors
    pub fn parse_str(&self, text: &str, origin: &Path) -> PipelineResult<PipelineDescription> {
        let file: PipelineFile = ron::from_str(text).map_err(|e| PipelineError::parse(origin, e.to_string()))?;
        finish(origin, file)
    }
}

impl PipelineLoader for RonLoader {
    fn load_pipeline(&self, path: &Path) -> PipelineResult<PipelineDescription> {
        let text = read_source(path)?;
        self.parse_str(&text, path)
    }

    fn extension(&self) -> &'static str {
        "ron"
    }
}
