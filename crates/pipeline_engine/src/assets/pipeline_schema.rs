//! On-disk pipeline description schema (version 1)
//!
//! Shared by every text loader. Fixed-function blocks are optional and fall
//! back to the opaque preset; unknown fields are rejected so typos do not
//! silently turn into defaults.

use serde::{Deserialize, Serialize};

use crate::render::pipeline::{
    BlendState, DepthState, FixedFunctionState, PipelineDescription, PrimitiveTopology,
    RasterizationState, ShaderStageRef,
};

/// Schema version written to and required from description files
pub const PIPELINE_SCHEMA_VERSION: u32 = 1;

/// Serialized form of a [`PipelineDescription`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineFile {
    /// Schema version, must equal [`PIPELINE_SCHEMA_VERSION`]
    pub version: u32,
    /// Optional pipeline name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Shader stages in order
    pub stages: Vec<ShaderStageRef>,
    /// Input assembly topology
    #[serde(default)]
    pub topology: PrimitiveTopology,
    /// Rasterizer block
    #[serde(default)]
    pub rasterization: RasterizationState,
    /// Depth block
    #[serde(default)]
    pub depth: DepthState,
    /// Blend block
    #[serde(default)]
    pub blend: BlendState,
}

impl PipelineFile {
    /// Current-version file for a description
    pub fn from_description(description: &PipelineDescription) -> Self {
        Self {
            version: PIPELINE_SCHEMA_VERSION,
            name: description.name.clone(),
            stages: description.stages.clone(),
            topology: description.state.topology,
            rasterization: description.state.rasterization,
            depth: description.state.depth,
            blend: description.state.blend,
        }
    }

    /// Check the version and structure, then convert
    pub fn into_description(self) -> Result<PipelineDescription, String> {
        if self.version != PIPELINE_SCHEMA_VERSION {
            return Err(format!(
                "unsupported schema version {} (expected {})",
                self.version, PIPELINE_SCHEMA_VERSION
            ));
        }

        let description = PipelineDescription {
            name: self.name,
            stages: self.stages,
            state: FixedFunctionState {
                topology: self.topology,
                rasterization: self.rasterization,
                depth: self.depth,
                blend: self.blend,
            },
        };
        description.validate()?;
        Ok(description)
    }
}
