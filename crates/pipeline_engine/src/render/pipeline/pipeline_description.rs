//! Pipeline descriptions
//!
//! A description is the transient, format-independent input to
//! [`PipelineManager::create`](super::PipelineManager::create): an ordered
//! list of shader stages plus fixed-function state.

use ash::vk;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::pipeline_config::FixedFunctionState;

/// Entry point used when a stage does not name one
pub const DEFAULT_ENTRY_POINT: &str = "main";

/// Programmable stage of a graphics pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Tessellation control (hull) shader
    TessellationControl,
    /// Tessellation evaluation (domain) shader
    TessellationEvaluation,
    /// Geometry shader
    Geometry,
    /// Fragment shader
    Fragment,
}

impl ShaderStage {
    /// All stages in pipeline order
    pub const ALL: [Self; 5] = [
        Self::Vertex,
        Self::TessellationControl,
        Self::TessellationEvaluation,
        Self::Geometry,
        Self::Fragment,
    ];

    /// Vulkan stage flag
    pub fn to_vk(self) -> vk::ShaderStageFlags {
        match self {
            Self::Vertex => vk::ShaderStageFlags::VERTEX,
            Self::TessellationControl => vk::ShaderStageFlags::TESSELLATION_CONTROL,
            Self::TessellationEvaluation => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
            Self::Geometry => vk::ShaderStageFlags::GEOMETRY,
            Self::Fragment => vk::ShaderStageFlags::FRAGMENT,
        }
    }

    /// Single-bit mask for this stage
    pub fn mask(self) -> ShaderStageMask {
        match self {
            Self::Vertex => ShaderStageMask::VERTEX,
            Self::TessellationControl => ShaderStageMask::TESSELLATION_CONTROL,
            Self::TessellationEvaluation => ShaderStageMask::TESSELLATION_EVALUATION,
            Self::Geometry => ShaderStageMask::GEOMETRY,
            Self::Fragment => ShaderStageMask::FRAGMENT,
        }
    }

    /// Lowercase name as written in description files
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::TessellationControl => "tessellation_control",
            Self::TessellationEvaluation => "tessellation_evaluation",
            Self::Geometry => "geometry",
            Self::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Set of stages present in a pipeline
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderStageMask: u32 {
        /// Vertex stage
        const VERTEX = 1 << 0;
        /// Tessellation control stage
        const TESSELLATION_CONTROL = 1 << 1;
        /// Tessellation evaluation stage
        const TESSELLATION_EVALUATION = 1 << 2;
        /// Geometry stage
        const GEOMETRY = 1 << 3;
        /// Fragment stage
        const FRAGMENT = 1 << 4;
    }
}

impl ShaderStageMask {
    /// Combined Vulkan stage flags
    pub fn to_vk(self) -> vk::ShaderStageFlags {
        ShaderStage::ALL
            .iter()
            .filter(|stage| self.contains(stage.mask()))
            .fold(vk::ShaderStageFlags::empty(), |flags, stage| flags | stage.to_vk())
    }
}

fn default_entry_point() -> String {
    DEFAULT_ENTRY_POINT.to_string()
}

/// One stage of a pipeline: which shader runs where
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShaderStageRef {
    /// Stage kind
    pub stage: ShaderStage,
    /// Identifier of the shader in the shader registry
    pub shader: String,
    /// Entry point function inside the shader module
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
}

impl ShaderStageRef {
    /// Stage using the default `main` entry point
    pub fn new(stage: ShaderStage, shader: impl Into<String>) -> Self {
        Self {
            stage,
            shader: shader.into(),
            entry_point: default_entry_point(),
        }
    }

    /// Override the entry point
    #[must_use]
    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = entry_point.into();
        self
    }
}

/// Configuration for a single graphics pipeline
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineDescription {
    /// Optional human-readable name, used for lookups and logging
    pub name: Option<String>,
    /// Shader stages in declaration order
    pub stages: Vec<ShaderStageRef>,
    /// Non-programmable state
    pub state: FixedFunctionState,
}

impl PipelineDescription {
    /// Empty description with a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Append a stage using the default entry point
    #[must_use]
    pub fn with_stage(mut self, stage: ShaderStage, shader: impl Into<String>) -> Self {
        self.stages.push(ShaderStageRef::new(stage, shader));
        self
    }

    /// Append a fully specified stage
    #[must_use]
    pub fn with_stage_ref(mut self, stage: ShaderStageRef) -> Self {
        self.stages.push(stage);
        self
    }

    /// Replace the fixed-function state
    #[must_use]
    pub fn with_state(mut self, state: FixedFunctionState) -> Self {
        self.state = state;
        self
    }

    /// Classic vertex + fragment pipeline with opaque state
    pub fn vertex_fragment(
        name: impl Into<String>,
        vertex_shader: impl Into<String>,
        fragment_shader: impl Into<String>,
    ) -> Self {
        Self::new(name)
            .with_stage(ShaderStage::Vertex, vertex_shader)
            .with_stage(ShaderStage::Fragment, fragment_shader)
    }

    /// Stages present in this description
    pub fn stage_mask(&self) -> ShaderStageMask {
        self.stages
            .iter()
            .fold(ShaderStageMask::empty(), |mask, stage| mask | stage.stage.mask())
    }

    /// Name for log output
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Structural checks shared by loaders and backends
    ///
    /// A description needs at least one stage, each stage kind at most once,
    /// and non-empty shader identifiers and entry points.
    pub fn validate(&self) -> Result<(), String> {
        if self.stages.is_empty() {
            return Err("pipeline declares no shader stages".to_string());
        }

        let mut seen = ShaderStageMask::empty();
        for stage_ref in &self.stages {
            let bit = stage_ref.stage.mask();
            if seen.contains(bit) {
                return Err(format!("{} stage declared more than once", stage_ref.stage));
            }
            seen |= bit;

            if stage_ref.shader.is_empty() {
                return Err(format!("{} stage has an empty shader identifier", stage_ref.stage));
            }
            if stage_ref.entry_point.is_empty() {
                return Err(format!("{} stage has an empty entry point", stage_ref.stage));
            }
        }

        Ok(())
    }
}
