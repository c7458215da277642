//! Pipeline descriptions and the pipeline registry

pub mod pipeline_config;
pub mod pipeline_description;
pub mod pipeline_manager;

pub use pipeline_config::{
    BlendMode, BlendState, CompareOp, CullMode, DepthState, FixedFunctionState, FrontFace, PolygonMode,
    PrimitiveTopology, RasterizationState,
};
pub use pipeline_description::{
    PipelineDescription, ShaderStage, ShaderStageMask, ShaderStageRef, DEFAULT_ENTRY_POINT,
};
pub use pipeline_manager::{ManagedPipeline, PipelineId, PipelineManager};
