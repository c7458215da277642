//! Graphics backend seam
//!
//! The registries never talk to a driver directly. Shader modules and
//! pipeline objects are created through [`GraphicsBackend`], and dropping the
//! returned objects releases them (RAII, same as the Vulkan wrappers).
//!
//! [`HeadlessBackend`] performs the validation a driver would do, translates
//! the description into Vulkan values and hands out fake handles. It backs
//! tooling and tests that run without a GPU.

use ash::vk::{self, Handle};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

use super::pipeline::{FixedFunctionState, ShaderStage, ShaderStageMask, ShaderStageRef};
use super::shader::SpirvModule;

/// Failure reported by the graphics layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct BackendError(pub String);

/// Result type for backend calls
pub type BackendResult<T> = Result<T, BackendError>;

/// A description stage paired with the module it resolved to
#[derive(Debug)]
pub struct ResolvedStage<'a, M> {
    /// Stage as declared in the description
    pub stage: &'a ShaderStageRef,
    /// Module owned by the shader registry
    pub module: &'a M,
}

/// Everything the backend needs to build one pipeline
#[derive(Debug)]
pub struct PipelineRequest<'a, M> {
    /// Description name, if any
    pub name: Option<&'a str>,
    /// Stages in declaration order
    pub stages: Vec<ResolvedStage<'a, M>>,
    /// Fixed-function state
    pub state: &'a FixedFunctionState,
}

impl<M> PipelineRequest<'_, M> {
    /// Stages present in the request
    pub fn stage_mask(&self) -> ShaderStageMask {
        self.stages
            .iter()
            .fold(ShaderStageMask::empty(), |mask, resolved| mask | resolved.stage.stage.mask())
    }
}

/// Creates API-resident shader modules and pipelines
pub trait GraphicsBackend {
    /// Owned shader module; dropping it destroys the module
    type ShaderModule;
    /// Owned pipeline; dropping it destroys the pipeline
    type Pipeline;

    /// Create a module from validated SPIR-V
    fn create_shader_module(&self, identifier: &str, spirv: &SpirvModule) -> BackendResult<Self::ShaderModule>;

    /// Create a graphics pipeline from resolved stages
    fn create_graphics_pipeline(
        &self,
        request: &PipelineRequest<'_, Self::ShaderModule>,
    ) -> BackendResult<Self::Pipeline>;
}

/// Optional device features the headless backend pretends to support
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlessFeatures {
    /// Geometry stage allowed
    pub geometry_shader: bool,
    /// Tessellation stages allowed
    pub tessellation_shader: bool,
    /// Line widths other than 1.0 allowed
    pub wide_lines: bool,
    /// Line and point polygon modes allowed
    pub fill_mode_non_solid: bool,
}

impl Default for HeadlessFeatures {
    fn default() -> Self {
        Self {
            geometry_shader: true,
            tessellation_shader: true,
            wide_lines: false,
            fill_mode_non_solid: true,
        }
    }
}

#[derive(Debug, Default)]
struct LiveObjects {
    shader_modules: AtomicUsize,
    pipelines: AtomicUsize,
}

/// Backend that validates and records state without a device
#[derive(Debug)]
pub struct HeadlessBackend {
    features: HeadlessFeatures,
    next_handle: AtomicU64,
    live: Arc<LiveObjects>,
}

impl HeadlessBackend {
    /// Backend with default features
    pub fn new() -> Self {
        Self::with_features(HeadlessFeatures::default())
    }

    /// Backend with explicit feature support
    pub fn with_features(features: HeadlessFeatures) -> Self {
        Self {
            features,
            next_handle: AtomicU64::new(1),
            live: Arc::new(LiveObjects::default()),
        }
    }

    /// Enabled features
    pub fn features(&self) -> HeadlessFeatures {
        self.features
    }

    /// Shader modules created and not yet dropped
    pub fn live_shader_modules(&self) -> usize {
        self.live.shader_modules.load(Ordering::Acquire)
    }

    /// Pipelines created and not yet dropped
    pub fn live_pipelines(&self) -> usize {
        self.live.pipelines.load(Ordering::Acquire)
    }

    fn allocate_handle(&self) -> u64 {
        self.next_handle.fetch_add(1, Ordering::Relaxed)
    }

    fn check_stages(&self, request: &PipelineRequest<'_, HeadlessShaderModule>) -> BackendResult<()> {
        let mask = request.stage_mask();

        if !mask.contains(ShaderStageMask::VERTEX) {
            return Err(BackendError("graphics pipeline requires a vertex stage".to_string()));
        }

        let tessellation = ShaderStageMask::TESSELLATION_CONTROL | ShaderStageMask::TESSELLATION_EVALUATION;
        if mask.intersects(tessellation) {
            if !mask.contains(tessellation) {
                return Err(BackendError(
                    "tessellation control and evaluation stages must be used together".to_string(),
                ));
            }
            if !self.features.tessellation_shader {
                return Err(BackendError("tessellationShader feature not enabled".to_string()));
            }
        }

        if mask.contains(ShaderStageMask::GEOMETRY) && !self.features.geometry_shader {
            return Err(BackendError("geometryShader feature not enabled".to_string()));
        }

        for resolved in &request.stages {
            let stage = resolved.stage;
            if !resolved.module.spirv.has_entry_point(stage.stage, &stage.entry_point) {
                return Err(BackendError(format!(
                    "shader '{}' has no {} entry point named '{}'",
                    resolved.module.identifier, stage.stage, stage.entry_point
                )));
            }
        }

        Ok(())
    }

    fn check_state(&self, state: &FixedFunctionState) -> BackendResult<()> {
        let line_width = state.rasterization.line_width;
        if !line_width.is_finite() || line_width <= 0.0 {
            return Err(BackendError(format!("invalid line width {line_width}")));
        }
        #[allow(clippy::float_cmp)]
        if line_width != 1.0 && !self.features.wide_lines {
            return Err(BackendError("wideLines feature not enabled".to_string()));
        }
        if state.rasterization.polygon_mode.to_vk() != vk::PolygonMode::FILL && !self.features.fill_mode_non_solid {
            return Err(BackendError("fillModeNonSolid feature not enabled".to_string()));
        }
        Ok(())
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsBackend for HeadlessBackend {
    type ShaderModule = HeadlessShaderModule;
    type Pipeline = HeadlessPipeline;

    fn create_shader_module(&self, identifier: &str, spirv: &SpirvModule) -> BackendResult<HeadlessShaderModule> {
        if spirv.entry_points().is_empty() {
            return Err(BackendError("module declares no entry points".to_string()));
        }

        self.live.shader_modules.fetch_add(1, Ordering::AcqRel);
        Ok(HeadlessShaderModule {
            identifier: identifier.to_string(),
            handle: vk::ShaderModule::from_raw(self.allocate_handle()),
            spirv: spirv.clone(),
            live: Arc::clone(&self.live),
        })
    }

    fn create_graphics_pipeline(
        &self,
        request: &PipelineRequest<'_, HeadlessShaderModule>,
    ) -> BackendResult<HeadlessPipeline> {
        self.check_stages(request)?;
        self.check_state(request.state)?;

        let state = request.state;
        let rasterization = state.rasterization_info();
        let depth_stencil = state.depth_stencil_info();

        self.live.pipelines.fetch_add(1, Ordering::AcqRel);
        Ok(HeadlessPipeline {
            handle: vk::Pipeline::from_raw(self.allocate_handle()),
            stage_flags: request.stage_mask().to_vk(),
            stage_modules: request.stages.iter().map(|s| (s.stage.stage, s.module.handle)).collect(),
            topology: state.topology.to_vk(),
            cull_mode: rasterization.cull_mode,
            front_face: rasterization.front_face,
            polygon_mode: rasterization.polygon_mode,
            depth_test: depth_stencil.depth_test_enable == vk::TRUE,
            depth_write: depth_stencil.depth_write_enable == vk::TRUE,
            depth_compare_op: depth_stencil.depth_compare_op,
            color_blend: state.blend.mode.to_vk(),
            live: Arc::clone(&self.live),
        })
    }
}

/// Shader module created by [`HeadlessBackend`]
#[derive(Debug)]
pub struct HeadlessShaderModule {
    identifier: String,
    handle: vk::ShaderModule,
    spirv: SpirvModule,
    live: Arc<LiveObjects>,
}

impl HeadlessShaderModule {
    /// Fake Vulkan handle
    pub fn handle(&self) -> vk::ShaderModule {
        self.handle
    }

    /// Identifier the module was created for
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Validated SPIR-V the module was created from
    pub fn spirv(&self) -> &SpirvModule {
        &self.spirv
    }
}

impl Drop for HeadlessShaderModule {
    fn drop(&mut self) {
        log::trace!("Destroying shader module '{}' ({:?})", self.identifier, self.handle);
        self.live.shader_modules.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Pipeline created by [`HeadlessBackend`], holding the translated Vulkan state
#[derive(Debug)]
pub struct HeadlessPipeline {
    /// Fake Vulkan handle
    pub handle: vk::Pipeline,
    /// Union of all stage flags
    pub stage_flags: vk::ShaderStageFlags,
    /// Module handle bound at each stage, in declaration order
    pub stage_modules: Vec<(ShaderStage, vk::ShaderModule)>,
    /// Input assembly topology
    pub topology: vk::PrimitiveTopology,
    /// Cull mode
    pub cull_mode: vk::CullModeFlags,
    /// Front face winding
    pub front_face: vk::FrontFace,
    /// Polygon mode
    pub polygon_mode: vk::PolygonMode,
    /// Depth test enabled
    pub depth_test: bool,
    /// Depth write enabled
    pub depth_write: bool,
    /// Depth compare operator
    pub depth_compare_op: vk::CompareOp,
    /// Color attachment blend state
    pub color_blend: vk::PipelineColorBlendAttachmentState,
    live: Arc<LiveObjects>,
}

impl Drop for HeadlessPipeline {
    fn drop(&mut self) {
        log::trace!("Destroying pipeline {:?}", self.handle);
        self.live.pipelines.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::pipeline::{PipelineDescription, PolygonMode};
    use crate::render::tests::spirv_module;

    fn module(backend: &HeadlessBackend, identifier: &str, stage: ShaderStage) -> HeadlessShaderModule {
        let spirv = SpirvModule::parse(&spirv_module(&[(stage, "main")])).unwrap();
        backend.create_shader_module(identifier, &spirv).unwrap()
    }

    fn request<'a>(
        description: &'a PipelineDescription,
        modules: &'a [HeadlessShaderModule],
    ) -> PipelineRequest<'a, HeadlessShaderModule> {
        PipelineRequest {
            name: description.name.as_deref(),
            stages: description
                .stages
                .iter()
                .zip(modules)
                .map(|(stage, module)| ResolvedStage { stage, module })
                .collect(),
            state: &description.state,
        }
    }

    #[test]
    fn test_pipeline_translates_state() {
        let backend = HeadlessBackend::new();
        let modules = [
            module(&backend, "vert", ShaderStage::Vertex),
            module(&backend, "frag", ShaderStage::Fragment),
        ];
        let description = PipelineDescription::vertex_fragment("basic", "vert", "frag");

        let pipeline = backend.create_graphics_pipeline(&request(&description, &modules)).unwrap();
        assert_eq!(pipeline.stage_flags, vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT);
        assert_eq!(pipeline.stage_modules[0], (ShaderStage::Vertex, modules[0].handle()));
        assert_eq!(pipeline.cull_mode, vk::CullModeFlags::BACK);
        assert!(pipeline.depth_test && pipeline.depth_write);
        assert_ne!(pipeline.handle, vk::Pipeline::null());
        assert_eq!(backend.live_pipelines(), 1);

        drop(pipeline);
        assert_eq!(backend.live_pipelines(), 0);
    }

    #[test]
    fn test_missing_vertex_stage_rejected() {
        let backend = HeadlessBackend::new();
        let modules = [module(&backend, "frag", ShaderStage::Fragment)];
        let description = PipelineDescription::new("frag_only").with_stage(ShaderStage::Fragment, "frag");

        let err = backend.create_graphics_pipeline(&request(&description, &modules)).unwrap_err();
        assert!(err.0.contains("vertex stage"));
        assert_eq!(backend.live_pipelines(), 0);
    }

    #[test]
    fn test_entry_point_must_match_stage() {
        let backend = HeadlessBackend::new();
        // Fragment module bound to the vertex stage
        let modules = [module(&backend, "frag", ShaderStage::Fragment)];
        let description = PipelineDescription::new("wrong").with_stage(ShaderStage::Vertex, "frag");

        let err = backend.create_graphics_pipeline(&request(&description, &modules)).unwrap_err();
        assert!(err.0.contains("no vertex entry point"));
    }

    #[test]
    fn test_feature_checks() {
        let backend = HeadlessBackend::with_features(HeadlessFeatures {
            geometry_shader: false,
            fill_mode_non_solid: false,
            ..HeadlessFeatures::default()
        });
        let modules = [
            module(&backend, "vert", ShaderStage::Vertex),
            module(&backend, "geom", ShaderStage::Geometry),
        ];
        let description = PipelineDescription::new("geo")
            .with_stage(ShaderStage::Vertex, "vert")
            .with_stage(ShaderStage::Geometry, "geom");
        let err = backend.create_graphics_pipeline(&request(&description, &modules)).unwrap_err();
        assert!(err.0.contains("geometryShader"));

        let mut wire = PipelineDescription::new("wire").with_stage(ShaderStage::Vertex, "vert");
        wire.state.rasterization.polygon_mode = PolygonMode::Line;
        let err = backend.create_graphics_pipeline(&request(&wire, &modules[..1])).unwrap_err();
        assert!(err.0.contains("fillModeNonSolid"));

        let mut wide = PipelineDescription::new("wide").with_stage(ShaderStage::Vertex, "vert");
        wide.state.rasterization.line_width = 2.0;
        let err = backend.create_graphics_pipeline(&request(&wide, &modules[..1])).unwrap_err();
        assert!(err.0.contains("wideLines"));
    }

    #[test]
    fn test_module_without_entry_points_rejected() {
        let backend = HeadlessBackend::new();
        let spirv = SpirvModule::parse(&spirv_module(&[])).unwrap();
        assert!(backend.create_shader_module("empty", &spirv).is_err());
        assert_eq!(backend.live_shader_modules(), 0);
    }
}
