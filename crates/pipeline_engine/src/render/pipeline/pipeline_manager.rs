//! Pipeline manager for handling multiple graphics pipelines
//!
//! Owns every pipeline created from a [`PipelineDescription`] under a
//! [`PipelineId`] drawn from a monotonic counter. Ids are never reused, so a
//! stale id can only miss, never alias a newer pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::assets::PipelineLoader;
use crate::render::backend::{GraphicsBackend, HeadlessBackend, PipelineRequest, ResolvedStage};
use crate::render::error::{PipelineError, PipelineResult};
use crate::render::shader::ShaderManager;
use super::pipeline_config::FixedFunctionState;
use super::pipeline_description::{PipelineDescription, ShaderStageMask, ShaderStageRef};

/// Identifier of a pipeline inside one [`PipelineManager`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PipelineId(u64);

impl PipelineId {
    /// Raw counter value
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A constructed pipeline together with the stages it was built from
#[derive(Debug)]
pub struct ManagedPipeline<P> {
    id: PipelineId,
    name: Option<String>,
    stages: Vec<ShaderStageRef>,
    state: FixedFunctionState,
    pipeline: P,
}

impl<P> ManagedPipeline<P> {
    /// Id in the owning registry
    pub fn id(&self) -> PipelineId {
        self.id
    }

    /// Name from the description
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Shader stages in declaration order
    pub fn stages(&self) -> &[ShaderStageRef] {
        &self.stages
    }

    /// Stages present in the pipeline
    pub fn stage_mask(&self) -> ShaderStageMask {
        self.stages
            .iter()
            .fold(ShaderStageMask::empty(), |mask, stage| mask | stage.stage.mask())
    }

    /// Fixed-function state the pipeline was built with
    pub fn state(&self) -> &FixedFunctionState {
        &self.state
    }

    /// Backend pipeline object
    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }
}

/// Manages graphics pipelines keyed by [`PipelineId`]
///
/// Move-only: the type is not `Clone`, and [`take`](Self::take) /
/// [`assign_from`](Self::assign_from) transfer the whole registry, leaving
/// the source empty with its counter back at zero.
pub struct PipelineManager<B: GraphicsBackend = HeadlessBackend> {
    pipelines: BTreeMap<PipelineId, ManagedPipeline<B::Pipeline>>,
    next_id: u64,
}

impl<B: GraphicsBackend> PipelineManager<B> {
    /// Create a new pipeline manager
    pub fn new() -> Self {
        Self {
            pipelines: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Construct a pipeline from `description` and store it under a fresh id
    ///
    /// A structurally invalid description (no stages, a stage kind declared
    /// twice, empty identifiers) fails with `Construction`. Every stage must
    /// name a shader registered in `shaders`, otherwise the call fails with
    /// `UnresolvedShaderReference`. Backend failures surface as `Construction`. Creation is atomic: on error nothing is inserted and
    /// the id counter does not move.
    pub fn create(
        &mut self,
        backend: &B,
        shaders: &ShaderManager<B>,
        description: PipelineDescription,
    ) -> PipelineResult<PipelineId> {
        description
            .validate()
            .map_err(|message| PipelineError::Construction(format!("{}: {}", description.display_name(), message)))?;

        let pipeline = {
            let mut resolved = Vec::with_capacity(description.stages.len());
            for stage in &description.stages {
                let module = shaders.get(&stage.shader).map_err(|_| PipelineError::UnresolvedShaderReference {
                    shader: stage.shader.clone(),
                    stage: stage.stage.to_string(),
                })?;
                resolved.push(ResolvedStage { stage, module });
            }

            let request = PipelineRequest {
                name: description.name.as_deref(),
                stages: resolved,
                state: &description.state,
            };
            backend
                .create_graphics_pipeline(&request)
                .map_err(|err| PipelineError::Construction(format!("{}: {}", description.display_name(), err)))?
        };

        let id = PipelineId(self.next_id);
        self.next_id += 1;

        log::debug!(
            "Created pipeline {} '{}' with {} stage(s)",
            id,
            description.display_name(),
            description.stages.len()
        );

        let PipelineDescription { name, stages, state } = description;
        self.pipelines.insert(id, ManagedPipeline { id, name, stages, state, pipeline });
        Ok(id)
    }

    /// Load a description with `loader` and create a pipeline from it
    pub fn create_from_file(
        &mut self,
        backend: &B,
        shaders: &ShaderManager<B>,
        loader: &dyn PipelineLoader,
        path: impl AsRef<Path>,
    ) -> PipelineResult<PipelineId> {
        let description = loader.load_pipeline(path.as_ref())?;
        self.create(backend, shaders, description)
    }

    /// Get pipeline by id
    pub fn get(&self, id: PipelineId) -> PipelineResult<&ManagedPipeline<B::Pipeline>> {
        self.pipelines.get(&id).ok_or(PipelineError::PipelineNotFound(id))
    }

    /// First pipeline whose description carried `name`
    pub fn find_by_name(&self, name: &str) -> Option<&ManagedPipeline<B::Pipeline>> {
        self.pipelines.values().find(|pipeline| pipeline.name() == Some(name))
    }

    /// Destroy the pipeline and forget its id
    pub fn remove(&mut self, id: PipelineId) -> PipelineResult<()> {
        let pipeline = self.pipelines.remove(&id).ok_or(PipelineError::PipelineNotFound(id))?;
        log::debug!("Removed pipeline {} '{}'", id, pipeline.name().unwrap_or("<unnamed>"));
        Ok(())
    }

    /// Destroy every pipeline; the id counter keeps running
    pub fn clear(&mut self) {
        log::debug!("Clearing {} pipeline(s)", self.pipelines.len());
        self.pipelines.clear();
    }

    /// Check if a pipeline exists for the id
    pub fn contains(&self, id: PipelineId) -> bool {
        self.pipelines.contains_key(&id)
    }

    /// Number of live pipelines
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// True when no pipelines are stored
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Counter value the next successful `create` will use
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Live ids in ascending order
    pub fn ids(&self) -> Vec<PipelineId> {
        self.pipelines.keys().copied().collect()
    }

    /// Pipelines in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &ManagedPipeline<B::Pipeline>> {
        self.pipelines.values()
    }

    /// Move all pipelines and the counter into a new registry
    ///
    /// `self` is left empty with its counter reset to zero.
    #[must_use]
    pub fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    /// Replace this registry's content with `source`'s
    ///
    /// Pipelines previously held by `self` are destroyed; `source` is left
    /// empty with its counter reset. `&mut` exclusivity rules out a
    /// self-assignment, so that case cannot arise.
    pub fn assign_from(&mut self, source: &mut Self) {
        *self = source.take();
    }
}

impl<B: GraphicsBackend> Default for PipelineManager<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: GraphicsBackend> Drop for PipelineManager<B> {
    fn drop(&mut self) {
        if !self.pipelines.is_empty() {
            log::debug!("PipelineManager dropping with {} pipelines", self.pipelines.len());
        }
    }
}
