//! Shader registry
//!
//! Owns every shader module under a unique string identifier. Modules live in
//! a slot map; the name index only stores slot keys, so removing a shader
//! leaves no dangling owner behind.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::foundation::collections::{ShaderKey, ShaderSlots};
use crate::render::backend::{GraphicsBackend, HeadlessBackend};
use crate::render::error::{PipelineError, PipelineResult};
use super::spirv::{EntryPoint, SpirvModule};

/// File extension picked up by [`ShaderManager::load_directory`]
pub const SHADER_EXTENSION: &str = "spv";

struct ShaderEntry<M> {
    identifier: String,
    module: M,
    entry_points: Vec<EntryPoint>,
    byte_len: usize,
}

/// Owns named shader modules created through a [`GraphicsBackend`]
pub struct ShaderManager<B: GraphicsBackend = HeadlessBackend> {
    shaders: ShaderSlots<ShaderEntry<B::ShaderModule>>,
    index: HashMap<String, ShaderKey>,
}

impl<B: GraphicsBackend> ShaderManager<B> {
    /// Create an empty shader registry
    pub fn new() -> Self {
        Self {
            shaders: ShaderSlots::with_key(),
            index: HashMap::new(),
        }
    }

    /// Validate `source` as SPIR-V, create its module and register it
    ///
    /// Fails with `DuplicateIdentifier` before doing any work if the
    /// identifier is taken, and with `Compilation` if the binary is malformed
    /// or the backend rejects it. The registry is unchanged on failure.
    pub fn load(&mut self, backend: &B, identifier: impl Into<String>, source: &[u8]) -> PipelineResult<ShaderKey> {
        let identifier = identifier.into();
        if self.index.contains_key(&identifier) {
            return Err(PipelineError::DuplicateIdentifier(identifier));
        }

        let spirv = SpirvModule::parse(source).map_err(|message| PipelineError::Compilation {
            identifier: identifier.clone(),
            message,
        })?;

        let module = backend
            .create_shader_module(&identifier, &spirv)
            .map_err(|err| PipelineError::Compilation {
                identifier: identifier.clone(),
                message: err.0,
            })?;

        log::debug!(
            "Loaded shader '{}' ({} bytes, {} entry points)",
            identifier,
            spirv.byte_len(),
            spirv.entry_points().len()
        );

        let key = self.shaders.insert(ShaderEntry {
            identifier: identifier.clone(),
            module,
            entry_points: spirv.entry_points().to_vec(),
            byte_len: spirv.byte_len(),
        });
        self.index.insert(identifier, key);
        Ok(key)
    }

    /// Read a SPIR-V file and register it under `identifier`
    pub fn load_file(&mut self, backend: &B, identifier: impl Into<String>, path: impl AsRef<Path>) -> PipelineResult<ShaderKey> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| PipelineError::io(path, e))?;
        self.load(backend, identifier, &bytes)
    }

    /// Register every `.spv` file in `dir`, named by file stem
    ///
    /// Files load in sorted path order. The call is all or nothing: if any
    /// file fails, the shaders registered by this call are removed again and
    /// the registry is left as it was.
    pub fn load_directory(&mut self, backend: &B, dir: impl AsRef<Path>) -> PipelineResult<Vec<String>> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .map_err(|e| PipelineError::io(dir, e))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == SHADER_EXTENSION))
            .collect();
        paths.sort();

        let mut loaded = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(identifier) = path.file_stem().and_then(|stem| stem.to_str()) else {
                log::warn!("Skipping shader with non UTF-8 name: {:?}", path);
                continue;
            };
            let identifier = identifier.to_string();
            if let Err(err) = self.load_file(backend, identifier.clone(), &path) {
                self.rollback(&loaded);
                return Err(err);
            }
            loaded.push(identifier);
        }

        log::info!("Loaded {} shader(s) from {:?}", loaded.len(), dir);
        Ok(loaded)
    }

    fn rollback(&mut self, identifiers: &[String]) {
        for identifier in identifiers {
            if let Some(key) = self.index.remove(identifier) {
                self.shaders.remove(key);
            }
        }
        log::debug!("Rolled back {} shader(s)", identifiers.len());
    }

    /// Borrow the module registered under `identifier`
    pub fn get(&self, identifier: &str) -> PipelineResult<&B::ShaderModule> {
        self.entry(identifier).map(|entry| &entry.module)
    }

    /// Borrow a module by slot key; `None` once the shader was removed
    pub fn get_by_key(&self, key: ShaderKey) -> Option<&B::ShaderModule> {
        self.shaders.get(key).map(|entry| &entry.module)
    }

    /// Slot key for `identifier`
    pub fn key(&self, identifier: &str) -> Option<ShaderKey> {
        self.index.get(identifier).copied()
    }

    /// Entry points reflected from the module's SPIR-V
    pub fn reflection(&self, identifier: &str) -> PipelineResult<&[EntryPoint]> {
        self.entry(identifier).map(|entry| entry.entry_points.as_slice())
    }

    /// Size of the SPIR-V binary the module was created from
    pub fn byte_len(&self, identifier: &str) -> PipelineResult<usize> {
        self.entry(identifier).map(|entry| entry.byte_len)
    }

    /// Destroy the module registered under `identifier`
    pub fn remove(&mut self, identifier: &str) -> PipelineResult<()> {
        let key = self
            .index
            .remove(identifier)
            .ok_or_else(|| PipelineError::ShaderNotFound(identifier.to_string()))?;
        self.shaders.remove(key);
        log::debug!("Removed shader '{}'", identifier);
        Ok(())
    }

    /// Whether `identifier` is registered
    pub fn contains(&self, identifier: &str) -> bool {
        self.index.contains_key(identifier)
    }

    /// Number of registered shaders
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    /// True when no shaders are registered
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Registered identifiers, sorted
    pub fn identifiers(&self) -> Vec<&str> {
        let mut identifiers: Vec<&str> = self.shaders.values().map(|entry| entry.identifier.as_str()).collect();
        identifiers.sort_unstable();
        identifiers
    }

    fn entry(&self, identifier: &str) -> PipelineResult<&ShaderEntry<B::ShaderModule>> {
        self.index
            .get(identifier)
            .and_then(|key| self.shaders.get(*key))
            .ok_or_else(|| PipelineError::ShaderNotFound(identifier.to_string()))
    }
}

impl<B: GraphicsBackend> Default for ShaderManager<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: GraphicsBackend> Drop for ShaderManager<B> {
    fn drop(&mut self) {
        log::debug!("ShaderManager dropping with {} shaders", self.shaders.len());
    }
}
