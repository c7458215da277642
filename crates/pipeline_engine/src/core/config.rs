//! # Registry Configuration
//!
//! Where shaders and pipeline descriptions live, which description format is
//! in use and how chatty logging should be. Loaded from `.toml` or `.ron`
//! through the [`Config`] trait.

use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use crate::config::{Config, ConfigError};
use crate::assets::LoaderFormat;
use crate::render::backend::HeadlessFeatures;

/// Directories searched, in order, when the configured shader directory is missing
const SHADER_DIR_CANDIDATES: [&str; 4] = ["target/shaders", "shaders", "resources/shaders", "../shaders"];

/// Top-level configuration for the registries and the tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directory holding compiled `.spv` shaders
    pub shader_dir: PathBuf,
    /// Directory holding pipeline description files
    pub pipeline_dir: PathBuf,
    /// Description file format
    pub loader_format: LoaderFormat,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Features enabled on the headless backend
    pub features: HeadlessFeatures,
}

impl RegistryConfig {
    /// Configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shader directory
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = dir.into();
        self
    }

    /// Set the pipeline description directory
    pub fn with_pipeline_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.pipeline_dir = dir.into();
        self
    }

    /// Set the description format
    pub fn with_loader_format(mut self, format: LoaderFormat) -> Self {
        self.loader_format = format;
        self
    }

    /// Set the default log filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Shader directory, falling back to the usual build locations
    ///
    /// Useful when the tool runs from a different working directory than the
    /// one the configuration was written for.
    pub fn resolve_shader_dir(&self) -> PathBuf {
        if self.shader_dir.is_dir() {
            return self.shader_dir.clone();
        }

        SHADER_DIR_CANDIDATES
            .iter()
            .map(Path::new)
            .find(|candidate| candidate.is_dir())
            .map_or_else(|| self.shader_dir.clone(), Path::to_path_buf)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shader_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("shader_dir cannot be empty".to_string()));
        }
        if self.pipeline_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("pipeline_dir cannot be empty".to_string()));
        }
        log::LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.log_level)))?;
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from("target/shaders"),
            pipeline_dir: PathBuf::from("resources/pipelines"),
            loader_format: LoaderFormat::default(),
            log_level: "info".to_string(),
            features: HeadlessFeatures::default(),
        }
    }
}

impl Config for RegistryConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = RegistryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.loader_format, LoaderFormat::Json);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(RegistryConfig::new().with_shader_dir("").validate().is_err());
        assert!(RegistryConfig::new().with_pipeline_dir("").validate().is_err());
        assert!(RegistryConfig::new().with_log_level("loud").validate().is_err());
        assert!(RegistryConfig::new().with_log_level("DEBUG").validate().is_ok());
    }

    #[test]
    fn test_toml_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.toml");
        let config = RegistryConfig::new()
            .with_shader_dir("build/spv")
            .with_loader_format(LoaderFormat::Ron)
            .with_log_level("debug");

        config.save_to_file(&path).unwrap();
        let loaded = RegistryConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.ron");
        fs::write(&path, "(loader_format: ron, features: (wide_lines: true))").unwrap();

        let loaded = RegistryConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.loader_format, LoaderFormat::Ron);
        assert!(loaded.features.wide_lines);
        assert!(loaded.features.geometry_shader);
        assert_eq!(loaded.shader_dir, PathBuf::from("target/shaders"));
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("registry.yaml");
        fs::write(&path, "shader_dir: x").unwrap();

        let err = RegistryConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let loaded = RegistryConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, RegistryConfig::default());
    }

    #[test]
    fn test_workspace_sample_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../registry.toml");
        let loaded = RegistryConfig::load_from_file(&path).unwrap();

        assert!(loaded.validate().is_ok());
        assert_eq!(loaded, RegistryConfig::default());
    }

    #[test]
    fn test_existing_shader_dir_is_kept() {
        let dir = TempDir::new().unwrap();
        let config = RegistryConfig::new().with_shader_dir(dir.path());
        assert_eq!(config.resolve_shader_dir(), dir.path());
    }
}
