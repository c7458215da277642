//! Format-independent pipeline loading
//!
//! Callers hold a `Box<dyn PipelineLoader>` chosen from configuration and
//! never look at the on-disk representation themselves.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::render::error::{PipelineError, PipelineResult};
use crate::render::pipeline::PipelineDescription;
use super::json_loader::JsonLoader;
use super::pipeline_schema::PipelineFile;
use super::ron_loader::RonLoader;

/// Produces a [`PipelineDescription`] from a file
pub trait PipelineLoader: Send + Sync {
    /// Read and parse the description stored at `path`
    ///
    /// Fails with `Io` when the file cannot be read and `Parse` when its
    /// content is not a valid description in this loader's format.
    fn load_pipeline(&self, path: &Path) -> PipelineResult<PipelineDescription>;

    /// File extension (without dot) this loader reads
    fn extension(&self) -> &'static str;
}

/// Description file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderFormat {
    /// JSON documents (`.json`)
    #[default]
    Json,
    /// Rusty Object Notation (`.ron`)
    Ron,
}

impl LoaderFormat {
    /// Format for a file extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "ron" => Some(Self::Ron),
            _ => None,
        }
    }

    /// Build the loader for this format
    pub fn create_loader(self) -> Box<dyn PipelineLoader> {
        match self {
            Self::Json => Box::new(JsonLoader::new()),
            Self::Ron => Box::new(RonLoader::new()),
        }
    }
}

pub(crate) fn read_source(path: &Path) -> PipelineResult<String> {
    fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))
}

pub(crate) fn finish(path: &Path, file: PipelineFile) -> PipelineResult<PipelineDescription> {
    let description = file.into_description().map_err(|message| PipelineError::parse(path, message))?;
    log::debug!(
        "Loaded pipeline description '{}' ({} stage(s)) from {:?}",
        description.display_name(),
        description.stages.len(),
        path
    );
    Ok(description)
}

/// Files in `dir` carrying the loader's extension, sorted
pub fn pipeline_files(loader: &dyn PipelineLoader, dir: impl AsRef<Path>) -> PipelineResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| PipelineError::io(dir, e))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == loader.extension()))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Load every description in `dir`, stopping at the first failure
pub fn load_directory(
    loader: &dyn PipelineLoader,
    dir: impl AsRef<Path>,
) -> PipelineResult<Vec<(PathBuf, PipelineDescription)>> {
    pipeline_files(loader, dir)?
        .into_iter()
        .map(|path| loader.load_pipeline(&path).map(|description| (path, description)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL_JSON: &str = r#"{ "version": 1, "stages": [ { "stage": "vertex", "shader": "v" } ] }"#;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(LoaderFormat::from_extension("json"), Some(LoaderFormat::Json));
        assert_eq!(LoaderFormat::from_extension("RON"), Some(LoaderFormat::Ron));
        assert_eq!(LoaderFormat::from_extension("yaml"), None);
    }

    #[test]
    fn test_create_loader_matches_format() {
        assert_eq!(LoaderFormat::Json.create_loader().extension(), "json");
        assert_eq!(LoaderFormat::Ron.create_loader().extension(), "ron");
    }

    #[test]
    fn test_load_directory_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.json"), MINIMAL_JSON).unwrap();
        fs::write(dir.path().join("a.json"), MINIMAL_JSON).unwrap();
        fs::write(dir.path().join("c.ron"), "ignored").unwrap();

        let loader = LoaderFormat::Json.create_loader();
        let loaded = load_directory(loader.as_ref(), dir.path()).unwrap();

        let names: Vec<_> = loaded
            .iter()
            .map(|(path, _)| path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_load_directory_stops_on_bad_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), MINIMAL_JSON).unwrap();
        fs::write(dir.path().join("b.json"), "{ broken").unwrap();

        let loader = JsonLoader::new();
        let err = load_directory(&loader, dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Parse { ref path, .. } if path.ends_with("b.json")));
    }

    #[test]
    fn test_workspace_sample_pipelines_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../resources/pipelines");
        let loaded = load_directory(&JsonLoader::new(), dir).unwrap();

        let names: Vec<_> = loaded.iter().map(|(_, description)| description.display_name()).collect();
        assert_eq!(names, vec!["basic", "transparent", "wireframe"]);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let loader = JsonLoader::new();
        assert!(matches!(pipeline_files(&loader, "no/such/dir"), Err(PipelineError::Io { .. })));
    }
}
