//! JSON pipeline description loader

use std::path::Path;

use crate::render::error::{PipelineError, PipelineResult};
use crate::render::pipeline::PipelineDescription;
use super::pipeline_loader::{finish, read_source, PipelineLoader};
use super::pipeline_schema::PipelineFile;

/// Reads pipeline descriptions written as JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLoader;

impl JsonLoader {
    /// Create a JSON loader
    pub fn new() -> Self {
        Self
    }

    /// Parse a description from JSON text; `origin` is only used in errors
    pub fn parse_str(&self, text: &str, origin: &Path) -> PipelineResult<PipelineDescription> {
        let file: PipelineFile =
            serde_json::from_str(text).map_err(|e| PipelineError::parse(origin, e.to_string()))?;
        finish(origin, file)
    }

    /// Pretty JSON text for a description, in the current schema version
    pub fn to_json(&self, description: &PipelineDescription) -> PipelineResult<String> {
        serde_json::to_string_pretty(&PipelineFile::from_description(description))
            .map_err(|e| PipelineError::Serialization(e.to_string()))
    }
}

impl PipelineLoader for JsonLoader {
    fn load_pipeline(&self, path: &Path) -> PipelineResult<PipelineDescription> {
        let text = read_source(path)?;
        self.parse_str(&text, path)
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::pipeline::{BlendMode, CompareOp, CullMode, PrimitiveTopology, ShaderStage};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_full_document() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, r#"
{{
    "version": 1,
    "name": "particles",
    "stages": [
        {{ "stage": "vertex", "shader": "particle_vert" }},
        {{ "stage": "geometry", "shader": "particle_geom", "entry_point": "expand" }},
        {{ "stage": "fragment", "shader": "particle_frag" }}
    ],
    "topology": "point_list",
    "rasterization": {{ "cull_mode": "none" }},
    "depth": {{ "write": false, "compare_op": "less_or_equal" }},
    "blend": {{ "mode": "additive" }}
}}
"#).unwrap();

        let description = JsonLoader::new().load_pipeline(temp_file.path()).unwrap();

        assert_eq!(description.name.as_deref(), Some("particles"));
        let stages: Vec<_> = description.stages.iter().map(|s| (s.stage, s.shader.as_str())).collect();
        assert_eq!(stages, vec![
            (ShaderStage::Vertex, "particle_vert"),
            (ShaderStage::Geometry, "particle_geom"),
            (ShaderStage::Fragment, "particle_frag"),
        ]);
        assert_eq!(description.stages[0].entry_point, "main");
        assert_eq!(description.stages[1].entry_point, "expand");
        assert_eq!(description.state.topology, PrimitiveTopology::PointList);
        assert_eq!(description.state.rasterization.cull_mode, CullMode::None);
        assert_eq!(description.state.rasterization.line_width, 1.0);
        assert!(description.state.depth.test);
        assert!(!description.state.depth.write);
        assert_eq!(description.state.depth.compare_op, CompareOp::LessOrEqual);
        assert_eq!(description.state.blend.mode, BlendMode::Additive);
    }

    #[test]
    fn test_written_text_loads_back() {
        let loader = JsonLoader::new();
        let description = crate::render::pipeline::PipelineDescription::vertex_fragment("basic", "v", "f");

        let text = loader.to_json(&description).unwrap();
        assert!(text.contains("\"version\": 1"));
        assert_eq!(loader.parse_str(&text, Path::new("inline.json")).unwrap(), description);
    }

    #[test]
    fn test_written_text_has_no_parse_origin() {
        let description = crate::render::pipeline::PipelineDescription::new("wire")
            .with_stage(ShaderStage::Vertex, "v")
            .with_state(crate::render::pipeline::FixedFunctionState::wireframe());

        let text = JsonLoader::new().to_json(&description).unwrap();
        assert!(!text.contains("<memory>"));
        assert!(text.contains("\"polygon_mode\": \"line\""));

        let err = PipelineError::Serialization("key must be a string".to_string());
        assert_eq!(err.to_string(), "Serialization failed: key must be a string");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_parse_errors() {
        let loader = JsonLoader::new();
        let origin = Path::new("bad.json");
        let cases = [
            "{ not json",
            r#"{ "stages": [] }"#,
            r#"{ "version": 1, "stages": [] }"#,
            r#"{ "version": 7, "stages": [ { "stage": "vertex", "shader": "v" } ] }"#,
            r#"{ "version": 1, "stages": [ { "stage": "compute", "shader": "c" } ] }"#,
            r#"{ "version": 1, "stages": [ { "stage": "vertex", "shader": "v" } ], "colour": 1 }"#,
            r#"{ "version": 1, "stages": [ { "stage": "vertex", "shader": "v", "entrypoint": "vs_main" } ] }"#,
            r#"{ "version": 1, "stages": [ { "stage": "vertex", "shader": "v" } ], "depth": { "wirte": false } }"#,
            r#"{ "version": 1, "stages": [ { "stage": "vertex", "shader": "v" } ], "rasterization": { "cull": "none" } }"#,
            r#"{ "version": 1, "stages": [ { "stage": "vertex", "shader": "v" } ], "blend": { "mode": "alpha", "factor": 1 } }"#,
        ];

        for text in cases {
            let err = loader.parse_str(text, origin).unwrap_err();
            assert!(matches!(err, PipelineError::Parse { .. }), "{text} gave {err:?}");
        }
    }

    #[test]
    fn test_unreadable_path_is_io_error() {
        let err = JsonLoader::new().load_pipeline(Path::new("missing/pipeline.json")).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
