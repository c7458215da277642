//! Shared fixtures and end-to-end registry scenarios


use crate::render::backend::HeadlessBackend;
use crate::render::pipeline::ShaderStage;
use crate::render::shader::spirv::{execution_model, SPIRV_MAGIC};
use crate::render::shader::ShaderManager;

/// Minimal SPIR-V 1.0 binary declaring the given entry points
pub(crate) fn spirv_module(entry_points: &[(ShaderStage, &str)]) -> Vec<u8> {
    let mut words = vec![
        SPIRV_MAGIC,
        0x0001_0000, // version 1.0
        0,           // generator
        16,          // id bound
        0,           // schema
        (2 << 16) | 17, // OpCapability
        1,              // Shader
        (3 << 16) | 14, // OpMemoryModel
        0,              // Logical
        1,              // GLSL450
    ];

    for (index, (stage, name)) in entry_points.iter().enumerate() {
        let mut name_bytes = name.as_bytes().to_vec();
        name_bytes.push(0);
        while name_bytes.len() % 4 != 0 {
            name_bytes.push(0);
        }
        let name_words: Vec<u32> = name_bytes
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        let word_count = 3 + name_words.len() as u32;
        words.push((word_count << 16) | 15);
        words.push(execution_model(*stage));
        words.push(index as u32 + 1);
        words.extend(name_words);
    }

    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

/// Backend plus a registry holding `vert_basic` and `frag_basic`
pub(crate) fn basic_shaders() -> (HeadlessBackend, ShaderManager<HeadlessBackend>) {
    let backend = HeadlessBackend::new();
    let mut shaders = ShaderManager::new();
    shaders
        .load(&backend, "vert_basic", &spirv_module(&[(ShaderStage::Vertex, "main")]))
        .unwrap();
    shaders
        .load(&backend, "frag_basic", &spirv_module(&[(ShaderStage::Fragment, "main")]))
        .unwrap();
    (backend, shaders)
}
