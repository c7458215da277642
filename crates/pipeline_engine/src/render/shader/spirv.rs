//! SPIR-V binary validation and entry point reflection

use std::io::Cursor;

use crate::render::pipeline::ShaderStage;

/// First word of every SPIR-V module
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

const HEADER_WORDS: usize = 5;
const OP_ENTRY_POINT: u32 = 15;

/// Entry point declared by an `OpEntryPoint` instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    /// Graphics stage, `None` for compute, kernel and ray tracing models
    pub stage: Option<ShaderStage>,
    /// Raw SPIR-V execution model
    pub execution_model: u32,
    /// Function name
    pub name: String,
}

/// Validated SPIR-V module
#[derive(Debug, Clone)]
pub struct SpirvModule {
    words: Vec<u32>,
    entry_points: Vec<EntryPoint>,
}

impl SpirvModule {
    /// Validate a binary and reflect its entry points
    ///
    /// Accepts both byte orders; the stored words are always host order.
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        if bytes.is_empty() {
            return Err("SPIR-V binary is empty".to_string());
        }

        let words = ash::util::read_spv(&mut Cursor::new(bytes))
            .map_err(|e| format!("invalid SPIR-V binary: {e}"))?;

        if words.len() < HEADER_WORDS {
            return Err("SPIR-V header is truncated".to_string());
        }

        let entry_points = Self::reflect_entry_points(&words)?;
        Ok(Self { words, entry_points })
    }

    fn reflect_entry_points(words: &[u32]) -> Result<Vec<EntryPoint>, String> {
        let mut entry_points = Vec::new();
        let mut offset = HEADER_WORDS;

        while offset < words.len() {
            let word_count = (words[offset] >> 16) as usize;
            let opcode = words[offset] & 0xffff;

            if word_count == 0 {
                return Err(format!("instruction at word {offset} has zero length"));
            }
            if offset + word_count > words.len() {
                return Err(format!("instruction at word {offset} runs past the end of the module"));
            }

            if opcode == OP_ENTRY_POINT {
                if word_count < 4 {
                    return Err(format!("OpEntryPoint at word {offset} is truncated"));
                }
                let execution_model = words[offset + 1];
                let name = decode_string(&words[offset + 3..offset + word_count])
                    .map_err(|reason| format!("OpEntryPoint at word {offset} {reason}"))?;
                entry_points.push(EntryPoint {
                    stage: stage_for_execution_model(execution_model),
                    execution_model,
                    name,
                });
            }

            offset += word_count;
        }

        Ok(entry_points)
    }

    /// Module words in host byte order
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// SPIR-V version as (major, minor)
    pub fn version(&self) -> (u8, u8) {
        let version = self.words[1];
        (((version >> 16) & 0xff) as u8, ((version >> 8) & 0xff) as u8)
    }

    /// Declared entry points in module order
    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// Whether the module can run `name` at `stage`
    pub fn has_entry_point(&self, stage: ShaderStage, name: &str) -> bool {
        self.entry_points
            .iter()
            .any(|entry| entry.stage == Some(stage) && entry.name == name)
    }

    /// Size of the binary in bytes
    pub fn byte_len(&self) -> usize {
        self.words.len() * 4
    }
}

/// SPIR-V execution model for a graphics stage
pub fn execution_model(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => 0,
        ShaderStage::TessellationControl => 1,
        ShaderStage::TessellationEvaluation => 2,
        ShaderStage::Geometry => 3,
        ShaderStage::Fragment => 4,
    }
}

fn stage_for_execution_model(model: u32) -> Option<ShaderStage> {
    ShaderStage::ALL
        .into_iter()
        .find(|stage| execution_model(*stage) == model)
}

/// Literal strings are nul-terminated UTF-8 packed little-end first into words
fn decode_string(words: &[u32]) -> Result<String, &'static str> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in words {
        for byte in word.to_le_bytes() {
            if byte == 0 {
                return String::from_utf8(bytes).map_err(|_| "has a name that is not valid UTF-8");
            }
            bytes.push(byte);
        }
    }
    Err("has an unterminated name")
}
