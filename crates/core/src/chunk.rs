use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::language::Language;

/// Type of code chunk
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChunkType {
    Function,
    Method,
    Class,
    Struct,
    Interface,
    Trait,
    Impl,
}

/// A semantic unit of code (function, method, class, ...) with its location and metadata
///
/// Line numbers are 1-based and inclusive; `start_line <= end_line` is enforced by the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct Chunk {
    /// Run-unique identifier
    pub id: String,

    /// Exact source text of the construct
    pub code: String,

    /// Repository full name (`owner/name`)
    pub repo: String,

    /// Path of the file relative to the snapshot root, `/`-separated
    pub file_path: String,

    /// Programming language
    pub language: Language,

    /// Kind of construct
    pub chunk_type: ChunkType,

    /// Function/class name
    pub name: String,

    /// First line of the construct
    #[builder(default = "None")]
    pub signature: Option<String>,

    /// Documentation string, when one precedes or opens the construct
    #[builder(default = "None")]
    pub docstring: Option<String>,

    pub start_line: usize,
    pub end_line: usize,

    /// Byte range in the file
    #[builder(default = "0")]
    pub start_byte: usize,
    #[builder(default = "0")]
    pub end_byte: usize,

    /// Enclosing class for methods
    #[builder(default = "None")]
    pub parent_class: Option<String>,

    /// Module path derived from the file path
    #[builder(default = "None")]
    pub module: Option<String>,

    /// Number of lines spanned by the construct
    pub lines_of_code: usize,
}

impl Chunk {
    /// Create a new builder
    pub fn builder() -> ChunkBuilder {
        ChunkBuilder::default()
    }
}

impl ChunkBuilder {
    fn validate(&self) -> Result<(), String> {
        if let (Some(start), Some(end)) = (self.start_line, self.end_line) {
            if start > end {
                return Err(format!("start_line {start} is after end_line {end}"));
            }
        }
        if let (Some(start), Some(end)) = (self.start_byte, self.end_byte) {
            if start > end {
                return Err(format!("start_byte {start} is after end_byte {end}"));
            }
        }
        Ok(())
    }
}
