//! Parser module — dispatch by file extension.

pub mod lua;
pub mod tags;

use crate::config::Config;
use anyhow::{anyhow, Result};
use lua::Declaration;
use std::path::Path;
use tags::CommentBlock;

/// A comment block and the declaration it documents, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub block: CommentBlock,
    pub declaration: Option<Declaration>,
}

/// Scanned items of one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
    /// Path as given on the command line, used in locations
    pub path: String,
    pub items: Vec<Item>,
}

/// Parse a source file based on its extension.
pub fn parse_file(path: &Path, content: &str, config: &Config) -> Result<ParsedFile> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("lua") => Ok(parse_source(&path.to_string_lossy(), content, config)),
        _ => Err(anyhow!("unsupported file type: {}", path.display())),
    }
}

/// Parse Lua source text under a display name.
pub fn parse_source(name: &str, content: &str, config: &Config) -> ParsedFile {
    ParsedFile {
        path: name.to_string(),
        items: lua::scan(content, &config.comment_prefix),
    }
}
