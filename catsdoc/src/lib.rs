//! catsdoc — documentation graphs from LuaCATS-annotated Lua files.
//!
//! The pipeline is scan → lex → bind → build → validate → serialize.
//! Scanning runs per file in parallel; everything after it is a single
//! deterministic pass over the files in the order given.

pub mod binder;
pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod logging;
pub mod model;
pub mod parser;
pub mod render;
pub mod types;
pub mod validate;

use anyhow::{Context, Result};
use config::Config;
use diagnostics::{Diagnostic, Severity};
use model::DocModel;
use parser::ParsedFile;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A built and validated model with everything reported along the way.
#[derive(Debug)]
pub struct Documentation {
    pub model: DocModel,
    /// Lex and bind diagnostics first, then validation, each in source order
    pub diagnostics: Vec<Diagnostic>,
}

impl Documentation {
    pub fn build(files: &[ParsedFile], config: &Config) -> Self {
        let (model, mut diagnostics) = builder::build(files);
        diagnostics.extend(validate::validate(&model, config));
        debug!(
            entities = model.len(),
            diagnostics = diagnostics.len(),
            "documentation built"
        );
        Self { model, diagnostics }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn to_json(&self) -> Result<String> {
        render::json::to_json(&self.model).context("failed to serialize documentation")
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        render::json::write_json(&self.model, path)
    }
}

/// Scan in-memory sources, keeping their order.
pub fn parse_sources(sources: &[(String, String)], config: &Config) -> Vec<ParsedFile> {
    sources
        .par_iter()
        .map(|(name, content)| parser::parse_source(name, content, config))
        .collect()
}

/// Read and scan files in parallel, keeping their order. Unreadable or
/// unsupported files are skipped with a warning.
pub fn load_files(paths: &[PathBuf], config: &Config) -> Vec<ParsedFile> {
    let parsed: Vec<Option<ParsedFile>> = paths
        .par_iter()
        .map(|path| match load_file(path, config) {
            Ok(file) => Some(file),
            Err(e) => {
                warn!("skipping {}: {:#}", path.display(), e);
                None
            }
        })
        .collect();
    parsed.into_iter().flatten().collect()
}

fn load_file(path: &Path, config: &Config) -> Result<ParsedFile> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    parser::parse_file(path, &content, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn sources(files: &[(&str, &str)]) -> Vec<(String, String)> {
        files
            .iter()
            .map(|(n, s)| (n.to_string(), s.to_string()))
            .collect()
    }

    const APPLICATION: &str = "\
---@meta
---@class renoise.Application
renoise.Application = {}

---@param message string
function renoise.Application:show_message(message) end
";

    const SONG: &str = "\
---@meta
renoise.Application = {}

---@return renoise.Song
function renoise.Application:song() end

---@class renoise.Song
";

    #[test]
    fn build_is_idempotent() {
        let config = Config::default();
        let input = sources(&[("a.lua", APPLICATION), ("b.lua", SONG)]);
        let first = Documentation::build(&parse_sources(&input, &config), &config);
        let second = Documentation::build(&parse_sources(&input, &config), &config);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
        assert!(first.diagnostics.is_empty(), "{:?}", first.diagnostics);
    }

    #[test]
    fn methods_union_across_files() {
        let config = Config::default();
        let files = parse_sources(&sources(&[("a.lua", APPLICATION), ("b.lua", SONG)]), &config);
        let doc = Documentation::build(&files, &config);
        let class = doc.model.class("renoise.Application").unwrap();
        let names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["show_message", "song"]);
        assert_eq!(doc.model.len(), 2);
    }

    #[test]
    fn scenario_json_shape() {
        let config = Config::default();
        let doc = Documentation::build(
            &parse_sources(&sources(&[("a.lua", APPLICATION)]), &config),
            &config,
        );
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        let method = &value[0]["methods"][0];
        assert_eq!(method["name"], "show_message");
        assert_eq!(
            method["params"],
            serde_json::json!([{ "name": "message", "type": "string", "optional": false }])
        );
    }

    #[test]
    fn unresolved_owner_fails_but_serializes() {
        let config = Config::default();
        let files = parse_sources(
            &sources(&[("broken.lua", "---@field volume number\nmixer = {}\n")]),
            &config,
        );
        let doc = Documentation::build(&files, &config);
        assert!(doc.has_errors());
        assert_eq!(doc.count(Severity::Error), 1);
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value[0]["name"], "mixer");
        assert!(value[0].get("fields").is_none());
    }

    #[test]
    fn load_files_skips_unreadable() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.lua");
        let mut f = fs::File::create(&good).unwrap();
        writeln!(f, "---@alias Mode string").unwrap();
        let missing = dir.path().join("missing.lua");

        let files = load_files(&[missing, good.clone()], &Config::default());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, good.to_string_lossy());
    }
}
