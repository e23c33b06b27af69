//! Pipeline configuration.

use crate::diagnostics::{Diagnostic, Severity};

/// Doc comment marker recognised by the scanner.
pub const DEFAULT_COMMENT_PREFIX: &str = "---";

/// Type names that never need a declaration.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "any",
    "boolean",
    "false",
    "function",
    "integer",
    "lightuserdata",
    "never",
    "nil",
    "number",
    "self",
    "string",
    "table",
    "thread",
    "true",
    "unknown",
    "userdata",
    "void",
];

#[derive(Debug, Clone)]
pub struct Config {
    /// Comment prefix marking annotation lines
    pub comment_prefix: String,
    /// Extra type names defined outside the processed files
    pub known_types: Vec<String>,
    /// Treat warnings as failures
    pub deny_warnings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            comment_prefix: DEFAULT_COMMENT_PREFIX.to_string(),
            known_types: Vec::new(),
            deny_warnings: false,
        }
    }
}

impl Config {
    /// Whether `name` resolves without a class, alias or enum in the model.
    pub fn is_known_type(&self, name: &str) -> bool {
        PRIMITIVE_TYPES.contains(&name) || self.known_types.iter().any(|t| t == name)
    }

    /// Whether these diagnostics should fail the run.
    pub fn fails(&self, diagnostics: &[Diagnostic]) -> bool {
        let threshold = if self.deny_warnings {
            Severity::Warning
        } else {
            Severity::Error
        };
        diagnostics.iter().any(|d| d.severity >= threshold)
    }
}
