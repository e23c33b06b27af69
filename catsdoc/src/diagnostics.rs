//! Diagnostics produced while binding and validating.
//!
//! Diagnostics are data, not errors: the pipeline always runs to
//! completion and the caller decides what a diagnostic means.

use crate::model::Location;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Code {
    /// `@word` that is not a known tag
    UnknownTag,
    /// Known tag whose payload did not parse
    MalformedTag,
    /// Tag with nothing to attach to
    OrphanTag,
    /// `@param` naming a parameter the function does not have
    UnknownParam,
    /// `@enum` without a table literal
    EnumWithoutTable,
    UnresolvedOwner,
    DuplicateMember,
    /// Same name used by entities of different kinds
    ConflictingDefinition,
    Redefinition,
    UnresolvedType,
}

impl Code {
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::UnknownTag => "unknown-tag",
            Code::MalformedTag => "malformed-tag",
            Code::OrphanTag => "orphan-tag",
            Code::UnknownParam => "unknown-param",
            Code::EnumWithoutTable => "enum-without-table",
            Code::UnresolvedOwner => "unresolved-owner",
            Code::DuplicateMember => "duplicate-member",
            Code::ConflictingDefinition => "conflicting-definition",
            Code::Redefinition => "redefinition",
            Code::UnresolvedType => "unresolved-type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Code,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Entity the diagnostic is about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: Code, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            location: None,
            entity: None,
        }
    }

    pub fn warning(code: Code, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn error(code: Code, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn at(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    pub fn on(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.severity, self.code.as_str())?;
        if let Some(ref loc) = self.location {
            write!(f, " {}:{}", loc.file, loc.line)?;
        }
        write!(f, ": {}", self.message)
    }
}
