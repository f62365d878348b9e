//! Errors and diagnostics produced while generating a diagram.
//!
//! ERROR HANDLING
//! ==============
//! Documents are hand-edited, so almost every problem is absorbed: the
//! offending record is skipped, a [`Diagnostic`] is recorded, and generation
//! continues with a valid DOT program. The one caller-visible failure is
//! [`GenerateError::StructurallyInvalidDocument`], raised when a mapping or
//! list was required and the document holds a scalar instead.

use serde::Serialize;
use serde_json::Value;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code for structured logs and reports.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;
}

// =============================================================================
// HARD ERRORS
// =============================================================================

/// Failure that prevents any meaningful output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// A mapping or list was required at `path` but something else was found.
    #[error("structurally invalid document at {path}: expected {expected}, found {found}")]
    StructurallyInvalidDocument { path: String, expected: &'static str, found: &'static str },
}

impl GenerateError {
    pub(crate) fn invalid(path: impl Into<String>, expected: &'static str, value: &Value) -> Self {
        Self::StructurallyInvalidDocument { path: path.into(), expected, found: json_type_name(value) }
    }
}

impl ErrorCode for GenerateError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::StructurallyInvalidDocument { .. } => "E_INVALID_DOCUMENT",
        }
    }
}

// =============================================================================
// DIAGNOSTICS
// =============================================================================

/// A recoverable problem found during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// No marker key matched; the output is an empty graph.
    #[error("unrecognized document schema (top-level keys: {})", keys.join(", "))]
    UnknownSchema { keys: Vec<String> },

    /// A connection endpoint did not match any node of this document.
    #[error("unresolved endpoint '{token}' at {context}: {reason}")]
    UnresolvedEndpoint { token: String, reason: String, context: String },

    /// A connection record is missing an endpoint or is not a mapping.
    #[error("malformed connection record at {context}: {reason}")]
    MalformedConnectionRecord { context: String, reason: String },

    /// A logical id mapped onto a DOT id that was already taken.
    #[error("identifier collision for '{key}': '{base}' already taken, using '{assigned}'")]
    IdentifierCollision { key: String, base: String, assigned: String },

    /// An edge referenced a node id that was never declared.
    #[error("dropped edge {from} -> {to}: endpoint not declared")]
    DanglingEdge { from: String, to: String },
}

impl ErrorCode for Diagnostic {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownSchema { .. } => "E_UNKNOWN_SCHEMA",
            Self::UnresolvedEndpoint { .. } => "E_UNRESOLVED_ENDPOINT",
            Self::MalformedConnectionRecord { .. } => "E_MALFORMED_CONNECTION",
            Self::IdentifierCollision { .. } => "E_IDENTIFIER_COLLISION",
            Self::DanglingEdge { .. } => "E_DANGLING_EDGE",
        }
    }
}

/// Short name of a JSON value's type for error messages.
#[must_use]
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
