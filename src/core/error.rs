use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A value did not match the shape a [`SchemaContract`](crate::core::contract::SchemaContract) declares.
///
/// `field` is a dotted path from the top-level value, e.g.
/// `bundleSuggestions[2].suggestedPrice`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field '{field}': expected {expected}, found {actual}")]
pub struct ValidationError {
    pub field: String,
    pub expected: String,
    pub actual: String,
}

impl ValidationError {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// A template placeholder had nothing to substitute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no value to render for placeholder '{field}'")]
pub struct RenderError {
    pub field: String,
}

/// Errors raised while putting contracts, templates and flows together.
///
/// These are programming errors in a flow definition; they surface at startup,
/// never during an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    #[error("duplicate field '{0}' in schema contract")]
    DuplicateField(String),

    #[error("invalid constraint on field '{field}': {reason}")]
    InvalidConstraint { field: String, reason: String },

    #[error("placeholder '{{{{{placeholder}}}}}' does not name an input field of flow '{flow}'")]
    UnresolvedPlaceholder { flow: String, placeholder: String },

    #[error("malformed template: {0}")]
    MalformedTemplate(String),

    #[error("flow '{flow}' is missing its {part}")]
    MissingPart { flow: String, part: &'static str },

    #[error("a flow named '{0}' is already registered")]
    DuplicateFlow(String),

    #[error("flow name cannot be empty")]
    EmptyName,
}

/// The four ways a flow invocation can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    /// The caller's value does not satisfy the input contract.
    InvalidInput,
    /// The template could not be rendered from a validated input.
    RenderFailure,
    /// The model service could not be reached, errored, or timed out.
    ModelUnavailable,
    /// The model answered, but not with something the output contract accepts.
    MalformedOutput,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidInput => "InvalidInput",
            FailureKind::RenderFailure => "RenderFailure",
            FailureKind::ModelUnavailable => "ModelUnavailable",
            FailureKind::MalformedOutput => "MalformedOutput",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure of a flow invocation.
///
/// `Display` shows only the message; the kind stays available for callers
/// that want to count or route failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FlowFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FlowFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidInput, message)
    }

    pub fn malformed_output(message: impl Into<String>) -> Self {
        Self::new(FailureKind::MalformedOutput, message)
    }
}
