//! Public error types for the engine API.
//!
//! Internal errors are converted to these types at the API boundary. Every
//! error that points into the source carries a [`Diagnostic`] so hosts can
//! render it with its location.

use core::fmt;

use crate::syntax::Span;
use crate::tree::TreeError;
use crate::{String, Vec, format};

/// Public error type for all engine operations.
#[derive(Debug)]
pub enum Error {
    /// Invalid API usage, or an internal failure outside of any evaluation.
    Api(String),

    /// Parse errors. Contains one or more diagnostics with source locations.
    Compilation { diagnostics: Vec<Diagnostic> },

    /// An evaluation failed (e.g. an `NA` condition, an unbound name).
    Runtime { diagnostic: Diagnostic },

    /// Resource limits exceeded (e.g. evaluation depth).
    ResourceExceeded(String),
}

impl Error {
    /// The diagnostics carried by this error, if any.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Error::Compilation { diagnostics } => diagnostics,
            Error::Runtime { diagnostic } => core::slice::from_ref(diagnostic),
            Error::Api(_) | Error::ResourceExceeded(_) => &[],
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Api(msg) => write!(f, "API error: {}", msg),
            Error::Compilation { diagnostics } => {
                let error_count = diagnostics
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .count();
                write!(f, "Compilation failed with {} error(s)", error_count)
            }
            Error::Runtime { diagnostic } => write!(f, "Runtime error: {}", diagnostic.message),
            Error::ResourceExceeded(msg) => write!(f, "Resource limit exceeded: {}", msg),
        }
    }
}

impl core::error::Error for Error {}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Optional code (e.g. "R002") for documentation lookup.
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

// ============================================================================
// Conversion from internal errors
// ============================================================================

impl From<crate::parser::ParseError> for Error {
    fn from(err: crate::parser::ParseError) -> Self {
        Error::Compilation {
            diagnostics: crate::Vec::from([err.to_diagnostic()]),
        }
    }
}

impl From<crate::evaluator::ExecutionError> for Error {
    fn from(err: crate::evaluator::ExecutionError) -> Self {
        use crate::evaluator::ExecutionErrorKind;
        match &err.kind {
            ExecutionErrorKind::ResourceExceeded(res_err) => {
                Error::ResourceExceeded(format!("{}", res_err))
            }
            ExecutionErrorKind::Runtime(_) => Error::Runtime {
                diagnostic: err.to_diagnostic(),
            },
        }
    }
}

impl From<TreeError> for Error {
    fn from(err: TreeError) -> Self {
        Error::Api(format!("{}", err))
    }
}
