//! Runtime evaluation errors.
//!
//! # Error Categories
//!
//! - **Runtime errors**: failures of the current evaluation (an `NA` condition,
//!   an empty condition, an unbound name). They abort the evaluation, never
//!   the engine.
//!
//! - **Resource exceeded errors**: resource limit violations such as stack
//!   overflow.
//!
//! Specialization signals are not errors and never appear here; see
//! [`crate::evaluator::protocol`].

use thiserror::Error;

use crate::api::{Diagnostic, Severity};
use crate::syntax::{Span, Symbol};
use crate::tree::TreeError;
use crate::values::{EmptyExtent, Value};
use crate::{String, ToString};

/// Error raised by a node, with the span captured when the node was built.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}")]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionErrorKind {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    ResourceExceeded(#[from] ResourceExceeded),
}

/// Failures of the current evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("argument is of length zero")]
    EmptyExtent,

    #[error("missing value where TRUE/FALSE needed")]
    UnexpectedNa,

    #[error("object '{name}' not found")]
    UndefinedVariable { name: Symbol },

    #[error("could not find function \"{name}\"")]
    UndefinedFunction { name: Symbol },

    #[error("'{name}' is not a function")]
    NotAFunction { name: Symbol },

    #[error("invalid argument to {function}: {message}")]
    InvalidArgument { function: Symbol, message: String },

    #[error("error in {function}: {message}")]
    NativeCall { function: Symbol, message: String },

    /// A rewrite tried to splice a node that is not where it expected.
    #[error("internal error: {0}")]
    Internal(#[from] TreeError),

    /// A node was not of the kind its parent's rewrite rules rely on.
    #[error("internal error: unexpected {found} node")]
    UnexpectedNode { found: &'static str },
}

impl From<EmptyExtent> for RuntimeError {
    fn from(_: EmptyExtent) -> Self {
        RuntimeError::EmptyExtent
    }
}

/// Resource limit exceeded errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceExceeded {
    #[error("Evaluation stack overflow: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow { depth: usize, max_depth: usize },
}

impl ExecutionError {
    pub fn new(kind: impl Into<ExecutionErrorKind>, span: Span) -> Self {
        Self {
            kind: kind.into(),
            span,
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = match &self.kind {
            ExecutionErrorKind::Runtime(err) => match err {
                RuntimeError::EmptyExtent => "R001",
                RuntimeError::UnexpectedNa => "R002",
                RuntimeError::UndefinedVariable { .. } => "R003",
                RuntimeError::UndefinedFunction { .. } => "R004",
                RuntimeError::NotAFunction { .. } => "R005",
                RuntimeError::InvalidArgument { .. } => "R006",
                RuntimeError::NativeCall { .. } => "R007",
                RuntimeError::Internal(_) | RuntimeError::UnexpectedNode { .. } => "R999",
            },
            ExecutionErrorKind::ResourceExceeded(_) => "L001",
        };
        let help = match &self.kind {
            ExecutionErrorKind::Runtime(RuntimeError::UnexpectedNa) => {
                Some("use is.na() to test for missing values first".to_string())
            }
            _ => None,
        };
        Diagnostic {
            severity: Severity::Error,
            message: self.kind.to_string(),
            span: self.span.clone(),
            help,
            code: Some(code.to_string()),
        }
    }
}

/// Non-local exits out of a node's execution.
///
/// `return` travels the same channel as errors but is not one: the top-level
/// evaluation boundary turns it back into the program's value.
#[derive(Debug, Clone, PartialEq)]
pub enum Unwind {
    Error(ExecutionError),
    Return(Value),
}

impl From<ExecutionError> for Unwind {
    fn from(error: ExecutionError) -> Self {
        Unwind::Error(error)
    }
}
