//! Unified error type for every failure mode of the engine.
//!
//! All tree-construction, lifecycle, scope, and typing failures are reported
//! through [`EvalError`]. Callers (and tests) classify errors with
//! [`EvalError::kind`] rather than matching on message text.
//!
//! Propagation policy: errors raised while finalizing a bracketed region are
//! converted into a recovery outcome by the builder (see `ast::recovery`);
//! everything else propagates to the caller and terminates the current
//! program or session unit.

use miette::Diagnostic;
use thiserror::Error;

/// Coarse classification of an [`EvalError`], mirroring the variant set.
///
/// Used by tests and callers that only care which family of failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed token stream: unknown token kind, brace mismatch, empty
    /// parens, wrong child arity or kind for a node variant.
    Structural,
    /// Missing parent scope, duplicate declaration, declaration misuse.
    Scope,
    /// Unsupported type-compatibility combination, member access on a
    /// disjunction, queries on the null type.
    Type,
    /// Inconsistent tree or lifecycle state; always fatal.
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Structural => "Structural",
            ErrorKind::Scope => "Scope",
            ErrorKind::Type => "Type",
            ErrorKind::Internal => "Internal",
        };
        write!(f, "{}", s)
    }
}

/// The single error type for the engine.
#[derive(Debug, Error, Diagnostic)]
pub enum EvalError {
    #[error("structural error: {message}")]
    #[diagnostic(code(arbor::structural))]
    Structural { message: String },

    #[error("scope error: {message}")]
    #[diagnostic(code(arbor::scope))]
    Scope { message: String },

    #[error("type error: {message}")]
    #[diagnostic(code(arbor::type_error))]
    Type { message: String },

    #[error("internal error: {message}")]
    #[diagnostic(code(arbor::internal))]
    Internal { message: String },
}

impl EvalError {
    pub fn structural(message: impl Into<String>) -> Self {
        EvalError::Structural {
            message: message.into(),
        }
    }

    pub fn scope(message: impl Into<String>) -> Self {
        EvalError::Scope {
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        EvalError::Type {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        EvalError::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::Structural { .. } => ErrorKind::Structural,
            EvalError::Scope { .. } => ErrorKind::Scope,
            EvalError::Type { .. } => ErrorKind::Type,
            EvalError::Internal { .. } => ErrorKind::Internal,
        }
    }
}
