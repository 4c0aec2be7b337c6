//! Error and diagnostic types.
//!
//! Most anomalies in block markup are recoverable and surface as
//! [`Diagnostic`]s next to the parsed blocks. [`ParseError`] is reserved for
//! inputs that exceed the configured resource limits.

use serde::Serialize;
use thiserror::Error;

use crate::types::Span;

/// Fatal parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("input is {len} bytes, larger than the {limit} byte limit")]
    InputTooLarge { len: usize, limit: usize },

    #[error("block nesting exceeds {limit} levels at byte {offset}")]
    NestingTooDeep { limit: usize, offset: usize },
}

/// Machine-readable kind of a recovered anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    /// The attribute payload was not a JSON object.
    MalformedAttrs,
    /// A closing delimiter with no open block of the same name.
    UnmatchedCloser,
    /// An opening delimiter that was closed implicitly.
    UnclosedBlock,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::MalformedAttrs => "malformed-attrs",
            DiagnosticCode::UnmatchedCloser => "unmatched-closer",
            DiagnosticCode::UnclosedBlock => "unclosed-block",
        }
    }
}

/// A non-fatal problem found while parsing. Every diagnostic is a warning:
/// the parse recovered and the blocks are still usable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            code,
            message: message.into(),
            span,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "warning[{}] {}..{}: {}",
            self.code.as_str(),
            self.span.start,
            self.span.end,
            self.message
        )
    }
}
