//! Error and diagnostic system for lattice documents.
//!
//! Every problem found while reading or elaborating a document is reported as
//! a [`Diagnostic`]: a severity, an optional [`ErrorCode`], a message, labeled
//! source spans and optional help. One or more diagnostics are returned to the
//! caller wrapped in a [`ParseError`].
//!
//! # Example
//!
//! ```
//! # use beamline_parser::error::{Diagnostic, ErrorCode};
//! # use beamline_parser::Span;
//!
//! let diag = Diagnostic::error("element `QF1` has no `length` attribute")
//!     .with_code(ErrorCode::E100)
//!     .with_label(Span::new(120..160), "missing `length`")
//!     .with_help("add `length=\"0\"` for thin elements");
//! ```

mod collector;
mod diagnostic;
mod error_code;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;

use std::fmt;

/// A type alias for `Result<T, Diagnostic>`.
pub(crate) type Result<T> = std::result::Result<T, Diagnostic>;

/// Error type for reading a lattice document.
///
/// Wraps one or more error diagnostics, in the order they were found.
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(first) = self.diagnostics.first() {
            write!(f, "{first}")?;
            if self.diagnostics.len() > 1 {
                write!(f, " (+{} more)", self.diagnostics.len() - 1)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}
