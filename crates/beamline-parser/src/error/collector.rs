//! Collector for accumulating diagnostics during a processing phase.

use log::warn;

use crate::error::{Diagnostic, ParseError};

/// Accumulates diagnostics so one pass can report several problems.
///
/// Warnings never fail a pass; they are forwarded to the log when the
/// collector finishes.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Run `result`, emitting its error if it failed.
    pub fn check<T>(&mut self, result: Result<T, Diagnostic>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(diagnostic) => {
                self.emit(diagnostic);
                None
            }
        }
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection.
    ///
    /// Returns every error diagnostic if any was emitted; otherwise logs the
    /// warnings and returns `Ok(())`.
    pub fn finish(self) -> Result<(), ParseError> {
        if self.has_errors() {
            let errors = self
                .diagnostics
                .into_iter()
                .filter(|diag| diag.severity().is_error())
                .collect();
            return Err(ParseError::new(errors));
        }

        for diagnostic in &self.diagnostics {
            warn!(diagnostic:% = diagnostic; "Lattice document warning");
        }
        Ok(())
    }
}
