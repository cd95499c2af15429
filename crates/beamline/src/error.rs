//! Error types for beamline operations.
//!
//! This module provides the main error type [`BeamlineError`] which wraps
//! the error conditions of reading documents and assembling lattices.

use std::io;

use thiserror::Error;

use beamline_parser::ParseError;

use crate::assembly::AssemblyError;

/// The main error type for beamline operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the document text next to the diagnostics so
/// reporters can point into the source.
#[derive(Debug, Error)]
pub enum BeamlineError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BeamlineError {
    /// Create a new `Parse` error with the associated document text.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }
}
