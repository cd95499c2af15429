//! Command-line argument definitions for the beamline CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the input document and its sequences,
//! the optional regenerated output, configuration and logging verbosity.

use clap::Parser;

/// Command-line arguments for the beamline lattice tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input lattice document
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Sequences to assemble, in document order. Defaults to all of them.
    #[arg(short, long = "sequence")]
    pub sequences: Vec<String>,

    /// Write the assembled lattice back as a document to this path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the configured maximum drift length
    #[arg(long)]
    pub max_drift_length: Option<f64>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
