//! Lattice assembly.
//!
//! Turns element descriptors into gap-free sequences and concatenates them
//! into a [`Lattice`](crate::structure::Lattice). Per sequence the pipeline is:
//!
//! 1. `classify` - build a typed node from each descriptor, rejecting
//!    degenerate thick and non-zero-length thin elements
//! 2. `split` - divide thick nodes into equal parts no longer than the
//!    maximum drift length
//! 3. `embed` - attach thin nodes inside the thick node that contains them
//! 4. `drift` - fill every gap with drifts and reject overlaps
//!
//! `sequence` drives these steps for one section and `lattice` orders and
//! joins sections. Every failure aborts the whole assembly.

mod classify;
mod drift;
mod embed;
mod lattice;
mod sequence;
mod split;

use std::fmt;

use thiserror::Error;

use beamline_core::{geometry::ZERO_DISTANCE, identifier::Id};

use crate::{config::AssemblyConfig, structure::Node};

/// Identification of the element an assembly error is about.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementInfo {
    pub name: Id,
    /// Type tag as written in the document, or `DRIFT`.
    pub kind: String,
    pub length: f64,
    pub position: Option<f64>,
}

impl ElementInfo {
    pub(crate) fn of_node(node: &Node) -> Self {
        Self {
            name: node.name(),
            kind: node.kind().tag().to_string(),
            length: node.length(),
            position: Some(node.position()),
        }
    }
}

impl fmt::Display for ElementInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` (type {}, length {}, position ",
            self.name, self.kind, self.length
        )?;
        match self.position {
            Some(position) => write!(f, "{position})"),
            None => write!(f, "missing)"),
        }
    }
}

/// A fatal assembly failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error("no sequence names were given")]
    EmptySequenceList,

    #[error("sequence `{name}` not found; available sequences: {}", .available.join(", "))]
    UnknownSequence { name: String, available: Vec<String> },

    #[error(
        "sequences [{}] are not contiguous in document order [{}]",
        .requested.join(", "),
        .available.join(", ")
    )]
    SequenceOrder {
        requested: Vec<String>,
        available: Vec<String>,
    },

    #[error("in sequence `{sequence}`: thick element {element} has zero length")]
    DegenerateThickElement { sequence: Id, element: ElementInfo },

    #[error("in sequence `{sequence}`: thin element {element} must have zero length")]
    ThinElementLength { sequence: Id, element: ElementInfo },

    #[error("in sequence `{sequence}`: element {element} has no position")]
    MissingPosition { sequence: Id, element: ElementInfo },

    #[error("in sequence `{sequence}`: RF gap {element} refers to unknown cavity `{cavity}`")]
    UnknownCavity {
        sequence: Id,
        cavity: Id,
        element: ElementInfo,
    },

    #[error("in sequence `{sequence}`: first node {element} starts before the sequence, at {start}")]
    FirstNodeTooLong {
        sequence: Id,
        element: ElementInfo,
        start: f64,
    },

    #[error(
        "in sequence `{sequence}`: last node {element} ends at {end}, past the sequence length {length}"
    )]
    LastNodeTooLong {
        sequence: Id,
        element: ElementInfo,
        end: f64,
        length: f64,
    },

    #[error("in sequence `{sequence}`: nodes {first} and {second} overlap (gap {gap})")]
    Overlap {
        sequence: Id,
        first: ElementInfo,
        second: ElementInfo,
        gap: f64,
    },

    #[error("in sequence `{sequence}`: element name `{name}` is used more than once")]
    DuplicateName { sequence: Id, name: Id },

    #[error("maximum drift length must be a positive finite number, got {0}")]
    InvalidMaxDriftLength(f64),

    #[error(
        "in sequence `{sequence}`: filling {from}..{to} needs more than {} drifts \
         of at most {max_drift_length}",
        MAX_SEGMENTS
    )]
    TooManyDrifts {
        sequence: Id,
        from: f64,
        to: f64,
        max_drift_length: f64,
    },

    #[error(
        "in sequence `{sequence}`: splitting {element} needs more than {} parts \
         of at most {max_drift_length}",
        MAX_SEGMENTS
    )]
    TooManyParts {
        sequence: Id,
        element: ElementInfo,
        max_drift_length: f64,
    },
}

/// Largest number of drifts filling one gap, and of parts of one thick node.
pub const MAX_SEGMENTS: usize = 100_000;

/// Convert a whole-number segment count, rejecting counts above
/// [`MAX_SEGMENTS`].
pub(crate) fn segment_count(count: f64) -> Option<usize> {
    if count.is_finite() && (1.0..=MAX_SEGMENTS as f64).contains(&count) {
        Some(count as usize)
    } else {
        None
    }
}

/// Assembles sequences and lattices from descriptors.
///
/// Holds the maximum drift length `D`, which bounds synthesized drifts and
/// the parts of split thick nodes, and the zero-distance tolerance.
#[derive(Debug, Clone)]
pub struct Assembler {
    max_drift_length: f64,
    tolerance: f64,
}

impl Assembler {
    /// Create an assembler with the given maximum drift length.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidMaxDriftLength`] unless the length is
    /// positive and finite.
    pub fn new(max_drift_length: f64) -> Result<Self, AssemblyError> {
        let mut assembler = Self {
            max_drift_length: 1.0,
            tolerance: ZERO_DISTANCE,
        };
        assembler.set_max_drift_length(max_drift_length)?;
        Ok(assembler)
    }

    pub fn from_config(config: &AssemblyConfig) -> Result<Self, AssemblyError> {
        Self::new(config.max_drift_length())
    }

    pub fn max_drift_length(&self) -> f64 {
        self.max_drift_length
    }

    pub fn set_max_drift_length(&mut self, max_drift_length: f64) -> Result<(), AssemblyError> {
        if !(max_drift_length.is_finite() && max_drift_length > 0.0) {
            return Err(AssemblyError::InvalidMaxDriftLength(max_drift_length));
        }
        self.max_drift_length = max_drift_length;
        Ok(())
    }

    /// Distance below which two positions are considered equal.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Default for Assembler {
    fn default() -> Self {
        Self {
            max_drift_length: crate::config::DEFAULT_MAX_DRIFT_LENGTH,
            tolerance: ZERO_DISTANCE,
        }
    }
}
