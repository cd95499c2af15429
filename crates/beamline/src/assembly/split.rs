//! Splitting thick nodes into equal parts.

use beamline_core::identifier::Id;

use super::{AssemblyError, ElementInfo, segment_count};
use crate::structure::{Node, NodeKind};

/// Guard against a quotient that lands a hair above an integer boundary.
const ROUNDING_GUARD: f64 = 1.0e-12;

/// Number of equal parts for a thick node of `length`.
///
/// Quadrupoles are split symmetrically about their center, so their count is
/// even and the rule applies to half the length. Bends only need each part
/// within `max_length`. Nodes within the bound stay in one part. Returns
/// `None` when the count exceeds [`MAX_SEGMENTS`](super::MAX_SEGMENTS).
pub(crate) fn part_count(kind: &NodeKind, length: f64, max_length: f64) -> Option<usize> {
    match kind {
        NodeKind::Quad(_) if 0.5 * length > max_length => {
            segment_count(2.0 * (0.5 * length / max_length + 1.5 - ROUNDING_GUARD).floor())
        }
        NodeKind::Bend(_) if length > max_length => {
            segment_count((length / max_length + 1.5 - ROUNDING_GUARD).floor())
        }
        _ => Some(1),
    }
}

/// Divide a thick node into parts no longer than `max_length`.
pub(crate) fn split(
    sequence: Id,
    node: &mut Node,
    max_length: f64,
) -> Result<(), AssemblyError> {
    let Some(count) = part_count(node.kind(), node.length(), max_length) else {
        return Err(AssemblyError::TooManyParts {
            sequence,
            element: ElementInfo::of_node(node),
            max_drift_length: max_length,
        });
    };
    node.set_part_count(count);
    Ok(())
}
