//! Attaching thin nodes inside thick nodes.

use crate::structure::Node;

/// Where a thin node lands inside a thick node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Location {
    /// Index into the thick node list.
    pub thick: usize,
    pub part_index: usize,
    /// The part boundary the thin node snaps to.
    pub position: f64,
}

/// Find the thick node and part that contain `position`.
///
/// Thick nodes are scanned in order and the first whose extent contains the
/// position, both ends inclusive within `tolerance`, wins. Inside it the
/// parts are walked from the entrance; the first cumulative boundary at or
/// beyond the position, within `tolerance`, gives the part index and the
/// snapped position.
pub(crate) fn locate(position: f64, thick: &[Node], tolerance: f64) -> Option<Location> {
    let (index, node) = thick
        .iter()
        .enumerate()
        .find(|(_, node)| node.extent().contains(position, tolerance))?;

    let start = node.extent().start();
    let delta = position - start;
    let mut boundary = 0.0;
    for (part_index, part) in node.parts().iter().enumerate() {
        boundary += part;
        if delta <= boundary + tolerance {
            return Some(Location {
                thick: index,
                part_index,
                position: start + boundary,
            });
        }
    }

    // The extent check admits up to `tolerance` past the exit, which the last
    // boundary already covers; reaching this point needs rounding in the sum.
    let last = node.part_count() - 1;
    Some(Location {
        thick: index,
        part_index: last,
        position: node.extent().end(),
    })
}
