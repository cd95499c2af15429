//! Drift synthesis between and around sequence nodes.

use beamline_core::identifier::Id;

use super::{AssemblyError, ElementInfo, segment_count};
use crate::structure::Node;

const START_ANCHOR: &str = "START";
const DRIFT_SUFFIX: &str = "drift";

/// Gap filling for one sequence.
pub(crate) struct DriftSynthesizer {
    sequence: Id,
    length: f64,
    max_drift_length: f64,
    tolerance: f64,
}

/// The gap-free node list of a sequence.
#[derive(Debug)]
pub(crate) struct Tiling {
    pub nodes: Vec<Node>,
    /// Final index of each input node, in input order.
    pub anchor_indices: Vec<usize>,
}

impl DriftSynthesizer {
    pub fn new(sequence: Id, length: f64, max_drift_length: f64, tolerance: f64) -> Self {
        Self {
            sequence,
            length,
            max_drift_length,
            tolerance,
        }
    }

    /// Interleave drifts with `anchors` so that the result tiles
    /// `[0, length]`.
    ///
    /// `anchors` must be sorted by position. Fails if the first node starts
    /// before 0, the last ends past the sequence length, or two neighbors
    /// overlap by more than the tolerance.
    pub fn fill(&self, anchors: Vec<Node>) -> Result<Tiling, AssemblyError> {
        let mut nodes = Vec::with_capacity(anchors.len() * 2 + 1);
        let mut anchor_indices = Vec::with_capacity(anchors.len());

        let (Some(first), Some(last)) = (anchors.first(), anchors.last()) else {
            self.push_drifts(&mut nodes, START_ANCHOR, 0.0, self.length)?;
            return Ok(Tiling {
                nodes,
                anchor_indices,
            });
        };

        let start = first.extent().start();
        if start < -self.tolerance {
            return Err(AssemblyError::FirstNodeTooLong {
                sequence: self.sequence,
                element: ElementInfo::of_node(first),
                start,
            });
        }
        let end = last.extent().end();
        if end > self.length + self.tolerance {
            return Err(AssemblyError::LastNodeTooLong {
                sequence: self.sequence,
                element: ElementInfo::of_node(last),
                end,
                length: self.length,
            });
        }
        for window in anchors.windows(2) {
            let (current, next) = (&window[0], &window[1]);
            let gap = current.extent().gap_to(&next.extent());
            if gap < -self.tolerance {
                return Err(AssemblyError::Overlap {
                    sequence: self.sequence,
                    first: ElementInfo::of_node(current),
                    second: ElementInfo::of_node(next),
                    gap,
                });
            }
        }

        self.push_drifts(&mut nodes, START_ANCHOR, 0.0, start)?;
        let mut anchors = anchors.into_iter().peekable();
        while let Some(anchor) = anchors.next() {
            let name = anchor.name().to_text();
            let from = anchor.extent().end();
            let to = anchors
                .peek()
                .map_or(self.length, |next| next.extent().start());

            anchor_indices.push(nodes.len());
            nodes.push(anchor);
            self.push_drifts(&mut nodes, &name, from, to)?;
        }
        Ok(Tiling {
            nodes,
            anchor_indices,
        })
    }

    /// Append the drifts filling `[from, to]`, if the gap exceeds the
    /// tolerance.
    fn push_drifts(
        &self,
        nodes: &mut Vec<Node>,
        anchor: &str,
        from: f64,
        to: f64,
    ) -> Result<(), AssemblyError> {
        let gap = to - from;
        if gap <= self.tolerance {
            return Ok(());
        }

        let Some(count) = segment_count((gap / self.max_drift_length).floor() + 1.0) else {
            return Err(AssemblyError::TooManyDrifts {
                sequence: self.sequence,
                from,
                to,
                max_drift_length: self.max_drift_length,
            });
        };
        let length = gap / count as f64;
        let sequence = self.sequence.to_text();
        for index in 0..count {
            let number = (index + 1).to_string();
            let name = Id::join(&[&sequence, anchor, &number, DRIFT_SUFFIX]);
            let position = from + length * (index as f64 + 0.5);
            nodes.push(Node::drift(name, length, position));
        }
        Ok(())
    }
}
