//! The assembled lattice and lattice-wide queries.

use beamline_core::identifier::Id;

use super::{
    node::{Node, NodeKind},
    sequence::Sequence,
};

/// A node together with the sequence that owns it.
#[derive(Debug, Clone, Copy)]
pub struct LatticeNode<'a> {
    sequence: &'a Sequence,
    node: &'a Node,
}

impl<'a> LatticeNode<'a> {
    pub fn sequence(&self) -> &'a Sequence {
        self.sequence
    }

    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// Center position in lattice coordinates.
    pub fn global_position(&self) -> f64 {
        self.sequence.position() + self.node.position()
    }
}

/// An ordered concatenation of sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    name: Id,
    sequences: Vec<Sequence>,
}

impl Lattice {
    pub(crate) fn new(name: Id, sequences: Vec<Sequence>) -> Self {
        Self { name, sequences }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn sequence(&self, name: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|sequence| sequence.name() == name)
    }

    /// Total length, the sum of the sequence lengths.
    pub fn length(&self) -> f64 {
        self.sequences.iter().map(Sequence::length).sum()
    }

    /// Top-level nodes of every sequence, in tracking order.
    pub fn nodes(&self) -> impl Iterator<Item = LatticeNode<'_>> {
        self.sequences.iter().flat_map(|sequence| {
            sequence
                .nodes()
                .iter()
                .map(move |node| LatticeNode { sequence, node })
        })
    }

    /// Every node, embedded ones included, in tracking order.
    pub fn all_nodes(&self) -> impl Iterator<Item = LatticeNode<'_>> {
        self.sequences.iter().flat_map(|sequence| {
            sequence
                .tracking_order()
                .map(move |node| LatticeNode { sequence, node })
        })
    }

    pub fn rf_gaps(&self) -> impl Iterator<Item = LatticeNode<'_>> {
        self.all_nodes()
            .filter(|entry| matches!(entry.node().kind(), NodeKind::RfGap(_)))
    }

    pub fn quads(&self) -> impl Iterator<Item = LatticeNode<'_>> {
        self.all_nodes()
            .filter(|entry| matches!(entry.node().kind(), NodeKind::Quad(_)))
    }

    /// Find a node by sequence and node name.
    pub fn find(&self, sequence: &str, node: &str) -> Option<LatticeNode<'_>> {
        let sequence = self.sequence(sequence)?;
        let node = sequence.node(node)?;
        Some(LatticeNode { sequence, node })
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn drift_sequence(name: &str, length: f64, start: f64) -> Sequence {
        let drift = Node::drift(Id::new(&format!("{name}:START:1:drift")), length, length / 2.0);
        let mut sequence = Sequence::new(
            Id::new(name),
            length,
            None,
            vec![drift],
            Vec::new(),
            Vec::new(),
        );
        sequence.set_position(start);
        sequence
    }

    #[test]
    fn test_length_and_lookup() {
        let lattice = Lattice::new(
            Id::new("L"),
            vec![drift_sequence("A", 1.5, 0.0), drift_sequence("B", 2.0, 1.5)],
        );

        assert_approx_eq!(f64, lattice.length(), 3.5);
        assert!(lattice.sequence("B").is_some());
        assert!(lattice.sequence("C").is_none());
        assert_eq!(lattice.nodes().count(), 2);
        assert_eq!(lattice.quads().count(), 0);
    }

    #[test]
    fn test_global_position() {
        let lattice = Lattice::new(
            Id::new("L"),
            vec![drift_sequence("A", 1.5, 0.0), drift_sequence("B", 2.0, 1.5)],
        );

        let entry = lattice.find("B", "B:START:1:drift").unwrap();
        assert_approx_eq!(f64, entry.node().position(), 1.0);
        assert_approx_eq!(f64, entry.global_position(), 2.5);
    }
}
