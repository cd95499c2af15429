//! Assembled sequences and their RF cavities.

use beamline_core::{descriptor::CavityDescriptor, geometry::Extent, identifier::Id};

use super::node::{EmbeddedNode, Node, NodeKind};

/// A named group of RF gaps sharing amplitude and frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct RfCavity {
    name: Id,
    amplitude: f64,
    frequency: f64,
    position: f64,
    phase: Option<f64>,
    gaps: Vec<Id>,
}

impl RfCavity {
    pub(crate) fn new(descriptor: &CavityDescriptor) -> Self {
        Self {
            name: descriptor.name,
            amplitude: descriptor.amplitude,
            frequency: descriptor.frequency,
            position: descriptor.position,
            phase: None,
            gaps: Vec::new(),
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Reference phase in radians, taken from the first gap in tracking
    /// order. `None` for a cavity without gaps.
    pub fn phase(&self) -> Option<f64> {
        self.phase
    }

    /// Member gap names in tracking order.
    pub fn gaps(&self) -> &[Id] {
        &self.gaps
    }

    /// Register a gap. The first registered gap sets the cavity phase.
    pub(crate) fn add_gap(&mut self, name: Id, phase: f64) {
        if self.gaps.is_empty() {
            self.phase = Some(phase);
        }
        self.gaps.push(name);
    }
}

/// One contiguous beamline section.
///
/// `nodes` is the final tracking order and tiles `[0, length]`. Embedded
/// nodes are kept separately, each naming its parent's index in `nodes`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    name: Id,
    length: f64,
    position: f64,
    bpm_frequency: Option<f64>,
    nodes: Vec<Node>,
    embedded: Vec<EmbeddedNode>,
    cavities: Vec<RfCavity>,
}

impl Sequence {
    pub(crate) fn new(
        name: Id,
        length: f64,
        bpm_frequency: Option<f64>,
        nodes: Vec<Node>,
        embedded: Vec<EmbeddedNode>,
        cavities: Vec<RfCavity>,
    ) -> Self {
        Self {
            name,
            length,
            position: 0.0,
            bpm_frequency,
            nodes,
            embedded,
            cavities,
        }
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Start of this sequence within the lattice.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// The sequence's span in lattice coordinates.
    pub fn extent(&self) -> Extent {
        Extent::new(self.position, self.position + self.length)
    }

    pub fn bpm_frequency(&self) -> Option<f64> {
        self.bpm_frequency
    }

    /// Top-level nodes in tracking order, drifts included.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn embedded(&self) -> &[EmbeddedNode] {
        &self.embedded
    }

    /// Nodes embedded in the top-level node at `index`, by part index.
    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &EmbeddedNode> {
        self.embedded
            .iter()
            .filter(move |child| child.parent() == index)
    }

    pub fn cavities(&self) -> &[RfCavity] {
        &self.cavities
    }

    pub fn cavity(&self, name: &str) -> Option<&RfCavity> {
        self.cavities.iter().find(|cavity| cavity.name() == name)
    }

    /// Find a node by name, top-level or embedded.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .chain(self.embedded.iter().map(EmbeddedNode::node))
            .find(|node| node.name() == name)
    }

    /// All nodes in tracking order: each top-level node followed by the
    /// nodes embedded in it.
    pub fn tracking_order(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().enumerate().flat_map(move |(index, node)| {
            std::iter::once(node).chain(self.children_of(index).map(EmbeddedNode::node))
        })
    }

    /// Number of synthesized drifts.
    pub fn drift_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node.kind(), NodeKind::Drift))
            .count()
    }

    pub(crate) fn set_position(&mut self, position: f64) {
        self.position = position;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Placement;

    fn marker(name: &str, position: f64) -> Node {
        Node::new(Id::new(name), NodeKind::Marker { alias: None }, 0.0, position)
    }

    #[test]
    fn test_cavity_phase_from_first_gap() {
        let mut cavity = RfCavity::new(&CavityDescriptor {
            name: Id::new("C1"),
            amplitude: 1.0,
            frequency: 402.5e6,
            position: 1.0,
        });
        assert_eq!(cavity.phase(), None);

        cavity.add_gap(Id::new("G1"), -0.5);
        cavity.add_gap(Id::new("G2"), 0.3);
        assert_eq!(cavity.phase(), Some(-0.5));
        assert_eq!(cavity.gaps().len(), 2);
        assert_eq!(cavity.gaps()[1], "G2");
    }

    #[test]
    fn test_children_and_tracking_order() {
        let nodes = vec![
            Node::drift(Id::new("S:START:1:drift"), 0.5, 0.25),
            Node::new(Id::new("A"), NodeKind::Drift, 0.5, 0.75),
        ];
        let embedded = vec![EmbeddedNode::new(marker("M", 1.0), 1, 0, Placement::After)];
        let sequence = Sequence::new(Id::new("S"), 1.0, None, nodes, embedded, Vec::new());

        assert_eq!(sequence.children_of(0).count(), 0);
        assert_eq!(sequence.children_of(1).count(), 1);
        let order: Vec<_> = sequence.tracking_order().map(Node::name).collect();
        assert_eq!(order.len(), 3);
        assert_eq!(order[2], "M");
        assert!(sequence.node("M").is_some());
        assert_eq!(sequence.drift_count(), 2);
    }
}
