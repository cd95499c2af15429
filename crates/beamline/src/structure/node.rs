//! Beamline nodes and their embedding records.

use std::f64::consts::PI;

use beamline_core::{
    descriptor::{BendParams, CorrectorParams, ElementKind, QuadParams, RfGapParams},
    geometry::Extent,
    identifier::Id,
};

/// Where an embedded node sits relative to the part it is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// At the exit of the part.
    After,
}

/// The kind of a node together with its type-specific parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Synthesized field-free filler.
    Drift,
    Quad(QuadParams),
    Bend(BendParams),
    RfGap(Box<RfGapParams>),
    CorrectorH(CorrectorParams),
    CorrectorV(CorrectorParams),
    /// A marker. `alias` keeps an unrecognised document type tag that was
    /// accepted as a marker.
    Marker { alias: Option<String> },
}

impl NodeKind {
    /// The type tag used in documents and reports.
    pub fn tag(&self) -> &str {
        match self {
            Self::Drift => "DRIFT",
            Self::Quad(_) => ElementKind::Quad.tag(),
            Self::Bend(_) => ElementKind::Bend.tag(),
            Self::RfGap(_) => ElementKind::RfGap.tag(),
            Self::CorrectorH(_) => ElementKind::CorrectorH.tag(),
            Self::CorrectorV(_) => ElementKind::CorrectorV.tag(),
            Self::Marker { alias: Some(alias) } => alias,
            Self::Marker { alias: None } => ElementKind::Marker.tag(),
        }
    }

    /// Quadrupoles and bends have a physical length; all other read kinds are
    /// points.
    pub fn is_thick(&self) -> bool {
        matches!(self, Self::Quad(_) | Self::Bend(_))
    }

    pub fn is_drift(&self) -> bool {
        matches!(self, Self::Drift)
    }
}

/// A beamline element placed in a sequence.
///
/// Positions are centers, local to the owning sequence. A node always has at
/// least one part; the part lengths sum to the node length.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    name: Id,
    kind: NodeKind,
    length: f64,
    position: f64,
    parts: Vec<f64>,
}

impl Node {
    pub(crate) fn new(name: Id, kind: NodeKind, length: f64, position: f64) -> Self {
        Self {
            name,
            kind,
            length,
            position,
            parts: vec![length],
        }
    }

    pub(crate) fn drift(name: Id, length: f64, position: f64) -> Self {
        Self::new(name, NodeKind::Drift, length, position)
    }

    pub fn name(&self) -> Id {
        self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Center position within the sequence.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// The physical extent `[center - length/2, center + length/2]`.
    pub fn extent(&self) -> Extent {
        Extent::from_center(self.position, self.length)
    }

    pub fn parts(&self) -> &[f64] {
        &self.parts
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Divide the node into `count` equal parts.
    pub(crate) fn set_part_count(&mut self, count: usize) {
        let count = count.max(1);
        self.parts = vec![self.length / count as f64; count];
    }

    pub(crate) fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    /// RF gap phase in radians.
    pub fn gap_phase(&self) -> Option<f64> {
        match &self.kind {
            NodeKind::RfGap(gap) => Some(gap.phase_deg * PI / 180.0),
            _ => None,
        }
    }

    /// Look up a scalar parameter by its document name.
    ///
    /// Quadrupoles answer `field` and its alias `dB/dr`; RF gaps answer
    /// `gap_phase` in radians next to the document's `phase` in degrees.
    pub fn param(&self, key: &str) -> Option<f64> {
        match &self.kind {
            NodeKind::Drift => None,
            NodeKind::Quad(quad) => match key {
                "field" | "dB/dr" => Some(quad.field),
                "aprt_type" => quad.aperture.as_ref().map(|a| a.shape as f64),
                "aperture" => quad.aperture.as_ref().map(|a| a.size),
                "radIn" => quad.pmq_radii.as_ref().map(|r| r.inner),
                "radOut" => quad.pmq_radii.as_ref().map(|r| r.outer),
                _ => None,
            },
            NodeKind::Bend(bend) => match key {
                "theta" => Some(bend.theta),
                "ea1" => Some(bend.ea1),
                "ea2" => Some(bend.ea2),
                "aprt_type" => bend.aperture.as_ref().map(|a| a.shape as f64),
                "aperture_x" => bend.aperture.as_ref().map(|a| a.x),
                "aperture_y" => bend.aperture.as_ref().map(|a| a.y),
                _ => None,
            },
            NodeKind::RfGap(gap) => match key {
                "E0TL" => Some(gap.e0tl),
                "E0L" => Some(gap.e0l),
                "mode" => Some(gap.mode),
                "phase" => Some(gap.phase_deg),
                "gap_phase" => self.gap_phase(),
                "beta_min" => Some(gap.ttf.beta_min),
                "beta_max" => Some(gap.ttf.beta_max),
                "aprt_type" => gap.aperture.as_ref().map(|a| a.shape as f64),
                "aperture" => gap.aperture.as_ref().map(|a| a.size),
                _ => None,
            },
            NodeKind::CorrectorH(corrector) | NodeKind::CorrectorV(corrector) => match key {
                "effLength" => Some(corrector.eff_length),
                "B" => corrector.field,
                _ => None,
            },
            NodeKind::Marker { .. } => None,
        }
    }
}

/// A thin node attached inside a thick node of the same sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedNode {
    node: Node,
    parent: usize,
    part_index: usize,
    placement: Placement,
}

impl EmbeddedNode {
    pub(crate) fn new(node: Node, parent: usize, part_index: usize, placement: Placement) -> Self {
        Self {
            node,
            parent,
            part_index,
            placement,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    /// Index of the parent in the sequence's top-level node list.
    pub fn parent(&self) -> usize {
        self.parent
    }

    pub fn part_index(&self) -> usize {
        self.part_index
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub(crate) fn set_parent(&mut self, parent: usize) {
        self.parent = parent;
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use beamline_core::descriptor::{Aperture, Multipoles};

    use super::*;

    fn quad(length: f64) -> Node {
        Node::new(
            Id::new("QH01"),
            NodeKind::Quad(QuadParams {
                field: -12.0,
                multipoles: Multipoles::default(),
                aperture: Some(Aperture {
                    shape: 1,
                    size: 0.02,
                }),
                pmq_radii: None,
            }),
            length,
            1.0,
        )
    }

    #[test]
    fn test_new_node_is_unsplit() {
        let node = quad(0.4);
        assert_eq!(node.part_count(), 1);
        assert_approx_eq!(f64, node.parts()[0], 0.4);
        assert_approx_eq!(f64, node.extent().start(), 0.8);
        assert_approx_eq!(f64, node.extent().end(), 1.2);
    }

    #[test]
    fn test_set_part_count() {
        let mut node = quad(3.0);
        node.set_part_count(4);
        assert_eq!(node.parts(), &[0.75, 0.75, 0.75, 0.75]);

        node.set_part_count(0);
        assert_eq!(node.part_count(), 1);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(NodeKind::Drift.tag(), "DRIFT");
        assert_eq!(quad(1.0).kind().tag(), "QUAD");
        assert_eq!(NodeKind::Marker { alias: None }.tag(), "MARKER");
        assert_eq!(
            NodeKind::Marker {
                alias: Some("BPM".to_string())
            }
            .tag(),
            "BPM"
        );
        assert!(quad(1.0).kind().is_thick());
        assert!(!NodeKind::Drift.is_thick());
        assert!(NodeKind::Drift.is_drift());
    }

    #[test]
    fn test_param_lookup() {
        let node = quad(0.1);
        assert_eq!(node.param("field"), Some(-12.0));
        assert_eq!(node.param("dB/dr"), Some(-12.0));
        assert_eq!(node.param("aperture"), Some(0.02));
        assert_eq!(node.param("radIn"), None);
        assert_eq!(node.gap_phase(), None);

        let corrector = Node::new(
            Id::new("DCH"),
            NodeKind::CorrectorH(CorrectorParams {
                eff_length: 0.05,
                field: None,
            }),
            0.0,
            0.5,
        );
        assert_eq!(corrector.param("effLength"), Some(0.05));
        assert_eq!(corrector.param("B"), None);
    }
}
