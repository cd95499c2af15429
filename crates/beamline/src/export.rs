//! Reverse mapping from an assembled lattice to descriptors.
//!
//! Drifts are synthesized by assembly and are not written back. Embedded
//! nodes are emitted after their parent at their snapped positions, so
//! assembling the result again reproduces the same node list.

use beamline_core::descriptor::{
    CavityDescriptor, ElementDescriptor, ElementParams, LatticeDescriptor, SequenceDescriptor,
};

use crate::structure::{Lattice, Node, NodeKind, RfCavity, Sequence};

/// Type-specific parameters of a node, or `None` for a drift.
fn element_params(kind: &NodeKind) -> Option<ElementParams> {
    let params = match kind {
        NodeKind::Drift => return None,
        NodeKind::Quad(quad) => ElementParams::Quad(quad.clone()),
        NodeKind::Bend(bend) => ElementParams::Bend(bend.clone()),
        NodeKind::RfGap(gap) => ElementParams::RfGap(gap.clone()),
        NodeKind::CorrectorH(corrector) => ElementParams::CorrectorH(corrector.clone()),
        NodeKind::CorrectorV(corrector) => ElementParams::CorrectorV(corrector.clone()),
        NodeKind::Marker { .. } => ElementParams::Marker,
    };
    Some(params)
}

fn element_descriptor(node: &Node) -> Option<ElementDescriptor> {
    let params = element_params(node.kind())?;
    let mut descriptor =
        ElementDescriptor::new(node.name(), node.length(), Some(node.position()), params);
    // Keeps unrecognised tags that were read as markers.
    descriptor.type_tag = node.kind().tag().to_string();
    Some(descriptor)
}

fn cavity_descriptor(cavity: &RfCavity) -> CavityDescriptor {
    CavityDescriptor {
        name: cavity.name(),
        amplitude: cavity.amplitude(),
        frequency: cavity.frequency(),
        position: cavity.position(),
    }
}

fn sequence_descriptor(sequence: &Sequence) -> SequenceDescriptor {
    let mut descriptor = SequenceDescriptor::new(sequence.name(), sequence.length());
    descriptor.bpm_frequency = sequence.bpm_frequency();
    descriptor.cavities = sequence.cavities().iter().map(cavity_descriptor).collect();
    descriptor.elements = sequence
        .tracking_order()
        .filter_map(element_descriptor)
        .collect();
    descriptor
}

impl From<&Lattice> for LatticeDescriptor {
    fn from(lattice: &Lattice) -> Self {
        Self {
            name: lattice.name(),
            sequences: lattice.sequences().iter().map(sequence_descriptor).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use beamline_core::{
        descriptor::{Multipoles, QuadParams},
        identifier::Id,
    };

    use super::*;
    use crate::assembly::Assembler;

    fn document() -> LatticeDescriptor {
        let mut sequence = SequenceDescriptor::new(Id::new("S"), 3.0);
        sequence.bpm_frequency = Some(402.5e6);
        sequence.elements = vec![
            ElementDescriptor::new(
                Id::new("Q1"),
                2.4,
                Some(1.5),
                ElementParams::Quad(QuadParams {
                    field: 3.0,
                    multipoles: Multipoles::default(),
                    aperture: None,
                    pmq_radii: None,
                }),
            ),
            ElementDescriptor::new(Id::new("M1"), 0.0, Some(1.45), ElementParams::Marker),
        ];
        let mut bpm = ElementDescriptor::new(Id::new("BPM1"), 0.0, Some(2.9), ElementParams::Marker);
        bpm.type_tag = "BPM".to_string();
        sequence.elements.push(bpm);

        let mut document = LatticeDescriptor::new(Id::new("L"));
        document.sequences.push(sequence);
        document
    }

    #[test]
    fn test_drifts_are_skipped() {
        let lattice = Assembler::default().assemble(&document(), &["S"]).unwrap();
        let exported = LatticeDescriptor::from(&lattice);

        let names: Vec<_> = exported.sequences[0]
            .elements
            .iter()
            .map(|element| element.name.to_text())
            .collect();
        assert_eq!(names, ["Q1", "M1", "BPM1"]);
        assert_eq!(exported.sequences[0].bpm_frequency, Some(402.5e6));
    }

    #[test]
    fn test_children_keep_snapped_positions() {
        let lattice = Assembler::default().assemble(&document(), &["S"]).unwrap();
        let exported = LatticeDescriptor::from(&lattice);

        // Q1 spans 0.3..2.7 in four parts of 0.6; M1 snaps to 1.5.
        let marker = &exported.sequences[0].elements[1];
        let position = marker.position.unwrap();
        assert!((position - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_tags_are_kept() {
        let lattice = Assembler::default().assemble(&document(), &["S"]).unwrap();
        let exported = LatticeDescriptor::from(&lattice);
        assert_eq!(exported.sequences[0].elements[2].type_tag, "BPM");
    }
}
