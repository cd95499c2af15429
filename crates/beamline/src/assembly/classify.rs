//! Descriptor classification into typed nodes.

use log::warn;

use beamline_core::{
    descriptor::{ElementDescriptor, ElementKind, ElementParams},
    identifier::Id,
};

use super::{AssemblyError, ElementInfo};
use crate::structure::{Node, NodeKind};

impl ElementInfo {
    pub(crate) fn of_descriptor(descriptor: &ElementDescriptor) -> Self {
        Self {
            name: descriptor.name,
            kind: descriptor.type_tag.clone(),
            length: descriptor.length,
            position: descriptor.position,
        }
    }
}

/// Build the node for one descriptor of `sequence`.
///
/// Quadrupoles and bends must have a positive length; every other type,
/// including unrecognised ones, must have zero length. Unrecognised types
/// become markers.
pub(crate) fn classify(sequence: Id, descriptor: &ElementDescriptor) -> Result<Node, AssemblyError> {
    let element = || ElementInfo::of_descriptor(descriptor);

    let Some(position) = descriptor.position else {
        return Err(AssemblyError::MissingPosition {
            sequence,
            element: element(),
        });
    };

    let recognised = ElementKind::from_tag(&descriptor.type_tag).is_some();
    let is_thick = recognised && descriptor.kind().is_thick();

    if is_thick && descriptor.length <= 0.0 {
        return Err(AssemblyError::DegenerateThickElement {
            sequence,
            element: element(),
        });
    }
    if !is_thick && descriptor.length != 0.0 {
        return Err(AssemblyError::ThinElementLength {
            sequence,
            element: element(),
        });
    }

    let kind = match &descriptor.params {
        ElementParams::Quad(quad) => NodeKind::Quad(quad.clone()),
        ElementParams::Bend(bend) => NodeKind::Bend(bend.clone()),
        ElementParams::RfGap(gap) => NodeKind::RfGap(gap.clone()),
        ElementParams::CorrectorH(corrector) => NodeKind::CorrectorH(corrector.clone()),
        ElementParams::CorrectorV(corrector) => NodeKind::CorrectorV(corrector.clone()),
        ElementParams::Marker if recognised => NodeKind::Marker { alias: None },
        ElementParams::Marker => {
            warn!(
                sequence:% = sequence,
                name:% = descriptor.name,
                type_tag = descriptor.type_tag.as_str();
                "Unknown element type, treating it as a marker"
            );
            NodeKind::Marker {
                alias: Some(descriptor.type_tag.clone()),
            }
        }
    };

    Ok(Node::new(descriptor.name, kind, descriptor.length, position))
}
