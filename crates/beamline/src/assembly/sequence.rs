//! Assembly of a single sequence.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace};

use beamline_core::{descriptor::SequenceDescriptor, identifier::Id};

use super::{
    Assembler, AssemblyError, ElementInfo, classify::classify, drift::DriftSynthesizer,
    embed::locate, split::split,
};
use crate::structure::{EmbeddedNode, Node, NodeKind, Placement, RfCavity, Sequence};

/// A node waiting for drift synthesis, with its index in the thick list if
/// it is thick.
struct Anchor {
    node: Node,
    thick: Option<usize>,
}

impl Assembler {
    /// Assemble one sequence from its descriptor.
    ///
    /// The result starts at position 0; [`Assembler::assemble`] moves it to
    /// its place in the lattice.
    ///
    /// # Errors
    ///
    /// Returns the first [`AssemblyError`] met. Nothing is returned for a
    /// sequence that fails.
    pub fn assemble_sequence(
        &self,
        descriptor: &SequenceDescriptor,
    ) -> Result<Sequence, AssemblyError> {
        let sequence = descriptor.name;
        debug!(
            sequence:% = sequence,
            length = descriptor.length,
            elements = descriptor.elements.len();
            "Assembling sequence"
        );

        check_unique_names(descriptor)?;

        let mut cavities: IndexMap<Id, RfCavity> = descriptor
            .cavities
            .iter()
            .map(|cavity| (cavity.name, RfCavity::new(cavity)))
            .collect();

        let mut nodes = Vec::with_capacity(descriptor.elements.len());
        for element in &descriptor.elements {
            let node = classify(sequence, element)?;
            if let NodeKind::RfGap(gap) = node.kind() {
                if !cavities.contains_key(&gap.cavity) {
                    return Err(AssemblyError::UnknownCavity {
                        sequence,
                        cavity: gap.cavity,
                        element: ElementInfo::of_descriptor(element),
                    });
                }
            }
            nodes.push(node);
        }
        // Stable, so equal positions keep document order.
        nodes.sort_by(|a, b| a.position().total_cmp(&b.position()));

        let (mut thick, thin): (Vec<Node>, Vec<Node>) =
            nodes.into_iter().partition(|node| node.kind().is_thick());
        for node in &mut thick {
            split(sequence, node, self.max_drift_length())?;
            trace!(
                name:% = node.name(),
                length = node.length(),
                parts = node.part_count();
                "Split thick node"
            );
        }

        let mut embedded = Vec::new();
        let mut standalone = Vec::new();
        for mut node in thin {
            match locate(node.position(), &thick, self.tolerance()) {
                Some(location) => {
                    trace!(
                        name:% = node.name(),
                        parent:% = thick[location.thick].name(),
                        part = location.part_index,
                        position = location.position;
                        "Embedding thin node"
                    );
                    node.set_position(location.position);
                    embedded.push(EmbeddedNode::new(
                        node,
                        location.thick,
                        location.part_index,
                        Placement::After,
                    ));
                }
                None => standalone.push(node),
            }
        }

        let mut anchors: Vec<Anchor> = thick
            .into_iter()
            .enumerate()
            .map(|(index, node)| Anchor {
                node,
                thick: Some(index),
            })
            .chain(
                standalone
                    .into_iter()
                    .map(|node| Anchor { node, thick: None }),
            )
            .collect();
        anchors.sort_by(|a, b| a.node.position().total_cmp(&b.node.position()));

        let thick_slots: Vec<(usize, usize)> = anchors
            .iter()
            .enumerate()
            .filter_map(|(slot, anchor)| anchor.thick.map(|thick| (thick, slot)))
            .collect();

        let tiling = DriftSynthesizer::new(
            sequence,
            descriptor.length,
            self.max_drift_length(),
            self.tolerance(),
        )
        .fill(anchors.into_iter().map(|anchor| anchor.node).collect())?;
        check_unique_nodes(sequence, &tiling.nodes, &embedded)?;

        let mut parents = vec![0; thick_slots.len()];
        for (thick, slot) in thick_slots {
            parents[thick] = tiling.anchor_indices[slot];
        }
        for child in &mut embedded {
            child.set_parent(parents[child.parent()]);
        }
        // Group children by parent so tracking order follows the node list.
        embedded.sort_by_key(EmbeddedNode::parent);

        register_gaps(&tiling.nodes, &embedded, &mut cavities);

        let sequence = Sequence::new(
            sequence,
            descriptor.length,
            descriptor.bpm_frequency,
            tiling.nodes,
            embedded,
            cavities.into_values().collect(),
        );
        debug!(
            sequence:% = sequence.name(),
            nodes = sequence.nodes().len(),
            embedded = sequence.embedded().len(),
            drifts = sequence.drift_count();
            "Sequence assembled"
        );
        Ok(sequence)
    }
}

fn check_unique_names(descriptor: &SequenceDescriptor) -> Result<(), AssemblyError> {
    let mut seen = HashSet::with_capacity(descriptor.elements.len());
    for element in &descriptor.elements {
        if !seen.insert(element.name) {
            return Err(AssemblyError::DuplicateName {
                sequence: descriptor.name,
                name: element.name,
            });
        }
    }
    Ok(())
}

/// Synthesized drift names must not repeat or shadow an element name.
fn check_unique_nodes(
    sequence: Id,
    nodes: &[Node],
    embedded: &[EmbeddedNode],
) -> Result<(), AssemblyError> {
    let mut seen = HashSet::with_capacity(nodes.len() + embedded.len());
    let all = nodes.iter().chain(embedded.iter().map(EmbeddedNode::node));
    for node in all {
        if !seen.insert(node.name()) {
            return Err(AssemblyError::DuplicateName {
                sequence,
                name: node.name(),
            });
        }
    }
    Ok(())
}

/// Register every RF gap with its cavity, in tracking order.
fn register_gaps(nodes: &[Node], embedded: &[EmbeddedNode], cavities: &mut IndexMap<Id, RfCavity>) {
    let tracking = nodes.iter().enumerate().flat_map(|(index, node)| {
        std::iter::once(node).chain(
            embedded
                .iter()
                .filter(move |child| child.parent() == index)
                .map(EmbeddedNode::node),
        )
    });
    for node in tracking {
        let (NodeKind::RfGap(gap), Some(phase)) = (node.kind(), node.gap_phase()) else {
            continue;
        };
        if let Some(cavity) = cavities.get_mut(&gap.cavity) {
            cavity.add_gap(node.name(), phase);
        }
    }
}
