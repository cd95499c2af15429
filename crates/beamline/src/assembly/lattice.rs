//! Ordering and concatenation of sequences into a lattice.

use log::{debug, info};

use beamline_core::descriptor::{LatticeDescriptor, SequenceDescriptor};

use super::{Assembler, AssemblyError};
use crate::structure::Lattice;

impl Assembler {
    /// Assemble the named sequences of `document` into one lattice.
    ///
    /// `names` must list sequences that sit next to each other in the
    /// document, in document order. Each sequence starts where the previous
    /// one ends.
    ///
    /// # Errors
    ///
    /// Fails if `names` is empty, names an unknown sequence, or is not a
    /// contiguous run of the document's sequences. Any sequence failure
    /// aborts the whole lattice.
    pub fn assemble(
        &self,
        document: &LatticeDescriptor,
        names: &[&str],
    ) -> Result<Lattice, AssemblyError> {
        let selected = select_sequences(document, names)?;
        info!(
            lattice:% = document.name,
            sequences = selected.len(),
            max_drift_length = self.max_drift_length();
            "Assembling lattice"
        );

        let mut sequences = Vec::with_capacity(selected.len());
        let mut start = 0.0;
        for descriptor in selected {
            let mut sequence = self.assemble_sequence(descriptor)?;
            sequence.set_position(start);
            debug!(
                sequence:% = sequence.name(),
                start = start;
                "Placed sequence"
            );
            start += sequence.length();
            sequences.push(sequence);
        }

        let lattice = Lattice::new(document.name, sequences);
        info!(
            lattice:% = lattice.name(),
            length = lattice.length();
            "Lattice assembled"
        );
        Ok(lattice)
    }
}

/// Resolve `names` to a contiguous run of the document's sequences.
fn select_sequences<'a>(
    document: &'a LatticeDescriptor,
    names: &[&str],
) -> Result<&'a [SequenceDescriptor], AssemblyError> {
    let available = || {
        document
            .sequences
            .iter()
            .map(|sequence| sequence.name.to_text())
            .collect::<Vec<_>>()
    };

    if names.is_empty() {
        return Err(AssemblyError::EmptySequenceList);
    }

    let mut indices = Vec::with_capacity(names.len());
    for name in names {
        let Some(index) = document
            .sequences
            .iter()
            .position(|sequence| sequence.name == *name)
        else {
            return Err(AssemblyError::UnknownSequence {
                name: name.to_string(),
                available: available(),
            });
        };
        indices.push(index);
    }

    let start = indices[0];
    let contiguous = indices
        .iter()
        .enumerate()
        .all(|(offset, index)| *index == start + offset);
    if !contiguous {
        return Err(AssemblyError::SequenceOrder {
            requested: names.iter().map(|name| name.to_string()).collect(),
            available: available(),
        });
    }

    debug!(requested:? = names, start = start; "Selected sequences");
    Ok(&document.sequences[start..start + names.len()])
}
