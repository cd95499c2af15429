//! Assembled lattice structures.
//!
//! The types here are the output of assembly and are read-only to callers:
//!
//! - **Nodes**: typed beamline elements with their parts ([`Node`], [`NodeKind`])
//! - **Embedding**: thin nodes attached inside thick ones ([`EmbeddedNode`], [`Placement`])
//! - **Sequences**: one section's ordered nodes and RF cavities ([`Sequence`], [`RfCavity`])
//! - **Lattice**: the ordered concatenation of sequences ([`Lattice`], [`LatticeNode`])
//!
//! A [`Sequence`] owns all of its nodes. Embedded nodes are stored next to the
//! top-level list and refer to their parent by index.

mod lattice;
mod node;
mod sequence;

pub use lattice::{Lattice, LatticeNode};
pub use node::{EmbeddedNode, Node, NodeKind, Placement};
pub use sequence::{RfCavity, Sequence};
