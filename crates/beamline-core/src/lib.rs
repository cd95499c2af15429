//! Beamline Core Types and Definitions
//!
//! This crate provides the foundational types shared by the beamline parser
//! and the lattice assembler. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Longitudinal extents and the zero-distance tolerance ([`geometry`] module)
//! - **Descriptors**: Typed element, cavity and sequence records ([`descriptor`] module)

pub mod descriptor;
pub mod geometry;
pub mod identifier;
