//! # Beamline Parser
//!
//! Reader and writer for lattice documents. A lattice document is a small
//! XML dialect: the root element names the lattice, its children are
//! sequences, and each sequence lists positioned `<accElement>` records.
//!
//! ## Usage
//!
//! ```
//! # use beamline_parser::{parse, ParseError};
//!
//! fn main() -> Result<(), ParseError> {
//!     let source = r#"
//!         <LINAC>
//!           <MEBT length="1.0">
//!             <accElement name="M1" type="MARKER" length="0" pos="0.5"/>
//!           </MEBT>
//!         </LINAC>
//!     "#;
//!
//!     let lattice = parse(source)?;
//!     assert_eq!(lattice.sequences.len(), 1);
//!     Ok(())
//! }
//! ```

mod document;
mod elaborate;
pub mod error;
mod markup;
mod span;
mod values;
mod writer;

pub use document::{Attribute, Element};
pub use error::ParseError;
pub use span::{Span, Spanned};
pub use values::ValueError;

use log::debug;

use beamline_core::descriptor::LatticeDescriptor;

/// Read the element tree of a document without interpreting it.
pub fn parse_document(source: &str) -> Result<Element, ParseError> {
    let items = markup::tokenize(source)?;
    debug!(items = items.len(); "Document tokenized");
    document::build(items)
}

/// Parse document text into a lattice descriptor.
///
/// Runs the whole reading pipeline:
///
/// 1. **Tokenize** - split the text into tags, text and skipped markup
/// 2. **Build** - check nesting and decode attributes into an element tree
/// 3. **Elaborate** - turn sequences, cavities and element records into
///    typed descriptors
///
/// # Errors
///
/// Returns a [`ParseError`] holding every error found by the first failing
/// phase.
pub fn parse(source: &str) -> Result<LatticeDescriptor, ParseError> {
    let root = parse_document(source)?;
    elaborate::elaborate(&root)
}

/// Write a lattice descriptor as document text.
///
/// The output reads back through [`parse`] to an equal descriptor.
pub fn write_document(lattice: &LatticeDescriptor) -> String {
    writer::render(&writer::to_element(lattice))
}
