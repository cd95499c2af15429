//! Beamline - assembles accelerator lattices from positioned elements.
//!
//! A lattice document lists sequences of elements, each with a declared
//! length and center position. This crate reads such documents, splits long
//! magnets into parts, attaches point elements inside the magnets that
//! contain them, fills every gap with drifts, and joins the requested
//! sequences into one lattice.

pub mod assembly;
pub mod config;

mod error;
mod export;
mod structure;

pub use beamline_core::{descriptor, geometry, identifier};

pub use assembly::{Assembler, AssemblyError, ElementInfo};
pub use error::BeamlineError;
pub use structure::{
    EmbeddedNode, Lattice, LatticeNode, Node, NodeKind, Placement, RfCavity, Sequence,
};

use log::{debug, info, trace};

use beamline_core::descriptor::LatticeDescriptor;

use config::AppConfig;

/// Builder for reading, assembling and writing lattices.
///
/// # Examples
///
/// ```rust
/// use beamline::{LatticeBuilder, config::AppConfig};
///
/// let source = r#"
///     <LINAC>
///       <MEBT length="1.0">
///         <accElement name="Q1" type="QUAD" length="0.2" pos="0.5">
///           <parameters field="12.5"/>
///         </accElement>
///       </MEBT>
///     </LINAC>
/// "#;
///
/// let builder = LatticeBuilder::new(AppConfig::default());
/// let lattice = builder.build(source, &["MEBT"]).expect("Failed to build");
/// assert_eq!(lattice.sequences()[0].nodes().len(), 3);
///
/// // Or use the default config
/// let builder = LatticeBuilder::default();
/// ```
#[derive(Default)]
pub struct LatticeBuilder {
    config: AppConfig,
}

impl LatticeBuilder {
    /// Create a new lattice builder with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including assembly settings
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Parse document text into a lattice descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`BeamlineError::Parse`] with the document text attached for
    /// markup errors and malformed element records.
    pub fn parse(&self, source: &str) -> Result<LatticeDescriptor, BeamlineError> {
        info!("Parsing lattice document");

        let document = beamline_parser::parse(source)
            .map_err(|err| BeamlineError::new_parse_error(err, source))?;

        debug!(
            lattice:% = document.name,
            sequences = document.sequences.len();
            "Document parsed successfully"
        );
        trace!(document:?; "Parsed document");

        Ok(document)
    }

    /// Assemble the named sequences of a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`BeamlineError::Assembly`] for an invalid configuration or
    /// any assembly failure.
    pub fn assemble(
        &self,
        document: &LatticeDescriptor,
        names: &[&str],
    ) -> Result<Lattice, BeamlineError> {
        let assembler = Assembler::from_config(self.config.assembly())?;
        let lattice = assembler.assemble(document, names)?;
        info!(
            sequences = lattice.sequences().len(),
            nodes = lattice.all_nodes().count();
            "Lattice built"
        );
        Ok(lattice)
    }

    /// Parse `source` and assemble the named sequences.
    pub fn build(&self, source: &str, names: &[&str]) -> Result<Lattice, BeamlineError> {
        let document = self.parse(source)?;
        self.assemble(&document, names)
    }

    /// Write an assembled lattice back as document text.
    ///
    /// Drifts are left out; reading and assembling the text again gives the
    /// same lattice.
    pub fn to_document(&self, lattice: &Lattice) -> String {
        info!(lattice:% = lattice.name(); "Writing lattice document");
        beamline_parser::write_document(&LatticeDescriptor::from(lattice))
    }
}
