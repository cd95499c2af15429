//! Element descriptor model.
//!
//! Descriptors are the flat, typed records decoded from a lattice document.
//! They carry no behavior: the assembler consumes them to build nodes, and the
//! reverse mapping produces them again from an assembled lattice.
//!
//! # Pipeline Position
//!
//! ```text
//! Document Text
//!     ↓ reader
//! Document Tree (elements + attributes with spans)
//!     ↓ elaborate
//! Descriptors (these types)
//!     ↓ assembly
//! Lattice (sequences of nodes)
//! ```

use std::fmt;

use crate::identifier::Id;

/// The type tag of a beamline element as it appears in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Quad,
    Bend,
    RfGap,
    CorrectorH,
    CorrectorV,
    Marker,
}

impl ElementKind {
    /// Resolve a document type tag. Returns `None` for tags that are not
    /// recognised.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "QUAD" => Some(Self::Quad),
            "BEND" => Some(Self::Bend),
            "RFGAP" => Some(Self::RfGap),
            "DCH" => Some(Self::CorrectorH),
            "DCV" => Some(Self::CorrectorV),
            "MARKER" => Some(Self::Marker),
            _ => None,
        }
    }

    /// The document type tag for this kind.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Quad => "QUAD",
            Self::Bend => "BEND",
            Self::RfGap => "RFGAP",
            Self::CorrectorH => "DCH",
            Self::CorrectorV => "DCV",
            Self::Marker => "MARKER",
        }
    }

    /// Returns `true` for kinds that must have a non-zero length.
    pub fn is_thick(&self) -> bool {
        matches!(self, Self::Quad | Self::Bend)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Aperture of a quadrupole or RF gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Aperture {
    /// Aperture shape code (`aprt_type`).
    pub shape: i64,
    pub size: f64,
}

/// Aperture of a bending magnet, given per transverse plane.
#[derive(Debug, Clone, PartialEq)]
pub struct BendAperture {
    pub shape: i64,
    pub x: f64,
    pub y: f64,
}

/// Higher-order multipole components of a magnet.
///
/// Empty vectors mean the component was not specified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multipoles {
    pub poles: Vec<i64>,
    pub kls: Vec<f64>,
    pub skews: Vec<i64>,
}

impl Multipoles {
    pub fn is_empty(&self) -> bool {
        self.poles.is_empty() && self.kls.is_empty() && self.skews.is_empty()
    }
}

/// Inner and outer radius of a permanent-magnet quadrupole.
#[derive(Debug, Clone, PartialEq)]
pub struct PmqRadii {
    pub inner: f64,
    pub outer: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadParams {
    /// Field gradient `dB/dr`.
    pub field: f64,
    pub multipoles: Multipoles,
    pub aperture: Option<Aperture>,
    pub pmq_radii: Option<PmqRadii>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BendParams {
    /// Bending angle.
    pub theta: f64,
    /// Entrance edge angle.
    pub ea1: f64,
    /// Exit edge angle.
    pub ea2: f64,
    pub multipoles: Multipoles,
    pub aperture: Option<BendAperture>,
}

/// A polynomial given by its order and coefficients, lowest order first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polynomial {
    pub order: usize,
    pub coefficients: Vec<f64>,
}

/// Transit-time-factor data of an RF gap.
///
/// The polynomials are stored verbatim; evaluating them is the business of
/// the tracking engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitTimeFactors {
    pub beta_min: f64,
    pub beta_max: f64,
    pub t: Polynomial,
    pub s: Polynomial,
    pub tp: Polynomial,
    pub sp: Polynomial,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RfGapParams {
    pub e0tl: f64,
    pub e0l: f64,
    pub mode: f64,
    /// Gap phase in degrees, as written in the document.
    pub phase_deg: f64,
    pub ez_file: String,
    /// Name of the owning RF cavity.
    pub cavity: Id,
    pub aperture: Option<Aperture>,
    pub ttf: TransitTimeFactors,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrectorParams {
    pub eff_length: f64,
    /// Corrector field `B`, if given.
    pub field: Option<f64>,
}

/// Type-specific parameters of an element, one variant per element kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementParams {
    Quad(QuadParams),
    Bend(BendParams),
    RfGap(Box<RfGapParams>),
    CorrectorH(CorrectorParams),
    CorrectorV(CorrectorParams),
    Marker,
}

impl ElementParams {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Quad(_) => ElementKind::Quad,
            Self::Bend(_) => ElementKind::Bend,
            Self::RfGap(_) => ElementKind::RfGap,
            Self::CorrectorH(_) => ElementKind::CorrectorH,
            Self::CorrectorV(_) => ElementKind::CorrectorV,
            Self::Marker => ElementKind::Marker,
        }
    }
}

/// One positioned element record of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDescriptor {
    pub name: Id,
    /// Type tag exactly as written in the document. Differs from
    /// `params.kind().tag()` only for unrecognised tags read as markers.
    pub type_tag: String,
    pub length: f64,
    /// Declared center position within the sequence.
    pub position: Option<f64>,
    pub params: ElementParams,
}

impl ElementDescriptor {
    pub fn new(name: Id, length: f64, position: Option<f64>, params: ElementParams) -> Self {
        Self {
            name,
            type_tag: params.kind().tag().to_string(),
            length,
            position,
            params,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.params.kind()
    }
}

/// A named RF cavity grouping of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct CavityDescriptor {
    pub name: Id,
    pub amplitude: f64,
    pub frequency: f64,
    pub position: f64,
}

/// One beamline section.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDescriptor {
    pub name: Id,
    pub length: f64,
    pub bpm_frequency: Option<f64>,
    pub cavities: Vec<CavityDescriptor>,
    /// Element records in document order.
    pub elements: Vec<ElementDescriptor>,
}

impl SequenceDescriptor {
    pub fn new(name: Id, length: f64) -> Self {
        Self {
            name,
            length,
            bpm_frequency: None,
            cavities: Vec::new(),
            elements: Vec::new(),
        }
    }
}

/// A whole lattice document: named sequences in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeDescriptor {
    pub name: Id,
    pub sequences: Vec<SequenceDescriptor>,
}

impl LatticeDescriptor {
    pub fn new(name: Id) -> Self {
        Self {
            name,
            sequences: Vec::new(),
        }
    }

    /// Names of all sequences in document order.
    pub fn sequence_names(&self) -> Vec<Id> {
        self.sequences.iter().map(|seq| seq.name).collect()
    }
}
