//! Elaboration of the element tree into lattice descriptors.
//!
//! The root element names the lattice and each of its children is a
//! sequence. Inside a sequence, `<Cavities>` holds the RF cavities and every
//! `<accElement>` becomes an [`ElementDescriptor`]. Errors are collected per
//! record, so one pass reports every broken element rather than the first.

use log::{debug, info, trace};

use beamline_core::{
    descriptor::{
        Aperture, BendAperture, BendParams, CavityDescriptor, CorrectorParams, ElementDescriptor,
        ElementKind, ElementParams, LatticeDescriptor, Multipoles, PmqRadii, Polynomial,
        QuadParams, RfGapParams, SequenceDescriptor, TransitTimeFactors,
    },
    identifier::Id,
};

use crate::{
    document::{Attribute, Element},
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError, Result},
    values::{self, ValueError},
};

pub(crate) const CAVITIES_TAG: &str = "Cavities";
pub(crate) const CAVITY_TAG: &str = "Cavity";
pub(crate) const ELEMENT_TAG: &str = "accElement";
pub(crate) const PARAMETERS_TAG: &str = "parameters";
pub(crate) const TTFS_TAG: &str = "TTFs";
pub(crate) const POLYNOMIAL_TAGS: [&str; 4] = ["polyT", "polyS", "polyTP", "polySP"];

fn required<'e>(element: &'e Element, name: &str) -> Result<&'e Attribute> {
    element.attribute(name).ok_or_else(|| {
        Diagnostic::error(format!(
            "`<{}>` is missing the `{name}` attribute",
            element.name()
        ))
        .with_code(ErrorCode::E100)
        .with_label(element.span(), format!("missing `{name}`"))
    })
}

fn value_diagnostic(attr: &Attribute, name: &str, err: ValueError) -> Diagnostic {
    let code = match err {
        ValueError::Number(_) => ErrorCode::E101,
        ValueError::Integer(_) => ErrorCode::E102,
        ValueError::ListEntry { .. } => ErrorCode::E103,
    };
    Diagnostic::error(format!("invalid `{name}`: {err}"))
        .with_code(code)
        .with_label(attr.span(), code.description())
}

fn text(element: &Element, name: &str) -> Result<String> {
    required(element, name).map(|attr| attr.value().to_string())
}

fn number(element: &Element, name: &str) -> Result<f64> {
    let attr = required(element, name)?;
    values::parse_f64(attr.value()).map_err(|err| value_diagnostic(attr, name, err))
}

fn optional_number(element: &Element, name: &str) -> Result<Option<f64>> {
    element
        .attribute(name)
        .map(|attr| {
            values::parse_f64(attr.value()).map_err(|err| value_diagnostic(attr, name, err))
        })
        .transpose()
}

fn integer(element: &Element, name: &str) -> Result<i64> {
    let attr = required(element, name)?;
    values::parse_i64(attr.value()).map_err(|err| value_diagnostic(attr, name, err))
}

fn optional_f64_list(element: &Element, name: &str) -> Result<Vec<f64>> {
    match element.attribute(name) {
        Some(attr) => {
            values::parse_f64_list(attr.value()).map_err(|err| value_diagnostic(attr, name, err))
        }
        None => Ok(Vec::new()),
    }
}

fn optional_i64_list(element: &Element, name: &str) -> Result<Vec<i64>> {
    match element.attribute(name) {
        Some(attr) => {
            values::parse_i64_list(attr.value()).map_err(|err| value_diagnostic(attr, name, err))
        }
        None => Ok(Vec::new()),
    }
}

fn has_all(element: &Element, names: &[&str]) -> bool {
    names.iter().all(|name| element.attribute(name).is_some())
}

fn child<'e>(element: &'e Element, name: &str) -> Result<&'e Element> {
    element.child(name).ok_or_else(|| {
        Diagnostic::error(format!(
            "`<{}>` is missing its `<{name}>` block",
            element.name()
        ))
        .with_code(ErrorCode::E104)
        .with_label(element.span(), format!("expected a `<{name}>` child"))
    })
}

fn multipoles(params: &Element) -> Result<Multipoles> {
    Ok(Multipoles {
        poles: optional_i64_list(params, "poles")?,
        kls: optional_f64_list(params, "kls")?,
        skews: optional_i64_list(params, "skews")?,
    })
}

/// Aperture present only when both the shape code and size are given.
fn aperture(params: &Element) -> Result<Option<Aperture>> {
    if !has_all(params, &["aprt_type", "aperture"]) {
        return Ok(None);
    }
    Ok(Some(Aperture {
        shape: integer(params, "aprt_type")?,
        size: number(params, "aperture")?,
    }))
}

fn quad_params(params: &Element) -> Result<QuadParams> {
    let pmq_radii = if has_all(params, &["radIn", "radOut"]) {
        Some(PmqRadii {
            inner: number(params, "radIn")?,
            outer: number(params, "radOut")?,
        })
    } else {
        None
    };

    Ok(QuadParams {
        field: number(params, "field")?,
        multipoles: multipoles(params)?,
        aperture: aperture(params)?,
        pmq_radii,
    })
}

fn bend_params(params: &Element) -> Result<BendParams> {
    let aperture = if has_all(params, &["aprt_type", "aperture_x", "aperture_y"]) {
        Some(BendAperture {
            shape: integer(params, "aprt_type")?,
            x: number(params, "aperture_x")?,
            y: number(params, "aperture_y")?,
        })
    } else {
        None
    };

    Ok(BendParams {
        theta: number(params, "theta")?,
        ea1: number(params, "ea1")?,
        ea2: number(params, "ea2")?,
        multipoles: multipoles(params)?,
        aperture,
    })
}

fn polynomial(element: &Element) -> Result<Polynomial> {
    let order = integer(element, "order")?;
    let order = usize::try_from(order).map_err(|_| {
        let attr = element.attribute("order");
        Diagnostic::error(format!("polynomial order `{order}` is negative"))
            .with_code(ErrorCode::E102)
            .with_label(
                attr.map_or(element.span(), Attribute::span),
                "expected a non-negative integer",
            )
    })?;

    Ok(Polynomial {
        order,
        coefficients: optional_f64_list(element, "pcoefs")?,
    })
}

fn transit_time_factors(ttfs: &Element) -> Result<TransitTimeFactors> {
    let [t, s, tp, sp] = POLYNOMIAL_TAGS;
    Ok(TransitTimeFactors {
        beta_min: number(ttfs, "beta_min")?,
        beta_max: number(ttfs, "beta_max")?,
        t: polynomial(child(ttfs, t)?)?,
        s: polynomial(child(ttfs, s)?)?,
        tp: polynomial(child(ttfs, tp)?)?,
        sp: polynomial(child(ttfs, sp)?)?,
    })
}

fn rf_gap_params(record: &Element, params: &Element) -> Result<RfGapParams> {
    Ok(RfGapParams {
        e0tl: number(params, "E0TL")?,
        e0l: number(params, "E0L")?,
        mode: number(params, "mode")?,
        phase_deg: number(params, "phase")?,
        ez_file: text(params, "EzFile")?,
        cavity: Id::new(&text(params, "cavity")?),
        aperture: aperture(params)?,
        ttf: transit_time_factors(child(record, TTFS_TAG)?)?,
    })
}

fn corrector_params(params: &Element) -> Result<CorrectorParams> {
    Ok(CorrectorParams {
        eff_length: number(params, "effLength")?,
        field: optional_number(params, "B")?,
    })
}

/// Elaborate one `<accElement>` record.
fn element(record: &Element) -> Result<ElementDescriptor> {
    let name = text(record, "name")?;
    let type_tag = text(record, "type")?;
    let length = number(record, "length")?;
    let position = optional_number(record, "pos")?;

    let kind = ElementKind::from_tag(&type_tag);
    trace!(name:?, type_tag:?, length:?, position:?; "Elaborating element");

    let params = match kind {
        Some(ElementKind::Quad) => ElementParams::Quad(quad_params(child(record, PARAMETERS_TAG)?)?),
        Some(ElementKind::Bend) => ElementParams::Bend(bend_params(child(record, PARAMETERS_TAG)?)?),
        Some(ElementKind::RfGap) => ElementParams::RfGap(Box::new(rf_gap_params(
            record,
            child(record, PARAMETERS_TAG)?,
        )?)),
        Some(ElementKind::CorrectorH) => {
            ElementParams::CorrectorH(corrector_params(child(record, PARAMETERS_TAG)?)?)
        }
        Some(ElementKind::CorrectorV) => {
            ElementParams::CorrectorV(corrector_params(child(record, PARAMETERS_TAG)?)?)
        }
        Some(ElementKind::Marker) | None => ElementParams::Marker,
    };

    let mut descriptor = ElementDescriptor::new(Id::new(&name), length, position, params);
    // Unrecognised types keep their tag; the assembler decides what they become.
    descriptor.type_tag = type_tag;
    Ok(descriptor)
}

fn cavity(record: &Element) -> Result<CavityDescriptor> {
    Ok(CavityDescriptor {
        name: Id::new(&text(record, "name")?),
        amplitude: number(record, "ampl")?,
        frequency: number(record, "frequency")?,
        position: number(record, "pos")?,
    })
}

struct Elaborator {
    diagnostics: DiagnosticCollector,
}

impl Elaborator {
    fn new() -> Self {
        Self {
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn sequence(&mut self, record: &Element) -> Option<SequenceDescriptor> {
        let name = Id::new(record.name());
        let length = self.diagnostics.check(number(record, "length"));
        let bpm_frequency = self
            .diagnostics
            .check(optional_number(record, "bpmFrequency"))
            .flatten();

        let mut sequence = SequenceDescriptor::new(name, length.unwrap_or_default());
        sequence.bpm_frequency = bpm_frequency;

        for cavities in record.children_named(CAVITIES_TAG) {
            for cavity_record in cavities.children_named(CAVITY_TAG) {
                if let Some(cavity) = self.diagnostics.check(cavity(cavity_record)) {
                    sequence.cavities.push(cavity);
                }
            }
        }

        for element_record in record.children_named(ELEMENT_TAG) {
            if let Some(element) = self.diagnostics.check(element(element_record)) {
                sequence.elements.push(element);
            }
        }

        debug!(
            sequence:% = name,
            elements = sequence.elements.len(),
            cavities = sequence.cavities.len();
            "Elaborated sequence"
        );
        length.map(|_| sequence)
    }

    fn lattice(mut self, root: &Element) -> std::result::Result<LatticeDescriptor, ParseError> {
        let mut lattice = LatticeDescriptor::new(Id::new(root.name()));
        let mut seen: Vec<&Element> = Vec::new();

        for record in root.children() {
            if let Some(first) = seen.iter().find(|prev| prev.name() == record.name()) {
                self.diagnostics.emit(
                    Diagnostic::error(format!("duplicate sequence `{}`", record.name()))
                        .with_code(ErrorCode::E105)
                        .with_label(record.span(), "sequence defined again")
                        .with_secondary_label(first.span(), "first defined here"),
                );
                continue;
            }
            seen.push(record);

            if let Some(sequence) = self.sequence(record) {
                lattice.sequences.push(sequence);
            }
        }

        self.diagnostics.finish()?;
        info!(
            lattice:% = lattice.name,
            sequences = lattice.sequences.len();
            "Lattice document elaborated"
        );
        Ok(lattice)
    }
}

/// Turn a document tree into a lattice descriptor.
pub(crate) fn elaborate(root: &Element) -> std::result::Result<LatticeDescriptor, ParseError> {
    Elaborator::new().lattice(root)
}
