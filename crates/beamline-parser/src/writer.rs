//! Lattice document writer.
//!
//! Builds an element tree from a [`LatticeDescriptor`] and renders it as
//! indented text. Numbers use Rust's shortest round-trip formatting, so a
//! written document reads back to exactly the same values.

use std::borrow::Cow;

use beamline_core::descriptor::{
    Aperture, BendParams, CavityDescriptor, CorrectorParams, ElementDescriptor, ElementParams,
    LatticeDescriptor, Multipoles, Polynomial, QuadParams, RfGapParams, SequenceDescriptor,
};

use crate::{
    document::Element,
    elaborate::{
        CAVITIES_TAG, CAVITY_TAG, ELEMENT_TAG, PARAMETERS_TAG, POLYNOMIAL_TAGS, TTFS_TAG,
    },
    values::format_list,
};

const INDENT: &str = "  ";

fn set_multipoles(params: &mut Element, multipoles: &Multipoles) {
    if multipoles.is_empty() {
        return;
    }
    params.set_attribute("poles", format_list(&multipoles.poles));
    params.set_attribute("kls", format_list(&multipoles.kls));
    params.set_attribute("skews", format_list(&multipoles.skews));
}

fn set_aperture(params: &mut Element, aperture: Option<&Aperture>) {
    if let Some(aperture) = aperture {
        params.set_attribute("aprt_type", aperture.shape.to_string());
        params.set_attribute("aperture", aperture.size.to_string());
    }
}

fn quad_parameters(quad: &QuadParams) -> Element {
    let mut params = Element::new(PARAMETERS_TAG).with_attribute("field", quad.field.to_string());
    set_multipoles(&mut params, &quad.multipoles);
    set_aperture(&mut params, quad.aperture.as_ref());
    if let Some(radii) = &quad.pmq_radii {
        params.set_attribute("radIn", radii.inner.to_string());
        params.set_attribute("radOut", radii.outer.to_string());
    }
    params
}

fn bend_parameters(bend: &BendParams) -> Element {
    let mut params = Element::new(PARAMETERS_TAG)
        .with_attribute("theta", bend.theta.to_string())
        .with_attribute("ea1", bend.ea1.to_string())
        .with_attribute("ea2", bend.ea2.to_string());
    set_multipoles(&mut params, &bend.multipoles);
    if let Some(aperture) = &bend.aperture {
        params.set_attribute("aprt_type", aperture.shape.to_string());
        params.set_attribute("aperture_x", aperture.x.to_string());
        params.set_attribute("aperture_y", aperture.y.to_string());
    }
    params
}

fn corrector_parameters(corrector: &CorrectorParams) -> Element {
    let mut params =
        Element::new(PARAMETERS_TAG).with_attribute("effLength", corrector.eff_length.to_string());
    if let Some(field) = corrector.field {
        params.set_attribute("B", field.to_string());
    }
    params
}

fn polynomial(tag: &str, poly: &Polynomial) -> Element {
    Element::new(tag)
        .with_attribute("order", poly.order.to_string())
        .with_attribute("pcoefs", format_list(&poly.coefficients))
}

fn rf_gap_blocks(gap: &RfGapParams) -> [Element; 2] {
    let mut params = Element::new(PARAMETERS_TAG)
        .with_attribute("E0TL", gap.e0tl.to_string())
        .with_attribute("E0L", gap.e0l.to_string())
        .with_attribute("mode", gap.mode.to_string())
        .with_attribute("phase", gap.phase_deg.to_string())
        .with_attribute("EzFile", gap.ez_file.as_str())
        .with_attribute("cavity", gap.cavity.to_text());
    set_aperture(&mut params, gap.aperture.as_ref());

    let ttf = &gap.ttf;
    let mut ttfs = Element::new(TTFS_TAG)
        .with_attribute("beta_min", ttf.beta_min.to_string())
        .with_attribute("beta_max", ttf.beta_max.to_string());
    for (tag, poly) in POLYNOMIAL_TAGS.iter().zip([&ttf.t, &ttf.s, &ttf.tp, &ttf.sp]) {
        ttfs.push_child(polynomial(tag, poly));
    }

    [params, ttfs]
}

fn element_record(element: &ElementDescriptor) -> Element {
    let mut record = Element::new(ELEMENT_TAG)
        .with_attribute("name", element.name.to_text())
        .with_attribute("type", element.type_tag.as_str())
        .with_attribute("length", element.length.to_string());
    if let Some(position) = element.position {
        record.set_attribute("pos", position.to_string());
    }

    match &element.params {
        ElementParams::Quad(quad) => record.push_child(quad_parameters(quad)),
        ElementParams::Bend(bend) => record.push_child(bend_parameters(bend)),
        ElementParams::RfGap(gap) => {
            for block in rf_gap_blocks(gap) {
                record.push_child(block);
            }
        }
        ElementParams::CorrectorH(corrector) | ElementParams::CorrectorV(corrector) => {
            record.push_child(corrector_parameters(corrector))
        }
        ElementParams::Marker => record.push_child(Element::new(PARAMETERS_TAG)),
    }
    record
}

fn cavity_record(cavity: &CavityDescriptor) -> Element {
    Element::new(CAVITY_TAG)
        .with_attribute("name", cavity.name.to_text())
        .with_attribute("ampl", cavity.amplitude.to_string())
        .with_attribute("frequency", cavity.frequency.to_string())
        .with_attribute("pos", cavity.position.to_string())
}

fn sequence_record(sequence: &SequenceDescriptor) -> Element {
    let mut record =
        Element::new(sequence.name.to_text()).with_attribute("length", sequence.length.to_string());
    if let Some(frequency) = sequence.bpm_frequency {
        record.set_attribute("bpmFrequency", frequency.to_string());
    }

    if !sequence.cavities.is_empty() {
        let mut cavities = Element::new(CAVITIES_TAG);
        for cavity in &sequence.cavities {
            cavities.push_child(cavity_record(cavity));
        }
        record.push_child(cavities);
    }

    for element in &sequence.elements {
        record.push_child(element_record(element));
    }
    record
}

/// Build the document tree for a lattice.
pub fn to_element(lattice: &LatticeDescriptor) -> Element {
    let mut root = Element::new(lattice.name.to_text());
    for sequence in &lattice.sequences {
        root.push_child(sequence_record(sequence));
    }
    root
}

fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['<', '>', '&', '"', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

fn render_element(out: &mut String, element: &Element, depth: usize) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(element.name());
    for (name, attr) in element.attributes() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(attr.value()));
        out.push('"');
    }

    if element.children().is_empty() {
        out.push_str("/>\n");
        return;
    }

    out.push_str(">\n");
    for child in element.children() {
        render_element(out, child, depth + 1);
    }
    out.push_str(&indent);
    out.push_str("</");
    out.push_str(element.name());
    out.push_str(">\n");
}

/// Render an element tree as document text, with an XML declaration.
pub fn render(root: &Element) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    render_element(&mut out, root, 0);
    out
}
