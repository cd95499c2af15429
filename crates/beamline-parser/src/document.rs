//! Element tree of a lattice document.
//!
//! [`build`] checks tag nesting over the markup stream and produces the
//! single root [`Element`]. Attribute values are entity-decoded here, so the
//! tree only holds plain text.

use indexmap::IndexMap;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    markup::{Markup, PositionedMarkup, RawAttribute, unescape},
    span::Span,
};

/// A decoded attribute value and the span of its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    value: String,
    span: Span,
}

impl Attribute {
    pub fn new(value: impl Into<String>, span: Span) -> Self {
        Self {
            value: value.into(),
            span,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// An element with its attributes (in document order) and child elements.
///
/// Character data is not kept; lattice documents carry everything in
/// attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: IndexMap<String, Attribute>,
    children: Vec<Element>,
    span: Span,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The span of the opening tag.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.attributes.iter().map(|(name, attr)| (name.as_str(), attr))
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// The first child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Set an attribute, replacing any previous value with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes
            .insert(name.into(), Attribute::new(value, Span::default()));
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.push_child(child);
        self
    }
}

/// Builds the element tree from a markup stream.
struct TreeBuilder {
    stack: Vec<Element>,
    roots: Vec<Element>,
    diagnostics: DiagnosticCollector,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            roots: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn open(&mut self, name: &str, raw_attributes: Vec<RawAttribute<'_>>, span: Span) -> Element {
        let mut element = Element::new(name);
        element.span = span;

        for raw in raw_attributes {
            let attr_name = *raw.name.inner();
            if let Some(previous) = element.attributes.get(attr_name) {
                self.diagnostics.emit(
                    Diagnostic::error(format!("duplicate attribute `{attr_name}` on `<{name}>`"))
                        .with_code(ErrorCode::E008)
                        .with_label(raw.name.span(), "duplicate attribute")
                        .with_secondary_label(previous.span, "first value here"),
                );
                continue;
            }
            let value_span = raw.value.span();
            if let Some(value) = self.diagnostics.check(unescape(raw.value.inner(), value_span)) {
                element
                    .attributes
                    .insert(attr_name.to_string(), Attribute::new(value, value_span));
            }
        }
        element
    }

    fn attach(&mut self, element: Element) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => self.roots.push(element),
        }
    }

    fn close(&mut self, name: &str, span: Span) {
        let Some(open) = self.stack.last() else {
            self.diagnostics.emit(
                Diagnostic::error(format!("closing tag `</{name}>` has no matching opening tag"))
                    .with_code(ErrorCode::E005)
                    .with_label(span, "unexpected closing tag"),
            );
            return;
        };

        if open.name == name {
            if let Some(element) = self.stack.pop() {
                self.attach(element);
            }
            return;
        }

        self.diagnostics.emit(
            Diagnostic::error(format!(
                "closing tag `</{name}>` does not match `<{}>`",
                open.name
            ))
            .with_code(ErrorCode::E005)
            .with_label(span, format!("expected `</{}>`", open.name))
            .with_secondary_label(open.span, "element opened here"),
        );

        // Close up to a matching ancestor, if there is one.
        if self.stack.iter().any(|element| element.name == name) {
            while let Some(element) = self.stack.pop() {
                let matched = element.name == name;
                self.attach(element);
                if matched {
                    break;
                }
            }
        }
    }

    fn text(&mut self, text: &str, span: Span) {
        if self.stack.is_empty() && !text.trim().is_empty() {
            self.diagnostics.emit(
                Diagnostic::error("text outside the root element")
                    .with_code(ErrorCode::E007)
                    .with_label(span, "unexpected text"),
            );
        }
    }

    fn build(mut self, items: Vec<PositionedMarkup<'_>>) -> Result<Element, ParseError> {
        for item in items {
            match item.markup {
                Markup::Open {
                    name,
                    attributes,
                    self_closing,
                } => {
                    let element = self.open(name, attributes, item.span);
                    if self_closing {
                        self.attach(element);
                    } else {
                        self.stack.push(element);
                    }
                }
                Markup::Close { name } => self.close(name, item.span),
                Markup::Text(text) => self.text(text, item.span),
            }
        }

        for element in std::mem::take(&mut self.stack) {
            self.diagnostics.emit(
                Diagnostic::error(format!("element `<{}>` is never closed", element.name))
                    .with_code(ErrorCode::E006)
                    .with_label(element.span, "opened here")
                    .with_help(format!("add `</{}>`", element.name)),
            );
        }

        let mut roots = std::mem::take(&mut self.roots).into_iter();
        let root = roots.next();
        if let Some(extra) = roots.next() {
            self.diagnostics.emit(
                Diagnostic::error("a lattice document has a single root element")
                    .with_code(ErrorCode::E007)
                    .with_label(extra.span, "second root element"),
            );
        }

        match root {
            Some(root) => self.diagnostics.finish().map(|()| root),
            None => {
                self.diagnostics.emit(
                    Diagnostic::error("document has no root element")
                        .with_code(ErrorCode::E007)
                        .with_label(Span::new(0..0), "expected a lattice element"),
                );
                self.diagnostics.finish().map(|()| Element::new(""))
            }
        }
    }
}

/// Build the element tree of a tokenized document.
pub(crate) fn build(items: Vec<PositionedMarkup<'_>>) -> Result<Element, ParseError> {
    TreeBuilder::new().build(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::tokenize;

    fn read(source: &str) -> Result<Element, ParseError> {
        build(tokenize(source)?)
    }

    fn first_code(source: &str) -> ErrorCode {
        read(source).unwrap_err().diagnostics()[0].code().unwrap()
    }

    #[test]
    fn test_tree_structure() {
        let root = read(
            r#"<?xml version="1.0"?>
<LINAC>
  <MEBT length="3.6">
    <accElement name="Q1" type="QUAD" length="0.1" pos="0.5">
      <parameters field="12.5"/>
    </accElement>
  </MEBT>
</LINAC>"#,
        )
        .unwrap();

        assert_eq!(root.name(), "LINAC");
        assert_eq!(root.children().len(), 1);
        let sequence = root.child("MEBT").unwrap();
        assert_eq!(sequence.attribute("length").unwrap().value(), "3.6");
        let element = &sequence.children()[0];
        assert_eq!(element.name(), "accElement");
        let names: Vec<_> = element.attributes().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["name", "type", "length", "pos"]);
        assert_eq!(
            element
                .child("parameters")
                .and_then(|p| p.attribute("field"))
                .map(Attribute::value),
            Some("12.5")
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        let root = read(r#"<L note="a &amp; b"/>"#).unwrap();
        assert_eq!(root.attribute("note").unwrap().value(), "a & b");
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = read("<L><S></L>").unwrap_err();
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E005));
        assert_eq!(diag.labels().len(), 2);
        assert_eq!(diag.labels()[1].span(), Span::new(3..6));
    }

    #[test]
    fn test_stray_closing_tag() {
        assert_eq!(first_code("<L/></S>"), ErrorCode::E005);
    }

    #[test]
    fn test_unclosed_element() {
        assert_eq!(first_code("<L><S/>"), ErrorCode::E006);
    }

    #[test]
    fn test_root_count() {
        assert_eq!(first_code("<!-- nothing -->"), ErrorCode::E007);
        assert_eq!(first_code("<A/><B/>"), ErrorCode::E007);
        assert_eq!(first_code("<A/> trailing"), ErrorCode::E007);
    }

    #[test]
    fn test_duplicate_attribute() {
        let err = read(r#"<L a="1" a="2"/>"#).unwrap_err();
        let diag = &err.diagnostics()[0];
        assert_eq!(diag.code(), Some(ErrorCode::E008));
        assert_eq!(diag.labels()[1].span(), Span::new(6..7));
    }

    #[test]
    fn test_invalid_entity() {
        assert_eq!(first_code(r#"<L a="x & y"/>"#), ErrorCode::E004);
    }

    #[test]
    fn test_builder_methods() {
        let element = Element::new("Cavity")
            .with_attribute("name", "C1")
            .with_attribute("name", "C2")
            .with_child(Element::new("x"));
        assert_eq!(element.attribute("name").unwrap().value(), "C2");
        assert_eq!(element.attributes().count(), 1);
        assert_eq!(element.children_named("x").count(), 1);
    }
}
