//! Diagnostics: severity, labeled spans and help text.

use std::fmt;

use crate::{error::ErrorCode, span::Span};

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The document cannot be turned into a lattice.
    Error,
    /// The document is usable but something looks wrong.
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A message attached to a span of the source document.
///
/// A primary label marks where the problem is; secondary labels point at
/// related places, such as the opening tag of an element whose closing tag
/// does not match.
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }
}

/// A single error or warning found in a lattice document.
///
/// # Example
///
/// ```text
/// error[E005]: closing tag `</HE>` does not match `<accElement>`
///    |
/// 12 |     </HE>
///    |     ^^^^^ expected `</accElement>`
///    |
///  9 |     <accElement name="QF1" ...>
///    |     ----------- element opened here
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity() {
        assert!(Severity::Error.is_error());
        assert!(!Severity::Error.is_warning());
        assert!(Severity::Warning.is_warning());
        assert_eq!(Severity::Warning.to_string(), "warning");
    }

    #[test]
    fn test_labels() {
        let diag = Diagnostic::error("closing tag does not match")
            .with_label(Span::new(40..45), "expected `</HE>`")
            .with_secondary_label(Span::new(0..4), "opened here");

        assert_eq!(diag.labels().len(), 2);
        assert!(diag.labels()[0].is_primary());
        assert!(!diag.labels()[1].is_primary());
        assert_eq!(diag.labels()[1].span().start(), 0);
        assert_eq!(diag.labels()[0].message(), "expected `</HE>`");
    }

    #[test]
    fn test_display_with_code() {
        let diag = Diagnostic::error("invalid number `abc`").with_code(ErrorCode::E101);
        assert_eq!(diag.to_string(), "error[E101]: invalid number `abc`");
    }

    #[test]
    fn test_display_without_code() {
        let diag = Diagnostic::warning("text content ignored");
        assert_eq!(diag.to_string(), "warning: text content ignored");
    }

    #[test]
    fn test_builder_chain() {
        let diag = Diagnostic::error("missing `pcoefs`")
            .with_code(ErrorCode::E100)
            .with_label(Span::new(10..20), "in this polynomial")
            .with_help("list the coefficients, lowest order first");

        assert!(diag.severity().is_error());
        assert_eq!(diag.code(), Some(ErrorCode::E100));
        assert_eq!(
            diag.help(),
            Some("list the coefficients, lowest order first")
        );
    }
}
