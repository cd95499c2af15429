//! Error codes for lattice document diagnostics.
//!
//! Codes are grouped by the phase that reports them:
//! - `E0xx` - Markup errors, found while reading the element tree
//! - `E1xx` - Content errors, found while turning elements into descriptors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Markup Errors (E0xx)
    // =========================================================================
    /// Unterminated comment, declaration or CDATA section.
    ///
    /// A `<!--`, `<?` or `<![CDATA[` was opened but its terminator never
    /// appears before the end of the document.
    E001,

    /// Unexpected character.
    ///
    /// A character was found that cannot start or continue a tag here.
    E002,

    /// Unterminated attribute value.
    ///
    /// An attribute value was opened with a quote that is never closed.
    E003,

    /// Invalid entity reference.
    ///
    /// Only `&lt;`, `&gt;`, `&amp;`, `&quot;`, `&apos;` and numeric character
    /// references are understood.
    E004,

    /// Mismatched closing tag.
    ///
    /// A closing tag names a different element than the one currently open.
    E005,

    /// Unclosed element.
    ///
    /// The document ended while an element was still open.
    E006,

    /// Missing or extra root element.
    ///
    /// A lattice document holds exactly one root element.
    E007,

    /// Duplicate attribute.
    ///
    /// The same attribute name appears twice on one element.
    E008,

    // =========================================================================
    // Content Errors (E1xx)
    // =========================================================================
    /// Missing required attribute.
    E100,

    /// Invalid number.
    ///
    /// An attribute that holds a real number could not be read as one.
    E101,

    /// Invalid integer.
    E102,

    /// Invalid number list.
    ///
    /// A list attribute (such as `pcoefs` or `kls`) holds an entry that is
    /// not a number.
    E103,

    /// Missing required child element.
    ///
    /// For example an RF gap without its `TTFs` block.
    E104,

    /// Duplicate sequence.
    ///
    /// Two sequences of one lattice share a name.
    E105,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Markup errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E006 => "E006",
            ErrorCode::E007 => "E007",
            ErrorCode::E008 => "E008",
            // Content errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated markup",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "unterminated attribute value",
            ErrorCode::E004 => "invalid entity reference",
            ErrorCode::E005 => "mismatched closing tag",
            ErrorCode::E006 => "unclosed element",
            ErrorCode::E007 => "missing or extra root element",
            ErrorCode::E008 => "duplicate attribute",
            ErrorCode::E100 => "missing attribute",
            ErrorCode::E101 => "invalid number",
            ErrorCode::E102 => "invalid integer",
            ErrorCode::E103 => "invalid number list",
            ErrorCode::E104 => "missing child element",
            ErrorCode::E105 => "duplicate sequence",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
