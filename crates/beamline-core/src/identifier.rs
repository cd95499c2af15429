//! Identifier management using string interning for efficient string storage and comparison
//!
//! Node, cavity, sequence and lattice names are all represented by [`Id`].
//! Synthesized drift names are composed from other identifiers with
//! [`Id::join`].

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Separator used when composing identifiers with [`Id::join`].
pub const SEPARATOR: char = ':';

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Efficient identifier type using string interning
///
/// # Examples
///
/// ```
/// use beamline_core::identifier::Id;
///
/// let quad = Id::new("HE:QF1");
/// assert_eq!(quad, "HE:QF1");
///
/// let drift = Id::join(&["HE", "QF1", "1", "drift"]);
/// assert_eq!(drift, "HE:QF1:1:drift");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Creates an identifier by joining the given segments with [`SEPARATOR`].
    ///
    /// # Examples
    ///
    /// ```
    /// use beamline_core::identifier::Id;
    ///
    /// let id = Id::join(&["MEBT", "START", "2", "drift"]);
    /// assert_eq!(id, "MEBT:START:2:drift");
    /// ```
    pub fn join(segments: &[&str]) -> Self {
        let mut name = String::new();
        for (idx, segment) in segments.iter().enumerate() {
            if idx > 0 {
                name.push(SEPARATOR);
            }
            name.push_str(segment);
        }
        Self::new(&name)
    }

    /// Returns an owned copy of the identifier's text.
    pub fn to_text(&self) -> String {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_string()
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .is_some_and(|self_str| self_str == other)
        })
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
