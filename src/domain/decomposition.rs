use std::fmt;

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};

use crate::domain::CodePoint;

/// The ordered codepoints that together stand for one composed character in
/// the HFS+ encoding.
///
/// A decomposition always holds at least two codepoints: a single codepoint
/// is never a decomposition of anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CodePoint>", into = "Vec<CodePoint>")]
pub struct Decomposition {
    first: CodePoint,
    rest: NonEmpty<CodePoint>,
}

/// Error returned when a sequence is too short to be a decomposition.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("A decomposition needs at least two codepoints, got {0}")]
pub struct TooShortError(usize);

impl Decomposition {
    /// Creates a decomposition from an ordered sequence of codepoints.
    ///
    /// # Errors
    ///
    /// Returns [`TooShortError`] if fewer than two codepoints are given.
    pub fn new(codepoints: Vec<CodePoint>) -> Result<Self, TooShortError> {
        let len = codepoints.len();
        let mut codepoints = codepoints.into_iter();
        let first = codepoints.next().ok_or(TooShortError(len))?;
        let rest = NonEmpty::from_vec(codepoints.collect()).ok_or(TooShortError(len))?;
        Ok(Self { first, rest })
    }

    /// Creates a decomposition from `char`s.
    ///
    /// # Errors
    ///
    /// Returns [`TooShortError`] if fewer than two chars are given.
    pub fn from_chars(chars: &str) -> Result<Self, TooShortError> {
        Self::new(chars.chars().map(CodePoint::new).collect())
    }

    /// The first codepoint of the sequence.
    #[must_use]
    pub const fn first(&self) -> CodePoint {
        self.first
    }

    /// Number of codepoints; always at least two.
    #[must_use]
    pub fn len(&self) -> usize {
        2 + self.rest.tail.len()
    }

    /// Always `false`; present for symmetry with [`Decomposition::len`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterates over the codepoints in order.
    pub fn iter(&self) -> impl Iterator<Item = CodePoint> + '_ {
        std::iter::once(self.first)
            .chain(std::iter::once(self.rest.head))
            .chain(self.rest.tail.iter().copied())
    }

    /// Returns the codepoints as a vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<CodePoint> {
        self.iter().collect()
    }

    /// Returns the sequence as a string of chars, e.g. `"e\u{301}"`.
    #[must_use]
    pub fn as_string(&self) -> String {
        self.iter().map(CodePoint::as_char).collect()
    }
}

impl TryFrom<Vec<CodePoint>> for Decomposition {
    type Error = TooShortError;

    fn try_from(value: Vec<CodePoint>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Decomposition> for Vec<CodePoint> {
    fn from(decomposition: Decomposition) -> Self {
        decomposition.to_vec()
    }
}

impl fmt::Display for Decomposition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(String::from).collect();
        write!(f, "{}", parts.join(" "))
    }
}

/// One parsed mapping unit: a composed character and the sequence it
/// decomposes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompositionRule {
    /// The single character being decomposed.
    pub composed: CodePoint,
    /// The codepoints it decomposes to, in order.
    pub decomposed: Decomposition,
}

impl DecompositionRule {
    /// Creates a rule.
    #[must_use]
    pub const fn new(composed: CodePoint, decomposed: Decomposition) -> Self {
        Self {
            composed,
            decomposed,
        }
    }
}

impl fmt::Display for DecompositionRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.composed, self.decomposed)
    }
}
