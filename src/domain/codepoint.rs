use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A single Unicode scalar value.
///
/// Wraps a [`char`], so surrogates and values above `U+10FFFF` cannot be
/// represented. Ordering follows the scalar value.
///
/// Parsed from the `0xHHHH` notation used by the HFS+ decomposition table or
/// from `U+HHHH`, and displayed as `U+HHHH`.
///
/// ```
/// use hfs_tables::CodePoint;
///
/// let e_acute: CodePoint = "0x00E9".parse().unwrap();
/// assert_eq!(e_acute.as_char(), 'é');
/// assert_eq!(e_acute.to_string(), "U+00E9");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CodePoint(char);

impl CodePoint {
    /// Creates a codepoint from a `char`.
    #[must_use]
    pub const fn new(c: char) -> Self {
        Self(c)
    }

    /// Creates a codepoint from a raw scalar value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAScalarValue`] for surrogates and values above
    /// `0x10FFFF`.
    pub fn from_u32(value: u32) -> Result<Self, Error> {
        char::from_u32(value)
            .map(Self)
            .ok_or(Error::NotAScalarValue(value))
    }

    /// Returns the codepoint as a `char`.
    #[must_use]
    pub const fn as_char(self) -> char {
        self.0
    }

    /// Returns the numeric scalar value.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0 as u32
    }
}

impl From<char> for CodePoint {
    fn from(c: char) -> Self {
        Self(c)
    }
}

impl From<CodePoint> for char {
    fn from(codepoint: CodePoint) -> Self {
        codepoint.0
    }
}

impl From<CodePoint> for String {
    fn from(codepoint: CodePoint) -> Self {
        codepoint.to_string()
    }
}

impl fmt::Display for CodePoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "U+{:04X}", self.value())
    }
}

/// Errors that can occur when parsing a codepoint.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The text is not `0x` or `U+` followed by hex digits.
    #[error("Invalid codepoint '{0}': expected 0xHHHH or U+HHHH")]
    Syntax(String),

    /// The value has too many significant digits to be a codepoint.
    #[error("Invalid codepoint '{0}': beyond U+10FFFF")]
    OutOfRange(String),

    /// The value is a surrogate or lies beyond `U+10FFFF`.
    #[error("Invalid codepoint 0x{0:X}: not a Unicode scalar value")]
    NotAScalarValue(u32),
}

impl FromStr for CodePoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = ["0x", "0X", "U+", "u+"]
            .iter()
            .find_map(|prefix| s.strip_prefix(prefix))
            .ok_or_else(|| Error::Syntax(s.to_string()))?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::Syntax(s.to_string()));
        }

        // leading zeros are padding; more than six significant digits exceed U+10FFFF
        let significant = digits.trim_start_matches('0');
        if significant.len() > 6 {
            return Err(Error::OutOfRange(s.to_string()));
        }

        let value = u32::from_str_radix(digits, 16).map_err(|_| Error::Syntax(s.to_string()))?;
        Self::from_u32(value)
    }
}

impl TryFrom<String> for CodePoint {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}

impl TryFrom<&str> for CodePoint {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}
