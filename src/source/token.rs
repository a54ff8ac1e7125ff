use std::{str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::domain::{CodePoint, CodePointError, Decomposition};

/// Whole-cell pattern for one or more `0xHHHH` values separated by spaces.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^0[xX][0-9A-Fa-f]+(?: 0[xX][0-9A-Fa-f]+)*$").expect("token pattern is valid")
});

/// A table cell recognized as codepoint data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A single codepoint: the composed character of the next rule.
    Composed(CodePoint),
    /// Two or more codepoints: the decomposition of the pending character.
    Decomposed(Decomposition),
}

/// Reasons a cell is not a token.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The cell is not a space-separated list of `0xHHHH` values.
    #[error("not a codepoint cell: '{0}'")]
    NotCodepoints(String),

    /// The cell has the right shape but holds an invalid value.
    #[error(transparent)]
    CodePoint(#[from] CodePointError),
}

impl FromStr for Token {
    type Err = Error;

    /// Classifies a cell. Surrounding whitespace is trimmed and inner runs of
    /// whitespace are treated as a single space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cell = s.split_whitespace().collect::<Vec<_>>().join(" ");
        if !TOKEN.is_match(&cell) {
            return Err(Error::NotCodepoints(s.to_string()));
        }

        let mut codepoints = cell
            .split(' ')
            .map(CodePoint::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if codepoints.len() == 1 {
            Ok(Self::Composed(codepoints.remove(0)))
        } else {
            let decomposition =
                Decomposition::new(codepoints).map_err(|_| Error::NotCodepoints(s.to_string()))?;
            Ok(Self::Decomposed(decomposition))
        }
    }
}
