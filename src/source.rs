//! Reading the HFS+ decomposition table.
//!
//! A source document is split into cells ([`html`], [`lines`]), each cell is
//! classified as a [`Token`] or ignored, and the tokens are paired into
//! [`DecompositionRule`](crate::DecompositionRule)s by the [`parser`].

pub mod html;
pub mod lines;
pub mod parser;
mod token;

pub use parser::{
    parse_cells, Event, MalformedInputError, OrphanPolicy, ParserState, RuleParser,
};
pub use token::{Error as TokenError, Token};

/// The layout of a source document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// An HTML page; cells are the `<p>` elements inside `<td>` elements.
    #[default]
    Html,
    /// Plain text with one cell per line.
    Lines,
}

impl InputFormat {
    /// Splits a document into cells, in document order.
    #[must_use]
    pub fn cells(self, document: &str) -> Vec<String> {
        match self {
            Self::Html => html::cells(document),
            Self::Lines => lines::cells(document),
        }
    }
}
