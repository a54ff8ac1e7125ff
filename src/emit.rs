//! Writing frozen tables out.
//!
//! Two formats are supported: the versioned JSON intermediate that
//! [`json::read`] loads back, and Rust source defining the tables as
//! `static` data. Both walk the tables in ascending codepoint order, so the
//! same tables always produce the same bytes.

use std::io;

use crate::domain::{Config, Tables};

pub mod json;
pub mod rust;

/// Output format of an emitted table set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Versioned JSON, readable by [`json::read`].
    #[default]
    Json,
    /// Rust source with `static` tables.
    Rust,
}

/// Errors that can occur while emitting or reading tables.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Writing to or reading from the underlying stream failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The JSON document could not be produced or parsed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A configured static name is not a Rust identifier.
    #[error("'{0}' is not a valid Rust identifier")]
    Identifier(String),

    /// Both tables were given the same static name.
    #[error("the encoding and decoding tables are both named '{0}'")]
    DuplicateName(String),
}

/// Writes `tables` in `format`.
///
/// # Errors
///
/// Returns an error if serialization or the write fails, or if the configured
/// static names are not two distinct identifiers.
pub fn write<W: io::Write>(
    tables: &Tables,
    format: Format,
    config: &Config,
    writer: &mut W,
) -> Result<(), Error> {
    match format {
        Format::Json => json::write(tables, writer),
        Format::Rust => rust::write(tables, config, writer),
    }
}
