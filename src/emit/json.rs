//! The JSON intermediate written by `build` and read back by `emit`.

use std::io;

use crate::{domain::Tables, emit::Error};

/// Writes the tables as pretty-printed, versioned JSON.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn write<W: io::Write>(tables: &Tables, writer: &mut W) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut *writer, tables)?;
    writeln!(writer)?;
    Ok(())
}

/// Reads tables written by [`write`].
///
/// # Errors
///
/// Returns an error if the document is not valid JSON, has an unknown
/// version, or describes a trie that no rule set could have produced.
pub fn read<R: io::Read>(reader: R) -> Result<Tables, Error> {
    Ok(serde_json::from_reader(reader)?)
}
