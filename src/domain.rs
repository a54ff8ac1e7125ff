//! Domain models for HFS+ decomposition tables.
//!
//! This module contains the codepoint and rule types, the two lookup tables
//! built from them, and configuration.

mod codepoint;
pub use codepoint::{CodePoint, Error as CodePointError};

mod decomposition;
pub use decomposition::{Decomposition, DecompositionRule, TooShortError};

mod config;
pub use config::Config;

/// Flat composed → decomposed lookup.
pub mod encoding_map;
pub use encoding_map::EncodingMap;

pub mod trie;
pub use trie::{Cursor, DecompositionTrie, Step, TrieNode};

/// Building and freezing the table set.
pub mod tables;
pub use tables::{Overwrite, Provenance, TableBuilder, Tables};
