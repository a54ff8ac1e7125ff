//! HFS+ Unicode decomposition tables
//!
//! Builds the two lookup tables needed to convert file names between normal
//! Unicode text and the decomposed form used by HFS+: a flat map from each
//! composed character to its decomposition, and a prefix tree that recovers
//! the composed character from a decomposed sequence one codepoint at a time.

pub mod domain;
pub use domain::{
    CodePoint, Config, Cursor, Decomposition, DecompositionRule, DecompositionTrie, EncodingMap,
    Overwrite, Provenance, Step, TableBuilder, Tables, TrieNode,
};

pub mod source;
pub use source::{InputFormat, OrphanPolicy};

pub mod emit;
