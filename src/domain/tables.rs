use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::domain::{CodePoint, Decomposition, DecompositionRule, DecompositionTrie, EncodingMap};

/// Where a table set came from and when it was built.
///
/// Recorded once at build time and carried unchanged into every emitted
/// artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    /// Timestamp recording when the tables were built.
    pub created: DateTime<Utc>,
    /// Name of the source document, if known.
    pub source: Option<String>,
    /// Hex-encoded SHA256 of the source document bytes, if known.
    pub source_sha256: Option<String>,
}

impl Provenance {
    /// Provenance stamped with the current time, truncated to whole seconds.
    #[must_use]
    pub fn now() -> Self {
        Self::at(Utc::now().trunc_subsecs(0))
    }

    /// Provenance stamped with the given time.
    #[must_use]
    pub const fn at(created: DateTime<Utc>) -> Self {
        Self {
            created,
            source: None,
            source_sha256: None,
        }
    }

    /// Attaches the source document name and the digest of its contents.
    #[must_use]
    pub fn with_source(mut self, name: impl Into<String>, contents: &[u8]) -> Self {
        let hash = Sha256::digest(contents);
        self.source = Some(name.into());
        self.source_sha256 = Some(format!("{hash:x}"));
        self
    }
}

/// A later rule replacing a different value written by an earlier one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overwrite {
    /// The encoding map already held another decomposition for `composed`.
    Encoding {
        /// The composed character.
        composed: CodePoint,
        /// The decomposition that was replaced.
        previous: Decomposition,
        /// The decomposition now stored.
        replacement: Decomposition,
    },
    /// The trie already held another composed character at `path`.
    Decoding {
        /// The decomposed sequence.
        path: Decomposition,
        /// The composed character that was replaced.
        previous: CodePoint,
        /// The composed character now stored.
        replacement: CodePoint,
    },
}

impl fmt::Display for Overwrite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Encoding {
                composed,
                previous,
                replacement,
            } => write!(
                f,
                "{composed} decomposed to [{previous}], now [{replacement}]"
            ),
            Self::Decoding {
                path,
                previous,
                replacement,
            } => write!(f, "[{path}] composed to {previous}, now {replacement}"),
        }
    }
}

/// Feeds one rule sequence into both the encoding map and the trie.
#[derive(Debug, Default)]
pub struct TableBuilder {
    encoding: EncodingMap,
    decoding: DecompositionTrie,
    overwrites: Vec<Overwrite>,
    rules: usize,
}

impl TableBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one rule to both tables.
    ///
    /// Replacing a different earlier value is recorded as an [`Overwrite`];
    /// repeating an identical rule is not.
    pub fn push(&mut self, rule: &DecompositionRule) {
        self.rules += 1;

        if let Some(previous) = self.encoding.insert(rule) {
            if previous != rule.decomposed {
                // the composed character no longer decodes from its old path
                self.decoding
                    .remove(&DecompositionRule::new(rule.composed, previous.clone()));
                self.record(Overwrite::Encoding {
                    composed: rule.composed,
                    previous,
                    replacement: rule.decomposed.clone(),
                });
            }
        }

        if let Some(previous) = self.decoding.insert(rule) {
            if previous != rule.composed {
                self.record(Overwrite::Decoding {
                    path: rule.decomposed.clone(),
                    previous,
                    replacement: rule.composed,
                });
            }
        }
    }

    fn record(&mut self, overwrite: Overwrite) {
        tracing::warn!("Duplicate rule: {overwrite}");
        self.overwrites.push(overwrite);
    }

    /// Overwrites recorded so far, in the order they happened.
    #[must_use]
    pub fn overwrites(&self) -> &[Overwrite] {
        &self.overwrites
    }

    /// Freezes the tables.
    #[must_use]
    pub fn finish(self, provenance: Provenance) -> Tables {
        tracing::debug!(
            "Built tables from {} rules: {} encodings, {} trie nodes",
            self.rules,
            self.encoding.len(),
            self.decoding.node_count()
        );
        Tables {
            provenance,
            encoding: self.encoding,
            decoding: self.decoding,
        }
    }
}

/// The frozen artifact set: provenance, encoding map and decomposition trie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Tables {
    provenance: Provenance,
    encoding: EncodingMap,
    decoding: DecompositionTrie,
}

impl Tables {
    /// Builds both tables from rules in order. Later rules win.
    #[instrument(level = "debug", skip(rules))]
    pub fn build<'a>(
        rules: impl IntoIterator<Item = &'a DecompositionRule>,
        provenance: Provenance,
    ) -> Self {
        let mut builder = TableBuilder::new();
        for rule in rules {
            builder.push(rule);
        }
        builder.finish(provenance)
    }

    /// Where and when the tables were built.
    #[must_use]
    pub const fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Composed character to decomposition.
    #[must_use]
    pub const fn encoding(&self) -> &EncodingMap {
        &self.encoding
    }

    /// Decomposition prefix tree.
    #[must_use]
    pub const fn decoding(&self) -> &DecompositionTrie {
        &self.decoding
    }
}

/// The serialized versions of the tables.
///
/// This allows the artifact format to change without breaking tables built
/// by older versions.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        created: DateTime<Utc>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_sha256: Option<String>,

        encoding: EncodingMap,

        decoding: DecompositionTrie,
    },
}

impl From<Versions> for Tables {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                created,
                source,
                source_sha256,
                encoding,
                decoding,
            } => Self {
                provenance: Provenance {
                    created,
                    source,
                    source_sha256,
                },
                encoding,
                decoding,
            },
        }
    }
}

impl From<Tables> for Versions {
    fn from(tables: Tables) -> Self {
        Self::V1 {
            created: tables.provenance.created,
            source: tables.provenance.source,
            source_sha256: tables.provenance.source_sha256,
            encoding: tables.encoding,
            decoding: tables.decoding,
        }
    }
}
