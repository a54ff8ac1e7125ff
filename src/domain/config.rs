use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::source::OrphanPolicy;

/// Configuration for building and emitting tables.
///
/// Loaded from `hfs-tables.toml`. Every field has a default, so a file
/// holding only `_version = "1"` gives [`Config::default`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// What to do with a decomposition that has no pending composed
    /// character in front of it.
    pub orphan_policy: OrphanPolicy,

    /// Whether a rule replacing a different earlier value fails the build.
    ///
    /// When `false` (default) the later rule wins and the overwrite is only
    /// logged.
    pub strict_duplicates: bool,

    /// Name of the emitted static holding the composed → decomposed map.
    encoding_table: String,

    /// Name of the emitted static holding the decomposition trie.
    decoding_table: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            orphan_policy: OrphanPolicy::default(),
            strict_duplicates: false,
            encoding_table: default_encoding_table(),
            decoding_table: default_decoding_table(),
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the name of the emitted encoding static.
    #[must_use]
    pub fn encoding_table(&self) -> &str {
        &self.encoding_table
    }

    /// Returns the name of the emitted decoding static.
    #[must_use]
    pub fn decoding_table(&self) -> &str {
        &self.decoding_table
    }

    /// Sets the names of the emitted statics.
    ///
    /// Names are normalized to uppercase.
    pub fn set_table_names(&mut self, encoding: &str, decoding: &str) {
        self.encoding_table = encoding.to_uppercase();
        self.decoding_table = decoding.to_uppercase();
    }
}

fn default_encoding_table() -> String {
    "MAP_TO_HFS".to_string()
}

fn default_decoding_table() -> String {
    "MAP_TO_NORMAL".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        orphan_policy: OrphanPolicy,

        #[serde(default)]
        strict_duplicates: bool,

        #[serde(default = "default_encoding_table")]
        encoding_table: String,

        #[serde(default = "default_decoding_table")]
        decoding_table: String,
    },
}

impl From<Versions> for super::Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                orphan_policy,
                strict_duplicates,
                encoding_table,
                decoding_table,
            } => Self {
                orphan_policy,
                strict_duplicates,
                encoding_table: encoding_table.to_uppercase(),
                decoding_table: decoding_table.to_uppercase(),
            },
        }
    }
}

impl From<super::Config> for Versions {
    fn from(config: super::Config) -> Self {
        Self::V1 {
            orphan_policy: config.orphan_policy,
            strict_duplicates: config.strict_duplicates,
            encoding_table: config.encoding_table,
            decoding_table: config.decoding_table,
        }
    }
}
