use std::path::PathBuf;

use hfs_tables::{emit::Format, Config};
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Emit {
    /// Tables written by `build --emit json`
    input: PathBuf,

    /// Where to write the tables [default: stdout]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "rust")]
    format: Format,

    /// Name of the encoding static [default: from config]
    #[arg(long, value_name = "NAME")]
    encoding_table: Option<String>,

    /// Name of the decoding static [default: from config]
    #[arg(long, value_name = "NAME")]
    decoding_table: Option<String>,
}

impl Emit {
    #[instrument(level = "debug", skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let tables = super::read_tables(&self.input)?;

        let mut config = config.clone();
        if self.encoding_table.is_some() || self.decoding_table.is_some() {
            let encoding = self
                .encoding_table
                .unwrap_or_else(|| config.encoding_table().to_string());
            let decoding = self
                .decoding_table
                .unwrap_or_else(|| config.decoding_table().to_string());
            config.set_table_names(&encoding, &decoding);
        }

        super::write_tables(&tables, self.format, &config, self.output.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{TimeZone, Utc};
    use hfs_tables::{CodePoint, Decomposition, DecompositionRule, Provenance, Tables};
    use tempfile::tempdir;

    use super::*;

    fn write_json(path: &std::path::Path) -> Tables {
        let rules = [DecompositionRule::new(
            CodePoint::new('\u{00E9}'),
            Decomposition::from_chars("e\u{0301}").unwrap(),
        )];
        let provenance = Provenance::at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
            .with_source("tn1150table.html", b"<table></table>");
        let tables = Tables::build(&rules, provenance);

        let mut file = fs::File::create(path).unwrap();
        hfs_tables::emit::json::write(&tables, &mut file).unwrap();
        tables
    }

    #[test]
    fn emits_rust_from_json_with_original_provenance() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("tables.json");
        let output = tmp.path().join("hfs_tables.rs");
        let tables = write_json(&input);

        Emit {
            input,
            output: Some(output.clone()),
            format: Format::Rust,
            encoding_table: None,
            decoding_table: None,
        }
        .run(&Config::default())
        .expect("emit should succeed");

        let source = fs::read_to_string(output).unwrap();
        let digest = tables.provenance().source_sha256.clone().unwrap();
        assert!(source.contains(&format!("//! Generated from tn1150table.html (sha256 {digest})")));
        assert!(source.contains("//! built at 2024-05-01T12:30:00Z"));
        assert!(source.contains("pub static MAP_TO_HFS: &[(char, &str)]"));
        assert!(source.contains("('\\u{00E9}', \"\\u{0065}\\u{0301}\"),"));
    }

    #[test]
    fn table_names_can_be_overridden() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("tables.json");
        let output = tmp.path().join("hfs_tables.rs");
        write_json(&input);

        Emit {
            input,
            output: Some(output.clone()),
            format: Format::Rust,
            encoding_table: None,
            decoding_table: Some("from_hfs".to_string()),
        }
        .run(&Config::default())
        .unwrap();

        let source = fs::read_to_string(output).unwrap();
        assert!(source.contains("pub static MAP_TO_HFS: &[(char, &str)]"));
        assert!(source.contains("pub static FROM_HFS: &[(char, ReverseTreeNode)]"));
    }

    #[test]
    fn json_to_json_is_unchanged() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("tables.json");
        let output = tmp.path().join("copy.json");
        write_json(&input);

        Emit {
            input: input.clone(),
            output: Some(output.clone()),
            format: Format::Json,
            encoding_table: None,
            decoding_table: None,
        }
        .run(&Config::default())
        .unwrap();

        assert_eq!(fs::read(input).unwrap(), fs::read(output).unwrap());
    }

    #[test]
    fn missing_input_is_an_error() {
        let tmp = tempdir().unwrap();
        let result = Emit {
            input: tmp.path().join("missing.json"),
            output: None,
            format: Format::Rust,
            encoding_table: None,
            decoding_table: None,
        }
        .run(&Config::default());
        assert!(result.is_err());
    }
}
