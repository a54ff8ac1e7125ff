use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use hfs_tables::{
    emit::Format,
    source::{parse_cells, InputFormat},
    Config, OrphanPolicy, Provenance, TableBuilder,
};
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Build {
    /// Saved copy of the decomposition table
    input: PathBuf,

    /// Layout of the input document
    #[arg(long, value_name = "FORMAT", default_value = "html")]
    format: InputFormat,

    /// Where to write the tables [default: stdout]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "json")]
    emit: Format,

    /// How to treat a decomposition with no composed character before it
    /// [default: from config]
    #[arg(long, value_name = "POLICY")]
    orphans: Option<OrphanPolicy>,

    /// Fail when a rule replaces a different earlier value
    #[arg(long)]
    strict: bool,

    /// Build timestamp to record instead of the current time (RFC 3339)
    #[arg(long, value_name = "TIMESTAMP")]
    created: Option<DateTime<Utc>>,
}

impl Build {
    #[instrument(level = "debug", skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let bytes = std::fs::read(&self.input)
            .with_context(|| format!("failed to read {}", self.input.display()))?;
        let document = std::str::from_utf8(&bytes)
            .with_context(|| format!("{} is not valid UTF-8", self.input.display()))?;

        let cells = self.format.cells(document);
        tracing::debug!("Extracted {} cells", cells.len());

        let policy = self.orphans.unwrap_or(config.orphan_policy);
        let rules = parse_cells(&cells, policy)
            .with_context(|| format!("malformed table in {}", self.input.display()))?;

        let mut builder = TableBuilder::new();
        for rule in &rules {
            builder.push(rule);
        }

        let overwrites = builder.overwrites().len();
        if overwrites > 0 && (self.strict || config.strict_duplicates) {
            anyhow::bail!(
                "{overwrites} rule(s) in {} replace an earlier value: {}",
                self.input.display(),
                builder.overwrites()[0]
            );
        }

        let provenance = self.provenance(&bytes);
        let tables = builder.finish(provenance);

        tracing::info!(
            "Built {} encodings and {} trie nodes from {} rules",
            tables.encoding().len(),
            tables.decoding().node_count(),
            rules.len()
        );

        super::write_tables(&tables, self.emit, config, self.output.as_deref())
    }

    fn provenance(&self, contents: &[u8]) -> Provenance {
        let provenance = self.created.map_or_else(Provenance::now, Provenance::at);
        let name = self.input.file_name().map_or_else(
            || self.input.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        provenance.with_source(name, contents)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::TimeZone;
    use hfs_tables::CodePoint;
    use tempfile::tempdir;

    use super::*;

    const TABLE: &str = r#"<html><body><table>
<tr><td><p>0x00C0</p></td><td><p>0x0041 0x0300</p></td></tr>
<tr><td><p>0x00E9</p></td><td><p>0x0065 0x0301</p></td></tr>
<tr><td><p>0x1EC7</p></td><td><p>0x0065 0x0323 0x0302</p></td></tr>
</table></body></html>
"#;

    fn command(input: PathBuf, output: PathBuf) -> Build {
        Build {
            input,
            format: InputFormat::Html,
            output: Some(output),
            emit: Format::Json,
            orphans: None,
            strict: false,
            created: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap()),
        }
    }

    #[test]
    fn builds_json_tables_from_html() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("tn1150table.html");
        let output = tmp.path().join("tables.json");
        fs::write(&input, TABLE).unwrap();

        command(input, output.clone())
            .run(&Config::default())
            .expect("build should succeed");

        let tables = hfs_tables::emit::json::read(fs::File::open(output).unwrap()).unwrap();
        assert_eq!(tables.encoding().len(), 3);
        assert_eq!(
            tables
                .decoding()
                .lookup(&hfs_tables::Decomposition::from_chars("e\u{0323}\u{0302}").unwrap()),
            Some(CodePoint::new('\u{1EC7}'))
        );
        assert_eq!(
            tables.provenance().source.as_deref(),
            Some("tn1150table.html")
        );
        assert!(tables.provenance().source_sha256.is_some());
    }

    #[test]
    fn orphan_decomposition_fails_by_default() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("table.txt");
        let output = tmp.path().join("tables.json");
        fs::write(&input, "0x0065 0x0301\n").unwrap();

        let mut build = command(input, output.clone());
        build.format = InputFormat::Lines;

        assert!(build.run(&Config::default()).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn orphan_decomposition_skipped_on_request() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("table.txt");
        let output = tmp.path().join("tables.json");
        fs::write(&input, "0x0065 0x0301\n0x00E9\n0x0065 0x0301\n").unwrap();

        let mut build = command(input, output.clone());
        build.format = InputFormat::Lines;
        build.orphans = Some(OrphanPolicy::Skip);
        build.run(&Config::default()).unwrap();

        let tables = hfs_tables::emit::json::read(fs::File::open(output).unwrap()).unwrap();
        assert_eq!(tables.encoding().len(), 1);
    }

    #[test]
    fn strict_build_rejects_conflicting_rules() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("table.txt");
        let output = tmp.path().join("tables.json");
        fs::write(&input, "0x00E9\n0x0065 0x0301\n0x00E9\n0x0065 0x0300\n").unwrap();

        let mut build = command(input.clone(), output.clone());
        build.format = InputFormat::Lines;
        build.strict = true;
        assert!(build.run(&Config::default()).is_err());

        let mut lenient = command(input, output.clone());
        lenient.format = InputFormat::Lines;
        lenient.run(&Config::default()).unwrap();

        let tables = hfs_tables::emit::json::read(fs::File::open(output).unwrap()).unwrap();
        assert_eq!(
            tables.encoding().get(CodePoint::new('\u{00E9}')).map(ToString::to_string),
            Some("U+0065 U+0300".to_string())
        );
    }

    #[test]
    fn strict_duplicates_from_config() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("table.txt");
        fs::write(&input, "0x00E9\n0x0065 0x0301\n0x00E9\n0x0065 0x0300\n").unwrap();

        let mut build = command(input, tmp.path().join("tables.json"));
        build.format = InputFormat::Lines;
        let mut config = Config::default();
        config.strict_duplicates = true;
        assert!(build.run(&config).is_err());
    }

    #[test]
    fn same_input_builds_identical_output() {
        let tmp = tempdir().unwrap();
        let input = tmp.path().join("tn1150table.html");
        fs::write(&input, TABLE).unwrap();

        let first = tmp.path().join("first.json");
        let second = tmp.path().join("second.json");
        command(input.clone(), first.clone())
            .run(&Config::default())
            .unwrap();
        command(input, second.clone())
            .run(&Config::default())
            .unwrap();

        assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
    }
}
