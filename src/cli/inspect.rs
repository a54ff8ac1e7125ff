use std::path::PathBuf;

use chrono::SecondsFormat;
use hfs_tables::{CodePoint, Tables, TrieNode};
use serde::Serialize;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Inspect {
    /// Tables written by `build --emit json`
    input: PathBuf,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Show the decomposition of a composed character (0xHHHH or U+HHHH)
    #[arg(long, value_name = "CODEPOINT")]
    decompose: Option<CodePoint>,

    /// Find the longest decomposed sequence at the start of the given
    /// codepoints and the character it composes to
    #[arg(long, value_name = "CODEPOINT", num_args = 1..)]
    compose: Vec<CodePoint>,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Summary of a table set.
#[derive(Debug, PartialEq, Eq, Serialize)]
struct Report {
    created: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_sha256: Option<String>,
    encodings: usize,
    trie_nodes: usize,
    max_depth: usize,
    /// Nodes that complete a sequence and can still be extended.
    ambiguous: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    decomposition: Option<Lookup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    composition: Option<Lookup>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct Lookup {
    query: String,
    result: Option<String>,
}

impl Inspect {
    #[instrument(level = "debug")]
    pub fn run(self) -> anyhow::Result<()> {
        let tables = super::read_tables(&self.input)?;
        let report = self.report(&tables);

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Table => Self::output_table(&report),
        }
        Ok(())
    }

    fn report(&self, tables: &Tables) -> Report {
        let provenance = tables.provenance();

        let decomposition = self.decompose.map(|composed| Lookup {
            query: composed.to_string(),
            result: tables.encoding().get(composed).map(ToString::to_string),
        });

        let composition = (!self.compose.is_empty()).then(|| Lookup {
            query: join(&self.compose),
            result: tables
                .decoding()
                .longest_match(&self.compose)
                .map(|(composed, len)| format!("{composed} <- {}", join(&self.compose[..len]))),
        });

        Report {
            created: provenance
                .created
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            source: provenance.source.clone(),
            source_sha256: provenance.source_sha256.clone(),
            encodings: tables.encoding().len(),
            trie_nodes: tables.decoding().node_count(),
            max_depth: tables.decoding().max_depth(),
            ambiguous: count_ambiguous(tables.decoding().root()),
            decomposition,
            composition,
        }
    }

    fn output_table(report: &Report) {
        println!("HFS+ decomposition tables");
        println!("{}", "─────────────────────────".dim());
        println!("{:<12} {}", "Created", report.created);
        if let Some(source) = &report.source {
            println!("{:<12} {source}", "Source");
        }
        if let Some(digest) = &report.source_sha256 {
            println!("{:<12} {}", "SHA-256", digest.dim());
        }
        println!();
        println!("{:<12} {}", "Encodings", report.encodings.to_string().info());
        println!("{:<12} {}", "Trie nodes", report.trie_nodes.to_string().info());
        println!("{:<12} {}", "Max depth", report.max_depth.to_string().info());
        println!("{:<12} {}", "Ambiguous", report.ambiguous.to_string().info());

        for (label, lookup) in [
            ("Decompose", &report.decomposition),
            ("Compose", &report.composition),
        ] {
            let Some(lookup) = lookup else { continue };
            println!();
            match &lookup.result {
                Some(result) => println!("{label} {}: {}", lookup.query, result.success()),
                None => println!("{label} {}: {}", lookup.query, "no match".warning()),
            }
        }
    }
}

fn join(codepoints: &[CodePoint]) -> String {
    codepoints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn count_ambiguous(node: &TrieNode) -> usize {
    node.children()
        .map(|(_, child)| {
            let own = usize::from(child.current().is_some() && child.has_children());
            own + count_ambiguous(child)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use hfs_tables::{Decomposition, DecompositionRule, Provenance};

    use super::*;

    fn cp(c: char) -> CodePoint {
        CodePoint::new(c)
    }

    fn tables() -> Tables {
        let rules = [
            DecompositionRule::new(cp('\u{00E9}'), Decomposition::from_chars("e\u{0301}").unwrap()),
            DecompositionRule::new(cp('\u{1EB9}'), Decomposition::from_chars("e\u{0323}").unwrap()),
            DecompositionRule::new(
                cp('\u{1EC7}'),
                Decomposition::from_chars("e\u{0323}\u{0302}").unwrap(),
            ),
        ];
        let provenance = Provenance::at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
        Tables::build(&rules, provenance)
    }

    fn inspect(decompose: Option<CodePoint>, compose: Vec<CodePoint>) -> Inspect {
        Inspect {
            input: PathBuf::from("tables.json"),
            output: OutputFormat::Json,
            decompose,
            compose,
        }
    }

    #[test]
    fn reports_statistics() {
        let report = inspect(None, Vec::new()).report(&tables());

        assert_eq!(report.encodings, 3);
        // e, e+0301, e+0323, e+0323+0302
        assert_eq!(report.trie_nodes, 4);
        assert_eq!(report.max_depth, 3);
        assert_eq!(report.ambiguous, 1);
        assert_eq!(report.created, "2024-05-01T12:30:00Z");
        assert!(report.decomposition.is_none());
        assert!(report.composition.is_none());
    }

    #[test]
    fn looks_up_decomposition() {
        let report = inspect(Some(cp('\u{1EC7}')), Vec::new()).report(&tables());
        assert_eq!(
            report.decomposition,
            Some(Lookup {
                query: "U+1EC7".to_string(),
                result: Some("U+0065 U+0323 U+0302".to_string()),
            })
        );
    }

    #[test]
    fn composes_longest_prefix() {
        let report = inspect(
            None,
            vec![cp('e'), cp('\u{0323}'), cp('\u{0301}')],
        )
        .report(&tables());
        assert_eq!(
            report.composition.and_then(|lookup| lookup.result),
            Some("U+1EB9 <- U+0065 U+0323".to_string())
        );
    }

    #[test]
    fn unknown_entries_have_no_result() {
        let report = inspect(Some(cp('x')), vec![cp('x'), cp('\u{0301}')]).report(&tables());
        assert_eq!(report.decomposition.and_then(|lookup| lookup.result), None);
        assert_eq!(report.composition.and_then(|lookup| lookup.result), None);
    }
}
