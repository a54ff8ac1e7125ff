//! Rust source holding the tables as sorted `static` slices.

use std::{io, sync::LazyLock};

use chrono::SecondsFormat;
use regex::Regex;

use crate::{
    domain::{CodePoint, Config, Tables, TrieNode},
    emit::Error,
};

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

const INDENT: &str = "    ";

/// Writes the tables as a Rust module.
///
/// The encoding table is a `&[(char, &str)]` sorted by composed character,
/// and the decoding table a nested `&[(char, ReverseTreeNode)]` sorted by
/// codepoint at every level, so both can be searched with
/// `binary_search_by_key`.
///
/// # Errors
///
/// Returns an error if a configured static name is not a valid identifier,
/// if both names are the same, or if the write fails.
pub fn write<W: io::Write>(tables: &Tables, config: &Config, writer: &mut W) -> Result<(), Error> {
    let encoding_name = identifier(config.encoding_table())?;
    let decoding_name = identifier(config.decoding_table())?;
    if encoding_name == decoding_name {
        return Err(Error::DuplicateName(encoding_name.to_string()));
    }

    write_header(tables, writer)?;

    writeln!(
        writer,
        "/// Composed character to HFS+ decomposition, sorted by composed character."
    )?;
    writeln!(writer, "pub static {encoding_name}: &[(char, &str)] = &[")?;
    for (composed, decomposed) in tables.encoding().iter() {
        let sequence: String = decomposed.iter().map(char_escape).collect();
        writeln!(
            writer,
            "{INDENT}('{}', \"{sequence}\"),",
            char_escape(composed)
        )?;
    }
    writeln!(writer, "];")?;
    writeln!(writer)?;

    writeln!(
        writer,
        "/// HFS+ decomposed sequences to composed characters, sorted by codepoint at every level."
    )?;
    writeln!(writer, "pub static {decoding_name}: &[(char, ReverseTreeNode)] = &[")?;
    write_children(tables.decoding().root(), 1, writer)?;
    writeln!(writer, "];")?;

    Ok(())
}

fn identifier(name: &str) -> Result<&str, Error> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(Error::Identifier(name.to_string()))
    }
}

fn write_header<W: io::Write>(tables: &Tables, writer: &mut W) -> io::Result<()> {
    let provenance = tables.provenance();

    writeln!(writer, "//! HFS+ Unicode decomposition tables")?;
    writeln!(writer, "//!")?;
    match (&provenance.source, &provenance.source_sha256) {
        (Some(source), Some(digest)) => {
            writeln!(writer, "//! Generated from {source} (sha256 {digest})")?;
        }
        (Some(source), None) => writeln!(writer, "//! Generated from {source}")?,
        _ => writeln!(writer, "//! Generated from the TN1150 decomposition table")?,
    }
    writeln!(
        writer,
        "//! built at {}",
        provenance
            .created
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    )?;
    writeln!(writer)?;

    writeln!(writer, "/// Node of the decomposed to composed lookup tree.")?;
    writeln!(writer, "#[derive(Debug)]")?;
    writeln!(writer, "pub struct ReverseTreeNode {{")?;
    writeln!(
        writer,
        "{INDENT}/// Composed character for the path to this node, if the path is complete."
    )?;
    writeln!(writer, "{INDENT}pub current: Option<char>,")?;
    writeln!(writer, "{INDENT}/// Continuations, sorted by codepoint.")?;
    writeln!(writer, "{INDENT}pub next: &'static [(char, ReverseTreeNode)],")?;
    writeln!(writer, "}}")?;
    writeln!(writer)?;
    Ok(())
}

fn write_children<W: io::Write>(node: &TrieNode, depth: usize, writer: &mut W) -> io::Result<()> {
    let indent = INDENT.repeat(depth);
    for (codepoint, child) in node.children() {
        let current = child
            .current()
            .map_or_else(|| "None".to_string(), |c| format!("Some('{}')", char_escape(c)));

        if child.has_children() {
            writeln!(
                writer,
                "{indent}('{}', ReverseTreeNode {{ current: {current}, next: &[",
                char_escape(codepoint)
            )?;
            write_children(child, depth + 1, writer)?;
            writeln!(writer, "{indent}] }}),")?;
        } else {
            writeln!(
                writer,
                "{indent}('{}', ReverseTreeNode {{ current: {current}, next: &[] }}),",
                char_escape(codepoint)
            )?;
        }
    }
    Ok(())
}

fn char_escape(codepoint: CodePoint) -> String {
    format!("\\u{{{:04X}}}", codepoint.value())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::{Decomposition, DecompositionRule, Provenance};

    fn rule(composed: char, decomposed: &str) -> DecompositionRule {
        DecompositionRule::new(
            CodePoint::new(composed),
            Decomposition::from_chars(decomposed).unwrap(),
        )
    }

    fn provenance() -> Provenance {
        Provenance::at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
    }

    fn render(tables: &Tables, config: &Config) -> String {
        let mut buffer = Vec::new();
        write(tables, config, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn emits_sorted_tables() {
        let rules = [
            rule('\u{00E9}', "e\u{0301}"),
            rule('\u{1EB9}', "e\u{0323}"),
            rule('\u{1EC7}', "e\u{0323}\u{0302}"),
            rule('\u{00C0}', "A\u{0300}"),
        ];
        let tables = Tables::build(&rules, provenance());
        let output = render(&tables, &Config::default());

        let expected = r#"//! HFS+ Unicode decomposition tables
//!
//! Generated from the TN1150 decomposition table
//! built at 2024-05-01T12:30:00Z

/// Node of the decomposed to composed lookup tree.
#[derive(Debug)]
pub struct ReverseTreeNode {
    /// Composed character for the path to this node, if the path is complete.
    pub current: Option<char>,
    /// Continuations, sorted by codepoint.
    pub next: &'static [(char, ReverseTreeNode)],
}

/// Composed character to HFS+ decomposition, sorted by composed character.
pub static MAP_TO_HFS: &[(char, &str)] = &[
    ('\u{00C0}', "\u{0041}\u{0300}"),
    ('\u{00E9}', "\u{0065}\u{0301}"),
    ('\u{1EB9}', "\u{0065}\u{0323}"),
    ('\u{1EC7}', "\u{0065}\u{0323}\u{0302}"),
];

/// HFS+ decomposed sequences to composed characters, sorted by codepoint at every level.
pub static MAP_TO_NORMAL: &[(char, ReverseTreeNode)] = &[
    ('\u{0041}', ReverseTreeNode { current: None, next: &[
        ('\u{0300}', ReverseTreeNode { current: Some('\u{00C0}'), next: &[] }),
    ] }),
    ('\u{0065}', ReverseTreeNode { current: None, next: &[
        ('\u{0301}', ReverseTreeNode { current: Some('\u{00E9}'), next: &[] }),
        ('\u{0323}', ReverseTreeNode { current: Some('\u{1EB9}'), next: &[
            ('\u{0302}', ReverseTreeNode { current: Some('\u{1EC7}'), next: &[] }),
        ] }),
    ] }),
];
"#;
        assert_eq!(output, expected);
    }

    #[test]
    fn header_names_source_and_digest() {
        let tables = Tables::build(
            [&rule('\u{00E9}', "e\u{0301}")],
            provenance().with_source("tn1150table.html", b""),
        );
        let output = render(&tables, &Config::default());
        assert!(output.contains(
            "//! Generated from tn1150table.html (sha256 e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855)"
        ));
    }

    #[test]
    fn uses_configured_static_names() {
        let mut config = Config::default();
        config.set_table_names("to_hfs", "from_hfs");
        let tables = Tables::build([&rule('\u{00E9}', "e\u{0301}")], provenance());
        let output = render(&tables, &config);

        assert!(output.contains("pub static TO_HFS: &[(char, &str)]"));
        assert!(output.contains("pub static FROM_HFS: &[(char, ReverseTreeNode)]"));
    }

    #[test]
    fn rejects_invalid_static_name() {
        let mut config = Config::default();
        config.set_table_names("to-hfs", "from_hfs");
        let tables = Tables::build(std::iter::empty(), provenance());

        let mut buffer = Vec::new();
        let error = write(&tables, &config, &mut buffer).unwrap_err();
        assert!(matches!(error, Error::Identifier(name) if name == "TO-HFS"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn rejects_identical_static_names() {
        let mut config = Config::default();
        config.set_table_names("hfs", "HFS");
        let tables = Tables::build(std::iter::empty(), provenance());

        let mut buffer = Vec::new();
        let error = write(&tables, &config, &mut buffer).unwrap_err();
        assert!(matches!(error, Error::DuplicateName(name) if name == "HFS"));
        assert!(buffer.is_empty());
    }

    #[test]
    fn supplementary_codepoints_use_full_width() {
        let tables = Tables::build(
            [&rule('\u{1D15E}', "\u{1D157}\u{1D165}")],
            provenance(),
        );
        let output = render(&tables, &Config::default());
        assert!(output.contains("('\\u{1D15E}', \"\\u{1D157}\\u{1D165}\"),"));
    }
}
