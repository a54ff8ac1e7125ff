//! Cell extraction from a plain token list.
//!
//! One cell per line. Blank lines and lines starting with `#` are skipped.

/// Returns the trimmed, non-empty, non-comment lines of `document`.
#[must_use]
pub fn cells(document: &str) -> Vec<String> {
    document
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_cell_per_line() {
        let document = "# HFS+ decompositions\n0x00E9\n0x0065 0x0301\n\n  0x00E8  \r\n0x0065 0x0300\n";
        assert_eq!(
            cells(document),
            vec!["0x00E9", "0x0065 0x0301", "0x00E8", "0x0065 0x0300"]
        );
    }
}
