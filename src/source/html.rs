//! Cell extraction from the TN1150 decomposition table page.
//!
//! The table keeps every value in a `<p>` inside a `<td>`. Text outside that
//! nesting (headings, notes, navigation) never becomes a cell.

use std::sync::LazyLock;

use regex::Regex;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)\b[^>]*>").expect("tag pattern is valid")
});

/// Returns the text of every `<p>` inside a `<td>`, in document order.
///
/// Inner markup is dropped, entities are decoded and surrounding whitespace
/// is trimmed. Empty cells are skipped.
///
/// ```
/// let page = "<table><tr><td><p>0x00E9</p></td><td><p>0x0065 0x0301</p></td></tr></table>";
/// assert_eq!(hfs_tables::source::html::cells(page), vec!["0x00E9", "0x0065 0x0301"]);
/// ```
#[must_use]
pub fn cells(document: &str) -> Vec<String> {
    let document = COMMENT.replace_all(document, "");
    let mut scanner = Scanner::default();
    let mut last = 0;

    for tag in TAG.captures_iter(&document) {
        let Some(whole) = tag.get(0) else { continue };
        scanner.text(&document[last..whole.start()]);
        scanner.tag(tag[1].is_empty(), &tag[2].to_ascii_lowercase());
        last = whole.end();
    }
    scanner.text(&document[last..]);

    scanner.finish()
}

#[derive(Debug, Default)]
struct Scanner {
    in_td: bool,
    in_p: bool,
    cell: String,
    cells: Vec<String>,
}

impl Scanner {
    fn text(&mut self, text: &str) {
        if self.in_td && self.in_p {
            self.cell.push_str(&html_escape::decode_html_entities(text));
        }
    }

    fn tag(&mut self, opening: bool, name: &str) {
        match (opening, name) {
            (true, "td") => {
                self.flush();
                self.in_td = true;
                self.in_p = false;
            }
            (false, "td") | (_, "tr" | "table") => {
                self.flush();
                self.in_td = false;
                self.in_p = false;
            }
            (true, "p") => {
                self.flush();
                self.in_p = self.in_td;
            }
            (false, "p") => {
                self.flush();
                self.in_p = false;
            }
            (true, "br") => self.text(" "),
            _ => {}
        }
    }

    fn flush(&mut self) {
        let cell = self.cell.trim();
        if !cell.is_empty() {
            self.cells.push(cell.to_string());
        }
        self.cell.clear();
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.cells
    }
}
