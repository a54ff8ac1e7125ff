//! Colored terminal output

use owo_colors::{colors::css, OwoColorize};

/// Whether stdout accepts color.
///
/// Reports go to stdout while logs go to stderr, so only stdout is checked.
fn supports_color() -> bool {
    supports_color::on_cached(supports_color::Stream::Stdout).is_some()
}

/// Colors for the `inspect` report.
pub trait Colorize {
    /// A lookup that found something (green)
    fn success(&self) -> String;
    /// A lookup that found nothing (amber)
    fn warning(&self) -> String;
    /// A statistic (blue)
    fn info(&self) -> String;
    /// Secondary detail, such as digests and rules
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn info(&self) -> String {
        if supports_color() {
            self.fg::<css::LightBlue>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn info(&self) -> String {
        self.as_str().info()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}
