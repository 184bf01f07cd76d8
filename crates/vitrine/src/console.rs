//! Terminal notifier: store messages printed to stderr.

use std::io::{self, Write};

use owo_colors::OwoColorize;
use vitrine_core::{Notifier, Severity};

/// Prints notifications as `✓ message` lines on stderr.
///
/// Errors are skipped: every failed action also returns its error, which
/// `main` renders as a diagnostic. `--quiet` keeps only warnings.
pub struct ConsoleNotifier {
    quiet: bool,
    color: bool,
}

impl ConsoleNotifier {
    pub fn new(quiet: bool, color: bool) -> Self {
        Self { quiet, color }
    }

    fn marker(&self, severity: Severity) -> String {
        let (symbol, painted) = match severity {
            Severity::Success => ("✓", "✓".green().to_string()),
            Severity::Warning => ("!", "!".yellow().to_string()),
            Severity::Error => ("✗", "✗".red().to_string()),
            Severity::Info => ("i", "i".cyan().to_string()),
        };
        if self.color { painted } else { symbol.to_owned() }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        if severity == Severity::Error || (self.quiet && severity != Severity::Warning) {
            return;
        }
        let marker = self.marker(severity);
        let _ = writeln!(io::stderr().lock(), "{marker} {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_are_plain_without_color() {
        let console = ConsoleNotifier::new(false, false);
        assert_eq!(console.marker(Severity::Success), "✓");
        assert_eq!(console.marker(Severity::Warning), "!");
    }

    #[test]
    fn colored_markers_carry_escape_codes() {
        let console = ConsoleNotifier::new(false, true);
        assert!(console.marker(Severity::Success).contains("\u{1b}["));
    }
}
