//! Terminal feedback written to stderr: status lines and a spinner.

use std::io::Write;
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

fn print_status(style: Style, label: &str, message: &str) {
    let _ = writeln!(std::io::stderr(), "{:>12} {message}", style.apply_to(label));
}

/// Print a Cargo-style status line: `   Resolving 12 declared dependencies`
///
/// The `label` is right-aligned on 12 columns in bold green.
pub fn status(label: &str, message: &str) {
    print_status(Style::new().green().bold(), label, message);
}

/// Same as [`status`] with a bold yellow label.
pub fn status_warn(label: &str, message: &str) {
    print_status(Style::new().yellow().bold(), label, message);
}

/// A spinner for work of unknown length, cleared when dropped.
///
/// Hidden when stderr is not a terminal.
pub struct Spinner {
    bar: ProgressBar,
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

pub fn spinner(message: &str) -> Spinner {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    Spinner { bar }
}
