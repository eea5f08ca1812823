//! Terminal output utilities for styled CLI output.

use std::fmt::Display;

use console::{Term, style};
use estately_business::{FieldErrors, Notification, NotificationLevel, UploadStatus};

/// Terminal output helper for consistent styled output.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    /// Print a success message with a green checkmark.
    pub fn success(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("✓").green().bold(), message)),
        );
    }

    /// Print an error message with a red X.
    pub fn error(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("✗").red().bold(), message)),
        );
    }

    pub fn warning(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("⚠").yellow().bold(), message)),
        );
    }

    pub fn info(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&format!("{} {}", style("ℹ").blue().bold(), message)),
        );
    }

    pub fn print(&self, message: impl Display) {
        drop(self.term.write_line(&message.to_string()));
    }

    pub fn newline(&self) {
        drop(self.term.write_line(""));
    }

    pub fn header(&self, message: impl Display) {
        drop(
            self.term
                .write_line(&style(message).bold().cyan().to_string()),
        );
    }

    pub fn divider(&self, width: usize) {
        drop(
            self.term
                .write_line(&style("─".repeat(width)).dim().to_string()),
        );
    }

    /// Print a labeled value with indentation.
    pub fn labeled_indent(&self, label: impl Display, value: impl Display, indent: usize) {
        let spaces = " ".repeat(indent);
        drop(
            self.term
                .write_line(&format!("{spaces}{}: {}", style(label).dim(), value)),
        );
    }

    pub fn dim(&self, message: impl Display) {
        drop(self.term.write_line(&style(message).dim().to_string()));
    }

    /// Wizard progress line, e.g. `[2/5] Upload Photos`.
    pub fn step(&self, position: usize, total: usize, title: impl Display) {
        drop(self.term.write_line(&format!(
            "\n{} {}",
            style(format!("[{position}/{total}]")).dim(),
            style(title).bold().cyan()
        )));
    }

    pub fn field_errors(&self, errors: &FieldErrors) {
        for message in errors.values() {
            self.error(message);
        }
    }

    pub fn notification(&self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Success => self.success(&notification.message),
            NotificationLevel::Error => self.error(&notification.message),
            NotificationLevel::Info => self.info(&notification.message),
        }
    }

    /// Render the upload progress as a 20 cell bar.
    pub fn upload_progress(&self, name: impl Display, upload: &UploadStatus) {
        let filled = usize::from(upload.progress) / 5;
        drop(self.term.write_line(&format!(
            "  {} {}{} {:>3}%",
            style(name).white().bold(),
            style("█".repeat(filled)).green(),
            style("░".repeat(20 - filled)).dim(),
            upload.progress
        )));
    }

    /// Print a count summary.
    pub fn count(&self, label: impl Display, count: usize) {
        drop(self.term.write_line(&format!(
            "{}: {} propert{}",
            style(label).dim(),
            style(count).cyan().bold(),
            if count == 1 { "y" } else { "ies" }
        )));
    }
}
