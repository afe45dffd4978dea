use console::style;

use crate::jobs::JobStatus;

/// Styled terminal messages. Status lines go to stderr so stdout stays
/// clean for reports piped elsewhere.
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn quiet(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("✓").green(), message);
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("ℹ").blue(), message);
        }
    }

    pub fn section(&self, message: &str) {
        if !self.quiet {
            eprintln!("\n{}", style(message).bold());
            eprintln!("{}", "─".repeat(40));
        }
    }

    /// Multi-line text, printed as-is
    pub fn block(&self, text: &str) {
        if !self.quiet {
            eprintln!("{text}");
        }
    }

    pub fn status(&self, status: JobStatus) -> String {
        let label = status.to_string();
        match status {
            JobStatus::Completed => style(label).green().to_string(),
            JobStatus::Failed => style(label).red().to_string(),
            JobStatus::Pending | JobStatus::Processing => style(label).yellow().to_string(),
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
