//! Output formatting for the CLI
//!
//! Results go to stdout as JSON or YAML so they can be piped. Messages and
//! colored diffs go to stderr.

use colored::Colorize;
use rustible_ios::error::Result;
use rustible_ios::modules::Diff;
use serde::Serialize;

use super::OutputFormat;

/// Output formatter for different output modes
pub struct OutputFormatter {
    /// Use colored output
    use_color: bool,
    /// Result serialization format
    format: OutputFormat,
    /// Verbosity level
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, format: OutputFormat, verbosity: u8) -> Self {
        // Respect NO_COLOR environment variable
        let use_color = use_color && std::env::var("NO_COLOR").is_err();

        Self {
            use_color,
            format,
            verbosity,
        }
    }

    /// Serialize a result to text in the configured format
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
        })
    }

    /// Print a result to stdout
    pub fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = self.render(value)?;
        println!("{}", text.trim_end());
        Ok(())
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "ERROR:".red().bold(), message);
        } else {
            eprintln!("ERROR: {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.use_color {
            eprintln!("{} {}", "WARNING:".yellow().bold(), message);
        } else {
            eprintln!("WARNING: {}", message);
        }
    }

    /// Print an info message (respects verbosity)
    pub fn info(&self, message: &str) {
        if self.verbosity < 1 {
            return;
        }

        if self.use_color {
            eprintln!("{} {}", "INFO:".blue(), message);
        } else {
            eprintln!("INFO: {}", message);
        }
    }

    /// Print a unified diff to stderr
    pub fn diff(&self, diff: &Diff) {
        let Some(details) = diff.details.as_deref() else {
            return;
        };

        eprintln!();
        for line in details.lines() {
            if !self.use_color {
                eprintln!("{}", line);
            } else if line.starts_with('+') {
                eprintln!("{}", line.green());
            } else if line.starts_with('-') {
                eprintln!("{}", line.red());
            } else {
                eprintln!("{}", line);
            }
        }
        eprintln!();
    }
}
