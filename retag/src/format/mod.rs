use crate::context::{AppContext, VerbosityLevel};
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use std::io::{self, IsTerminal, Write};

/// Color output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Color when stdout is a terminal and `NO_COLOR` is unset
    Auto,
    Always,
    Never,
}

impl From<&str> for ColorChoice {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "always" => ColorChoice::Always,
            "never" => ColorChoice::Never,
            _ => ColorChoice::Auto,
        }
    }
}

/// Check if we should use colors in output
pub fn should_color(ctx: &AppContext) -> bool {
    match ctx.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal(),
    }
}

/// Colorize a checkmark for success if colors are enabled
pub fn checkmark(ctx: &AppContext) -> String {
    if should_color(ctx) {
        format!("{}", "✓".green().bold())
    } else {
        "✓".to_string()
    }
}

/// Colorize an X mark for errors if colors are enabled
pub fn error_mark(ctx: &AppContext) -> String {
    if should_color(ctx) {
        format!("{}", "✗".red().bold())
    } else {
        "✗".to_string()
    }
}

/// Print a success message to stdout
pub fn success(ctx: &AppContext, message: &str) {
    println!("{} {}", checkmark(ctx), message);
}

/// Print an error message to stderr
///
/// Inside GitHub Actions the message is also emitted as an `::error::`
/// workflow annotation so it shows up on the run summary. Both lines go to
/// stderr, leaving stdout to the json/yaml summary.
pub fn error(ctx: &AppContext, message: &str) {
    let _ = write_error(ctx, &mut std::io::stderr().lock(), message);
}

/// Writes an error line, and the workflow annotation when enabled, to `out`
pub fn write_error<W: Write>(ctx: &AppContext, out: &mut W, message: &str) -> io::Result<()> {
    writeln!(out, "{} {}", error_mark(ctx), message)?;
    if ctx.github_actions {
        writeln!(out, "{}", github_error_annotation(message))?;
    }
    Ok(())
}

/// Print a diagnostic line to stderr when the context verbosity allows it
///
/// `Normal` level messages are never printed here; use [`success`] or
/// [`error`] for regular output.
pub fn print(ctx: &AppContext, level: VerbosityLevel, message: &str) {
    if level > VerbosityLevel::Normal && ctx.verbosity >= level {
        eprintln!("{}", message);
    }
}

/// Escapes a message for use as GitHub workflow command data
pub fn escape_annotation(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Formats a GitHub `::error::` workflow command
pub fn github_error_annotation(message: &str) -> String {
    format!("::error::{}", escape_annotation(message))
}

/// Output format for the run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable pretty format
    Pretty,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "yaml" | "yml" => OutputFormat::Yaml,
            _ => OutputFormat::Pretty,
        }
    }
}

/// Trait for types that can be formatted for CLI output
pub trait Formattable: Serialize {
    /// Format the type for pretty (human-readable) output
    fn format_pretty(&self) -> String;
}

/// Format a single item for output
pub fn format_output<T: Formattable>(item: &T, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Pretty => Ok(item.format_pretty()),
        OutputFormat::Json => serde_json::to_string_pretty(item)
            .map_err(|e| format!("Failed to serialize to JSON: {}", e)),
        OutputFormat::Yaml => {
            serde_yaml::to_string(item).map_err(|e| format!("Failed to serialize to YAML: {}", e))
        }
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
