//! Application context that holds resolved runtime state
//!
//! Built once in `main` from CLI flags and the environment, then passed
//! read-only to the command handlers.

use crate::format::ColorChoice;
use std::env;

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;

/// Verbosity selected with repeated `-v` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerbosityLevel {
    Normal,
    Verbose,
    VeryVerbose,
    Trace,
}

impl VerbosityLevel {
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::VeryVerbose,
            _ => Self::Trace,
        }
    }

    /// Default `tracing` filter directive for this level
    pub fn filter_directive(self) -> &'static str {
        match self {
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::VeryVerbose => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Application context with resolved runtime state
#[derive(Debug, Clone)]
pub struct AppContext {
    pub color: ColorChoice,
    pub verbosity: VerbosityLevel,
    /// Running as a GitHub Actions step (`GITHUB_ACTIONS=true`)
    pub github_actions: bool,
}

impl AppContext {
    pub fn build(color: ColorChoice, verbosity: VerbosityLevel) -> Self {
        let github_actions = env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true");

        Self {
            color,
            verbosity,
            github_actions,
        }
    }
}
