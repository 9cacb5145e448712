use std::{fmt, path::PathBuf, time::Duration};

use thiserror::Error;

use crate::soft::Assertion;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration value `{key}`: set the {env} environment variable or `{key}` in the config file")]
    Missing { key: &'static str, env: &'static str },

    #[error("Invalid base URL {value:?}: {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Carries whatever failed before the run was cut off.
    #[error("Suite exceeded its overall timeout of {limit:?}\n{summary}")]
    Timeout {
        limit: Duration,
        summary: FailureSummary,
    },

    #[error("Suite failed:\n{0}")]
    Failed(FailureSummary),
}

/// Every failed assertion and step error of one run, reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureSummary {
    pub assertions: Vec<Assertion>,
    pub step_errors: Vec<(String, String)>,
}

impl FailureSummary {
    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty() && self.step_errors.is_empty()
    }
}

impl fmt::Display for FailureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.assertions.is_empty() {
            writeln!(f, "{} assertion(s) failed:", self.assertions.len())?;
            for (i, assertion) in self.assertions.iter().enumerate() {
                writeln!(
                    f,
                    "  {}) {}: expected {}, got {}",
                    i + 1,
                    assertion.description,
                    assertion.expected,
                    assertion.actual
                )?;
            }
        }
        if !self.step_errors.is_empty() {
            writeln!(f, "{} step(s) errored:", self.step_errors.len())?;
            for (step, message) in &self.step_errors {
                writeln!(f, "  [{step}] {message}")?;
            }
        }
        Ok(())
    }
}
