//! Configuration resolution.
//!
//! Each value comes from its environment variable when set, else from the
//! static config document. The document is read once when [`Config::load`]
//! runs; the resulting [`Config`] is passed to whoever needs it.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::ConfigError;

/// Overrides the location of the config document.
pub const CONFIG_PATH_ENV: &str = "PLAYER_SUITE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

pub const BASE_URL_ENV: &str = "BASE_URL";
pub const TESTER_EMAIL_ENV: &str = "TESTER_EMAIL";
pub const TESTER_PASSWORD_ENV: &str = "TESTER_PASSWORD";

/// The static config document. All keys are optional here; presence is
/// checked when a value is asked for.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    pub base_url: Option<String>,
    pub tester_email: Option<String>,
    pub tester_password: Option<String>,
}

impl ConfigDocument {
    /// Reads the document at `path`. A missing file is an empty document.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, using environment only");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    document: ConfigDocument,
    env: HashMap<&'static str, String>,
}

impl Config {
    /// Loads `.env` (without overriding the process environment), snapshots the
    /// three variables and reads the config document.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_config_path());
        let document = ConfigDocument::read(&path)?;
        let env = [BASE_URL_ENV, TESTER_EMAIL_ENV, TESTER_PASSWORD_ENV]
            .into_iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key, value)))
            .collect();
        Ok(Self { document, env })
    }

    pub fn from_sources<I>(document: ConfigDocument, env: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, String)>,
    {
        Self {
            document,
            env: env.into_iter().collect(),
        }
    }

    fn resolve<'a>(
        &'a self,
        env: &'static str,
        key: &'static str,
        from_document: &'a Option<String>,
    ) -> Result<&'a str, ConfigError> {
        self.env
            .get(env)
            .or(from_document.as_ref())
            .map(String::as_str)
            .ok_or(ConfigError::Missing { key, env })
    }

    pub fn base_url(&self) -> Result<&str, ConfigError> {
        let value = self.resolve(BASE_URL_ENV, "baseUrl", &self.document.base_url)?;
        match Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(value),
            Ok(url) => Err(ConfigError::InvalidBaseUrl {
                value: value.to_string(),
                reason: format!("unsupported scheme `{}`", url.scheme()),
            }),
            Err(err) => Err(ConfigError::InvalidBaseUrl {
                value: value.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    pub fn tester_email(&self) -> Result<&str, ConfigError> {
        self.resolve(TESTER_EMAIL_ENV, "testerEmail", &self.document.tester_email)
    }

    pub fn tester_password(&self) -> Result<&str, ConfigError> {
        self.resolve(
            TESTER_PASSWORD_ENV,
            "testerPassword",
            &self.document.tester_password,
        )
    }
}

fn default_config_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_FILE)
}

/// Knobs of a suite run that are not environment-specific.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteSettings {
    pub players_to_create: usize,
    /// Bounds the whole run, not individual requests.
    pub timeout: Duration,
    pub currency_code: String,
}

impl Default for SuiteSettings {
    fn default() -> Self {
        Self {
            players_to_create: 12,
            timeout: Duration::from_secs(60),
            currency_code: "EUR".to_string(),
        }
    }
}
