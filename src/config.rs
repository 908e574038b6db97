//! Runtime settings.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. An optional YAML file (`--config` / `NEWSBYTE_CONFIG`)
//! 3. Command-line flags and their environment variables
//!
//! # YAML Format
//!
//! Every key is optional:
//!
//! ```yaml
//! endpoint: https://gnews.io/api/v4/search
//! api_key: your-key
//! max_results: 3
//! lang: en
//! usage_file: /home/me/.local/share/newsbyte/usage.json
//! pacing:
//!   welcome_ms: 1000
//!   reply_ms: 800
//!   reprompt_ms: 1500
//! ```

use crate::api::DEFAULT_MAX_RESULTS;
use crate::cli::Cli;
use crate::conversation::Pacing;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://gnews.io/api/v4/search";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid endpoint '{endpoint}': {source}")]
    Endpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
}

/// Delays in milliseconds, as written in the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PacingSettings {
    pub welcome_ms: u64,
    pub reply_ms: u64,
    pub reprompt_ms: u64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        let pacing = Pacing::default();
        Self {
            welcome_ms: pacing.welcome.as_millis() as u64,
            reply_ms: pacing.reply.as_millis() as u64,
            reprompt_ms: pacing.reprompt.as_millis() as u64,
        }
    }
}

impl PacingSettings {
    pub fn to_pacing(self) -> Pacing {
        Pacing {
            welcome: Duration::from_millis(self.welcome_ms),
            reply: Duration::from_millis(self.reply_ms),
            reprompt: Duration::from_millis(self.reprompt_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_results: usize,
    pub lang: String,
    pub usage_file: Option<PathBuf>,
    pub pacing: PacingSettings,
    /// Set by `--ephemeral` only.
    #[serde(skip)]
    pub ephemeral: bool,
    /// Set by `--no-delay` only.
    #[serde(skip)]
    pub no_delay: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            max_results: DEFAULT_MAX_RESULTS,
            lang: "en".to_string(),
            usage_file: None,
            pacing: PacingSettings::default(),
            ephemeral: false,
            no_delay: false,
        }
    }
}

impl Settings {
    /// Parse a YAML document. An empty document yields the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    #[instrument(level = "debug")]
    pub fn load_file(path: &str) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let settings = Self::from_yaml(&yaml)?;
        debug!(endpoint = %settings.endpoint, "Loaded settings file");
        Ok(settings)
    }

    /// Build the effective settings for a run.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let base = match &cli.config {
            Some(path) => Self::load_file(path)?,
            None => Self::default(),
        };
        Ok(base.apply_cli(cli))
    }

    /// Overlay command-line values on top of `self`.
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(endpoint) = &cli.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(key) = &cli.api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(max) = cli.max_results {
            self.max_results = max;
        }
        if let Some(lang) = &cli.lang {
            self.lang = lang.clone();
        }
        if let Some(path) = &cli.usage_file {
            self.usage_file = Some(PathBuf::from(path));
        }
        self.ephemeral = cli.ephemeral;
        self.no_delay = cli.no_delay;
        // A blank key from the environment means "no key".
        self.api_key = self.api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.endpoint).map_err(|source| ConfigError::Endpoint {
            endpoint: self.endpoint.clone(),
            source,
        })
    }

    pub fn pacing(&self) -> Pacing {
        if self.no_delay {
            return Pacing::instant();
        }
        self.pacing.to_pacing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.max_results, 3);
        assert_eq!(settings.lang, "en");
        assert_eq!(settings.pacing(), Pacing::default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml(
            "endpoint: http://localhost:3000/api/news\npacing:\n  reply_ms: 10\n",
        )
        .unwrap();

        assert_eq!(settings.endpoint, "http://localhost:3000/api/news");
        assert_eq!(settings.max_results, 3);
        assert_eq!(settings.pacing.reply_ms, 10);
        assert_eq!(settings.pacing.welcome_ms, 1000);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        assert!(matches!(
            Settings::from_yaml("max_results: lots"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "endpoint: https://file.test/search\nmax_results: 5\nlang: fr").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::parse_from([
            "newsbyte",
            "--config",
            &path,
            "--endpoint",
            "https://cli.test/search",
            "--no-delay",
        ]);
        let settings = Settings::from_cli(&cli).unwrap();

        assert_eq!(settings.endpoint, "https://cli.test/search");
        assert_eq!(settings.max_results, 5);
        assert_eq!(settings.lang, "fr");
        assert_eq!(settings.pacing(), Pacing::instant());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let cli = Cli::parse_from(["newsbyte", "--config", "/nonexistent/newsbyte.yaml"]);
        assert!(matches!(
            Settings::from_cli(&cli),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_blank_api_key_is_dropped() {
        let cli = Cli::parse_from(["newsbyte", "--api-key", "  "]);
        let settings = Settings::default().apply_cli(&cli);
        assert_eq!(settings.api_key, None);
    }

    #[test]
    fn test_endpoint_validation() {
        let mut settings = Settings::default();
        assert!(settings.endpoint_url().is_ok());

        settings.endpoint = "not a url".to_string();
        assert!(matches!(
            settings.endpoint_url(),
            Err(ConfigError::Endpoint { .. })
        ));
    }
}
