//! Endpoint configuration for the two prediction services.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `COVIDX_*` environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DETECTION_URL: &str = "http://127.0.0.1:5000/predict";
pub const DEFAULT_PREDICTION_URL: &str = "http://127.0.0.1:8080/predict-prediction";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_DETECTION_URL: &str = "COVIDX_DETECTION_URL";
pub const ENV_PREDICTION_URL: &str = "COVIDX_PREDICTION_URL";
pub const ENV_TIMEOUT_SECS: &str = "COVIDX_TIMEOUT_SECS";

/// Where the image classifier and questionnaire classifier live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub detection_url: String,
    pub prediction_url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            detection_url: DEFAULT_DETECTION_URL.to_string(),
            prediction_url: DEFAULT_PREDICTION_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    detection_url: Option<String>,
    prediction_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl ServiceConfig {
    /// Defaults, overlaid with `path` if it exists, overlaid with the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) if p.exists() => Self::from_file(p)?,
            Some(p) => {
                tracing::debug!("No config file at {}, using defaults", p.display());
                Self::default()
            }
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(raw)?;
        let defaults = Self::default();
        let timeout_secs = match file.timeout_secs {
            Some(0) => {
                tracing::warn!(
                    "timeout_secs must be positive, using default {}",
                    defaults.timeout_secs
                );
                defaults.timeout_secs
            }
            Some(secs) => secs,
            None => defaults.timeout_secs,
        };
        Ok(Self {
            detection_url: file.detection_url.unwrap_or(defaults.detection_url),
            prediction_url: file.prediction_url.unwrap_or(defaults.prediction_url),
            timeout_secs,
        })
    }

    /// Applies `COVIDX_*` overrides from `lookup`. Unparseable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_DETECTION_URL).filter(|v| !v.trim().is_empty()) {
            tracing::info!("{ENV_DETECTION_URL} set, using {url}");
            self.detection_url = url.trim().to_string();
        }
        if let Some(url) = lookup(ENV_PREDICTION_URL).filter(|v| !v.trim().is_empty()) {
            tracing::info!("{ENV_PREDICTION_URL} set, using {url}");
            self.prediction_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                Ok(_) => tracing::warn!(
                    "{ENV_TIMEOUT_SECS} must be positive, keeping {}",
                    self.timeout_secs
                ),
                Err(e) => tracing::warn!("Invalid {ENV_TIMEOUT_SECS} value {raw:?}: {e}"),
            }
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_services() {
        let cfg = ServiceConfig::default();
        assert_eq!(cfg.detection_url, "http://127.0.0.1:5000/predict");
        assert_eq!(cfg.prediction_url, "http://127.0.0.1:8080/predict-prediction");
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() -> Result<()> {
        let cfg = ServiceConfig::from_toml_str("prediction_url = \"http://lab:9000/q\"\n")?;
        assert_eq!(cfg.prediction_url, "http://lab:9000/q");
        assert_eq!(cfg.detection_url, DEFAULT_DETECTION_URL);
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        Ok(())
    }

    #[test]
    fn zero_timeout_in_file_falls_back_to_default() -> Result<()> {
        let cfg = ServiceConfig::from_toml_str("timeout_secs = 0\n")?;
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(cfg.timeout() > Duration::ZERO);
        Ok(())
    }

    #[test]
    fn unknown_toml_key_is_rejected() {
        assert!(ServiceConfig::from_toml_str("detection = \"x\"").is_err());
    }

    #[test]
    fn load_reads_file_when_present() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "detection_url = \"http://scanner:5000/predict\"\ntimeout_secs = 5\n",
        )?;
        let cfg = ServiceConfig::from_file(&path)?;
        assert_eq!(cfg.detection_url, "http://scanner:5000/predict");
        assert_eq!(cfg.timeout_secs, 5);
        Ok(())
    }

    #[test]
    fn load_with_missing_file_falls_back_to_defaults() -> Result<()> {
        let dir = tempdir()?;
        let cfg = ServiceConfig::load(Some(&dir.path().join("absent.toml")))?;
        assert_eq!(cfg.prediction_url, ServiceConfig::default().prediction_url);
        Ok(())
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut cfg = ServiceConfig::default();
        cfg.apply_overrides(env(&[
            (ENV_DETECTION_URL, " http://other:1/predict "),
            (ENV_TIMEOUT_SECS, "12"),
        ]));
        assert_eq!(cfg.detection_url, "http://other:1/predict");
        assert_eq!(cfg.prediction_url, DEFAULT_PREDICTION_URL);
        assert_eq!(cfg.timeout_secs, 12);
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut cfg = ServiceConfig::default();
        cfg.apply_overrides(env(&[
            (ENV_PREDICTION_URL, "   "),
            (ENV_TIMEOUT_SECS, "soon"),
        ]));
        assert_eq!(cfg, ServiceConfig::default());

        cfg.apply_overrides(env(&[(ENV_TIMEOUT_SECS, "0")]));
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
