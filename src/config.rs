//! Engine configuration.
//!
//! Loaded from camelCase JSON; every key is optional and takes its default.
//!
//! # Examples
//!
//! ```
//! use concierge::config::{ClassifierKind, EngineConfig};
//!
//! let config = EngineConfig::from_json_str(r#"{"confidenceThreshold": 0.6}"#).unwrap();
//! assert_eq!(config.confidence_threshold, 0.6);
//! assert_eq!(config.session_idle_timeout_seconds, 600);
//! assert_eq!(config.classifier, ClassifierKind::Keyword);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};

/// Intent classifier backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Weighted cue matching.
    #[default]
    Keyword,
    /// TF-IDF similarity to labelled samples.
    Tfidf,
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::Keyword => f.write_str("keyword"),
            ClassifierKind::Tfidf => f.write_str("tfidf"),
        }
    }
}

impl FromStr for ClassifierKind {
    type Err = ConciergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(ClassifierKind::Keyword),
            "tfidf" | "tf-idf" => Ok(ClassifierKind::Tfidf),
            other => Err(ConciergeError::config(format!(
                "Unknown classifier '{other}', expected 'keyword' or 'tfidf'"
            ))),
        }
    }
}

/// Tunables of [`ConciergeEngine`](crate::engine::ConciergeEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Classifications below this confidence resolve to `UNKNOWN`.
    pub confidence_threshold: f32,
    pub session_idle_timeout_seconds: u64,
    /// Extra attempts after a failed lookup (0 or 1).
    pub dispatch_retry_count: u32,
    pub dispatch_timeout_millis: u64,
    pub sweep_interval_seconds: u64,
    pub classifier: ClassifierKind,
    /// Labelled samples for the TF-IDF backend; built-in samples when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_data: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            session_idle_timeout_seconds: 600,
            dispatch_retry_count: 1,
            dispatch_timeout_millis: 2000,
            sweep_interval_seconds: 60,
            classifier: ClassifierKind::Keyword,
            training_data: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        Self::from_json_str(&content)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConciergeError::config(format!(
                "confidenceThreshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.dispatch_retry_count > 1 {
            return Err(ConciergeError::config(format!(
                "dispatchRetryCount must be 0 or 1, got {}",
                self.dispatch_retry_count
            )));
        }
        for (key, value) in [
            ("sessionIdleTimeoutSeconds", self.session_idle_timeout_seconds),
            ("dispatchTimeoutMillis", self.dispatch_timeout_millis),
            ("sweepIntervalSeconds", self.sweep_interval_seconds),
        ] {
            if value == 0 {
                return Err(ConciergeError::config(format!("{key} must be positive")));
            }
        }
        Ok(())
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_seconds)
    }

    pub fn dispatch_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch_timeout_millis)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}
