//! Labelled training samples.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::intent::Intent;

/// Built-in samples for the statistical classifier.
const BUILTIN_SAMPLES: &str = include_str!("../../data/intent_samples.json");

/// Training sample for intent classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentSample {
    pub query: String,
    pub intent: Intent,
}

/// Load training data from a JSON file of `[{"query", "intent"}]`.
pub fn load_training_data<P: AsRef<Path>>(path: P) -> Result<Vec<IntentSample>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read training data {}", path.display()))?;
    let samples = serde_json::from_str(&content)
        .with_context(|| format!("invalid training data {}", path.display()))?;
    Ok(samples)
}

pub fn builtin_samples() -> Result<Vec<IntentSample>> {
    Ok(serde_json::from_str(BUILTIN_SAMPLES)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_training_data() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"query": "gym hours", "intent": "LIBRARY_HOURS"}}, {{"query": "menu", "intent": "DINING_MENU"}}]"#
        )
        .unwrap();

        let samples = load_training_data(file.path()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].intent, Intent::DiningMenu);
    }

    #[test]
    fn test_invalid_label_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"query": "weather", "intent": "WEATHER"}}]"#).unwrap();

        let message = load_training_data(file.path()).unwrap_err().to_string();
        assert!(message.starts_with("invalid training data "), "{message}");
        assert!(message.contains("WEATHER"), "{message}");
    }
}
