//! Error types for the Concierge engine.
//!
//! All failures are represented by the [`ConciergeError`] enum. Two families live
//! side by side:
//!
//! - Turn-level conditions (`LowConfidence`, `AmbiguousSlot`, `MissingRequiredSlot`,
//!   `DataUnavailable`, `SessionExpired`). The engine recovers from every one of them
//!   locally and turns it into a response payload; they never escape
//!   [`ConciergeEngine::handle_utterance`](crate::engine::ConciergeEngine::handle_utterance).
//! - Ambient errors (I/O, JSON, configuration, analysis) raised while loading
//!   configuration, datasets or training data. File loaders attach the path
//!   with `anyhow` context; those surface as [`ConciergeError::Anyhow`].
//!
//! # Examples
//!
//! ```
//! use concierge::error::{ConciergeError, Result};
//!
//! fn load() -> Result<()> {
//!     Err(ConciergeError::config("confidenceThreshold must be within [0, 1]"))
//! }
//!
//! assert_eq!(
//!     load().unwrap_err().to_string(),
//!     "Configuration error: confidenceThreshold must be within [0, 1]"
//! );
//! ```

use std::io;

use thiserror::Error;

use crate::intent::Intent;
use crate::slot::SlotName;

/// The main error type for Concierge operations.
#[derive(Error, Debug)]
pub enum ConciergeError {
    /// The classifier was not confident enough to route the utterance.
    #[error("Low confidence: {confidence:.2}")]
    LowConfidence {
        confidence: f32,
        /// Prompt to repeat when the session is still collecting slots.
        reprompt: Option<String>,
    },

    /// A slot matched more than one interpretation.
    #[error("Ambiguous slot {slot} for {intent}: {}", candidates.join(" | "))]
    AmbiguousSlot {
        intent: Intent,
        slot: SlotName,
        candidates: Vec<String>,
        prompt: String,
    },

    /// A required slot has no value yet.
    #[error("Missing required slot {slot} for {intent}")]
    MissingRequiredSlot {
        intent: Intent,
        slot: SlotName,
        prompt: String,
    },

    /// The data-access interface failed on every attempt.
    #[error("Data unavailable after {attempts} attempt(s): {reason}")]
    DataUnavailable { attempts: u32, reason: String },

    /// The session was idle past the configured timeout.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// I/O errors (config files, datasets)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Analysis-related errors (tokenization, filtering)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Classifier construction or prediction errors
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// File loading failures, with the file named in the context chain.
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with ConciergeError.
pub type Result<T> = std::result::Result<T, ConciergeError>;

impl ConciergeError {
    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ConciergeError::Config(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        ConciergeError::Analysis(msg.into())
    }

    /// Create a new classifier error.
    pub fn classifier<S: Into<String>>(msg: S) -> Self {
        ConciergeError::Classifier(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ConciergeError::Other(msg.into())
    }

    /// Create a new data-unavailable error.
    pub fn data_unavailable<S: Into<String>>(attempts: u32, reason: S) -> Self {
        ConciergeError::DataUnavailable {
            attempts,
            reason: reason.into(),
        }
    }

    /// Whether the engine answers this condition with a clarification prompt.
    pub fn is_clarification(&self) -> bool {
        self.clarification_prompt().is_some()
    }

    /// The question to ask the user for clarification kinds.
    pub fn clarification_prompt(&self) -> Option<&str> {
        match self {
            ConciergeError::AmbiguousSlot { prompt, .. }
            | ConciergeError::MissingRequiredSlot { prompt, .. } => Some(prompt.as_str()),
            _ => None,
        }
    }
}
