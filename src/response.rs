//! The payload returned for every turn.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dialogue::{DialogueSession, DialogueState};
use crate::dispatch::Record;
use crate::intent::Intent;
use crate::slot::SlotName;

/// Why a fallback response was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FallbackReason {
    LowConfidence,
    NotFound,
    DataUnavailable,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FallbackReason::LowConfidence => "low confidence",
            FallbackReason::NotFound => "not found",
            FallbackReason::DataUnavailable => "data unavailable",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseKind {
    Answer,
    Clarification,
    Fallback { reason: FallbackReason },
}

impl ResponseKind {
    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            ResponseKind::Fallback { reason } => Some(*reason),
            _ => None,
        }
    }
}

/// Text plus everything a front end needs to render the turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePayload {
    pub session_id: String,
    pub turn: u64,
    pub text: String,
    pub intent: Intent,
    pub confidence: f32,
    pub kind: ResponseKind,
    /// Dialogue state after the turn.
    pub state: DialogueState,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_slot: Option<SlotName>,
    /// Candidates offered by an ambiguity clarification.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl ResponsePayload {
    /// Start a payload from the session as it stands after the turn.
    pub fn for_session<S: Into<String>>(
        session: &DialogueSession,
        kind: ResponseKind,
        text: S,
    ) -> Self {
        Self {
            session_id: session.id().to_string(),
            turn: session.turn(),
            text: text.into(),
            intent: Intent::Unknown,
            confidence: 0.0,
            kind,
            state: session.state(),
            records: Vec::new(),
            pending_slot: session.pending_slot().filter(|_| session.is_collecting()),
            options: Vec::new(),
        }
    }

    pub fn with_intent(mut self, intent: Intent, confidence: f32) -> Self {
        self.intent = intent;
        self.confidence = confidence;
        self
    }

    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.records = records;
        self
    }

    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }

    pub fn is_answer(&self) -> bool {
        self.kind == ResponseKind::Answer
    }

    pub fn is_clarification(&self) -> bool {
        self.kind == ResponseKind::Clarification
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        self.kind.fallback_reason()
    }
}
