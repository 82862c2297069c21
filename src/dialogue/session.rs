//! Per-session dialogue context.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::error::{ConciergeError, Result};
use crate::intent::Intent;
use crate::slot::{SlotMap, SlotName};

pub type SessionId = String;

/// Dialogue state machine states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogueState {
    Idle,
    Collecting,
    Ready,
    Dispatched,
    Expired,
}

impl DialogueState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DialogueState::Expired)
    }
}

/// One user's dialogue context.
#[derive(Clone, Debug)]
pub struct DialogueSession {
    id: SessionId,
    intent: Option<Intent>,
    /// Confidence of the classification that set `intent`.
    confidence: f32,
    slots: SlotMap,
    pending_slot: Option<SlotName>,
    /// Last clarification question asked.
    prompt: Option<String>,
    turn: u64,
    last_activity: Instant,
    state: DialogueState,
}

impl DialogueSession {
    pub fn new<S: Into<SessionId>>(id: S, now: Instant) -> Self {
        Self {
            id: id.into(),
            intent: None,
            confidence: 0.0,
            slots: SlotMap::new(),
            pending_slot: None,
            prompt: None,
            turn: 0,
            last_activity: now,
            state: DialogueState::Idle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn intent(&self) -> Option<Intent> {
        self.intent
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn slots(&self) -> &SlotMap {
        &self.slots
    }

    pub fn pending_slot(&self) -> Option<SlotName> {
        self.pending_slot
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn is_collecting(&self) -> bool {
        self.state == DialogueState::Collecting
    }

    /// Count a new turn and refresh the activity timestamp.
    pub fn begin_turn(&mut self, now: Instant) -> u64 {
        self.turn += 1;
        self.last_activity = now;
        self.turn
    }

    /// Whether the session sat idle for at least `timeout`.
    pub fn is_idle_expired(&self, now: Instant, timeout: Duration) -> bool {
        !self.state.is_terminal() && now.saturating_duration_since(self.last_activity) >= timeout
    }

    /// Fail with `SessionExpired` if the idle timeout elapsed or the session
    /// was already expired.
    pub fn check_idle(&self, now: Instant, timeout: Duration) -> Result<()> {
        if self.state.is_terminal() || self.is_idle_expired(now, timeout) {
            return Err(ConciergeError::SessionExpired(self.id.clone()));
        }
        Ok(())
    }

    /// Mark the session expired and drop its context.
    pub fn expire(&mut self) {
        self.clear_context();
        self.state = DialogueState::Expired;
    }

    /// Start over as a fresh idle session with the same id.
    pub fn recreate(&mut self, now: Instant) {
        *self = DialogueSession::new(std::mem::take(&mut self.id), now);
    }

    /// Return to `Idle` with no intent or slots.
    pub fn reset(&mut self) {
        self.clear_context();
        self.state = DialogueState::Idle;
    }

    /// Replace the context with a new intent. Previous slots are discarded.
    pub fn start_intent(&mut self, intent: Intent, confidence: f32, slots: SlotMap) {
        self.intent = Some(intent);
        self.confidence = confidence;
        self.slots = slots;
        self.pending_slot = None;
        self.prompt = None;
        self.state = DialogueState::Collecting;
    }

    /// Merge new values into the current context.
    pub fn merge_slots(&mut self, slots: SlotMap) {
        self.slots.merge(slots);
    }

    pub fn clear_slot(&mut self, name: SlotName) {
        self.slots.clear(name);
    }

    /// Ask for `slot` and stay collecting.
    pub fn await_slot<S: Into<String>>(&mut self, slot: SlotName, prompt: S) {
        self.pending_slot = Some(slot);
        self.prompt = Some(prompt.into());
        self.state = DialogueState::Collecting;
    }

    pub fn set_state(&mut self, state: DialogueState) {
        self.state = state;
    }

    fn clear_context(&mut self) {
        self.intent = None;
        self.confidence = 0.0;
        self.slots = SlotMap::new();
        self.pending_slot = None;
        self.prompt = None;
    }
}
