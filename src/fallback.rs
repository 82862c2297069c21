//! Safe responses for turns that cannot be answered.

use log::debug;

use crate::dialogue::DialogueSession;
use crate::dispatch::LookupRequest;
use crate::intent::Intent;
use crate::response::{FallbackReason, ResponseKind, ResponsePayload};

pub const DEFAULT_HINT: &str = "I couldn't find a direct match in the campus database. \
Try asking about specific keywords like 'library hours', 'CS department schedule', \
'canteen menu', or 'how to apply for leave'.";

pub const DEFAULT_UNAVAILABLE: &str =
    "Campus data service temporarily unavailable. Please try again in a moment.";

/// Builds fallback payloads. Never fails.
#[derive(Clone, Debug)]
pub struct FallbackHandler {
    hint: String,
    unavailable: String,
}

impl Default for FallbackHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FallbackHandler {
    pub fn new() -> Self {
        Self {
            hint: DEFAULT_HINT.to_string(),
            unavailable: DEFAULT_UNAVAILABLE.to_string(),
        }
    }

    pub fn with_hint<S: Into<String>>(mut self, hint: S) -> Self {
        self.hint = hint.into();
        self
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// Intent `UNKNOWN`. Repeats the pending question when there is one.
    pub fn low_confidence(
        &self,
        session: &DialogueSession,
        confidence: f32,
        reprompt: Option<&str>,
    ) -> ResponsePayload {
        let text = match reprompt {
            Some(prompt) => format!("Sorry, I didn't understand that. {prompt}"),
            None => self.hint.clone(),
        };
        debug!("session {}: low confidence fallback ({confidence:.3})", session.id());
        ResponsePayload::for_session(session, Self::kind(FallbackReason::LowConfidence), text)
            .with_intent(Intent::Unknown, confidence)
    }

    /// Apology naming the searched values, plus the follow-up question if the
    /// session asks again.
    pub fn not_found(
        &self,
        session: &DialogueSession,
        intent: Intent,
        confidence: f32,
        request: &LookupRequest,
        follow_up: Option<&str>,
    ) -> ResponsePayload {
        let searched = request.describe();
        let mut text = if searched.is_empty() {
            "Sorry, I couldn't find anything matching your request.".to_string()
        } else {
            format!("Sorry, I couldn't find anything for {searched}.")
        };
        if let Some(prompt) = follow_up {
            text.push(' ');
            text.push_str(prompt);
        }
        ResponsePayload::for_session(session, Self::kind(FallbackReason::NotFound), text)
            .with_intent(intent, confidence)
    }

    pub fn unavailable(
        &self,
        session: &DialogueSession,
        intent: Intent,
        confidence: f32,
    ) -> ResponsePayload {
        ResponsePayload::for_session(
            session,
            Self::kind(FallbackReason::DataUnavailable),
            self.unavailable.clone(),
        )
        .with_intent(intent, confidence)
    }

    fn kind(reason: FallbackReason) -> ResponseKind {
        ResponseKind::Fallback { reason }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    use crate::slot::{SlotName, SlotValue};

    fn session() -> DialogueSession {
        DialogueSession::new("s", Instant::now())
    }

    #[test]
    fn test_low_confidence_hint() {
        let payload = FallbackHandler::new().low_confidence(&session(), 0.2, None);
        assert_eq!(payload.intent, Intent::Unknown);
        assert_eq!(payload.confidence, 0.2);
        assert_eq!(payload.text, DEFAULT_HINT);
        assert_eq!(payload.fallback_reason(), Some(FallbackReason::LowConfidence));
    }

    #[test]
    fn test_low_confidence_reprompt() {
        let payload = FallbackHandler::new().low_confidence(
            &session(),
            0.0,
            Some("Which facility would you like to book?"),
        );
        assert!(payload.text.ends_with("Which facility would you like to book?"));
    }

    #[test]
    fn test_not_found_names_values() {
        let request = LookupRequest::new(Intent::ExamSchedule)
            .with_param(SlotName::CourseId, SlotValue::Identifier("XX999".into()));
        let payload = FallbackHandler::new().not_found(
            &session(),
            Intent::ExamSchedule,
            0.7,
            &request,
            Some("Which course is the exam for?"),
        );
        assert!(payload.text.contains("course XX999"));
        assert!(payload.text.ends_with("Which course is the exam for?"));
        assert_eq!(payload.intent, Intent::ExamSchedule);
    }

    #[test]
    fn test_unavailable() {
        let payload = FallbackHandler::new().unavailable(&session(), Intent::DiningMenu, 0.6);
        assert!(payload.text.contains("service temporarily unavailable"));
        assert_eq!(payload.fallback_reason(), Some(FallbackReason::DataUnavailable));
    }
}
