//! Turn evaluation: answer, topic switch, clarification or dispatch.

use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, info};

use crate::analysis::NormalizedUtterance;
use crate::classifier::{Classification, GatedClassifier};
use crate::dialogue::session::{DialogueSession, DialogueState};
use crate::dispatch::source::{LookupRequest, QueryResult};
use crate::error::{ConciergeError, Result};
use crate::intent::Intent;
use crate::slot::{
    ExtractionContext, SlotExtractor, SlotFill, SlotName, SlotSchema, SlotType, SlotValue,
};

/// A completed intent, ready for the dispatcher.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchPlan {
    pub intent: Intent,
    pub confidence: f32,
    pub request: LookupRequest,
}

/// Decides what a turn does to a session.
///
/// [`advance`](Self::advance) returns a [`DispatchPlan`] when the session's
/// intent has every required slot filled and nothing ambiguous. Otherwise it
/// returns one of the turn-level errors, which the engine turns into a
/// response:
///
/// - `LowConfidence`: no intent, and the utterance answered nothing
/// - `MissingRequiredSlot` / `AmbiguousSlot`: ask, stay collecting
#[derive(Clone)]
pub struct DialogueManager {
    classifier: GatedClassifier,
    extractor: Arc<dyn SlotExtractor>,
}

impl std::fmt::Debug for DialogueManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueManager")
            .field("classifier", &self.classifier)
            .field("extractor", &self.extractor.name())
            .finish()
    }
}

impl DialogueManager {
    pub fn new(classifier: GatedClassifier, extractor: Arc<dyn SlotExtractor>) -> Self {
        Self {
            classifier,
            extractor,
        }
    }

    pub fn classifier(&self) -> &GatedClassifier {
        &self.classifier
    }

    pub fn extractor(&self) -> &dyn SlotExtractor {
        self.extractor.as_ref()
    }

    /// Process one utterance against the session.
    pub fn advance(
        &self,
        session: &mut DialogueSession,
        utterance: &NormalizedUtterance,
        today: NaiveDate,
    ) -> Result<DispatchPlan> {
        if matches!(
            session.state(),
            DialogueState::Ready | DialogueState::Dispatched
        ) {
            // The previous turn never completed.
            debug!("session {} left in {:?}, resetting", session.id(), session.state());
            session.reset();
        }

        let classification = self.classifier.classify(utterance);

        if let Some(current) = session.intent().filter(|_| session.is_collecting()) {
            let context = ExtractionContext::new(today).with_pending(session.pending_slot());
            let extracted = self.extractor.extract(current, utterance, &context);
            let answered = session.slots().newly_resolved(&extracted);

            if !answered.is_empty()
                && self.answers_current(
                    session,
                    current,
                    &answered,
                    &classification,
                    utterance,
                    today,
                )
            {
                debug!("session {} answered {:?} for {current}", session.id(), answered);
                session.merge_slots(extracted);
                return self.evaluate(session);
            }
        }

        if classification.is_unknown() {
            return Err(ConciergeError::LowConfidence {
                confidence: classification.confidence,
                reprompt: session
                    .prompt()
                    .filter(|_| session.is_collecting())
                    .map(String::from),
            });
        }

        let intent = classification.intent;
        let same_intent = session.is_collecting() && session.intent() == Some(intent);
        let pending = if same_intent {
            session.pending_slot()
        } else {
            None
        };
        let context = ExtractionContext::new(today).with_pending(pending);
        let extracted = self.extractor.extract(intent, utterance, &context);

        if same_intent {
            session.merge_slots(extracted);
        } else {
            if let Some(previous) = session.intent().filter(|_| session.is_collecting()) {
                info!("session {}: topic switch {previous} -> {intent}", session.id());
            }
            session.start_intent(intent, classification.confidence, extracted);
        }

        self.evaluate(session)
    }

    /// Whether a collecting turn is an answer for `current` rather than a
    /// new question.
    ///
    /// Unknown and same-intent turns answer whatever they resolve. When the
    /// classifier names another intent, the turn answers only if it resolves
    /// the pending slot, that slot is not free text, and the other intent
    /// could not be dispatched from this utterance alone.
    fn answers_current(
        &self,
        session: &DialogueSession,
        current: Intent,
        answered: &[SlotName],
        classification: &Classification,
        utterance: &NormalizedUtterance,
        today: NaiveDate,
    ) -> bool {
        if classification.is_unknown() || classification.intent == current {
            return true;
        }
        let Some(pending) = session.pending_slot().filter(|slot| answered.contains(slot)) else {
            return false;
        };
        let free_text = SlotSchema::for_intent(current)
            .get(pending)
            .is_some_and(|spec| spec.kind == SlotType::String);
        if free_text {
            return false;
        }

        let other = classification.intent;
        let own_slots = self
            .extractor
            .extract(other, utterance, &ExtractionContext::new(today));
        !own_slots.is_complete(&SlotSchema::for_intent(other))
    }

    /// Walk the schema: the first ambiguous or missing required slot asks;
    /// otherwise the session moves to dispatch.
    fn evaluate(&self, session: &mut DialogueSession) -> Result<DispatchPlan> {
        let Some(intent) = session.intent() else {
            return Err(ConciergeError::LowConfidence {
                confidence: 0.0,
                reprompt: None,
            });
        };
        let schema = SlotSchema::for_intent(intent);

        for spec in schema.slots() {
            match session.slots().get(spec.name).clone() {
                SlotFill::Ambiguous(candidates) => {
                    let prompt = ambiguity_prompt(spec.name, &candidates);
                    session.await_slot(spec.name, prompt.clone());
                    return Err(ConciergeError::AmbiguousSlot {
                        intent,
                        slot: spec.name,
                        candidates: candidates.iter().map(SlotValue::describe).collect(),
                        prompt,
                    });
                }
                SlotFill::Empty if spec.required => {
                    session.await_slot(spec.name, spec.prompt);
                    return Err(ConciergeError::MissingRequiredSlot {
                        intent,
                        slot: spec.name,
                        prompt: spec.prompt.to_string(),
                    });
                }
                _ => {}
            }
        }

        session.set_state(DialogueState::Ready);
        let request = LookupRequest::from_slots(intent, session.slots());
        session.set_state(DialogueState::Dispatched);
        debug!("session {} dispatching {intent} {:?}", session.id(), request.params);

        Ok(DispatchPlan {
            intent,
            confidence: session.confidence(),
            request,
        })
    }

    /// Settle the session after dispatch. Returns the follow-up question when
    /// the session goes back to collecting.
    pub fn complete(
        &self,
        session: &mut DialogueSession,
        intent: Intent,
        outcome: &Result<QueryResult>,
    ) -> Option<String> {
        let schema = SlotSchema::for_intent(intent);
        let follow_up = match outcome {
            Ok(result) if result.is_not_found() => schema.required().next(),
            _ => None,
        };

        match follow_up {
            Some(first) => {
                for spec in schema.required() {
                    session.clear_slot(spec.name);
                }
                session.await_slot(first.name, first.prompt);
                Some(first.prompt.to_string())
            }
            None => {
                session.reset();
                None
            }
        }
    }
}

/// "Which date do you mean: Friday 23 October 2026 or Friday 30 October 2026?"
fn ambiguity_prompt(slot: SlotName, candidates: &[SlotValue]) -> String {
    let options: Vec<String> = candidates.iter().map(SlotValue::describe).collect();
    let listing = match options.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
        _ => options.join(""),
    };
    format!("Which {} do you mean: {listing}?", slot.noun())
}
