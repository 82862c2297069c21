//! The inbound interface: one utterance in, one payload out.
//!
//! ```text
//! text ─► Normalizer ─► GatedClassifier ─► SlotExtractor ─► DialogueManager
//!                                                              │
//!                        clarification ◄───────────────────────┤
//!                                                              ▼
//!                 ResponseRenderer / FallbackHandler ◄─ QueryDispatcher
//! ```

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use tokio::time::Instant;

use crate::analysis::{NormalizedUtterance, Normalizer};
use crate::classifier::{Classification, GatedClassifier, IntentClassifier, build_classifier};
use crate::config::EngineConfig;
use crate::dialogue::{
    DialogueManager, DialogueSession, DispatchPlan, SessionStore, SessionSweeper,
};
use crate::dispatch::{DataSource, QueryDispatcher, QueryResult, ResponseRenderer};
use crate::error::{ConciergeError, Result};
use crate::fallback::FallbackHandler;
use crate::intent::Intent;
use crate::response::{ResponseKind, ResponsePayload};
use crate::slot::{ExtractionContext, RuleBasedSlotExtractor, SlotExtractor, SlotMap};

/// Intent resolution and query dispatch for many concurrent sessions.
///
/// Idle sessions are pruned as turns arrive; [`spawn_sweeper`](Self::spawn_sweeper)
/// also expires them on a fixed interval.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use concierge::config::EngineConfig;
/// use concierge::dispatch::InMemoryCampusStore;
/// use concierge::engine::ConciergeEngine;
/// use concierge::intent::Intent;
///
/// # tokio_test::block_on(async {
/// let store = Arc::new(InMemoryCampusStore::builtin().unwrap());
/// let engine = ConciergeEngine::new(EngineConfig::default(), store).unwrap();
///
/// let reply = engine.handle_utterance("web-1", "When is the library open?").await;
/// assert_eq!(reply.intent, Intent::LibraryHours);
/// assert!(reply.is_answer());
/// # });
/// ```
pub struct ConciergeEngine {
    normalizer: Normalizer,
    manager: DialogueManager,
    dispatcher: QueryDispatcher,
    renderer: ResponseRenderer,
    fallback: FallbackHandler,
    sessions: Arc<SessionStore>,
    config: EngineConfig,
    reference_date: Option<NaiveDate>,
}

impl std::fmt::Debug for ConciergeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConciergeEngine")
            .field("manager", &self.manager)
            .field("dispatcher", &self.dispatcher)
            .field("config", &self.config)
            .field("active_sessions", &self.sessions.active_sessions())
            .finish()
    }
}

impl ConciergeEngine {
    /// Engine with the configured classifier and the rule-based extractor.
    pub fn new(config: EngineConfig, source: Arc<dyn DataSource>) -> Result<Self> {
        ConciergeEngineBuilder::new(source).config(config).build()
    }

    pub fn builder(source: Arc<dyn DataSource>) -> ConciergeEngineBuilder {
        ConciergeEngineBuilder::new(source)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Handle one utterance. Total: every input yields a payload.
    pub async fn handle_utterance(&self, session_id: &str, text: &str) -> ResponsePayload {
        let utterance = self.normalizer.normalize(text);
        let mut session = self.sessions.lock(session_id).await;

        let now = Instant::now();
        if let Err(e) = session.check_idle(now, self.sessions.idle_timeout()) {
            info!("{e}; starting a fresh session");
            session.recreate(now);
        }
        let turn = session.begin_turn(now);
        debug!("session {session_id} turn {turn}: {:?}", utterance.tokens());

        match self.manager.advance(&mut session, &utterance, self.today()) {
            Ok(plan) => self.dispatch(&mut session, plan).await,
            Err(condition) => self.respond_to(&session, condition),
        }
    }

    async fn dispatch(&self, session: &mut DialogueSession, plan: DispatchPlan) -> ResponsePayload {
        let DispatchPlan {
            intent,
            confidence,
            request,
        } = plan;

        let outcome = self.dispatcher.dispatch(&request).await;
        let follow_up = self.manager.complete(session, intent, &outcome);

        match outcome {
            Ok(QueryResult::Records(records)) => {
                let text = self.renderer.render(&request, &records);
                ResponsePayload::for_session(session, ResponseKind::Answer, text)
                    .with_intent(intent, confidence)
                    .with_records(records.records)
            }
            Ok(QueryResult::NotFound) => {
                debug!("session {}: nothing for {intent}", session.id());
                self.fallback
                    .not_found(session, intent, confidence, &request, follow_up.as_deref())
            }
            Err(e) => {
                warn!("session {}: {e}", session.id());
                self.fallback.unavailable(session, intent, confidence)
            }
        }
    }

    fn respond_to(&self, session: &DialogueSession, condition: ConciergeError) -> ResponsePayload {
        let confidence = session.confidence();
        match condition {
            ConciergeError::LowConfidence {
                confidence,
                reprompt,
            } => self
                .fallback
                .low_confidence(session, confidence, reprompt.as_deref()),
            ConciergeError::AmbiguousSlot {
                intent,
                candidates,
                prompt,
                ..
            } => ResponsePayload::for_session(session, ResponseKind::Clarification, prompt)
                .with_intent(intent, confidence)
                .with_options(candidates),
            ConciergeError::MissingRequiredSlot { intent, prompt, .. } => {
                ResponsePayload::for_session(session, ResponseKind::Clarification, prompt)
                    .with_intent(intent, confidence)
            }
            other => {
                warn!("session {}: unexpected condition {other}", session.id());
                self.fallback.low_confidence(session, 0.0, None)
            }
        }
    }

    /// Classify without touching any session.
    pub fn classify(&self, text: &str) -> Classification {
        self.manager.classifier().classify(&self.normalizer.normalize(text))
    }

    /// Extract `intent`'s slots from `text` without touching any session.
    pub fn extract(&self, intent: Intent, text: &str) -> SlotMap {
        let utterance: NormalizedUtterance = self.normalizer.normalize(text);
        self.manager
            .extractor()
            .extract(intent, &utterance, &ExtractionContext::new(self.today()))
    }

    pub async fn end_session(&self, session_id: &str) -> bool {
        self.sessions.end_session(session_id).await
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.active_sessions()
    }

    /// Start the background idle sweeper. Must be called inside a tokio runtime.
    pub fn spawn_sweeper(&self) -> SessionSweeper {
        SessionSweeper::spawn(self.sessions.clone(), self.config.sweep_interval())
    }

    fn today(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

/// Builder for [`ConciergeEngine`].
pub struct ConciergeEngineBuilder {
    source: Arc<dyn DataSource>,
    config: EngineConfig,
    classifier: Option<Arc<dyn IntentClassifier>>,
    extractor: Option<Arc<dyn SlotExtractor>>,
    renderer: ResponseRenderer,
    fallback: FallbackHandler,
    reference_date: Option<NaiveDate>,
}

impl ConciergeEngineBuilder {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            config: EngineConfig::default(),
            classifier: None,
            extractor: None,
            renderer: ResponseRenderer::new(),
            fallback: FallbackHandler::new(),
            reference_date: None,
        }
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this backend instead of the one named by the configuration.
    pub fn classifier(mut self, classifier: Arc<dyn IntentClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn SlotExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn renderer(mut self, renderer: ResponseRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn fallback(mut self, fallback: FallbackHandler) -> Self {
        self.fallback = fallback;
        self
    }

    /// Resolve relative dates against a fixed day instead of the local date.
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn build(self) -> Result<ConciergeEngine> {
        self.config.validate()?;

        let classifier = match self.classifier {
            Some(classifier) => classifier,
            None => build_classifier(self.config.classifier, self.config.training_data.as_deref())?,
        };
        let extractor: Arc<dyn SlotExtractor> = match self.extractor {
            Some(extractor) => extractor,
            None => Arc::new(RuleBasedSlotExtractor::new()?),
        };
        info!(
            "engine ready: classifier {} ({}), extractor {}, source {}",
            classifier.name(),
            classifier.version(),
            extractor.name(),
            self.source.name()
        );

        Ok(ConciergeEngine {
            normalizer: Normalizer::new(),
            manager: DialogueManager::new(
                GatedClassifier::new(classifier, self.config.confidence_threshold),
                extractor,
            ),
            dispatcher: QueryDispatcher::new(
                self.source,
                self.config.dispatch_retry_count,
                self.config.dispatch_timeout(),
            ),
            renderer: self.renderer,
            fallback: self.fallback,
            sessions: Arc::new(SessionStore::new(self.config.idle_timeout())),
            config: self.config,
            reference_date: self.reference_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::InMemoryCampusStore;
    use crate::dialogue::DialogueState;

    fn engine() -> ConciergeEngine {
        ConciergeEngine::builder(Arc::new(InMemoryCampusStore::builtin().unwrap()))
            .reference_date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_answer_turn() {
        let engine = engine();
        let reply = engine.handle_utterance("s1", "where is the gym").await;
        assert!(reply.is_answer());
        assert_eq!(reply.intent, Intent::FacilityLocation);
        assert_eq!(reply.turn, 1);
        assert_eq!(reply.state, DialogueState::Idle);
        assert!(!reply.records.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = EngineConfig {
            confidence_threshold: 2.0,
            ..EngineConfig::default()
        };
        let source = Arc::new(InMemoryCampusStore::builtin().unwrap());
        assert!(ConciergeEngine::new(config, source).is_err());
    }

    #[test]
    fn test_classify_and_extract() {
        let engine = engine();
        let classification = engine.classify("What's on the menu for lunch?");
        assert_eq!(classification.intent, Intent::DiningMenu);

        let slots = engine.extract(Intent::DiningMenu, "What's on the menu for lunch?");
        assert!(slots.get(crate::slot::SlotName::Meal).is_filled());
    }

    #[tokio::test]
    async fn test_end_session() {
        let engine = engine();
        engine.handle_utterance("s1", "book a slot").await;
        assert_eq!(engine.active_sessions(), 1);
        assert!(engine.end_session("s1").await);
        assert_eq!(engine.active_sessions(), 0);
    }
}
