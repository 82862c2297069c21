use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;

use concierge::config::{ClassifierKind, EngineConfig};
use concierge::dialogue::DialogueState;
use concierge::dispatch::{
    CampusDataset, DataSource, InMemoryCampusStore, LookupError, LookupRequest, QueryResult,
};
use concierge::engine::ConciergeEngine;
use concierge::fallback::DEFAULT_HINT;
use concierge::intent::Intent;
use concierge::response::{FallbackReason, ResponseKind};
use concierge::slot::SlotName;

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
}

fn engine_with(source: Arc<dyn DataSource>, config: EngineConfig) -> ConciergeEngine {
    ConciergeEngine::builder(source)
        .config(config)
        .reference_date(reference_date())
        .build()
        .unwrap()
}

fn campus_engine() -> ConciergeEngine {
    engine_with(
        Arc::new(InMemoryCampusStore::builtin().unwrap()),
        EngineConfig::default(),
    )
}

/// Always fails and counts calls.
#[derive(Default)]
struct FailingSource {
    calls: AtomicU32,
}

#[async_trait]
impl DataSource for FailingSource {
    async fn lookup(&self, _request: &LookupRequest) -> Result<QueryResult, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LookupError::Unavailable("connection refused".into()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[tokio::test]
async fn library_hours_question_is_answered() {
    let engine = campus_engine();
    let reply = engine.handle_utterance("s1", "When is the library open?").await;

    assert_eq!(reply.intent, Intent::LibraryHours);
    assert!(reply.confidence >= 0.5);
    assert_eq!(reply.kind, ResponseKind::Answer);
    assert!(reply.text.starts_with("Library hours: "));
    assert!(reply.text.contains("Reference 8 AM - 8 PM"));
    assert!(reply.text.contains("Borrowing 9 AM - 5 PM, closed Sunday"));
    assert_eq!(reply.records.len(), 3);
    assert_eq!(reply.state, DialogueState::Idle);
}

#[tokio::test]
async fn booking_collects_facility_then_date() {
    let engine = campus_engine();

    let reply = engine.handle_utterance("s1", "book a slot").await;
    assert_eq!(reply.kind, ResponseKind::Clarification);
    assert_eq!(reply.intent, Intent::FacilityBooking);
    assert_eq!(reply.state, DialogueState::Collecting);
    assert_eq!(reply.pending_slot, Some(SlotName::FacilityName));
    assert_eq!(reply.text, "Which facility would you like to book?");

    let reply = engine
        .handle_utterance("s1", "the gym day after tomorrow")
        .await;
    assert_eq!(reply.kind, ResponseKind::Answer);
    assert_eq!(reply.intent, Intent::FacilityBooking);
    assert_eq!(
        reply.text,
        "Available slots for Monday 19 October 2026: Gym 07:00-08:00, Gym 18:00-19:00, Gym 19:00-20:00"
    );
    assert_eq!(reply.turn, 2);
}

#[tokio::test]
async fn exam_schedule_follow_up_fills_course() {
    let engine = campus_engine();

    let reply = engine.handle_utterance("s1", "Exam schedule").await;
    assert_eq!(reply.kind, ResponseKind::Clarification);
    assert_eq!(reply.pending_slot, Some(SlotName::CourseId));

    let reply = engine.handle_utterance("s1", "for CS101").await;
    assert_eq!(reply.intent, Intent::ExamSchedule);
    assert_eq!(reply.kind, ResponseKind::Answer);
    assert_eq!(
        reply.text,
        "The CS101 exam (Introduction to Programming) is on Thursday 12 November 2026, 10:00-13:00 in Exam Hall 1."
    );
    assert_eq!(reply.records[0]["room"], "Exam Hall 1");
}

#[tokio::test]
async fn topic_switch_does_not_merge_slots() {
    let engine = campus_engine();

    let reply = engine.handle_utterance("s1", "book the gym").await;
    assert_eq!(reply.intent, Intent::FacilityBooking);
    assert_eq!(reply.pending_slot, Some(SlotName::Date));

    let reply = engine.handle_utterance("s1", "where is the parking").await;
    assert_eq!(reply.intent, Intent::FacilityLocation);
    assert_eq!(reply.kind, ResponseKind::Answer);
    assert_eq!(reply.records.len(), 1);
    assert_eq!(reply.records[0]["name"], "Parking");
    assert!(!reply.text.contains("Gym"));

    // The booking context is gone: a fresh booking asks for the facility again.
    let reply = engine.handle_utterance("s1", "book a slot").await;
    assert_eq!(reply.pending_slot, Some(SlotName::FacilityName));
}

#[tokio::test]
async fn clarification_answer_beats_new_intent_trigger() {
    let engine = campus_engine();

    let reply = engine.handle_utterance("s1", "Which classes are there?").await;
    assert_eq!(reply.pending_slot, Some(SlotName::Department));

    // "exam" would classify as EXAM_SCHEDULE on its own.
    let reply = engine.handle_utterance("s1", "mechanical exam").await;
    assert_eq!(reply.intent, Intent::ClassSchedule);
    assert_eq!(reply.text, "Class schedule: B.Tech ME - 2nd Year: Tue/Thu 09:00-10:30, Room ME-103");
}

#[tokio::test]
async fn self_contained_question_switches_topic_while_collecting() {
    let engine = campus_engine();

    let reply = engine.handle_utterance("s1", "book the gym").await;
    assert_eq!(reply.pending_slot, Some(SlotName::Date));

    // "today" fits the pending date, but the menu question stands on its own.
    let reply = engine.handle_utterance("s1", "what's on the menu today").await;
    assert_eq!(reply.intent, Intent::DiningMenu);
    assert_eq!(reply.kind, ResponseKind::Answer);
    assert!(!reply.text.contains("Gym"));
    assert_eq!(reply.state, DialogueState::Idle);
}

#[tokio::test]
async fn unasked_optional_slot_does_not_hold_the_topic() {
    let engine = campus_engine();

    let reply = engine.handle_utterance("s1", "Which classes are there?").await;
    assert_eq!(reply.pending_slot, Some(SlotName::Department));

    let reply = engine.handle_utterance("s1", "when is the cs101 exam").await;
    assert_eq!(reply.intent, Intent::ExamSchedule);
    assert_eq!(reply.kind, ResponseKind::Answer);
    assert!(reply.text.starts_with("The CS101 exam"));
}

#[tokio::test]
async fn switched_question_keeps_its_own_slots() {
    let engine = campus_engine();

    let reply = engine.handle_utterance("s1", "book the gym").await;
    assert_eq!(reply.intent, Intent::FacilityBooking);

    let reply = engine.handle_utterance("s1", "where is the parking tomorrow").await;
    assert_eq!(reply.intent, Intent::FacilityLocation);
    assert_eq!(reply.kind, ResponseKind::Answer);
    assert_eq!(reply.records.len(), 1);
    assert_eq!(reply.records[0]["name"], "Parking");
}

#[tokio::test]
async fn bare_weekday_asks_which_date() {
    let engine = campus_engine();

    let reply = engine.handle_utterance("s1", "book the gym on friday").await;
    assert_eq!(reply.kind, ResponseKind::Clarification);
    assert_eq!(reply.pending_slot, Some(SlotName::Date));
    assert_eq!(
        reply.options,
        vec!["Friday 23 October 2026", "Friday 30 October 2026"]
    );
    assert_eq!(
        reply.text,
        "Which date do you mean: Friday 23 October 2026 or Friday 30 October 2026?"
    );

    let reply = engine.handle_utterance("s1", "this friday").await;
    assert_eq!(reply.kind, ResponseKind::Answer);
    assert!(reply.text.starts_with("Available slots for Friday 23 October 2026"));
}

#[tokio::test]
async fn unavailable_source_falls_back_after_retry() {
    let source = Arc::new(FailingSource::default());
    let engine = engine_with(source.clone(), EngineConfig::default());

    let reply = engine.handle_utterance("s1", "When is the library open?").await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(reply.intent, Intent::LibraryHours);
    assert_eq!(
        reply.kind,
        ResponseKind::Fallback {
            reason: FallbackReason::DataUnavailable
        }
    );
    assert!(reply.text.contains("service temporarily unavailable"));
    assert_eq!(reply.state, DialogueState::Idle);
}

#[tokio::test]
async fn retry_can_be_disabled() {
    let source = Arc::new(FailingSource::default());
    let config = EngineConfig {
        dispatch_retry_count: 0,
        ..EngineConfig::default()
    };
    let engine = engine_with(source.clone(), config);

    let reply = engine.handle_utterance("s1", "where is the gym").await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    assert_eq!(reply.fallback_reason(), Some(FallbackReason::DataUnavailable));
}

#[tokio::test]
async fn not_found_asks_again() {
    let engine = campus_engine();

    let reply = engine.handle_utterance("s1", "when is the xx999 exam").await;
    assert_eq!(reply.fallback_reason(), Some(FallbackReason::NotFound));
    assert_eq!(reply.intent, Intent::ExamSchedule);
    assert_eq!(reply.state, DialogueState::Collecting);
    assert_eq!(reply.pending_slot, Some(SlotName::CourseId));
    assert!(reply.text.contains("course XX999"));
    assert!(reply.text.ends_with("Which course is the exam for? For example CS101."));

    let reply = engine.handle_utterance("s1", "ma205").await;
    assert_eq!(reply.kind, ResponseKind::Answer);
    assert!(reply.text.contains("Linear Algebra"));
}

#[tokio::test]
async fn low_confidence_gives_hint() {
    let engine = campus_engine();
    let reply = engine.handle_utterance("s1", "hello there").await;

    assert_eq!(reply.intent, Intent::Unknown);
    assert_eq!(reply.fallback_reason(), Some(FallbackReason::LowConfidence));
    assert_eq!(reply.text, DEFAULT_HINT);
    assert_eq!(reply.state, DialogueState::Idle);
}

#[tokio::test]
async fn unknown_reply_while_collecting_repeats_prompt() {
    let engine = campus_engine();
    engine.handle_utterance("s1", "book a slot").await;

    let reply = engine.handle_utterance("s1", "hmm").await;
    assert_eq!(reply.fallback_reason(), Some(FallbackReason::LowConfidence));
    assert_eq!(reply.state, DialogueState::Collecting);
    assert!(reply.text.ends_with("Which facility would you like to book?"));
}

#[tokio::test]
async fn every_input_yields_a_payload() {
    let engine = campus_engine();
    let long = "library ".repeat(5_000);
    let inputs = [
        "",
        "   ",
        "?!?!...",
        "🙂🙂🙂",
        "図書館はいつ開いていますか",
        long.as_str(),
        "\u{0}\u{1}",
    ];

    for (i, input) in inputs.iter().enumerate() {
        let session = format!("t{i}");
        let reply = engine.handle_utterance(&session, input).await;
        assert_eq!(reply.session_id, session);
        assert_eq!(reply.turn, 1);
        assert!(!reply.text.is_empty(), "empty text for input {i}");
        assert!((0.0..=1.0).contains(&reply.confidence));
    }
}

#[tokio::test]
async fn classification_is_deterministic() {
    let engine = campus_engine();
    for text in [
        "When is the library open?",
        "book the gym",
        "what is for lunch",
        "how do i apply for leave",
        "hello",
    ] {
        assert_eq!(engine.classify(text), engine.classify(text));
    }
}

#[tokio::test]
async fn requery_is_idempotent() {
    let engine = campus_engine();
    let first = engine.handle_utterance("s1", "where is the computer lab").await;
    let second = engine.handle_utterance("s1", "where is the computer lab").await;

    assert!(first.is_answer());
    assert_eq!(first.text, second.text);
    assert_eq!(first.records, second.records);
}

#[tokio::test]
async fn dataset_replacement_is_visible_to_next_turn() {
    let store = Arc::new(InMemoryCampusStore::builtin().unwrap());
    let engine = engine_with(store.clone(), EngineConfig::default());

    let mut dataset = CampusDataset::builtin().unwrap();
    for facility in &mut dataset.facilities {
        if facility.name == "Gym" {
            facility.location = "Sports Complex".to_string();
        }
    }
    store.replace(dataset);

    let reply = engine.handle_utterance("s1", "where is the gym").await;
    assert!(reply.text.starts_with("Gym is at Sports Complex."));
}

#[tokio::test]
async fn procedure_answer_uses_faq_format() {
    let engine = campus_engine();
    let reply = engine.handle_utterance("s1", "how do i apply for leave").await;

    assert_eq!(reply.intent, Intent::AdminProcedure);
    assert!(reply.text.starts_with("[Leave] How do I apply for leave?\nAnswer: "));
}

#[tokio::test]
async fn tfidf_backend_routes_questions() {
    let config = EngineConfig {
        classifier: ClassifierKind::Tfidf,
        ..EngineConfig::default()
    };
    let engine = engine_with(Arc::new(InMemoryCampusStore::builtin().unwrap()), config);

    let reply = engine.handle_utterance("s1", "where is the parking").await;
    assert_eq!(reply.intent, Intent::FacilityLocation);
    assert!(reply.is_answer());
}
