use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;

use concierge::config::EngineConfig;
use concierge::dialogue::DialogueState;
use concierge::dispatch::InMemoryCampusStore;
use concierge::engine::ConciergeEngine;
use concierge::intent::Intent;
use concierge::response::{FallbackReason, ResponseKind};
use concierge::slot::SlotName;

fn engine(config: EngineConfig) -> Arc<ConciergeEngine> {
    Arc::new(
        ConciergeEngine::builder(Arc::new(InMemoryCampusStore::builtin().unwrap()))
            .config(config)
            .reference_date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap())
            .build()
            .unwrap(),
    )
}

fn short_timeouts() -> EngineConfig {
    EngineConfig {
        session_idle_timeout_seconds: 600,
        sweep_interval_seconds: 60,
        ..EngineConfig::default()
    }
}

#[tokio::test(start_paused = true)]
async fn idle_session_is_recreated_on_next_turn() {
    let engine = engine(short_timeouts());

    let reply = engine.handle_utterance("s1", "Exam schedule").await;
    assert_eq!(reply.pending_slot, Some(SlotName::CourseId));

    tokio::time::advance(Duration::from_secs(601)).await;

    // The answer arrives too late: the session starts over and "for CS101"
    // alone carries no intent.
    let reply = engine.handle_utterance("s1", "for CS101").await;
    assert_eq!(reply.turn, 1);
    assert_eq!(reply.intent, Intent::Unknown);
    assert_eq!(reply.fallback_reason(), Some(FallbackReason::LowConfidence));
    assert_eq!(reply.state, DialogueState::Idle);
}

#[tokio::test(start_paused = true)]
async fn activity_keeps_session_alive() {
    let engine = engine(short_timeouts());

    engine.handle_utterance("s1", "Exam schedule").await;
    tokio::time::advance(Duration::from_secs(400)).await;
    engine.handle_utterance("s1", "hmm").await;
    tokio::time::advance(Duration::from_secs(400)).await;

    let reply = engine.handle_utterance("s1", "for CS101").await;
    assert_eq!(reply.turn, 3);
    assert_eq!(reply.kind, ResponseKind::Answer);
}

#[tokio::test(start_paused = true)]
async fn sweeper_expires_idle_sessions() {
    let engine = engine(short_timeouts());
    let sweeper = engine.spawn_sweeper();

    engine.handle_utterance("a", "book a slot").await;
    engine.handle_utterance("b", "Exam schedule").await;
    assert_eq!(engine.active_sessions(), 2);

    tokio::time::sleep(Duration::from_secs(300)).await;
    engine.handle_utterance("b", "hmm").await;

    tokio::time::sleep(Duration::from_secs(400)).await;
    assert!(!engine.sessions().contains("a"));
    assert!(engine.sessions().contains("b"));

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(engine.active_sessions(), 0);

    let reply = engine.handle_utterance("a", "where is the gym").await;
    assert_eq!(reply.turn, 1);
    assert!(reply.is_answer());

    sweeper.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn abandoned_sessions_do_not_accumulate_without_sweeper() {
    let engine = engine(short_timeouts());

    for i in 0..8 {
        engine
            .handle_utterance(&format!("visitor-{i}"), "book a slot")
            .await;
    }
    assert_eq!(engine.active_sessions(), 8);

    tokio::time::advance(Duration::from_secs(601)).await;
    let reply = engine.handle_utterance("late", "where is the gym").await;
    assert!(reply.is_answer());
    assert_eq!(engine.active_sessions(), 1);
}

#[tokio::test]
async fn sessions_are_independent() {
    let engine = engine(EngineConfig::default());

    let conversations = (0..16).map(|i| {
        let engine = engine.clone();
        async move {
            let session = format!("user-{i}");
            let first = engine.handle_utterance(&session, "Exam schedule").await;
            let second = engine.handle_utterance(&session, "for CS101").await;
            (first, second)
        }
    });

    for (first, second) in join_all(conversations).await {
        assert!(first.is_clarification());
        assert_eq!(second.kind, ResponseKind::Answer);
        assert!(second.text.contains("Exam Hall 1"));
    }
    assert_eq!(engine.active_sessions(), 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_session_turns_are_serialized() {
    let engine = engine(EngineConfig::default());

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.handle_utterance("shared", "where is the gym").await })
        })
        .collect();

    let mut turns = Vec::new();
    for handle in handles {
        let reply = handle.await.unwrap();
        assert!(reply.is_answer());
        turns.push(reply.turn);
    }
    turns.sort_unstable();
    assert_eq!(turns, (1..=10).collect::<Vec<u64>>());
}

#[tokio::test]
async fn ended_session_starts_fresh() {
    let engine = engine(EngineConfig::default());

    engine.handle_utterance("s1", "book a slot").await;
    assert!(engine.end_session("s1").await);
    assert!(!engine.end_session("s1").await);

    let reply = engine.handle_utterance("s1", "the gym").await;
    assert_eq!(reply.turn, 1);
    assert_ne!(reply.intent, Intent::FacilityBooking);
}
