//! # Concierge
//!
//! Intent resolution and structured query dispatch for campus assistants.
//!
//! ## Features
//!
//! - Search-engine style normalization pipeline
//! - Keyword and TF-IDF intent classifiers behind one trait
//! - Typed slot extraction (dates, course ids, vocabularies, titles)
//! - Multi-turn clarification with per-session serialization
//! - Bounded-retry dispatch against a pluggable data source
//! - Deterministic fallbacks for every failure mode

pub mod analysis;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod dialogue;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod intent;
pub mod response;
pub mod slot;

pub mod prelude {
    pub use crate::config::{ClassifierKind, EngineConfig};
    pub use crate::dispatch::{DataSource, InMemoryCampusStore, LookupRequest, QueryResult};
    pub use crate::engine::ConciergeEngine;
    pub use crate::error::{ConciergeError, Result};
    pub use crate::intent::Intent;
    pub use crate::response::{FallbackReason, ResponseKind, ResponsePayload};
    pub use crate::slot::{SlotName, SlotValue};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
