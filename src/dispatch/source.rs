//! The data-access interface consumed by the dispatcher.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::intent::Intent;
use crate::slot::{SlotMap, SlotName, SlotSchema, SlotValue};

/// One row of a result, field name to value.
pub type Record = BTreeMap<String, String>;

/// A deterministic lookup: the intent plus its filled slot values in schema order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub intent: Intent,
    pub params: Vec<(SlotName, SlotValue)>,
}

impl LookupRequest {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            params: Vec::new(),
        }
    }

    /// Build the request for a completed slot map. Empty and ambiguous slots
    /// are left out.
    pub fn from_slots(intent: Intent, slots: &SlotMap) -> Self {
        Self {
            intent,
            params: slots.filled_in_order(&SlotSchema::for_intent(intent)),
        }
    }

    pub fn with_param(mut self, name: SlotName, value: SlotValue) -> Self {
        self.params.push((name, value));
        self
    }

    pub fn param(&self, name: SlotName) -> Option<&SlotValue> {
        self.params
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| value)
    }

    /// Canonical string value of a parameter.
    pub fn text(&self, name: SlotName) -> Option<String> {
        self.param(name).map(|value| value.to_string())
    }

    /// "course CS101 and date Friday 23 October 2026"
    pub fn describe(&self) -> String {
        self.params
            .iter()
            .map(|(name, value)| format!("{} {}", name.noun(), value.describe()))
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

/// Records returned by a lookup, tagged with the table they came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub source: String,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new<S: Into<String>>(source: S, records: Vec<Record>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Outcome of a successful lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryResult {
    Records(RecordSet),
    NotFound,
}

impl QueryResult {
    /// Empty record sets become `NotFound`.
    pub fn from_records(records: RecordSet) -> Self {
        if records.is_empty() {
            QueryResult::NotFound
        } else {
            QueryResult::Records(records)
        }
    }

    pub fn is_not_found(&self) -> bool {
        match self {
            QueryResult::NotFound => true,
            QueryResult::Records(records) => records.is_empty(),
        }
    }

    pub fn records(&self) -> &[Record] {
        match self {
            QueryResult::Records(set) => &set.records,
            QueryResult::NotFound => &[],
        }
    }
}

/// Failure of a single lookup attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("data source unavailable: {0}")]
    Unavailable(String),
}

/// Read-only campus data access.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Run one lookup.
    async fn lookup(&self, request: &LookupRequest) -> Result<QueryResult, LookupError>;

    /// Get the name of this data source for debugging and logging.
    fn name(&self) -> &str;
}
