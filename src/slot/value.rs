//! Slot values and fill state.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::slot::SlotName;
use crate::slot::schema::SlotSchema;

/// A typed value extracted for a slot.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SlotValue {
    /// Free text (book titles).
    Text(String),
    /// A calendar date.
    Date(NaiveDate),
    /// Canonical option of an enum vocabulary.
    Choice(String),
    /// Canonical identifier, e.g. `CS101`.
    Identifier(String),
}

impl SlotValue {
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            SlotValue::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Human-facing rendering used in prompts and answers.
    pub fn describe(&self) -> String {
        match self {
            SlotValue::Date(date) => date.format("%A %-d %B %Y").to_string(),
            SlotValue::Text(text) => format!("\"{text}\""),
            other => other.to_string(),
        }
    }
}

/// Canonical rendering, used as the lookup key.
impl fmt::Display for SlotValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotValue::Text(text) => f.write_str(text),
            SlotValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            SlotValue::Choice(choice) => f.write_str(choice),
            SlotValue::Identifier(id) => f.write_str(id),
        }
    }
}

/// Fill state of one slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum SlotFill {
    #[default]
    Empty,
    Filled(SlotValue),
    /// More than one interpretation matched. Candidates are distinct and sorted.
    Ambiguous(Vec<SlotValue>),
}

impl SlotFill {
    /// Build a fill from a list of candidate values.
    ///
    /// Duplicates collapse; no candidates is `Empty`, one is `Filled`.
    pub fn from_candidates(mut candidates: Vec<SlotValue>) -> Self {
        candidates.sort();
        candidates.dedup();
        match candidates.len() {
            0 => SlotFill::Empty,
            1 => SlotFill::Filled(candidates.remove(0)),
            _ => SlotFill::Ambiguous(candidates),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SlotFill::Empty)
    }

    pub fn is_filled(&self) -> bool {
        matches!(self, SlotFill::Filled(_))
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, SlotFill::Ambiguous(_))
    }

    pub fn value(&self) -> Option<&SlotValue> {
        match self {
            SlotFill::Filled(value) => Some(value),
            _ => None,
        }
    }

    pub fn candidates(&self) -> &[SlotValue] {
        match self {
            SlotFill::Ambiguous(candidates) => candidates,
            _ => &[],
        }
    }
}

static EMPTY: SlotFill = SlotFill::Empty;

/// Fill map of a dialogue context, keyed by slot name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotMap(BTreeMap<SlotName, SlotFill>);

impl SlotMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding every slot of the schema, all empty.
    pub fn for_schema(schema: &SlotSchema) -> Self {
        SlotMap(
            schema
                .slots()
                .iter()
                .map(|spec| (spec.name, SlotFill::Empty))
                .collect(),
        )
    }

    /// Fill state of a slot. Absent slots read as `Empty`.
    pub fn get(&self, name: SlotName) -> &SlotFill {
        self.0.get(&name).unwrap_or(&EMPTY)
    }

    pub fn value(&self, name: SlotName) -> Option<&SlotValue> {
        self.get(name).value()
    }

    pub fn set(&mut self, name: SlotName, fill: SlotFill) {
        self.0.insert(name, fill);
    }

    pub fn fill(&mut self, name: SlotName, value: SlotValue) {
        self.set(name, SlotFill::Filled(value));
    }

    pub fn clear(&mut self, name: SlotName) {
        if let Some(fill) = self.0.get_mut(&name) {
            *fill = SlotFill::Empty;
        }
    }

    /// Merge a newer extraction into this map.
    ///
    /// Filled and ambiguous values overwrite; empty values never clear.
    pub fn merge(&mut self, newer: SlotMap) {
        for (name, fill) in newer.0 {
            match fill {
                SlotFill::Empty => {
                    self.0.entry(name).or_insert(SlotFill::Empty);
                }
                fill => {
                    self.0.insert(name, fill);
                }
            }
        }
    }

    /// Slots that are not filled in `self` but are non-empty in `newer`.
    pub fn newly_resolved(&self, newer: &SlotMap) -> Vec<SlotName> {
        newer
            .0
            .iter()
            .filter(|(name, fill)| !fill.is_empty() && !self.get(**name).is_filled())
            .map(|(name, _)| *name)
            .collect()
    }

    /// Every required slot filled and nothing ambiguous.
    pub fn is_complete(&self, schema: &SlotSchema) -> bool {
        schema.slots().iter().all(|spec| match self.get(spec.name) {
            SlotFill::Ambiguous(_) => false,
            SlotFill::Empty => !spec.required,
            SlotFill::Filled(_) => true,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SlotName, &SlotFill)> {
        self.0.iter()
    }

    /// Filled values in schema order.
    pub fn filled_in_order(&self, schema: &SlotSchema) -> Vec<(SlotName, SlotValue)> {
        schema
            .slots()
            .iter()
            .filter_map(|spec| self.value(spec.name).map(|v| (spec.name, v.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Intent;

    fn choice(s: &str) -> SlotValue {
        SlotValue::Choice(s.to_string())
    }

    #[test]
    fn test_from_candidates() {
        assert_eq!(SlotFill::from_candidates(vec![]), SlotFill::Empty);
        assert_eq!(
            SlotFill::from_candidates(vec![choice("Gym"), choice("Gym")]),
            SlotFill::Filled(choice("Gym"))
        );
        let fill = SlotFill::from_candidates(vec![choice("Physics Lab"), choice("Computer Lab")]);
        assert_eq!(fill.candidates(), [choice("Computer Lab"), choice("Physics Lab")]);
    }

    #[test]
    fn test_merge_never_clears() {
        let schema = SlotSchema::for_intent(Intent::FacilityBooking);
        let mut current = SlotMap::for_schema(&schema);
        current.fill(SlotName::FacilityName, choice("Gym"));

        let mut newer = SlotMap::for_schema(&schema);
        let date = NaiveDate::from_ymd_opt(2026, 10, 23).unwrap();
        newer.fill(SlotName::Date, SlotValue::Date(date));

        current.merge(newer);
        assert_eq!(current.value(SlotName::FacilityName), Some(&choice("Gym")));
        assert_eq!(current.value(SlotName::Date), Some(&SlotValue::Date(date)));
    }

    #[test]
    fn test_newly_resolved() {
        let schema = SlotSchema::for_intent(Intent::ExamSchedule);
        let current = SlotMap::for_schema(&schema);
        let mut newer = SlotMap::for_schema(&schema);
        newer.fill(SlotName::CourseId, SlotValue::Identifier("CS101".into()));
        assert_eq!(current.newly_resolved(&newer), vec![SlotName::CourseId]);
        assert!(newer.newly_resolved(&newer).is_empty());
    }

    #[test]
    fn test_is_complete() {
        let schema = SlotSchema::for_intent(Intent::FacilityBooking);
        let mut slots = SlotMap::for_schema(&schema);
        slots.fill(SlotName::FacilityName, SlotValue::Choice("Gym".into()));
        assert!(!slots.is_complete(&schema));

        let friday = NaiveDate::from_ymd_opt(2026, 10, 23).unwrap();
        let later = NaiveDate::from_ymd_opt(2026, 10, 30).unwrap();
        slots.set(
            SlotName::Date,
            SlotFill::Ambiguous(vec![SlotValue::Date(friday), SlotValue::Date(later)]),
        );
        assert!(!slots.is_complete(&schema));

        slots.fill(SlotName::Date, SlotValue::Date(friday));
        assert!(slots.is_complete(&schema));
        assert!(SlotMap::new().is_complete(&SlotSchema::for_intent(Intent::DiningMenu)));
    }

    #[test]
    fn test_value_rendering() {
        let date = SlotValue::Date(NaiveDate::from_ymd_opt(2026, 10, 23).unwrap());
        assert_eq!(date.to_string(), "2026-10-23");
        assert_eq!(date.describe(), "Friday 23 October 2026");
        assert_eq!(SlotValue::Text("rust in action".into()).describe(), "\"rust in action\"");
    }
}
