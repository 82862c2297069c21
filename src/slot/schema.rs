//! Per-intent slot schemas.
//!
//! Schemas are static tables: each intent has an ordered list of slot specs.
//! Evaluation walks that order, so the first entry is the first thing the
//! user is asked for.

use serde::Serialize;

use crate::intent::Intent;
use crate::slot::SlotName;
use crate::slot::vocabulary::{
    DEPARTMENTS, DINING_HALLS, FACILITIES, LIBRARY_SECTIONS, MEALS, PROCEDURES, Vocabulary,
};

/// How a slot value is recognised.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "vocabulary", rename_all = "snake_case")]
pub enum SlotType {
    String,
    Date,
    Enum(&'static Vocabulary),
    Identifier,
}

impl SlotType {
    pub fn label(&self) -> &'static str {
        match self {
            SlotType::String => "string",
            SlotType::Date => "date",
            SlotType::Enum(_) => "enum",
            SlotType::Identifier => "identifier",
        }
    }
}

/// One slot of an intent schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SlotSpec {
    pub name: SlotName,
    pub kind: SlotType,
    pub required: bool,
    /// Question asked when the slot is missing.
    pub prompt: &'static str,
}

const fn spec(name: SlotName, kind: SlotType, required: bool, prompt: &'static str) -> SlotSpec {
    SlotSpec {
        name,
        kind,
        required,
        prompt,
    }
}

static LIBRARY_HOURS: [SlotSpec; 2] = [
    spec(
        SlotName::LibrarySection,
        SlotType::Enum(&LIBRARY_SECTIONS),
        false,
        "Which library section: Reference, Borrowing or Reading Room?",
    ),
    spec(SlotName::Date, SlotType::Date, false, "For which date?"),
];

static EXAM_SCHEDULE: [SlotSpec; 1] = [spec(
    SlotName::CourseId,
    SlotType::Identifier,
    true,
    "Which course is the exam for? For example CS101.",
)];

static CLASS_SCHEDULE: [SlotSpec; 2] = [
    spec(
        SlotName::Department,
        SlotType::Enum(&DEPARTMENTS),
        true,
        "Which department? For example Computer Science or Mechanical.",
    ),
    spec(
        SlotName::CourseId,
        SlotType::Identifier,
        false,
        "Which course? For example CS201.",
    ),
];

static FACILITY_LOCATION: [SlotSpec; 1] = [spec(
    SlotName::FacilityName,
    SlotType::Enum(&FACILITIES),
    true,
    "Which facility are you looking for?",
)];

static FACILITY_BOOKING: [SlotSpec; 2] = [
    spec(
        SlotName::FacilityName,
        SlotType::Enum(&FACILITIES),
        true,
        "Which facility would you like to book?",
    ),
    spec(
        SlotName::Date,
        SlotType::Date,
        true,
        "For which date would you like to book it?",
    ),
];

static DINING_MENU: [SlotSpec; 3] = [
    spec(
        SlotName::DiningHall,
        SlotType::Enum(&DINING_HALLS),
        false,
        "Which dining hall: Main Canteen or North Mess?",
    ),
    spec(
        SlotName::Meal,
        SlotType::Enum(&MEALS),
        false,
        "Which meal: breakfast, lunch or dinner?",
    ),
    spec(SlotName::Date, SlotType::Date, false, "For which date?"),
];

static BOOK_SEARCH: [SlotSpec; 1] = [spec(
    SlotName::BookTitle,
    SlotType::String,
    true,
    "What is the title of the book?",
)];

static ADMIN_PROCEDURE: [SlotSpec; 1] = [spec(
    SlotName::Procedure,
    SlotType::Enum(&PROCEDURES),
    true,
    "Which procedure do you need help with? For example admissions, exam registration or leave.",
)];

/// Ordered slot specs for one intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SlotSchema {
    intent: Intent,
    slots: &'static [SlotSpec],
}

impl SlotSchema {
    pub fn for_intent(intent: Intent) -> Self {
        let slots: &'static [SlotSpec] = match intent {
            Intent::LibraryHours => &LIBRARY_HOURS,
            Intent::ExamSchedule => &EXAM_SCHEDULE,
            Intent::ClassSchedule => &CLASS_SCHEDULE,
            Intent::FacilityLocation => &FACILITY_LOCATION,
            Intent::FacilityBooking => &FACILITY_BOOKING,
            Intent::DiningMenu => &DINING_MENU,
            Intent::BookSearch => &BOOK_SEARCH,
            Intent::AdminProcedure => &ADMIN_PROCEDURE,
            Intent::Unknown => &[],
        };
        SlotSchema { intent, slots }
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn slots(&self) -> &'static [SlotSpec] {
        self.slots
    }

    pub fn get(&self, name: SlotName) -> Option<&'static SlotSpec> {
        self.slots.iter().find(|spec| spec.name == name)
    }

    pub fn contains(&self, name: SlotName) -> bool {
        self.get(name).is_some()
    }

    pub fn required(&self) -> impl Iterator<Item = &'static SlotSpec> {
        self.slots.iter().filter(|spec| spec.required)
    }

    pub fn required_count(&self) -> usize {
        self.required().count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
