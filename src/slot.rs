//! Typed slots: names, schemas, values and extraction.
//!
//! ```text
//! Intent ──► SlotSchema (ordered SlotSpecs)
//!                 │
//! Utterance ──► SlotExtractor ──► SlotMap { SlotName → SlotFill }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod date;
pub mod extractor;
pub mod schema;
pub mod value;
pub mod vocabulary;

pub use extractor::{ExtractionContext, RuleBasedSlotExtractor, SlotExtractor};
pub use schema::{SlotSchema, SlotSpec, SlotType};
pub use value::{SlotFill, SlotMap, SlotValue};
pub use vocabulary::Vocabulary;

/// The closed set of slot names shared by all intent schemas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotName {
    Date,
    CourseId,
    Department,
    FacilityName,
    DiningHall,
    Meal,
    BookTitle,
    LibrarySection,
    Procedure,
}

impl SlotName {
    pub fn label(&self) -> &'static str {
        match self {
            SlotName::Date => "date",
            SlotName::CourseId => "course_id",
            SlotName::Department => "department",
            SlotName::FacilityName => "facility_name",
            SlotName::DiningHall => "dining_hall",
            SlotName::Meal => "meal",
            SlotName::BookTitle => "book_title",
            SlotName::LibrarySection => "library_section",
            SlotName::Procedure => "procedure",
        }
    }

    /// Noun used when talking about the slot to the user.
    pub fn noun(&self) -> &'static str {
        match self {
            SlotName::Date => "date",
            SlotName::CourseId => "course",
            SlotName::Department => "department",
            SlotName::FacilityName => "facility",
            SlotName::DiningHall => "dining hall",
            SlotName::Meal => "meal",
            SlotName::BookTitle => "title",
            SlotName::LibrarySection => "section",
            SlotName::Procedure => "procedure",
        }
    }
}

impl fmt::Display for SlotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
