//! The closed intent taxonomy.
//!
//! Every classification resolves to exactly one [`Intent`]. The set is versioned
//! by [`TAXONOMY_VERSION`]; adding or removing a variant bumps the version so that
//! trained classifier data can be checked against it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConciergeError, Result};

/// Version of the intent taxonomy.
pub const TAXONOMY_VERSION: &str = "campus-2";

/// Campus request categories.
///
/// Variant order is the taxonomy order used for deterministic tie-breaking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    LibraryHours,
    ExamSchedule,
    ClassSchedule,
    FacilityLocation,
    FacilityBooking,
    DiningMenu,
    BookSearch,
    AdminProcedure,
    Unknown,
}

impl Intent {
    /// Every routable intent, in taxonomy order. `Unknown` is excluded.
    pub const SUPPORTED: [Intent; 8] = [
        Intent::LibraryHours,
        Intent::ExamSchedule,
        Intent::ClassSchedule,
        Intent::FacilityLocation,
        Intent::FacilityBooking,
        Intent::DiningMenu,
        Intent::BookSearch,
        Intent::AdminProcedure,
    ];

    /// The wire label, e.g. `LIBRARY_HOURS`.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::LibraryHours => "LIBRARY_HOURS",
            Intent::ExamSchedule => "EXAM_SCHEDULE",
            Intent::ClassSchedule => "CLASS_SCHEDULE",
            Intent::FacilityLocation => "FACILITY_LOCATION",
            Intent::FacilityBooking => "FACILITY_BOOKING",
            Intent::DiningMenu => "DINING_MENU",
            Intent::BookSearch => "BOOK_SEARCH",
            Intent::AdminProcedure => "ADMIN_PROCEDURE",
            Intent::Unknown => "UNKNOWN",
        }
    }

    /// Human readable description used in CLI listings.
    pub fn description(&self) -> &'static str {
        match self {
            Intent::LibraryHours => "Library opening hours",
            Intent::ExamSchedule => "Exam dates and rooms for a course",
            Intent::ClassSchedule => "Class timetable for a department",
            Intent::FacilityLocation => "Where a campus facility is",
            Intent::FacilityBooking => "Free booking slots for a facility",
            Intent::DiningMenu => "Dining hall menus",
            Intent::BookSearch => "Library catalogue search",
            Intent::AdminProcedure => "How to complete an administrative procedure",
            Intent::Unknown => "Unrecognised request",
        }
    }

    /// Position in taxonomy order.
    pub fn ordinal(&self) -> usize {
        *self as usize
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Intent::Unknown)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Intent {
    type Err = ConciergeError;

    /// Accepts the wire label in any case, with `-` or `_` separators.
    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_uppercase().replace('-', "_");
        Intent::SUPPORTED
            .iter()
            .chain(std::iter::once(&Intent::Unknown))
            .find(|intent| intent.label() == key)
            .copied()
            .ok_or_else(|| ConciergeError::other(format!("unknown intent label: {s}")))
    }
}
