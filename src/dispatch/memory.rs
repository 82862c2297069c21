//! In-memory campus data source.
//!
//! [`InMemoryCampusStore`] answers every intent from a [`CampusDataset`] loaded
//! from JSON. The dataset sits behind a lock and can be swapped atomically
//! with [`InMemoryCampusStore::replace`]; each lookup reads one consistent
//! snapshot.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use log::info;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::dispatch::source::{
    DataSource, LookupError, LookupRequest, QueryResult, Record, RecordSet,
};
use crate::error::Result;
use crate::intent::Intent;
use crate::slot::{SlotName, SlotValue};

const BUILTIN_DATASET: &str = include_str!("../../data/campus.json");

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibrarySection {
    pub section: String,
    pub services: String,
    #[serde(default)]
    pub notes: String,
    pub hours: String,
    /// Weekday names the section is closed on.
    #[serde(default)]
    pub closed_on: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamEntry {
    pub course_id: String,
    pub course: String,
    pub date: NaiveDate,
    pub time: String,
    pub room: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSchedule {
    pub department: String,
    pub course: String,
    #[serde(default)]
    pub course_id: String,
    pub details: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub name: String,
    pub description: String,
    pub location: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSlots {
    pub facility: String,
    pub days: Vec<String>,
    pub slots: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub meal: String,
    pub hours: String,
    pub items: String,
    /// Saturday and Sunday menu, when it differs.
    #[serde(default)]
    pub weekend_items: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningHall {
    pub name: String,
    pub menu: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub meals: Vec<Meal>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: String,
    pub author: String,
    pub call_number: String,
    pub copies_available: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub category: String,
    pub question: String,
    pub answer: String,
}

/// All campus tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampusDataset {
    pub library: Vec<LibrarySection>,
    pub exams: Vec<ExamEntry>,
    pub class_schedules: Vec<ClassSchedule>,
    pub facilities: Vec<Facility>,
    pub booking_slots: Vec<BookingSlots>,
    pub dining: Vec<DiningHall>,
    pub books: Vec<Book>,
    pub procedures: Vec<Procedure>,
}

impl CampusDataset {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read campus dataset {}", path.display()))?;
        let dataset = serde_json::from_str(&json)
            .with_context(|| format!("invalid campus dataset {}", path.display()))?;
        Ok(dataset)
    }

    /// The sample campus shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_DATASET)
    }

    /// Answer a request against this snapshot.
    pub fn query(&self, request: &LookupRequest) -> QueryResult {
        let (source, records) = match request.intent {
            Intent::LibraryHours => ("library", self.library_hours(request)),
            Intent::ExamSchedule => ("exams", self.exam_schedule(request)),
            Intent::ClassSchedule => ("class_schedules", self.class_schedule(request)),
            Intent::FacilityLocation => ("facilities", self.facility_location(request)),
            Intent::FacilityBooking => ("booking_slots", self.facility_booking(request)),
            Intent::DiningMenu => ("dining", self.dining_menu(request)),
            Intent::BookSearch => ("books", self.book_search(request)),
            Intent::AdminProcedure => ("procedures", self.admin_procedure(request)),
            Intent::Unknown => return QueryResult::NotFound,
        };
        QueryResult::from_records(RecordSet::new(source, records))
    }

    fn library_hours(&self, request: &LookupRequest) -> Vec<Record> {
        let section = request.text(SlotName::LibrarySection);
        let date = request.param(SlotName::Date).and_then(SlotValue::as_date);

        self.library
            .iter()
            .filter(|s| matches_opt(&s.section, section.as_deref()))
            .map(|s| {
                let hours = match date {
                    Some(date) if s.closed_on.iter().any(|d| is_weekday(d, date.weekday())) => {
                        "Closed".to_string()
                    }
                    Some(_) => s.hours.clone(),
                    None if s.closed_on.is_empty() => format!("{} daily", s.hours),
                    None => format!("{}, closed {}", s.hours, s.closed_on.join(" and ")),
                };
                let mut record = record([
                    ("section", s.section.as_str()),
                    ("hours", hours.as_str()),
                    ("services", s.services.as_str()),
                    ("notes", s.notes.as_str()),
                ]);
                if let Some(date) = date {
                    record.insert("date".into(), date.to_string());
                }
                record
            })
            .collect()
    }

    fn exam_schedule(&self, request: &LookupRequest) -> Vec<Record> {
        let Some(course_id) = request.text(SlotName::CourseId) else {
            return Vec::new();
        };
        self.exams
            .iter()
            .filter(|e| e.course_id.eq_ignore_ascii_case(&course_id))
            .map(|e| {
                record([
                    ("course_id", e.course_id.as_str()),
                    ("course", e.course.as_str()),
                    ("date", e.date.to_string().as_str()),
                    ("time", e.time.as_str()),
                    ("room", e.room.as_str()),
                ])
            })
            .collect()
    }

    fn class_schedule(&self, request: &LookupRequest) -> Vec<Record> {
        let Some(department) = request.text(SlotName::Department) else {
            return Vec::new();
        };
        let course_id = request.text(SlotName::CourseId);
        self.class_schedules
            .iter()
            .filter(|c| c.department.eq_ignore_ascii_case(&department))
            .filter(|c| matches_opt(&c.course_id, course_id.as_deref()))
            .map(|c| {
                record([
                    ("department", c.department.as_str()),
                    ("course", c.course.as_str()),
                    ("course_id", c.course_id.as_str()),
                    ("details", c.details.as_str()),
                ])
            })
            .collect()
    }

    fn facility_location(&self, request: &LookupRequest) -> Vec<Record> {
        let Some(name) = request.text(SlotName::FacilityName) else {
            return Vec::new();
        };
        self.facilities
            .iter()
            .filter(|f| f.name.eq_ignore_ascii_case(&name))
            .map(|f| {
                record([
                    ("name", f.name.as_str()),
                    ("description", f.description.as_str()),
                    ("location", f.location.as_str()),
                ])
            })
            .collect()
    }

    fn facility_booking(&self, request: &LookupRequest) -> Vec<Record> {
        let (Some(facility), Some(date)) = (
            request.text(SlotName::FacilityName),
            request.param(SlotName::Date).and_then(SlotValue::as_date),
        ) else {
            return Vec::new();
        };
        let day = date.to_string();
        let day = day.as_str();

        self.booking_slots
            .iter()
            .filter(|b| b.facility.eq_ignore_ascii_case(&facility))
            .filter(|b| b.days.iter().any(|d| is_weekday(d, date.weekday())))
            .flat_map(|b| {
                b.slots.iter().map(move |slot| {
                    record([
                        ("facility", b.facility.as_str()),
                        ("date", day),
                        ("slot", slot.as_str()),
                    ])
                })
            })
            .collect()
    }

    fn dining_menu(&self, request: &LookupRequest) -> Vec<Record> {
        let hall = request.text(SlotName::DiningHall);
        let meal = request.text(SlotName::Meal);
        let meal = meal.as_deref();
        let weekend = request
            .param(SlotName::Date)
            .and_then(SlotValue::as_date)
            .is_some_and(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun));

        self.dining
            .iter()
            .filter(|h| matches_opt(&h.name, hall.as_deref()))
            .flat_map(move |h| {
                h.meals
                    .iter()
                    .filter(move |m| matches_opt(&m.meal, meal))
                    .map(move |m| {
                        let items = match (&m.weekend_items, weekend) {
                            (Some(special), true) => special.as_str(),
                            _ => m.items.as_str(),
                        };
                        record([
                            ("hall", h.name.as_str()),
                            ("meal", m.meal.as_str()),
                            ("hours", m.hours.as_str()),
                            ("items", items),
                            ("notes", h.notes.as_str()),
                        ])
                    })
            })
            .collect()
    }

    fn book_search(&self, request: &LookupRequest) -> Vec<Record> {
        let Some(title) = request.text(SlotName::BookTitle) else {
            return Vec::new();
        };
        let wanted = words(&title);
        if wanted.is_empty() {
            return Vec::new();
        }

        self.books
            .iter()
            .filter(|b| {
                let have = words(&b.title);
                wanted.iter().all(|w| have.contains(w))
            })
            .map(|b| {
                record([
                    ("title", b.title.as_str()),
                    ("author", b.author.as_str()),
                    ("call_number", b.call_number.as_str()),
                    ("copies_available", b.copies_available.to_string().as_str()),
                ])
            })
            .collect()
    }

    fn admin_procedure(&self, request: &LookupRequest) -> Vec<Record> {
        let Some(procedure) = request.text(SlotName::Procedure) else {
            return Vec::new();
        };
        self.procedures
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(&procedure))
            .map(|p| {
                record([
                    ("category", p.category.as_str()),
                    ("question", p.question.as_str()),
                    ("answer", p.answer.as_str()),
                ])
            })
            .collect()
    }
}

fn record<const N: usize>(fields: [(&str, &str); N]) -> Record {
    fields
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Absent filters match everything.
fn matches_opt(value: &str, filter: Option<&str>) -> bool {
    filter.is_none_or(|f| value.eq_ignore_ascii_case(f))
}

fn is_weekday(name: &str, day: Weekday) -> bool {
    name.parse::<Weekday>().is_ok_and(|d| d == day)
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Reference data source backed by an in-memory [`CampusDataset`].
#[derive(Debug)]
pub struct InMemoryCampusStore {
    dataset: RwLock<Arc<CampusDataset>>,
}

impl InMemoryCampusStore {
    pub fn new(dataset: CampusDataset) -> Self {
        Self {
            dataset: RwLock::new(Arc::new(dataset)),
        }
    }

    /// A store seeded with the built-in sample campus.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(CampusDataset::builtin()?))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(CampusDataset::from_path(path)?))
    }

    /// Swap in a new dataset. Lookups already running keep their snapshot.
    pub fn replace(&self, dataset: CampusDataset) {
        *self.dataset.write() = Arc::new(dataset);
        info!("campus dataset replaced");
    }

    /// The current snapshot.
    pub fn dataset(&self) -> Arc<CampusDataset> {
        self.dataset.read().clone()
    }
}

#[async_trait]
impl DataSource for InMemoryCampusStore {
    async fn lookup(
        &self,
        request: &LookupRequest,
    ) -> std::result::Result<QueryResult, LookupError> {
        let snapshot = self.dataset();
        Ok(snapshot.query(request))
    }

    fn name(&self) -> &str {
        "in_memory_campus"
    }
}
