//! Response text templates.
//!
//! Each intent has a header and a per-record line template. Placeholders are
//! `{field}` names of the record; the header additionally sees `{count}` and
//! `{for_date}`, which expands to " for <date>" when the request carries one.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dispatch::source::{LookupRequest, Record, RecordSet};
use crate::intent::Intent;
use crate::slot::{SlotName, SlotValue};

/// Header, record line and separator for one intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    pub header: String,
    pub line: String,
    pub separator: String,
}

impl Template {
    pub fn new(header: &str, line: &str, separator: &str) -> Self {
        Self {
            header: header.to_string(),
            line: line.to_string(),
            separator: separator.to_string(),
        }
    }
}

/// Shapes record sets into answer text.
#[derive(Clone, Debug)]
pub struct ResponseRenderer {
    templates: HashMap<Intent, Template>,
}

impl ResponseRenderer {
    pub fn new() -> Self {
        let templates = [
            (
                Intent::LibraryHours,
                Template::new("Library hours{for_date}: ", "{section} {hours}", "; "),
            ),
            (
                Intent::ExamSchedule,
                Template::new(
                    "",
                    "The {course_id} exam ({course}) is on {date}, {time} in {room}.",
                    " ",
                ),
            ),
            (
                Intent::ClassSchedule,
                Template::new("Class schedule: ", "{course}: {details}", "; "),
            ),
            (
                Intent::FacilityLocation,
                Template::new("", "{name} is at {location}. {description}.", " "),
            ),
            (
                Intent::FacilityBooking,
                Template::new("Available slots{for_date}: ", "{facility} {slot}", ", "),
            ),
            (
                Intent::DiningMenu,
                Template::new(
                    "Menu{for_date}: ",
                    "{hall} {meal} ({hours}): {items}",
                    "; ",
                ),
            ),
            (
                Intent::BookSearch,
                Template::new(
                    "Found {count} book(s): ",
                    "{title} by {author}, call no. {call_number}, {copies_available} available",
                    "; ",
                ),
            ),
            (
                Intent::AdminProcedure,
                Template::new("", "[{category}] {question}\nAnswer: {answer}", "\n\n"),
            ),
        ]
        .into_iter()
        .collect();
        Self { templates }
    }

    /// Replace the template of one intent.
    pub fn with_template(mut self, intent: Intent, template: Template) -> Self {
        self.templates.insert(intent, template);
        self
    }

    pub fn render(&self, request: &LookupRequest, records: &RecordSet) -> String {
        let Some(template) = self.templates.get(&request.intent) else {
            return records
                .records
                .iter()
                .map(|r| r.values().cloned().collect::<Vec<_>>().join(", "))
                .collect::<Vec<_>>()
                .join("; ");
        };

        let for_date = request
            .param(SlotName::Date)
            .map(|date| format!(" for {}", date.describe()))
            .unwrap_or_default();
        let header = template
            .header
            .replace("{count}", &records.len().to_string())
            .replace("{for_date}", &for_date);

        let lines: Vec<String> = records
            .records
            .iter()
            .map(|record| fill(&template.line, record))
            .collect();

        format!("{header}{}", lines.join(&template.separator))
    }
}

impl Default for ResponseRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Substitute `{field}` placeholders. ISO dates render in long form.
fn fill(template: &str, record: &Record) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                if let Some(value) = record.get(key) {
                    out.push_str(&humanize(value));
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn humanize(value: &str) -> String {
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => SlotValue::Date(date).describe(),
        Err(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> Record {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_exam_template() {
        let request = LookupRequest::new(Intent::ExamSchedule)
            .with_param(SlotName::CourseId, SlotValue::Identifier("CS101".into()));
        let records = RecordSet::new(
            "exams",
            vec![record(&[
                ("course_id", "CS101"),
                ("course", "Introduction to Programming"),
                ("date", "2026-11-12"),
                ("time", "10:00-13:00"),
                ("room", "Exam Hall 1"),
            ])],
        );
        assert_eq!(
            ResponseRenderer::new().render(&request, &records),
            "The CS101 exam (Introduction to Programming) is on Thursday 12 November 2026, 10:00-13:00 in Exam Hall 1."
        );
    }

    #[test]
    fn test_header_placeholders() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 23).unwrap();
        let request = LookupRequest::new(Intent::FacilityBooking)
            .with_param(SlotName::FacilityName, SlotValue::Choice("Gym".into()))
            .with_param(SlotName::Date, SlotValue::Date(date));
        let records = RecordSet::new(
            "booking_slots",
            vec![
                record(&[("facility", "Gym"), ("slot", "07:00-08:00")]),
                record(&[("facility", "Gym"), ("slot", "18:00-19:00")]),
            ],
        );
        assert_eq!(
            ResponseRenderer::new().render(&request, &records),
            "Available slots for Friday 23 October 2026: Gym 07:00-08:00, Gym 18:00-19:00"
        );
    }

    #[test]
    fn test_fill_missing_and_unclosed() {
        let r = record(&[("a", "1")]);
        assert_eq!(fill("{a}-{b}", &r), "1-");
        assert_eq!(fill("x {a", &r), "x {a");
    }

    #[test]
    fn test_custom_template() {
        let renderer = ResponseRenderer::new().with_template(
            Intent::FacilityLocation,
            Template::new("", "{name}: {location}", " | "),
        );
        let request = LookupRequest::new(Intent::FacilityLocation);
        let records = RecordSet::new(
            "facilities",
            vec![record(&[("name", "Gym"), ("location", "Building A")])],
        );
        assert_eq!(renderer.render(&request, &records), "Gym: Building A");
    }
}
