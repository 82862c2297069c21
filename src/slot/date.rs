//! Date mention recognition over normalized tokens.
//!
//! Recognised forms, relative to a reference date:
//!
//! - `today`, `tonight`, `tomorrow`, `day after tomorrow`, `yesterday`
//! - `23 october`, `23rd of oct`, `october 23`, `oct 23rd 2026`
//! - `2026 10 23` (ISO dates after punctuation stripping)
//! - `this friday` (next occurrence, the reference day counts)
//! - `next friday` (one week after `this friday`)
//! - a bare `friday`, which is ambiguous between this week's and next week's
//!
//! Explicit dates without a year resolve to their next occurrence on or after
//! the reference date.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// A date found in an utterance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DateMention {
    Resolved(NaiveDate),
    /// Several plausible calendar days, in ascending order.
    Ambiguous(Vec<NaiveDate>),
}

impl DateMention {
    pub fn candidates(&self) -> Vec<NaiveDate> {
        match self {
            DateMention::Resolved(date) => vec![*date],
            DateMention::Ambiguous(dates) => dates.clone(),
        }
    }
}

fn weekday(token: &str) -> Option<Weekday> {
    let day = match token {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" => Weekday::Sat,
        "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// Month number for a month name. `may` is only a month next to a day number.
fn month(token: &str) -> Option<u32> {
    let month = match token {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Day of month with an optional ordinal suffix: `23`, `23rd`, `1st`.
fn day_of_month(token: &str) -> Option<u32> {
    let digits = token
        .strip_suffix("st")
        .or_else(|| token.strip_suffix("nd"))
        .or_else(|| token.strip_suffix("rd"))
        .or_else(|| token.strip_suffix("th"))
        .unwrap_or(token);
    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().filter(|d| (1..=31).contains(d))
}

fn year(token: &str) -> Option<i32> {
    if token.len() != 4 || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok().filter(|y| (1900..=2100).contains(y))
}

fn number(token: &str, max: u32) -> Option<u32> {
    if token.is_empty() || token.len() > 2 || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok().filter(|n| (1..=max).contains(n))
}

/// Whether a token names a weekday or month, or is a relative date word.
pub fn is_calendar_word(token: &str) -> bool {
    weekday(token).is_some()
        || month(token).is_some()
        || matches!(token, "today" | "tonight" | "tomorrow" | "yesterday")
}

/// The next date on or after `reference` that falls on `day`.
pub fn this_weekday(reference: NaiveDate, day: Weekday) -> NaiveDate {
    let ahead = (7 + day.num_days_from_monday() - reference.weekday().num_days_from_monday()) % 7;
    reference + Days::new(u64::from(ahead))
}

pub fn next_weekday(reference: NaiveDate, day: Weekday) -> NaiveDate {
    this_weekday(reference, day) + Days::new(7)
}

fn month_day(reference: NaiveDate, month: u32, day: u32, year: Option<i32>) -> Option<NaiveDate> {
    match year {
        Some(year) => NaiveDate::from_ymd_opt(year, month, day),
        None => {
            let this_year = NaiveDate::from_ymd_opt(reference.year(), month, day);
            match this_year {
                Some(date) if date >= reference => Some(date),
                _ => NaiveDate::from_ymd_opt(reference.year() + 1, month, day),
            }
        }
    }
}

fn token_at(tokens: &[String], i: usize) -> &str {
    tokens.get(i).map(String::as_str).unwrap_or("")
}

/// Find every date mention, in token order.
pub fn find_dates(tokens: &[String], reference: NaiveDate) -> Vec<DateMention> {
    let token = |i: usize| token_at(tokens, i);
    let mut mentions = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let current = token(i);

        // ISO: 2026 10 23
        if let (Some(y), Some(m), Some(d)) = (
            year(current),
            number(token(i + 1), 12),
            number(token(i + 2), 31),
        ) {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                mentions.push(DateMention::Resolved(date));
                i += 3;
                continue;
            }
        }

        if current == "day" && token(i + 1) == "after" && token(i + 2) == "tomorrow" {
            mentions.push(DateMention::Resolved(reference + Days::new(2)));
            i += 3;
            continue;
        }

        match current {
            "today" | "tonight" => {
                mentions.push(DateMention::Resolved(reference));
                i += 1;
                continue;
            }
            "tomorrow" => {
                mentions.push(DateMention::Resolved(reference + Days::new(1)));
                i += 1;
                continue;
            }
            "yesterday" => {
                mentions.push(DateMention::Resolved(reference - Days::new(1)));
                i += 1;
                continue;
            }
            _ => {}
        }

        if let Some(day) = weekday(current) {
            let mention = match (i > 0).then(|| token(i - 1)) {
                Some("this") => DateMention::Resolved(this_weekday(reference, day)),
                Some("next") => DateMention::Resolved(next_weekday(reference, day)),
                _ => DateMention::Ambiguous(vec![
                    this_weekday(reference, day),
                    next_weekday(reference, day),
                ]),
            };
            mentions.push(mention);
            i += 1;
            continue;
        }

        // 23 october [2026], 23rd of oct
        if let Some(d) = day_of_month(current) {
            let of = usize::from(token(i + 1) == "of");
            if let Some(m) = month(token(i + 1 + of)) {
                let y = year(token(i + 2 + of));
                if let Some(date) = month_day(reference, m, d, y) {
                    mentions.push(DateMention::Resolved(date));
                    i += 2 + of + usize::from(y.is_some());
                    continue;
                }
            }
        }

        // october 23[rd] [2026]
        if let Some(m) = month(current) {
            if let Some(d) = day_of_month(token(i + 1)) {
                let y = year(token(i + 2));
                if let Some(date) = month_day(reference, m, d, y) {
                    mentions.push(DateMention::Resolved(date));
                    i += 2 + usize::from(y.is_some());
                    continue;
                }
            }
        }

        i += 1;
    }

    mentions
}

#[cfg(test)]
mod tests {
    use super::*;

    // A Saturday.
    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn find(text: &str) -> Vec<DateMention> {
        let tokens: Vec<String> = text.split_whitespace().map(String::from).collect();
        find_dates(&tokens, reference())
    }

    #[test]
    fn test_relative_words() {
        assert_eq!(find("today"), vec![DateMention::Resolved(ymd(2026, 10, 17))]);
        assert_eq!(find("tomorrow"), vec![DateMention::Resolved(ymd(2026, 10, 18))]);
        assert_eq!(
            find("the day after tomorrow"),
            vec![DateMention::Resolved(ymd(2026, 10, 19))]
        );
        assert_eq!(find("yesterday"), vec![DateMention::Resolved(ymd(2026, 10, 16))]);
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(
            find("this friday"),
            vec![DateMention::Resolved(ymd(2026, 10, 23))]
        );
        assert_eq!(
            find("next friday"),
            vec![DateMention::Resolved(ymd(2026, 10, 30))]
        );
        assert_eq!(
            find("on friday"),
            vec![DateMention::Ambiguous(vec![ymd(2026, 10, 23), ymd(2026, 10, 30)])]
        );
        // The reference day itself counts as "this saturday".
        assert_eq!(
            find("this saturday"),
            vec![DateMention::Resolved(ymd(2026, 10, 17))]
        );
    }

    #[test]
    fn test_explicit_dates() {
        assert_eq!(find("23 october"), vec![DateMention::Resolved(ymd(2026, 10, 23))]);
        assert_eq!(find("oct 23rd"), vec![DateMention::Resolved(ymd(2026, 10, 23))]);
        assert_eq!(
            find("the 2nd of january"),
            vec![DateMention::Resolved(ymd(2027, 1, 2))]
        );
        assert_eq!(
            find("march 3 2025"),
            vec![DateMention::Resolved(ymd(2025, 3, 3))]
        );
        assert_eq!(find("2026 11 05"), vec![DateMention::Resolved(ymd(2026, 11, 5))]);
    }

    #[test]
    fn test_invalid_and_unrelated() {
        assert!(find("30 february").is_empty());
        assert!(find("may i book the gym").is_empty());
        assert!(find("cs101 exam in room 23").is_empty());
    }

    #[test]
    fn test_calendar_words() {
        assert!(is_calendar_word("oct"));
        assert!(is_calendar_word("fri"));
        assert!(!is_calendar_word("room"));
    }
}
