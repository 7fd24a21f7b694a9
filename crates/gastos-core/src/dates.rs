//! Date normalization
//!
//! Turns whatever the user (or the model) wrote about *when* into a calendar
//! date. The reference date is always injected so results are deterministic.

use std::sync::LazyLock;

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use regex::Regex;
use tracing::debug;

use crate::text::{contains_term, fold};

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("valid regex"));

static DAY_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})([/.-])(\d{1,2})(?:([/.-])(\d{4}|\d{2}))?\b").expect("valid regex")
});

static DAY_OF_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdia (\d{1,2})\b").expect("valid regex"));

/// Today's date on the local clock
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Normalize a date expression relative to `reference`
///
/// Explicit dates win over relative phrases. Anything unrecognized, or an
/// explicit date that does not exist on the calendar, yields `reference`.
pub fn normalize_date(text: &str, reference: NaiveDate) -> NaiveDate {
    if let Some(explicit) = explicit_date(text, reference) {
        return explicit.unwrap_or_else(|| {
            debug!(text, "Explicit date is not a calendar date, using reference");
            reference
        });
    }

    relative_date(&fold(text), reference).unwrap_or(reference)
}

/// `Some(Some(date))` for a valid explicit date, `Some(None)` when the text
/// holds a date-shaped token that does not exist (31/02), `None` otherwise
fn explicit_date(text: &str, reference: NaiveDate) -> Option<Option<NaiveDate>> {
    if let Some(caps) = ISO_DATE.captures(text) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return Some(NaiveDate::from_ymd_opt(year, month, day));
    }

    for caps in DAY_MONTH.captures_iter(text) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[3].parse().ok()?;
        let separator = &caps[2];

        // "12.50" is an amount, not the 12th of a 50th month
        if !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            continue;
        }

        let year = match caps.get(5) {
            Some(year) => {
                if caps.get(4).map(|m| m.as_str()) != Some(separator) {
                    continue;
                }
                let digits = year.as_str();
                let value: i32 = digits.parse().ok()?;
                if digits.len() == 2 {
                    2000 + value
                } else {
                    value
                }
            }
            // Without a year only "3/5" is a date; "12.50" and "10-12" are amounts
            None if separator != "/" => continue,
            None => reference.year(),
        };

        return Some(NaiveDate::from_ymd_opt(year, month, day));
    }

    None
}

fn relative_date(folded: &str, reference: NaiveDate) -> Option<NaiveDate> {
    if contains_term(folded, "anteontem") {
        return Some(reference - Duration::days(2));
    }
    if contains_term(folded, "ontem") {
        return Some(reference - Duration::days(1));
    }
    if contains_term(folded, "hoje") {
        return Some(reference);
    }
    if contains_term(folded, "semana passada") {
        return Some(reference - Duration::days(7));
    }
    if contains_term(folded, "mes passado") {
        // chrono clamps to the last day of the shorter month
        return reference.checked_sub_months(Months::new(1));
    }
    if let Some(caps) = DAY_OF_MONTH.captures(folded) {
        let day: u32 = caps[1].parse().ok()?;
        return reference.with_day(day);
    }
    None
}
