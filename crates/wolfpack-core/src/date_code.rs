//! Resolution of voice-platform date slot values into concrete date ranges.
//!
//! The platform fills a date slot with a partial ISO 8601 code whose shape
//! depends on what the user said:
//!
//! | Spoken                 | Code           | Resolved as                     |
//! |------------------------|----------------|---------------------------------|
//! | "November first"       | `2016-11-01`   | that day                        |
//! | "this week"            | `2016-W44`     | Sunday through Saturday         |
//! | "this weekend"         | `2016-W44-WE`  | Saturday and Sunday             |
//! | "in November"          | `2016-11`      | the whole month                 |
//! | "this decade"          | `201X`         | unsupported                     |
//! | "next year"            | `2017`         | unsupported                     |
//! | "this winter"          | `2016-WI`      | unsupported                     |
//!
//! Every range is half-open: `begin` is the first day included, `end` the
//! first day excluded. Resolution is a pure function of the code and the
//! caller-supplied `today`; labels such as "this week" are computed once and
//! stored with the range so they render the same on later turns.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calendar::{
    add_days, today_is_sunday, WeekCalendar, DEFAULT_MINIMAL_DAYS_IN_FIRST_WEEK,
};
use crate::error::{Result, SkillError};

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const SEASON_MARKERS: [&str; 4] = ["WI", "SP", "SU", "FA"];

/// How wide a resolved range is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Weekend,
    Month,
}

/// A resolved, half-open calendar range with its spoken labels.
///
/// `begin < end` always holds, including for values read back from a
/// persisted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DateRangeFields")]
pub struct DateRange {
    begin: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
    label: String,
    label_with_preposition: String,
}

impl DateRange {
    fn new(
        begin: NaiveDate,
        end: NaiveDate,
        granularity: Granularity,
        label: String,
        label_with_preposition: String,
    ) -> Result<Self> {
        if begin >= end {
            return Err(SkillError::InvalidCalendarValue(format!(
                "range begin {begin} is not before end {end}"
            )));
        }
        Ok(Self {
            begin,
            end,
            granularity,
            label,
            label_with_preposition,
        })
    }

    /// First day in the range.
    pub fn begin(&self) -> NaiveDate {
        self.begin
    }

    /// First day after the range.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Label without a leading preposition, e.g. "November" or "this week".
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Label that reads after "events", e.g. "in November" or "on Tuesday, November 1, 2016".
    pub fn label_with_preposition(&self) -> &str {
        &self.label_with_preposition
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.begin <= date && date < self.end
    }

    /// Number of days covered.
    pub fn len_days(&self) -> i64 {
        (self.end - self.begin).num_days()
    }
}

#[derive(Deserialize)]
struct DateRangeFields {
    begin: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
    label: String,
    label_with_preposition: String,
}

impl TryFrom<DateRangeFields> for DateRange {
    type Error = SkillError;

    fn try_from(fields: DateRangeFields) -> Result<Self> {
        DateRange::new(
            fields.begin,
            fields.end,
            fields.granularity,
            fields.label,
            fields.label_with_preposition,
        )
    }
}

/// Options for [`resolve_date_code_with_options`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// How many days of the new year week 1 must hold.
    pub minimal_days_in_first_week: u8,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            minimal_days_in_first_week: DEFAULT_MINIMAL_DAYS_IN_FIRST_WEEK,
        }
    }
}

/// Shape of a date code, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeKind {
    Decade,
    Year,
    Season,
    Month,
    Weekend,
    Week,
    Day,
}

fn classify(code: &str) -> CodeKind {
    if code.contains('X') {
        CodeKind::Decade
    } else if code.len() == 4 {
        CodeKind::Year
    } else if SEASON_MARKERS.iter().any(|m| code.contains(m)) {
        CodeKind::Season
    } else if is_month_code(code) {
        CodeKind::Month
    } else if code.contains("WE") {
        CodeKind::Weekend
    } else if code.contains('W') {
        CodeKind::Week
    } else {
        CodeKind::Day
    }
}

/// Resolve a date code with the default first-week policy.
///
/// See [`resolve_date_code_with_options`].
pub fn resolve_date_code(code: &str, today: NaiveDate) -> Result<DateRange> {
    resolve_date_code_with_options(code, today, &ResolveOptions::default())
}

/// Resolve a date code into a [`DateRange`] relative to `today`.
///
/// # Errors
///
/// Returns [`SkillError::UnsupportedDateGranularity`] for decade, year and
/// season codes, and [`SkillError::InvalidCalendarValue`] when a numeric
/// component is malformed or out of range (e.g. `2016-13`, `2016-W54`).
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use wolfpack_core::date_code::resolve_date_code;
///
/// let today = NaiveDate::from_ymd_opt(2016, 11, 1).unwrap();
/// let range = resolve_date_code("2016-W44", today).unwrap();
/// assert_eq!(range.begin(), NaiveDate::from_ymd_opt(2016, 10, 30).unwrap());
/// assert_eq!(range.label(), "this week");
/// ```
pub fn resolve_date_code_with_options(
    code: &str,
    today: NaiveDate,
    options: &ResolveOptions,
) -> Result<DateRange> {
    let kind = classify(code);
    tracing::debug!(code, ?kind, %today, "classified date code");

    match kind {
        CodeKind::Decade | CodeKind::Year | CodeKind::Season => {
            Err(SkillError::UnsupportedDateGranularity(code.to_string()))
        }
        CodeKind::Month => resolve_month(code),
        CodeKind::Weekend => {
            let calendar = WeekCalendar::new(options.minimal_days_in_first_week)?;
            resolve_weekend(code, today, &calendar)
        }
        CodeKind::Week => {
            let calendar = WeekCalendar::new(options.minimal_days_in_first_week)?;
            resolve_week(code, today, &calendar)
        }
        CodeKind::Day => resolve_day(code),
    }
}

fn resolve_day(code: &str) -> Result<DateRange> {
    let begin = NaiveDate::parse_from_str(code, "%Y-%m-%d")
        .map_err(|e| SkillError::InvalidCalendarValue(format!("'{code}': {e}")))?;
    let end = add_days(begin, 1)?;
    let label = begin.format("%A, %B %-d, %Y").to_string();
    let with_preposition = format!("on {label}");

    DateRange::new(begin, end, Granularity::Day, label, with_preposition)
}

fn resolve_week(code: &str, today: NaiveDate, calendar: &WeekCalendar) -> Result<DateRange> {
    let (year, week) = parse_week_code(code)?;

    let (year, week) = if today_is_sunday(today) {
        calendar.following_week(year, week)?
    } else {
        (year, week)
    };

    let begin = calendar.first_day_of_week(year, week)?;
    let end = add_days(begin, 7)?;
    let label = if week == calendar.current_week_number(today)? {
        "this week"
    } else {
        "next week"
    };

    DateRange::new(
        begin,
        end,
        Granularity::Week,
        label.to_string(),
        label.to_string(),
    )
}

// The weekend week number is not stepped forward on Sundays: on a Sunday the
// platform's "this weekend" names the Saturday just past, which then reads as
// "next weekend" against the upcoming week.
fn resolve_weekend(code: &str, today: NaiveDate, calendar: &WeekCalendar) -> Result<DateRange> {
    let week_code = code.strip_suffix("-WE").ok_or_else(|| {
        SkillError::InvalidCalendarValue(format!("'{code}': expected YYYY-Www-WE"))
    })?;
    let (year, week) = parse_week_code(week_code)?;

    let sunday = calendar.first_day_of_week(year, week)?;
    let begin = add_days(sunday, 6)?;
    let end = add_days(begin, 2)?;
    let label = if week == calendar.current_week_number(today)? {
        "this weekend"
    } else {
        "next weekend"
    };

    DateRange::new(
        begin,
        end,
        Granularity::Weekend,
        label.to_string(),
        label.to_string(),
    )
}

fn resolve_month(code: &str) -> Result<DateRange> {
    let (year, month) = code
        .split_once('-')
        .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
        .ok_or_else(|| SkillError::InvalidCalendarValue(format!("'{code}': expected YYYY-MM")))?;

    if !(1..=12).contains(&month) {
        return Err(SkillError::InvalidCalendarValue(format!(
            "'{code}': month must be 1-12, got {month}"
        )));
    }

    let begin = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| SkillError::InvalidCalendarValue(format!("'{code}': year out of range")))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| SkillError::InvalidCalendarValue(format!("'{code}': year out of range")))?;

    let label = month_name(begin.month()).to_string();
    let with_preposition = format!("in {label}");

    DateRange::new(begin, end, Granularity::Month, label, with_preposition)
}

/// `YYYY-MM`, digits only.
fn is_month_code(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit)
}

/// Parse `YYYY-Www` into (year, week).
fn parse_week_code(code: &str) -> Result<(i32, u32)> {
    let invalid = || SkillError::InvalidCalendarValue(format!("'{code}': expected YYYY-Www"));

    let (year, week) = code.split_once("-W").ok_or_else(invalid)?;
    if year.is_empty()
        || week.is_empty()
        || !year.bytes().all(|b| b.is_ascii_digit())
        || !week.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let week = week.parse::<u32>().map_err(|_| invalid())?;
    Ok((year, week))
}

/// English month name for `month` in 1..=12.
fn month_name(month: u32) -> &'static str {
    MONTH_NAMES[month as usize - 1]
}
