//! Sunday-anchored week-of-year arithmetic.
//!
//! Weeks run Sunday through Saturday. Week 1 of a year is the first week
//! holding at least `minimal_days_in_first_week` days of that year, so the
//! days of early January may belong to the last week of the previous year
//! and the days of late December to week 1 of the next.
//!
//! All functions take the date they reason about as an argument; nothing
//! here reads a clock.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::error::{Result, SkillError};

/// Policy constant for the first-week rule: week 1 must hold at least three
/// days of the new year.
pub const DEFAULT_MINIMAL_DAYS_IN_FIRST_WEEK: u8 = 3;

/// Highest week number a date code may carry.
pub const MAX_WEEK_NUMBER: u32 = 53;

/// Week calendar for one first-week policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCalendar {
    minimal_days_in_first_week: u8,
}

impl Default for WeekCalendar {
    fn default() -> Self {
        Self {
            minimal_days_in_first_week: DEFAULT_MINIMAL_DAYS_IN_FIRST_WEEK,
        }
    }
}

impl WeekCalendar {
    /// Build a calendar whose week 1 holds at least `minimal_days_in_first_week`
    /// days of the new year.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::InvalidCalendarValue`] unless the value is in `1..=7`.
    pub fn new(minimal_days_in_first_week: u8) -> Result<Self> {
        if !(1..=7).contains(&minimal_days_in_first_week) {
            return Err(SkillError::InvalidCalendarValue(format!(
                "minimal days in first week must be 1-7, got {minimal_days_in_first_week}"
            )));
        }
        Ok(Self {
            minimal_days_in_first_week,
        })
    }

    /// The Sunday that begins week `week` of `year`.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::InvalidCalendarValue`] if `week` is outside
    /// `1..=53` or the year is outside chrono's supported range.
    pub fn first_day_of_week(&self, year: i32, week: u32) -> Result<NaiveDate> {
        check_week_number(week)?;
        let week_one = self.week_one_start(year)?;
        add_days(week_one, u64::from(week - 1) * 7)
    }

    /// Week number of `today` under this calendar's convention.
    pub fn current_week_number(&self, today: NaiveDate) -> Result<u32> {
        let year = today.year();
        let this_year = self.week_one_start(year)?;

        let start = if today < this_year {
            self.week_one_start(year - 1)?
        } else if today >= self.week_one_start(year + 1)? {
            return Ok(1);
        } else {
            this_year
        };

        Ok(((today - start).num_days() / 7 + 1) as u32)
    }

    /// Number of weeks (52 or 53) in `year`.
    pub fn weeks_in_year(&self, year: i32) -> Result<u32> {
        let start = self.week_one_start(year)?;
        let next = self.week_one_start(year + 1)?;
        Ok(((next - start).num_days() / 7) as u32)
    }

    /// The week after (`year`, `week`), rolling into week 1 of the next year
    /// past the last week.
    pub fn following_week(&self, year: i32, week: u32) -> Result<(i32, u32)> {
        check_week_number(week)?;
        if week >= self.weeks_in_year(year)? {
            Ok((year + 1, 1))
        } else {
            Ok((year, week + 1))
        }
    }

    fn week_one_start(&self, year: i32) -> Result<NaiveDate> {
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| SkillError::InvalidCalendarValue(format!("year {year} out of range")))?;
        let offset = jan1.weekday().num_days_from_sunday();
        let sunday = jan1
            .checked_sub_days(Days::new(u64::from(offset)))
            .ok_or_else(|| SkillError::InvalidCalendarValue(format!("year {year} out of range")))?;

        if 7 - offset >= u32::from(self.minimal_days_in_first_week) {
            Ok(sunday)
        } else {
            add_days(sunday, 7)
        }
    }
}

/// Whether `today` is a Sunday, the boundary day of a Sunday-anchored week.
///
/// The voice platform reports "this week" on a Sunday as the week that just
/// ended; callers step the requested week forward by one when this holds.
pub fn today_is_sunday(today: NaiveDate) -> bool {
    today.weekday() == Weekday::Sun
}

pub(crate) fn add_days(date: NaiveDate, days: u64) -> Result<NaiveDate> {
    date.checked_add_days(Days::new(days))
        .ok_or_else(|| SkillError::InvalidCalendarValue(format!("{date} + {days} days overflows")))
}

fn check_week_number(week: u32) -> Result<()> {
    if week == 0 || week > MAX_WEEK_NUMBER {
        return Err(SkillError::InvalidCalendarValue(format!(
            "week number must be 1-{MAX_WEEK_NUMBER}, got {week}"
        )));
    }
    Ok(())
}
