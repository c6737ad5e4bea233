//! Skill configuration: local timezone and policy constants.
//!
//! The timezone is only used at the edge, to turn an injected instant into
//! the local calendar date that resolution runs against.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::calendar::DEFAULT_MINIMAL_DAYS_IN_FIRST_WEEK;
use crate::conversation::MAX_EVENTS;
use crate::date_code::ResolveOptions;
use crate::error::{Result, SkillError};

pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SkillConfig {
    /// IANA timezone the events and the users live in.
    pub timezone: String,
    /// How many days of the new year week 1 must hold.
    pub minimal_days_in_first_week: u8,
    /// Longest list read out before asking the user to pick a category.
    pub max_events: usize,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            minimal_days_in_first_week: DEFAULT_MINIMAL_DAYS_IN_FIRST_WEEK,
            max_events: MAX_EVENTS,
        }
    }
}

impl SkillConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SkillConfig =
            serde_json::from_str(json).map_err(|e| SkillError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.tz()?;
        if !(1..=7).contains(&self.minimal_days_in_first_week) {
            return Err(SkillError::InvalidConfig(format!(
                "minimal_days_in_first_week must be 1-7, got {}",
                self.minimal_days_in_first_week
            )));
        }
        if self.max_events == 0 {
            return Err(SkillError::InvalidConfig(
                "max_events must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| SkillError::InvalidConfig(format!("invalid timezone '{}'", self.timezone)))
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            minimal_days_in_first_week: self.minimal_days_in_first_week,
        }
    }

    /// The local wall-clock time at instant `now`.
    pub fn local_now(&self, now: DateTime<Utc>) -> Result<NaiveDateTime> {
        Ok(now.with_timezone(&self.tz()?).naive_local())
    }

    /// The local calendar date at instant `now`.
    pub fn today(&self, now: DateTime<Utc>) -> Result<NaiveDate> {
        Ok(self.local_now(now)?.date())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults() {
        let config = SkillConfig::default();
        assert_eq!(config.timezone, "America/Los_Angeles");
        assert_eq!(config.minimal_days_in_first_week, 3);
        assert_eq!(config.max_events, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = SkillConfig::from_json(r#"{"max_events": 8}"#).unwrap();
        assert_eq!(config.max_events, 8);
        assert_eq!(config.timezone, DEFAULT_TIMEZONE);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = SkillConfig::from_json(r#"{"max_event": 8}"#).unwrap_err();
        assert!(matches!(err, SkillError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_timezone() {
        let err = SkillConfig::from_json(r#"{"timezone": "Mars/Olympus"}"#).unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"), "got: {err}");
    }

    #[test]
    fn test_invalid_minimal_days() {
        assert!(SkillConfig::from_json(r#"{"minimal_days_in_first_week": 9}"#).is_err());
    }

    #[test]
    fn test_zero_max_events() {
        assert!(SkillConfig::from_json(r#"{"max_events": 0}"#).is_err());
    }

    #[test]
    fn test_today_uses_local_date() {
        // 03:00 UTC on Nov 2 is still the evening of Nov 1 in California
        let now = Utc.with_ymd_and_hms(2016, 11, 2, 3, 0, 0).unwrap();
        let today = SkillConfig::default().today(now).unwrap();
        assert_eq!(today, NaiveDate::from_ymd_opt(2016, 11, 1).unwrap());
    }

    #[test]
    fn test_local_now_is_wall_clock_time() {
        let now = Utc.with_ymd_and_hms(2016, 11, 2, 3, 0, 0).unwrap();
        let local = SkillConfig::default().local_now(now).unwrap();
        let expected = NaiveDate::from_ymd_opt(2016, 11, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        assert_eq!(local, expected);
    }
}
