//! Event records and the lookup seam the conversation queries through.
//!
//! The skill never builds or runs queries itself. A backend implements
//! [`EventSource`] over whatever store holds the events; [`InMemoryEvents`]
//! is a vector-backed implementation for tests and the CLI.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::date_code::DateRange;
use crate::error::{Result, SkillError};
use crate::intent::EventDetail;

/// One row of event data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_id: i64,
    pub summary: String,
    pub start: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// General admission fee as listed, e.g. "Free" or "$5".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    /// Category labels, matched against [`Category::label`].
    #[serde(default)]
    pub categories: Vec<String>,
}

impl EventRecord {
    /// The value a detail question asks for, if the record has it.
    pub fn detail(&self, detail: EventDetail) -> Option<String> {
        match detail {
            EventDetail::Fee => self.fee.clone(),
            EventDetail::Location => self.location.clone(),
            EventDetail::EndTime => self
                .end
                .map(|end| end.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

/// Event categories a user can narrow a long list by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "Athletics")]
    Athletics,
    #[serde(rename = "Arts and Entertainment")]
    ArtsAndEntertainment,
    #[serde(rename = "Lectures and Films")]
    LecturesAndFilms,
    #[serde(rename = "Club and Student Organizations")]
    Clubs,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::All,
        Category::Athletics,
        Category::ArtsAndEntertainment,
        Category::LecturesAndFilms,
        Category::Clubs,
    ];

    /// Category name as stored with the events.
    pub fn label(self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Athletics => "Athletics",
            Category::ArtsAndEntertainment => "Arts and Entertainment",
            Category::LecturesAndFilms => "Lectures and Films",
            Category::Clubs => "Club and Student Organizations",
        }
    }

    /// Look up a category by its stored name.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }

    /// Whether `record` belongs to this category. [`Category::All`] matches everything.
    pub fn matches(self, record: &EventRecord) -> bool {
        match self {
            Category::All => true,
            _ => record.categories.iter().any(|c| c == self.label()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where the conversation looks up events.
///
/// Implementations return records ordered by start time; the order becomes
/// the candidate order for name matching.
pub trait EventSource {
    /// Events starting within `range`.
    fn events_in_range(&self, range: &DateRange) -> Result<Vec<EventRecord>>;

    /// Events starting within `range` that belong to `category`.
    fn events_in_category(&self, range: &DateRange, category: Category)
        -> Result<Vec<EventRecord>>;

    /// The first event starting strictly after `now`.
    fn next_event_after(&self, now: NaiveDateTime) -> Result<Option<EventRecord>>;
}

impl<T: EventSource + ?Sized> EventSource for &T {
    fn events_in_range(&self, range: &DateRange) -> Result<Vec<EventRecord>> {
        (**self).events_in_range(range)
    }

    fn events_in_category(
        &self,
        range: &DateRange,
        category: Category,
    ) -> Result<Vec<EventRecord>> {
        (**self).events_in_category(range, category)
    }

    fn next_event_after(&self, now: NaiveDateTime) -> Result<Option<EventRecord>> {
        (**self).next_event_after(now)
    }
}

/// Vector-backed [`EventSource`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryEvents {
    events: Vec<EventRecord>,
}

impl InMemoryEvents {
    pub fn new(mut events: Vec<EventRecord>) -> Self {
        events.sort_by_key(|e| e.start);
        Self { events }
    }

    /// Parse a JSON array of [`EventRecord`]s.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::Lookup`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        let events: Vec<EventRecord> = serde_json::from_str(json)
            .map_err(|e| SkillError::Lookup(format!("invalid event data: {e}")))?;
        Ok(Self::new(events))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, event_id: i64) -> Option<&EventRecord> {
        self.events.iter().find(|e| e.event_id == event_id)
    }
}

impl EventSource for InMemoryEvents {
    fn events_in_range(&self, range: &DateRange) -> Result<Vec<EventRecord>> {
        self.events_in_category(range, Category::All)
    }

    fn events_in_category(
        &self,
        range: &DateRange,
        category: Category,
    ) -> Result<Vec<EventRecord>> {
        Ok(self
            .events
            .iter()
            .filter(|e| range.contains(e.start.date()) && category.matches(e))
            .cloned()
            .collect())
    }

    fn next_event_after(&self, now: NaiveDateTime) -> Result<Option<EventRecord>> {
        Ok(self.events.iter().find(|e| e.start > now).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_code::resolve_date_code;
    use chrono::NaiveDate;

    fn event(id: i64, summary: &str, start: &str, categories: &[&str]) -> EventRecord {
        EventRecord {
            event_id: id,
            summary: summary.to_string(),
            start: NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M").unwrap(),
            end: None,
            location: None,
            fee: None,
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn source() -> InMemoryEvents {
        InMemoryEvents::new(vec![
            event(3, "Art Show", "2016-11-01 18:00", &["Arts and Entertainment"]),
            event(1, "Basketball Game", "2016-11-01 12:00", &["Athletics"]),
            event(2, "Film Night", "2016-11-02 19:00", &["Lectures and Films"]),
            event(4, "Chess Club", "2016-11-06 10:00", &["Club and Student Organizations"]),
        ])
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 11, 1).unwrap()
    }

    #[test]
    fn test_range_filter_orders_by_start() {
        let range = resolve_date_code("2016-11-01", today()).unwrap();
        let found = source().events_in_range(&range).unwrap();
        let ids: Vec<i64> = found.iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_range_end_is_exclusive() {
        // Week 44 runs Oct 30 through Nov 5; the Nov 6 event is outside it.
        let range = resolve_date_code("2016-W44", today()).unwrap();
        let found = source().events_in_range(&range).unwrap();
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_category_filter() {
        let range = resolve_date_code("2016-11", today()).unwrap();
        let found = source()
            .events_in_category(&range, Category::Athletics)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].summary, "Basketball Game");
    }

    #[test]
    fn test_all_category_matches_everything() {
        let range = resolve_date_code("2016-11", today()).unwrap();
        let found = source().events_in_category(&range, Category::All).unwrap();
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()), Some(category));
        }
        assert_eq!(Category::from_label("Knitting"), None);
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&Category::LecturesAndFilms).unwrap();
        assert_eq!(json, "\"Lectures and Films\"");
    }

    #[test]
    fn test_from_json() {
        let json = r#"[
            {"event_id": 7, "summary": "Open Mic", "start": "2016-11-03T20:00:00",
             "categories": ["Arts and Entertainment"]}
        ]"#;
        let events = InMemoryEvents::from_json(json).unwrap();
        assert_eq!(events.len(), 1);
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_next_event_after() {
        let next = source().next_event_after(at("2016-11-01 13:00")).unwrap();
        assert_eq!(next.map(|e| e.event_id), Some(3));
    }

    #[test]
    fn test_next_event_excludes_event_starting_now() {
        let next = source().next_event_after(at("2016-11-01 12:00")).unwrap();
        assert_eq!(next.map(|e| e.summary), Some("Art Show".to_string()));
    }

    #[test]
    fn test_no_next_event_after_last() {
        assert_eq!(source().next_event_after(at("2016-11-06 10:00")).unwrap(), None);
    }

    #[test]
    fn test_detail_values() {
        let json = r#"[
            {"event_id": 9, "summary": "Jazz Night", "start": "2016-11-04T20:00:00",
             "end": "2016-11-04T22:30:00", "fee": "$5", "location": "Stewart Theatre"}
        ]"#;
        let events = InMemoryEvents::from_json(json).unwrap();
        let record = events.get(9).unwrap();
        assert_eq!(record.detail(EventDetail::Fee).as_deref(), Some("$5"));
        assert_eq!(record.detail(EventDetail::Location).as_deref(), Some("Stewart Theatre"));
        assert_eq!(
            record.detail(EventDetail::EndTime).as_deref(),
            Some("2016-11-04T22:30:00")
        );
        assert!(events.get(10).is_none());
    }

    #[test]
    fn test_missing_detail_is_none() {
        let record = event(1, "Basketball Game", "2016-11-01 12:00", &["Athletics"]);
        assert_eq!(record.detail(EventDetail::Fee), None);
        assert_eq!(record.detail(EventDetail::EndTime), None);
    }

    #[test]
    fn test_from_json_malformed() {
        let err = InMemoryEvents::from_json("{not json").unwrap_err();
        assert!(matches!(err, SkillError::Lookup(_)));
    }
}
