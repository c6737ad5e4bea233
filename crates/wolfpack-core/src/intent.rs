//! Mapping from voice-platform intent names and slots onto the closed set of
//! conversation intents.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillError};
use crate::events::Category;

pub const INTENT_NEXT_EVENT: &str = "NextEventIntent";
pub const INTENT_GET_EVENTS_ON_DATE: &str = "GetEventsOnDateIntent";
pub const INTENT_ALL_CATEGORY: &str = "AllCategoryIntent";
pub const INTENT_SPORTS_CATEGORY: &str = "SportsCategoryIntent";
pub const INTENT_ARTS_AND_ENTERTAINMENT_CATEGORY: &str = "ArtsAndEntertainmentCategoryIntent";
pub const INTENT_LECTURES_CATEGORY: &str = "LecturesCategoryIntent";
pub const INTENT_CLUBS_CATEGORY: &str = "ClubsCategoryIntent";
pub const INTENT_GET_FEE_DETAILS: &str = "GetFeeDetailsIntent";
pub const INTENT_GET_LOCATION_DETAILS: &str = "GetLocationDetailsIntent";
pub const INTENT_GET_END_TIME: &str = "GetEndTimeIntent";

pub const SLOT_DATE: &str = "date";
pub const SLOT_EVENT_NAME: &str = "eventName";

/// Which fact about a single event the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventDetail {
    Fee,
    Location,
    EndTime,
}

impl EventDetail {
    /// Field name the detail is reported under.
    pub fn key(self) -> &'static str {
        match self {
            EventDetail::Fee => "fee",
            EventDetail::Location => "location",
            EventDetail::EndTime => "end_time",
        }
    }
}

/// A user request, as the conversation sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The first event starting after the current moment.
    NextEvent,
    /// List events within the range named by a date code.
    ResolveDate { code: String },
    /// Narrow a too-long list by category.
    NarrowByCategory { category: Category },
    /// Ask about one of the events just listed.
    ResolveCandidate {
        spoken_name: String,
        detail: EventDetail,
    },
    /// Anything the conversation does not handle.
    Unrecognized { name: String },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::NextEvent => "NextEvent",
            Intent::ResolveDate { .. } => "ResolveDate",
            Intent::NarrowByCategory { .. } => "NarrowByCategory",
            Intent::ResolveCandidate { .. } => "ResolveCandidate",
            Intent::Unrecognized { .. } => "Unrecognized",
        }
    }

    /// Build an intent from a platform intent name and its slot values.
    ///
    /// Unknown intent names map to [`Intent::Unrecognized`].
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::MissingSlot`] if a slot the intent needs is absent
    /// or blank.
    pub fn from_request(intent_name: &str, slots: &HashMap<String, String>) -> Result<Self> {
        let intent = match intent_name {
            INTENT_NEXT_EVENT => Intent::NextEvent,
            INTENT_GET_EVENTS_ON_DATE => Intent::ResolveDate {
                code: required_slot(slots, SLOT_DATE)?,
            },
            INTENT_ALL_CATEGORY => narrow(Category::All),
            INTENT_SPORTS_CATEGORY => narrow(Category::Athletics),
            INTENT_ARTS_AND_ENTERTAINMENT_CATEGORY => narrow(Category::ArtsAndEntertainment),
            INTENT_LECTURES_CATEGORY => narrow(Category::LecturesAndFilms),
            INTENT_CLUBS_CATEGORY => narrow(Category::Clubs),
            INTENT_GET_FEE_DETAILS => detail(slots, EventDetail::Fee)?,
            INTENT_GET_LOCATION_DETAILS => detail(slots, EventDetail::Location)?,
            INTENT_GET_END_TIME => detail(slots, EventDetail::EndTime)?,
            other => Intent::Unrecognized {
                name: other.to_string(),
            },
        };
        tracing::debug!(intent_name, intent = intent.name(), "mapped request");
        Ok(intent)
    }
}

fn narrow(category: Category) -> Intent {
    Intent::NarrowByCategory { category }
}

fn detail(slots: &HashMap<String, String>, detail: EventDetail) -> Result<Intent> {
    Ok(Intent::ResolveCandidate {
        spoken_name: required_slot(slots, SLOT_EVENT_NAME)?,
        detail,
    })
}

fn required_slot(slots: &HashMap<String, String>, name: &'static str) -> Result<String> {
    slots
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(SkillError::MissingSlot(name))
}
