//! # wolfpack-core
//!
//! Deterministic core of a campus events voice skill.
//!
//! The voice platform hands the skill an intent name plus string slots. This
//! crate turns partial date codes into concrete ranges, matches misheard event
//! names against the events a user just heard, and sequences those steps
//! across the turns of a session. Event storage, speech rendering, and session
//! persistence belong to the caller; everything here is a pure function of its
//! inputs, including the "today" anchor.
//!
//! ## Modules
//!
//! - [`calendar`] — Sunday-anchored week-of-year arithmetic
//! - [`date_code`] — date slot code → [`DateRange`] with spoken labels
//! - [`similarity`] — character-frequency cosine similarity and best match
//! - [`candidates`] — ordered name → id set the user can refer back to
//! - [`events`] — event records and the [`EventSource`] lookup seam
//! - [`intent`] — platform intent names and slots → [`Intent`]
//! - [`conversation`] — per-session state machine
//! - [`config`] — timezone and policy constants
//! - [`error`] — Error types

pub mod calendar;
pub mod candidates;
pub mod config;
pub mod conversation;
pub mod date_code;
pub mod error;
pub mod events;
pub mod intent;
pub mod similarity;

pub use calendar::{today_is_sunday, WeekCalendar};
pub use candidates::{Candidate, CandidateSet};
pub use config::SkillConfig;
pub use conversation::{Conversation, Outcome, SessionState, Turn, MAX_EVENTS, UPCOMING_LABEL};
pub use date_code::{
    resolve_date_code, resolve_date_code_with_options, DateRange, Granularity, ResolveOptions,
};
pub use error::SkillError;
pub use events::{Category, EventRecord, EventSource, InMemoryEvents};
pub use intent::{EventDetail, Intent};
pub use similarity::{best_match, best_match_scored, similarity, ScoredMatch};
