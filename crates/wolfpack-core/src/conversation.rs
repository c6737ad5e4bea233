//! Multi-turn conversation state for the events skill.
//!
//! A session moves between three states:
//!
//! ```text
//!            ResolveDate (1..=max)                 ResolveCandidate
//!   Idle ──────────────────────────▶ EventsPresented ◀──────┐
//!    │                                   ▲  │               │
//!    │ ResolveDate (> max)   Narrow (≥1) │  └───────────────┘
//!    ▼                                   │
//!   NarrowingRequired ───────────────────┘
//! ```
//!
//! `ResolveDate` and `NextEvent` are accepted in every state; `NextEvent`
//! never changes it. Each turn takes the current
//! [`SessionState`] by value and returns the next one inside a [`Turn`]; the
//! caller persists it between turns. Nothing here is shared between sessions.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::candidates::CandidateSet;
use crate::config::SkillConfig;
use crate::date_code::{resolve_date_code_with_options, DateRange, ResolveOptions};
use crate::error::{Result, SkillError};
use crate::events::{Category, EventRecord, EventSource};
use crate::intent::{EventDetail, Intent};

/// Longest list read out before asking the user to pick a category.
pub const MAX_EVENTS: usize = 5;

/// Label of the [`Outcome::NoResults`] given when nothing is upcoming.
pub const UPCOMING_LABEL: &str = "coming up";

/// Per-session conversation state.
///
/// The data each state needs travels with it: the candidate set while events
/// are presented, the saved range while a category choice is pending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No date or category context yet.
    #[default]
    Idle,
    /// The user heard a short list and may ask about one of its events.
    EventsPresented { candidates: CandidateSet },
    /// Too many events matched; the user must pick a category.
    NarrowingRequired { saved_range: DateRange },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "Idle",
            SessionState::EventsPresented { .. } => "EventsPresented",
            SessionState::NarrowingRequired { .. } => "NarrowingRequired",
        }
    }

    /// The range a pending category choice will be applied to.
    pub fn saved_range(&self) -> Option<&DateRange> {
        match self {
            SessionState::NarrowingRequired { saved_range } => Some(saved_range),
            _ => None,
        }
    }

    /// The events the user may currently refer to by name.
    pub fn recent_candidates(&self) -> Option<&CandidateSet> {
        match self {
            SessionState::EventsPresented { candidates } => Some(candidates),
            _ => None,
        }
    }
}

/// What a turn produced, for the renderer to speak.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The first event after the current moment.
    NextEvent {
        name: String,
        id: i64,
        start: NaiveDateTime,
    },
    /// A spoken name matched one presented event.
    ResolvedSingle {
        name: String,
        id: i64,
        detail: EventDetail,
    },
    /// A short list of events; `label` reads after "events", e.g. "this week".
    ResolvedList {
        candidates: CandidateSet,
        label: String,
    },
    /// Too many events in `range`; ask for a category.
    TooManyResults { count: usize, range: DateRange },
    /// Nothing found in the requested range.
    NoResults { label: String },
    /// Nothing found in the chosen category; the category question stays open.
    ///
    /// This is an outcome rather than a [`SkillError`]: the turn succeeded and
    /// the renderer asks for another category instead of speaking a fallback.
    NoResultsInCategory { category: Category, label: String },
    /// The intent is not one the conversation handles.
    NotUnderstood,
}

/// The result of one turn: the next state plus an outcome or error.
///
/// On error the state is the one the turn started in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub state: SessionState,
    pub outcome: Result<Outcome>,
}

impl Turn {
    fn to(state: SessionState, outcome: Outcome) -> Self {
        Self {
            state,
            outcome: Ok(outcome),
        }
    }

    fn failed(state: SessionState, error: SkillError) -> Self {
        Self {
            state,
            outcome: Err(error),
        }
    }
}

/// Drives sessions through their states, looking events up in `S`.
#[derive(Debug, Clone)]
pub struct Conversation<S> {
    source: S,
    options: ResolveOptions,
    max_events: usize,
}

impl<S: EventSource> Conversation<S> {
    /// A conversation with default policy: three-day first week, five events.
    pub fn new(source: S) -> Self {
        Self {
            source,
            options: ResolveOptions::default(),
            max_events: MAX_EVENTS,
        }
    }

    /// A conversation using the policy in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::InvalidConfig`] if `config` fails validation.
    pub fn from_config(source: S, config: &SkillConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            options: config.resolve_options(),
            max_events: config.max_events,
        })
    }

    /// Handle one turn at local time `now`.
    ///
    /// Errors never escape as panics: they come back in [`Turn::outcome`]
    /// with `state` unchanged.
    pub fn handle(&self, state: SessionState, intent: Intent, now: NaiveDateTime) -> Turn {
        tracing::debug!(state = state.name(), intent = intent.name(), %now, "handling turn");

        let today = now.date();
        let turn = match intent {
            Intent::NextEvent => self.next_event(state, now),
            Intent::ResolveDate { code } => self.resolve_date(state, &code, today),
            Intent::NarrowByCategory { category } => self.narrow_by_category(state, category),
            Intent::ResolveCandidate {
                spoken_name,
                detail,
            } => self.resolve_candidate(state, &spoken_name, detail),
            Intent::Unrecognized { name } => {
                tracing::debug!(%name, "unrecognized intent");
                Turn::to(state, Outcome::NotUnderstood)
            }
        };

        match &turn.outcome {
            Ok(_) => tracing::debug!(next = turn.state.name(), "turn complete"),
            Err(e) => tracing::debug!(next = turn.state.name(), error = %e, "turn failed"),
        }
        turn
    }

    fn next_event(&self, state: SessionState, now: NaiveDateTime) -> Turn {
        match self.source.next_event_after(now) {
            Ok(Some(record)) => {
                tracing::debug!(id = record.event_id, start = %record.start, "next event");
                Turn::to(
                    state,
                    Outcome::NextEvent {
                        name: record.summary,
                        id: record.event_id,
                        start: record.start,
                    },
                )
            }
            Ok(None) => Turn::to(
                state,
                Outcome::NoResults {
                    label: UPCOMING_LABEL.to_string(),
                },
            ),
            Err(e) => {
                tracing::warn!(error = %e, "event lookup failed");
                Turn::failed(state, e)
            }
        }
    }

    fn resolve_date(&self, state: SessionState, code: &str, today: NaiveDate) -> Turn {
        let range = match resolve_date_code_with_options(code, today, &self.options) {
            Ok(range) => range,
            Err(e) => return Turn::failed(state, e),
        };

        let records = match self.source.events_in_range(&range) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "event lookup failed");
                return Turn::failed(state, e);
            }
        };

        let count = records.len();
        tracing::debug!(
            begin = %range.begin(),
            end = %range.end(),
            label = range.label(),
            count,
            "resolved date"
        );

        if count == 0 {
            let label = range.label_with_preposition().to_string();
            Turn::to(state, Outcome::NoResults { label })
        } else if count <= self.max_events {
            present(&records, &range)
        } else {
            Turn::to(
                SessionState::NarrowingRequired {
                    saved_range: range.clone(),
                },
                Outcome::TooManyResults { count, range },
            )
        }
    }

    fn narrow_by_category(&self, state: SessionState, category: Category) -> Turn {
        let saved_range = match state {
            SessionState::NarrowingRequired { saved_range } => saved_range,
            other => return rejected(other, "NarrowByCategory"),
        };

        let records = match self.source.events_in_category(&saved_range, category) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, %category, "event lookup failed");
                return Turn::failed(SessionState::NarrowingRequired { saved_range }, e);
            }
        };
        tracing::debug!(%category, count = records.len(), "narrowed by category");

        if records.is_empty() {
            let label = saved_range.label_with_preposition().to_string();
            return Turn::to(
                SessionState::NarrowingRequired { saved_range },
                Outcome::NoResultsInCategory { category, label },
            );
        }

        present(&records, &saved_range)
    }

    fn resolve_candidate(&self, state: SessionState, spoken: &str, detail: EventDetail) -> Turn {
        let candidates = match state {
            SessionState::EventsPresented { candidates } => candidates,
            other => return rejected(other, "ResolveCandidate"),
        };

        let outcome = match candidates.resolve(spoken) {
            Ok(found) => Ok(Outcome::ResolvedSingle {
                name: found.name.clone(),
                id: found.id,
                detail,
            }),
            Err(e) => {
                tracing::warn!(spoken, error = %e, "no candidates to match");
                Err(e)
            }
        };
        Turn {
            state: SessionState::EventsPresented { candidates },
            outcome,
        }
    }
}

fn present(records: &[EventRecord], range: &DateRange) -> Turn {
    let candidates = CandidateSet::from_records(records);
    Turn::to(
        SessionState::EventsPresented {
            candidates: candidates.clone(),
        },
        Outcome::ResolvedList {
            candidates,
            label: range.label_with_preposition().to_string(),
        },
    )
}

fn rejected(state: SessionState, intent: &'static str) -> Turn {
    tracing::warn!(state = state.name(), intent, "intent not valid in current state");
    let error = SkillError::InvalidStateTransition {
        state: state.name(),
        intent,
    };
    Turn::failed(state, error)
}
