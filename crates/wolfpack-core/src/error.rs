//! Error types for wolfpack-core operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkillError {
    #[error("Unsupported date granularity: '{0}'")]
    UnsupportedDateGranularity(String),

    #[error("Invalid calendar value: {0}")]
    InvalidCalendarValue(String),

    #[error("No candidates to match against")]
    EmptyCandidateSet,

    #[error("Invalid state transition: {intent} is not accepted in state {state}")]
    InvalidStateTransition {
        state: &'static str,
        intent: &'static str,
    },

    #[error("Missing slot: {0}")]
    MissingSlot(&'static str),

    #[error("Event lookup failed: {0}")]
    Lookup(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl SkillError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SkillError::UnsupportedDateGranularity(_) => "UnsupportedDateGranularity",
            SkillError::InvalidCalendarValue(_) => "InvalidCalendarValue",
            SkillError::EmptyCandidateSet => "EmptyCandidateSet",
            SkillError::InvalidStateTransition { .. } => "InvalidStateTransition",
            SkillError::MissingSlot(_) => "MissingSlot",
            SkillError::Lookup(_) => "Lookup",
            SkillError::InvalidConfig(_) => "InvalidConfig",
        }
    }

    /// The sentence a renderer should speak for this error.
    pub fn user_message(&self) -> String {
        match self {
            SkillError::UnsupportedDateGranularity(_) | SkillError::InvalidCalendarValue(_) => {
                "I can't understand that kind of date yet.".to_string()
            }
            SkillError::EmptyCandidateSet => {
                "I don't have anything to match against.".to_string()
            }
            SkillError::InvalidStateTransition { .. } => {
                "Sorry, I forgot what we were talking about. Could you repeat your request?"
                    .to_string()
            }
            SkillError::MissingSlot(slot) => format!("Which {slot} are you interested in?"),
            SkillError::Lookup(_) | SkillError::InvalidConfig(_) => {
                "Sorry, I'm on break.".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SkillError>;
