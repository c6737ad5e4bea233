//! The set of event names a user was just told about.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillError};
use crate::events::EventRecord;
use crate::similarity::best_match;

/// One named event the user may refer to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub id: i64,
}

/// Event names mapped to their ids, in the order they were presented.
///
/// Names are unique; inserting an existing name keeps the first id. The
/// order is significant: name matching breaks ties toward the earlier entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Candidate>", into = "Vec<Candidate>")]
pub struct CandidateSet {
    entries: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from event records, keyed by summary.
    pub fn from_records(records: &[EventRecord]) -> Self {
        records
            .iter()
            .map(|r| (r.summary.clone(), r.event_id))
            .collect()
    }

    /// Add `name`. Returns `false` if the name was already present.
    pub fn insert(&mut self, name: impl Into<String>, id: i64) -> bool {
        let name = name.into();
        if self.entries.iter().any(|c| c.name == name) {
            return false;
        }
        self.entries.push(Candidate { name, id });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.name.as_str())
    }

    pub fn id_of(&self, name: &str) -> Option<i64> {
        self.entries.iter().find(|c| c.name == name).map(|c| c.id)
    }

    /// The candidate whose name best matches `spoken`.
    ///
    /// # Errors
    ///
    /// Returns [`SkillError::EmptyCandidateSet`] if the set is empty.
    pub fn resolve(&self, spoken: &str) -> Result<&Candidate> {
        let name = best_match(spoken, self.names())?;
        self.entries
            .iter()
            .find(|c| c.name == name)
            .ok_or(SkillError::EmptyCandidateSet)
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut set = CandidateSet::new();
        for (name, id) in iter {
            set.insert(name, id);
        }
        set
    }
}

impl From<Vec<Candidate>> for CandidateSet {
    fn from(entries: Vec<Candidate>) -> Self {
        entries.into_iter().map(|c| (c.name, c.id)).collect()
    }
}

impl From<CandidateSet> for Vec<Candidate> {
    fn from(set: CandidateSet) -> Self {
        set.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> CandidateSet {
        [("Basketball Game", 1), ("Art Show", 2)].into_iter().collect()
    }

    #[test]
    fn test_resolve_misheard_name() {
        let found = set().resolve("Bball game").unwrap().clone();
        assert_eq!(found, Candidate { name: "Basketball Game".into(), id: 1 });
    }

    #[test]
    fn test_resolve_empty_set() {
        let err = CandidateSet::new().resolve("Art Show").unwrap_err();
        assert_eq!(err, SkillError::EmptyCandidateSet);
    }

    #[test]
    fn test_duplicate_name_keeps_first_id() {
        let mut set = set();
        assert!(!set.insert("Art Show", 99));
        assert_eq!(set.id_of("Art Show"), Some(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_order_is_preserved() {
        let set = set();
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["Basketball Game", "Art Show"]);
    }

    #[test]
    fn test_serializes_as_ordered_list() {
        let json = serde_json::to_value(set()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"name": "Basketball Game", "id": 1},
                {"name": "Art Show", "id": 2}
            ])
        );
        let back: CandidateSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, set());
    }

    #[test]
    fn test_deserialize_drops_duplicate_names() {
        let json = serde_json::json!([
            {"name": "Art Show", "id": 2},
            {"name": "Art Show", "id": 5}
        ]);
        let set: CandidateSet = serde_json::from_value(json).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.id_of("Art Show"), Some(2));
    }
}
