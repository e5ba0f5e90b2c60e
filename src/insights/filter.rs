// Art listing filters and dropdown option helpers

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

use crate::state::{ArtRecord, StateKey};

/// Optional filter per dimension. `None` matches everything in that
/// dimension; there is no sentinel string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtFilter {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub state: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn blank_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(non_blank(Option::<String>::deserialize(deserializer)?))
}

impl ArtFilter {
    /// Blank values are treated as unset
    pub fn new(category: Option<String>, state: Option<String>) -> Self {
        ArtFilter {
            category: non_blank(category),
            state: non_blank(state),
        }
    }

    /// True when no dimension is constrained
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.state.is_none()
    }

    pub fn matches(&self, record: &ArtRecord) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| record.category == c);
        let state_ok = self.state.as_deref().map_or(true, |s| record.state == s);
        category_ok && state_ok
    }
}

/// Records matching every present filter, in input order. Both values are
/// matched exactly since they come from the dropdowns built over the same
/// table. An empty filter returns everything; callers decide whether that
/// is worth showing.
pub fn filter_art(records: &[ArtRecord], filter: &ArtFilter) -> Vec<ArtRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

/// Distinct categories in first-seen order
pub fn distinct_categories(records: &[ArtRecord]) -> Vec<String> {
    distinct(records.iter().map(|r| r.category.as_str()))
}

/// Distinct state names in first-seen order
pub fn distinct_art_states(records: &[ArtRecord]) -> Vec<String> {
    distinct(records.iter().map(|r| r.state.as_str()))
}

/// Distinct state names, sorted
pub fn sorted_art_states(records: &[ArtRecord]) -> Vec<String> {
    let mut states = distinct_art_states(records);
    states.sort();
    states
}

/// Art rows for a state, compared by normalized key
pub fn art_for_state<'a>(records: &'a [ArtRecord], state: &str) -> Vec<&'a ArtRecord> {
    let key = StateKey::new(state);
    records.iter().filter(|r| r.state_key() == key).collect()
}

/// Distinct art form names for a state in first-seen order
pub fn artforms_for_state(records: &[ArtRecord], state: &str) -> Vec<String> {
    distinct(art_for_state(records, state).into_iter().map(|r| r.artform.as_str()))
}

pub(crate) fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(String::from)
        .collect()
}
