// Left join of art rows onto tourism stats

use serde::Serialize;
use std::collections::HashMap;

use crate::state::{ArtRecord, StateKey, TourismStat};

/// An art row with its state's tourism stat, if any
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtWithTourism {
    pub art: ArtRecord,
    pub tourism: Option<TourismStat>,
}

/// Index tourism rows by normalized state. The first row for a key wins.
pub fn index_tourism(tourism_rows: &[TourismStat]) -> HashMap<StateKey, &TourismStat> {
    let mut index = HashMap::with_capacity(tourism_rows.len());
    for stat in tourism_rows {
        index.entry(stat.state_key()).or_insert(stat);
    }
    index
}

/// Left join on the normalized state key. Output length and order match
/// `art_rows`; states without stats get `None`.
pub fn join_with_tourism(art_rows: &[ArtRecord], tourism_rows: &[TourismStat]) -> Vec<ArtWithTourism> {
    let index = index_tourism(tourism_rows);

    art_rows
        .iter()
        .map(|art| ArtWithTourism {
            art: art.clone(),
            tourism: index.get(&art.state_key()).map(|s| (*s).clone()),
        })
        .collect()
}

/// First tourism row for a state, compared by normalized key
pub fn tourism_for_state<'a>(tourism_rows: &'a [TourismStat], state: &str) -> Option<&'a TourismStat> {
    let key = StateKey::new(state);
    tourism_rows.iter().find(|t| t.state_key() == key)
}
