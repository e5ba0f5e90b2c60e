// Visitor-volume queries: state ranking and hidden gem detection

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use super::join::index_tourism;
use crate::state::{ArtRecord, StateKey, TourismStat};

/// Upper bounds (exclusive) for a state to count as under-visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficThresholds {
    pub domestic: u64,
    pub foreign: u64,
}

impl Default for TrafficThresholds {
    fn default() -> Self {
        TrafficThresholds {
            domestic: 1_000_000,
            foreign: 100_000,
        }
    }
}

impl TrafficThresholds {
    /// Below both thresholds. Exceeding either one disqualifies.
    pub fn is_low_traffic(&self, stat: &TourismStat) -> bool {
        stat.domestic_visitors < self.domestic && stat.foreign_visitors < self.foreign
    }
}

/// Join art and tourism on state and return the distinct states under both
/// thresholds. Only states with art records and a tourism row qualify. Names
/// are the art rows' trimmed spelling, first seen per key.
pub fn identify_low_traffic_states(
    art_rows: &[ArtRecord],
    tourism_rows: &[TourismStat],
    thresholds: &TrafficThresholds,
) -> BTreeSet<String> {
    let index = index_tourism(tourism_rows);
    let mut seen: HashSet<StateKey> = HashSet::new();
    let mut gems = BTreeSet::new();

    for art in art_rows {
        let key = art.state_key();
        if seen.contains(&key) {
            continue;
        }
        if let Some(stat) = index.get(&key) {
            seen.insert(key);
            if thresholds.is_low_traffic(stat) {
                gems.insert(art.state.trim().to_string());
            }
        }
    }

    gems
}

/// Membership test by normalized key
pub fn is_hidden_gem(state: &str, gems: &BTreeSet<String>) -> bool {
    let key = StateKey::new(state);
    gems.iter().any(|g| StateKey::new(g) == key)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitorMetric {
    #[default]
    Domestic,
    Foreign,
    Total,
}

impl VisitorMetric {
    pub fn value(&self, stat: &TourismStat) -> u64 {
        match self {
            VisitorMetric::Domestic => stat.domestic_visitors,
            VisitorMetric::Foreign => stat.foreign_visitors,
            VisitorMetric::Total => stat.total_visitors(),
        }
    }
}

/// Tourism rows ordered by `metric`, highest first, ties in input order.
/// `top_n` of `None` keeps every row.
pub fn rank_states(
    tourism_rows: &[TourismStat],
    metric: VisitorMetric,
    top_n: Option<usize>,
) -> Vec<TourismStat> {
    let mut ranked = tourism_rows.to_vec();
    ranked.sort_by(|a, b| metric.value(b).cmp(&metric.value(a)));
    if let Some(n) = top_n {
        ranked.truncate(n);
    }
    ranked
}
