// Insights Module
// Pure filter, join, ranking and aggregation queries over loaded tables

pub mod filter;
pub mod join;
pub mod seasonal;
pub mod traffic;

pub use filter::{
    art_for_state, artforms_for_state, distinct_art_states, distinct_categories, filter_art,
    sorted_art_states, ArtFilter,
};
pub use join::{join_with_tourism, tourism_for_state, ArtWithTourism};
pub use seasonal::{
    aggregate_seasonal, best_months, top_months, total_visitors, MonthlyVisitors,
    DATA_NOT_AVAILABLE, DEFAULT_TOP_MONTHS,
};
pub use traffic::{
    identify_low_traffic_states, is_hidden_gem, rank_states, TrafficThresholds, VisitorMetric,
};

use crate::state::TourismStat;

/// Distinct tourism state names, sorted
pub fn sorted_tourism_states(tourism_rows: &[TourismStat]) -> Vec<String> {
    let mut states = filter::distinct(tourism_rows.iter().map(|t| t.state.as_str()));
    states.sort();
    states
}
