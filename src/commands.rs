// Dashboard commands
// Display-ready views assembled from session queries
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::insights::{
    self, ArtFilter, MonthlyVisitors, TrafficThresholds, VisitorMetric, DEFAULT_TOP_MONTHS,
};
use crate::session::Session;
use crate::state::{Month, TourismStat};

pub const SELECT_FILTER_PROMPT: &str = "Please select at least one filter to view results.";
pub const NO_MATCHING_ART: &str = "No matching art forms found for the selected filters.";
pub const NO_ART_FOR_STATE: &str = "No art forms found for this state.";
pub const NO_DESCRIPTION: &str = "_No description available._";
pub const DEFAULT_LOCAL_TIP: &str = "Explore its rich art and culture!";

/// Cards per grid row in the explorer
pub const GRID_WIDTH: usize = 3;

const LOCAL_TIPS: &[(&str, &str)] = &[
    (
        "odisha",
        "Don't miss the Puri Jagannath Temple and the Ratha Yatra Festival!",
    ),
    (
        "kolkata",
        "Enjoy the famous Durga Puja festival and the traditional sweets like Rosogolla.",
    ),
];

static LINK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http\S+").expect("link pattern is valid"));

#[derive(Debug, Serialize)]
pub struct CommandError {
    message: String,
}

impl<E: std::fmt::Display> From<E> for CommandError {
    fn from(error: E) -> Self {
        CommandError {
            message: error.to_string(),
        }
    }
}

impl CommandError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Split items into rows of `width` for grid layouts
pub fn chunk_rows<T: Clone>(items: &[T], width: usize) -> Vec<Vec<T>> {
    items.chunks(width.max(1)).map(|c| c.to_vec()).collect()
}

// ==================== FILTER OPTIONS ====================

#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    /// Explorer dropdowns, first-seen order
    pub categories: Vec<String>,
    pub states: Vec<String>,
    /// Plan-my-visit picker, sorted
    pub plan_states: Vec<String>,
    /// Deep-dive picker, sorted
    pub deep_dive_states: Vec<String>,
}

pub fn filter_options(session: &Session) -> FilterOptions {
    FilterOptions {
        categories: insights::distinct_categories(session.art()),
        states: insights::distinct_art_states(session.art()),
        plan_states: insights::sorted_art_states(session.art()),
        deep_dive_states: insights::sorted_tourism_states(session.tourism()),
    }
}

// ==================== ART EXPLORER ====================

#[derive(Debug, Clone, Serialize)]
pub struct ArtCard {
    pub artform: String,
    pub state: String,
    pub category: String,
    /// Empty when the record has no image
    pub image_url: String,
    pub description: String,
    pub tourism: Option<TourismStat>,
}

/// No filter selected means the explorer prompts instead of listing
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArtExplorerView {
    NeedsFilter {
        message: String,
    },
    Results {
        total: usize,
        rows: Vec<Vec<ArtCard>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

pub fn explore_art(session: &Session, filter: &ArtFilter) -> ArtExplorerView {
    if filter.is_empty() {
        return ArtExplorerView::NeedsFilter {
            message: SELECT_FILTER_PROMPT.to_string(),
        };
    }

    let filtered = insights::filter_art(session.art(), filter);
    let cards: Vec<ArtCard> = insights::join_with_tourism(&filtered, session.tourism())
        .into_iter()
        .map(|joined| ArtCard {
            artform: joined.art.artform,
            state: joined.art.state,
            category: joined.art.category,
            image_url: joined.art.image_url.unwrap_or_default(),
            description: joined
                .art
                .description
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            tourism: joined.tourism,
        })
        .collect();

    log::debug!("art explorer: {} cards for {:?}", cards.len(), filter);

    ArtExplorerView::Results {
        total: cards.len(),
        message: cards.is_empty().then(|| NO_MATCHING_ART.to_string()),
        rows: chunk_rows(&cards, GRID_WIDTH),
    }
}

// ==================== TOURISM OVERVIEW ====================

#[derive(Debug, Clone, Serialize)]
pub struct VisitorBar {
    pub state: String,
    pub domestic_visitors: u64,
    pub foreign_visitors: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TourismOverview {
    /// Ranked by domestic visitors
    pub chart: Vec<VisitorBar>,
    pub hidden_gems: Vec<String>,
}

pub fn tourism_overview(session: &Session) -> TourismOverview {
    let chart = insights::rank_states(session.tourism(), VisitorMetric::Domestic, None)
        .into_iter()
        .map(|s| VisitorBar {
            state: s.state,
            domestic_visitors: s.domestic_visitors,
            foreign_visitors: s.foreign_visitors,
        })
        .collect();

    let hidden_gems = insights::identify_low_traffic_states(
        session.art(),
        session.tourism(),
        &TrafficThresholds::default(),
    )
    .into_iter()
    .collect();

    TourismOverview { chart, hidden_gems }
}

// ==================== PLAN MY VISIT ====================

/// A blank selection counts as no selection
fn selected(state: Option<&str>) -> Option<&str> {
    state.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Serialize)]
pub struct Experience {
    pub artform: String,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitPlan {
    pub state: String,
    pub featured_artforms: Vec<String>,
    pub best_months: Vec<String>,
    pub hidden_gem: bool,
    pub experiences: Vec<Experience>,
}

/// `None` means nothing selected; the panel is skipped
pub fn plan_visit(session: &Session, state: Option<&str>) -> Option<VisitPlan> {
    let state = selected(state)?;

    let gems = insights::identify_low_traffic_states(
        session.art(),
        session.tourism(),
        &TrafficThresholds::default(),
    );

    let experiences = insights::art_for_state(session.art(), state)
        .into_iter()
        .map(|r| Experience {
            artform: r.artform.clone(),
            category: r.category.clone(),
            description: r
                .description
                .as_deref()
                .map(strip_links)
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        })
        .collect();

    Some(VisitPlan {
        state: state.to_string(),
        featured_artforms: insights::artforms_for_state(session.art(), state),
        best_months: insights::best_months(state, session.seasonal(), DEFAULT_TOP_MONTHS),
        hidden_gem: insights::is_hidden_gem(state, &gems),
        experiences,
    })
}

/// Drop raw links from free-text descriptions
pub fn strip_links(text: &str) -> String {
    LINK_PATTERN.replace_all(text, "").trim().to_string()
}

// ==================== STATE DEEP DIVE ====================

/// Absent figures mean the state has no tourism row, not zero visitors
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub domestic_visitors: Option<u64>,
    pub foreign_visitors: Option<u64>,
    pub seasonal_visitors: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendPoint {
    pub month: Month,
    pub visitors: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArtFormEntry {
    pub artform: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateDeepDive {
    pub state: String,
    pub snapshot: StateSnapshot,
    pub monthly_trend: Vec<TrendPoint>,
    pub art_forms: Vec<ArtFormEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub art_message: Option<String>,
    pub local_tip: String,
}

pub fn state_deep_dive(session: &Session, state: Option<&str>) -> Option<StateDeepDive> {
    let state = selected(state)?;

    let tourism = insights::tourism_for_state(session.tourism(), state);
    let monthly: MonthlyVisitors = insights::aggregate_seasonal(state, session.seasonal());

    let art_forms: Vec<ArtFormEntry> = insights::art_for_state(session.art(), state)
        .into_iter()
        .map(|r| ArtFormEntry {
            artform: r.artform.clone(),
            category: r.category.clone(),
        })
        .collect();

    Some(StateDeepDive {
        state: state.to_string(),
        snapshot: StateSnapshot {
            domestic_visitors: tourism.map(|t| t.domestic_visitors),
            foreign_visitors: tourism.map(|t| t.foreign_visitors),
            seasonal_visitors: monthly.total(),
        },
        monthly_trend: monthly
            .iter()
            .map(|(month, visitors)| TrendPoint { month, visitors })
            .collect(),
        art_message: art_forms.is_empty().then(|| NO_ART_FOR_STATE.to_string()),
        art_forms,
        local_tip: local_tip(state).to_string(),
    })
}

pub fn local_tip(state: &str) -> &'static str {
    let key = crate::state::StateKey::new(state);
    LOCAL_TIPS
        .iter()
        .find(|(name, _)| *name == key.as_str())
        .map(|(_, tip)| *tip)
        .unwrap_or(DEFAULT_LOCAL_TIP)
}

// ==================== LANDING ====================

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub loaded_at: DateTime<Utc>,
    pub art_records: usize,
    pub tourism_stats: usize,
    pub seasonal_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LandingView {
    pub session: SessionInfo,
    pub filters: FilterOptions,
    pub tourism: TourismOverview,
}

pub fn landing(session: &Session) -> LandingView {
    LandingView {
        session: SessionInfo {
            loaded_at: session.loaded_at(),
            art_records: session.art().len(),
            tourism_stats: session.tourism().len(),
            seasonal_rows: session.seasonal().len(),
        },
        filters: filter_options(session),
        tourism: tourism_overview(session),
    }
}

// ==================== DISPATCH ====================

#[derive(Debug, Default, Deserialize)]
struct StateInput {
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RankInput {
    #[serde(default)]
    metric: VisitorMetric,
    #[serde(default)]
    top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct BestMonthsInput {
    state: String,
    #[serde(default = "default_top_months")]
    top_n: usize,
}

fn default_top_months() -> usize {
    DEFAULT_TOP_MONTHS
}

/// Single JSON entry point for an embedding presentation layer
pub fn dispatch(
    session: &Session,
    command: &str,
    args: serde_json::Value,
) -> CommandResult<serde_json::Value> {
    let args = if args.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        args
    };

    let value = match command {
        "landing" => serde_json::to_value(landing(session))?,
        "filter_options" => serde_json::to_value(filter_options(session))?,
        "explore_art" => {
            let filter: ArtFilter = serde_json::from_value(args)?;
            serde_json::to_value(explore_art(session, &filter))?
        }
        "tourism_overview" => serde_json::to_value(tourism_overview(session))?,
        "rank_states" => {
            let input: RankInput = serde_json::from_value(args)?;
            serde_json::to_value(insights::rank_states(session.tourism(), input.metric, input.top_n))?
        }
        "best_months" => {
            let input: BestMonthsInput = serde_json::from_value(args)?;
            serde_json::to_value(insights::best_months(&input.state, session.seasonal(), input.top_n))?
        }
        "plan_visit" => {
            let input: StateInput = serde_json::from_value(args)?;
            serde_json::to_value(plan_visit(session, input.state.as_deref()))?
        }
        "state_deep_dive" => {
            let input: StateInput = serde_json::from_value(args)?;
            serde_json::to_value(state_deep_dive(session, input.state.as_deref()))?
        }
        _ => {
            return Err(CommandError {
                message: format!("Unknown command: {}", command),
            })
        }
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ArtRecord, SeasonalTrend};
    use serde_json::json;

    fn art(state: &str, artform: &str, category: &str, description: Option<&str>) -> ArtRecord {
        ArtRecord {
            state: state.to_string(),
            artform: artform.to_string(),
            category: category.to_string(),
            description: description.map(String::from),
            image_url: None,
        }
    }

    fn stat(state: &str, domestic: u64, foreign: u64) -> TourismStat {
        TourismStat {
            state: state.to_string(),
            domestic_visitors: domestic,
            foreign_visitors: foreign,
        }
    }

    fn trend(state: &str, month: Month, visitors: u64) -> SeasonalTrend {
        SeasonalTrend {
            state: state.to_string(),
            month,
            visitors,
        }
    }

    fn session() -> Session {
        Session::from_tables(
            vec![
                art("Odisha", "Pattachitra", "Painting", Some("Cloth scroll art. See https://example.org/p")),
                art("Odisha", "Odissi", "Dance", None),
                art("Bihar", "Madhubani", "Painting", Some("Folk painting")),
                art("Nagaland", "Hornbill Crafts", "Handicraft", None),
                art("Bihar", "Sikki Grass", "Handicraft", None),
            ],
            vec![
                stat("Odisha", 900_000, 50_000),
                stat("Bihar", 3_000_000, 400_000),
                stat("Kerala", 1_500_000, 120_000),
            ],
            vec![
                trend("Odisha", Month::December, 4_000),
                trend("Odisha", Month::June, 1_000),
                trend("odisha", Month::December, 500),
                trend("Kerala", Month::January, 9_000),
            ],
        )
    }

    #[test]
    fn test_chunk_rows() {
        let rows = chunk_rows(&[1, 2, 3, 4, 5, 6, 7], 3);
        assert_eq!(rows, vec![vec![1, 2, 3], vec![4, 5, 6], vec![7]]);
        assert!(chunk_rows::<i32>(&[], 3).is_empty());
    }

    #[test]
    fn test_explore_art_requires_filter() {
        let view = explore_art(&session(), &ArtFilter::default());
        match view {
            ArtExplorerView::NeedsFilter { message } => assert_eq!(message, SELECT_FILTER_PROMPT),
            other => panic!("unexpected view: {:?}", other),
        }
    }

    #[test]
    fn test_explore_art_cards() {
        let filter = ArtFilter::new(Some("Painting".to_string()), None);
        let ArtExplorerView::Results { total, rows, message } = explore_art(&session(), &filter) else {
            panic!("expected results");
        };

        assert_eq!(total, 2);
        assert!(message.is_none());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].artform, "Pattachitra");
        assert_eq!(rows[0][0].image_url, "");
        assert_eq!(rows[0][0].tourism.as_ref().unwrap().domestic_visitors, 900_000);
        assert_eq!(rows[0][1].description, "Folk painting");
    }

    #[test]
    fn test_explore_art_missing_tourism_and_description() {
        let filter = ArtFilter::new(None, Some("Nagaland".to_string()));
        let ArtExplorerView::Results { rows, .. } = explore_art(&session(), &filter) else {
            panic!("expected results");
        };
        assert!(rows[0][0].tourism.is_none());
        assert_eq!(rows[0][0].description, NO_DESCRIPTION);
    }

    #[test]
    fn test_explore_art_no_match() {
        let filter = ArtFilter::new(Some("Dance".to_string()), Some("Bihar".to_string()));
        let ArtExplorerView::Results { total, rows, message } = explore_art(&session(), &filter) else {
            panic!("expected results");
        };
        assert_eq!(total, 0);
        assert!(rows.is_empty());
        assert_eq!(message.as_deref(), Some(NO_MATCHING_ART));
    }

    #[test]
    fn test_tourism_overview() {
        let overview = tourism_overview(&session());
        let order: Vec<&str> = overview.chart.iter().map(|b| b.state.as_str()).collect();
        assert_eq!(order, vec!["Bihar", "Kerala", "Odisha"]);
        assert_eq!(overview.hidden_gems, vec!["Odisha".to_string()]);
    }

    #[test]
    fn test_plan_visit() {
        assert!(plan_visit(&session(), None).is_none());

        let plan = plan_visit(&session(), Some("odisha")).unwrap();
        assert_eq!(plan.featured_artforms, vec!["Pattachitra", "Odissi"]);
        assert_eq!(plan.best_months, vec!["December", "June", "December"]);
        assert!(plan.hidden_gem);
        assert_eq!(plan.experiences.len(), 2);
        assert_eq!(plan.experiences[0].description, "Cloth scroll art. See");
        assert_eq!(plan.experiences[1].description, NO_DESCRIPTION);
    }

    #[test]
    fn test_plan_visit_without_seasonal_data() {
        let plan = plan_visit(&session(), Some("Bihar")).unwrap();
        assert_eq!(plan.best_months, vec!["Data not available"]);
        assert!(!plan.hidden_gem);
    }

    #[test]
    fn test_state_deep_dive() {
        assert!(state_deep_dive(&session(), None).is_none());

        let dive = state_deep_dive(&session(), Some("Odisha")).unwrap();
        assert_eq!(dive.snapshot.domestic_visitors, Some(900_000));
        assert_eq!(dive.snapshot.foreign_visitors, Some(50_000));
        assert_eq!(dive.snapshot.seasonal_visitors, 5_500);
        assert_eq!(dive.monthly_trend.len(), 12);
        assert_eq!(dive.monthly_trend[11].visitors, 4_500);
        assert_eq!(dive.monthly_trend[5].visitors, 1_000);
        assert_eq!(dive.art_forms.len(), 2);
        assert!(dive.art_message.is_none());
        assert!(dive.local_tip.contains("Jagannath"));
    }

    #[test]
    fn test_state_deep_dive_without_art_or_stats() {
        let dive = state_deep_dive(&session(), Some("Kerala")).unwrap();
        assert!(dive.art_forms.is_empty());
        assert_eq!(dive.art_message.as_deref(), Some(NO_ART_FOR_STATE));
        assert_eq!(dive.local_tip, DEFAULT_LOCAL_TIP);

        let dive = state_deep_dive(&session(), Some("Nagaland")).unwrap();
        assert!(dive.snapshot.domestic_visitors.is_none());
        assert_eq!(dive.snapshot.seasonal_visitors, 0);
    }

    #[test]
    fn test_blank_state_is_no_selection() {
        let session = session();
        for blank in ["", "   "] {
            assert!(plan_visit(&session, Some(blank)).is_none());
            assert!(state_deep_dive(&session, Some(blank)).is_none());
        }

        let value = dispatch(&session, "state_deep_dive", json!({"state": " "})).unwrap();
        assert!(value.is_null());

        let value = dispatch(&session, "explore_art", json!({"category": "", "state": ""})).unwrap();
        assert_eq!(value["status"], "needs_filter");
    }

    #[test]
    fn test_strip_links() {
        assert_eq!(strip_links("Visit http://a.b/c now"), "Visit  now");
        assert_eq!(strip_links("https://only.link"), "");
        assert_eq!(strip_links("plain text"), "plain text");
    }

    #[test]
    fn test_filter_options() {
        let options = filter_options(&session());
        assert_eq!(options.categories, vec!["Painting", "Dance", "Handicraft"]);
        assert_eq!(options.states, vec!["Odisha", "Bihar", "Nagaland"]);
        assert_eq!(options.plan_states, vec!["Bihar", "Nagaland", "Odisha"]);
        assert_eq!(options.deep_dive_states, vec!["Bihar", "Kerala", "Odisha"]);
    }

    #[test]
    fn test_dispatch() {
        let session = session();

        let value = dispatch(&session, "explore_art", json!({"category": "Dance"})).unwrap();
        assert_eq!(value["status"], "results");
        assert_eq!(value["total"], 1);

        let value = dispatch(&session, "explore_art", serde_json::Value::Null).unwrap();
        assert_eq!(value["status"], "needs_filter");

        let value = dispatch(&session, "best_months", json!({"state": "ODISHA", "top_n": 1})).unwrap();
        assert_eq!(value, json!(["December"]));

        let value = dispatch(&session, "rank_states", json!({"metric": "foreign", "top_n": 1})).unwrap();
        assert_eq!(value[0]["state"], "Bihar");

        let value = dispatch(&session, "plan_visit", json!({})).unwrap();
        assert!(value.is_null());

        let value = dispatch(&session, "landing", json!(null)).unwrap();
        assert_eq!(value["session"]["art_records"], 5);
    }

    #[test]
    fn test_dispatch_errors() {
        let session = session();

        let err = dispatch(&session, "delete_everything", json!({})).unwrap_err();
        assert!(err.message().contains("Unknown command"));

        let err = dispatch(&session, "best_months", json!({"top_n": 2})).unwrap_err();
        assert!(err.message().contains("state"));
    }
}
