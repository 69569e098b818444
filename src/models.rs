use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ===== Wire types, as the survey backend returns them =====
//
// Every field defaults when absent: a sparse or partially malformed payload
// degrades to zeros and empty collections instead of failing the decode.

#[derive(Debug, Clone, Deserialize, Default)]
pub struct StatsResponse {
    #[serde(default)]
    pub total_responses: u64,
    #[serde(default)]
    pub global: GlobalStats,
    #[serde(default)]
    pub timeline: Vec<TimelinePoint>,
    #[serde(default)]
    pub stats: BTreeMap<String, QuestionStat>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GlobalStats {
    #[serde(default)]
    pub avg: Option<f64>,
    /// Counts per answered value. JSON object keys are strings ("1".."4").
    #[serde(default)]
    pub per_value: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimelinePoint {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct QuestionStat {
    #[serde(default)]
    pub sum: f64,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CommentsResponse {
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub area_key: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ===== Derived view types =====

/// Everything the dashboard shows, recomputed from scratch on every refresh.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub total_responses: u64,
    pub global_avg: Option<f64>,
    pub latest: Option<TimelinePoint>,
    /// Counts for values 1..=4, in that order, missing values as 0.
    pub distribution: [u64; 4],
    pub critical_pct: Option<f64>,
    pub positive_pct: Option<f64>,
    pub satisfaction_index: Option<f64>,
    /// One row per known area, in table order.
    pub areas: Vec<AreaAverage>,
    pub insights: Option<Insights>,
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaAverage {
    pub key: String,
    pub label: String,
    pub answers: u64,
    /// `None` when the area received no answers.
    pub average: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub best: AreaScore,
    pub worst: AreaScore,
    pub most_active: AreaScore,
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaScore {
    pub key: String,
    pub label: String,
    pub value: f64,
}

/// Filtered comment view: chips over the whole filtered set, cards capped.
#[derive(Debug, Clone, Serialize)]
pub struct CommentsView {
    pub total: usize,
    pub shown: usize,
    pub areas: Vec<AreaCount>,
    pub comments: Vec<CommentCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AreaCount {
    pub key: String,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentCard {
    pub area_key: String,
    pub area_label: String,
    pub text: String,
    pub field: String,
    pub registered: String,
}

/// Query parameters shared by the dashboard page and the comments endpoint.
#[derive(Debug, Deserialize)]
pub struct CommentQuery {
    pub area: Option<String>,
    pub q: Option<String>,
}
