use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type GoalId = u64;
pub type EntryId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub label: String,
    pub target: u32,
}

/// One recorded change to a goal's progress.
///
/// `applied_delta` is the effect after clamping and is the only value used to
/// recompute totals. `requested_magnitude` always equals its absolute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementEntry {
    pub id: EntryId,
    pub goal_id: GoalId,
    pub date: NaiveDate,
    pub applied_delta: i64,
    pub requested_magnitude: u64,
    #[serde(default)]
    pub note: String,
}

/// Persisted snapshot of every goal and entry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LedgerData {
    pub goals: BTreeMap<GoalId, Goal>,
    /// Insertion order.
    pub entries: Vec<MovementEntry>,
    #[serde(default)]
    pub next_entry_id: EntryId,
    #[serde(default)]
    pub next_goal_id: GoalId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    Complete,
    InProgress,
    Pending,
}

impl GoalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GoalStatus::Complete => "Complete",
            GoalStatus::InProgress => "InProgress",
            GoalStatus::Pending => "Pending",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalSummary {
    pub goal_id: GoalId,
    pub label: String,
    pub target: u32,
    pub accumulated: i64,
    pub remaining: i64,
    pub percentage: f64,
    pub status: GoalStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallProgress {
    pub target: u64,
    pub accumulated: i64,
    pub percentage: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub goals: Vec<GoalSummary>,
    pub overall: OverallProgress,
}

/// Movement as submitted by the dashboard. `amount` arrives either as a JSON
/// number or as the raw text of the input field; numbers with a fractional
/// part are rejected as invalid input.
#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    pub amount: serde_json::Value,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct MovementForm {
    pub amount: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviseRequest {
    pub magnitude: u64,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub label: String,
    pub target: u32,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordResponse {
    pub recorded: bool,
    pub entry: Option<MovementEntry>,
    pub summary: GoalSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviseResponse {
    pub entry: MovementEntry,
    pub summary: GoalSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub removed: MovementEntry,
    pub adjusted: Vec<EntryId>,
    pub summary: GoalSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub goal: Goal,
    pub entries: Vec<MovementEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: u64,
}
