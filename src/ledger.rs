//! Goal ledger: clamped accumulation of signed movements per goal.
//!
//! Every write keeps `0 <= sum(applied_delta) <= target` for the goal it
//! touches. Accumulated progress is always derived from the entries, never
//! stored on its own. A positive delta is progress towards the target, a
//! negative delta gives progress back.

use crate::models::{
    EntryId, Goal, GoalId, GoalStatus, GoalSummary, MovementEntry, OverallProgress,
};
use crate::store::{LedgerStore, NewEntry};
use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("movement amount must be a whole number, got {0:?}")]
    InvalidAmount(String),
    #[error("goal {0} does not exist")]
    GoalNotFound(GoalId),
    #[error("movement {0} does not exist")]
    EntryNotFound(EntryId),
    #[error("invalid goal: {0}")]
    InvalidGoal(String),
}

/// A movement the operator wants to commit.
#[derive(Debug, Clone)]
pub struct Movement {
    pub delta: i64,
    pub note: String,
    pub date: NaiveDate,
}

impl Movement {
    /// Movement dated today.
    pub fn new(delta: i64, note: impl Into<String>) -> Self {
        Self {
            delta,
            note: note.into(),
            date: Local::now().date_naive(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded(MovementEntry),
    /// Nothing changed and no note was given.
    NotRecorded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub removed: MovementEntry,
    /// Entries trimmed to bring the remaining sum back inside the bound.
    pub adjusted: Vec<EntryId>,
}

pub fn parse_amount(text: &str) -> Result<i64, LedgerError> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| LedgerError::InvalidAmount(trimmed.to_string()))
}

/// Accepts a JSON number without a fractional part (`2` or `2.0`) or the raw
/// text of an input field.
pub fn amount_from_json(value: &serde_json::Value) -> Result<i64, LedgerError> {
    match value {
        serde_json::Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(whole_float))
            .ok_or_else(|| LedgerError::InvalidAmount(number.to_string())),
        serde_json::Value::String(text) => parse_amount(text),
        other => Err(LedgerError::InvalidAmount(other.to_string())),
    }
}

fn whole_float(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.fract() == 0.0 && in_range).then_some(value as i64)
}

fn raw_sum(entries: &[MovementEntry]) -> i64 {
    entries
        .iter()
        .fold(0i64, |sum, entry| sum.saturating_add(entry.applied_delta))
}

fn clamp_to_target(value: i64, target: u32) -> i64 {
    value.clamp(0, i64::from(target))
}

pub fn accumulated<S: LedgerStore>(store: &S, goal: &Goal) -> i64 {
    clamp_to_target(raw_sum(&store.load_entries(goal.id)), goal.target)
}

/// `round(100 * accumulated / target, 1)`, zero for a zero target.
pub fn percentage(accumulated: i64, target: u64) -> f64 {
    if target == 0 {
        return 0.0;
    }
    (accumulated as f64 * 1000.0 / target as f64).round() / 10.0
}

pub fn status_for(accumulated: i64, percentage: f64) -> GoalStatus {
    if percentage >= 100.0 {
        GoalStatus::Complete
    } else if accumulated > 0 {
        GoalStatus::InProgress
    } else {
        GoalStatus::Pending
    }
}

pub fn summarize_goal<S: LedgerStore>(store: &S, goal: &Goal) -> GoalSummary {
    let accumulated = accumulated(store, goal);
    let percentage = percentage(accumulated, u64::from(goal.target));
    GoalSummary {
        goal_id: goal.id,
        label: goal.label.clone(),
        target: goal.target,
        accumulated,
        remaining: i64::from(goal.target) - accumulated,
        percentage,
        status: status_for(accumulated, percentage),
    }
}

pub fn summarize<S: LedgerStore>(store: &S) -> Vec<GoalSummary> {
    store
        .load_goals()
        .iter()
        .map(|goal| summarize_goal(store, goal))
        .collect()
}

pub fn overall(summaries: &[GoalSummary]) -> OverallProgress {
    let target: u64 = summaries.iter().map(|s| u64::from(s.target)).sum();
    let accumulated: i64 = summaries.iter().map(|s| s.accumulated).sum();
    OverallProgress {
        target,
        accumulated,
        percentage: percentage(accumulated, target),
    }
}

pub fn record_movement<S: LedgerStore>(
    store: &mut S,
    goal_id: GoalId,
    movement: Movement,
) -> Result<RecordOutcome, LedgerError> {
    let goal = store
        .load_goal(goal_id)
        .ok_or(LedgerError::GoalNotFound(goal_id))?;
    let current = accumulated(store, &goal);
    let proposed = current.saturating_add(movement.delta);
    let applied_delta = clamp_to_target(proposed, goal.target) - current;
    let note = movement.note.trim().to_string();

    if applied_delta == 0 && note.is_empty() {
        debug!(goal_id, requested = movement.delta, "movement had no effect and no note");
        return Ok(RecordOutcome::NotRecorded);
    }

    let id = store.insert_entry(NewEntry {
        goal_id,
        date: movement.date,
        applied_delta,
        note: note.clone(),
    });
    info!(
        goal_id,
        entry_id = id,
        requested = movement.delta,
        applied = applied_delta,
        "movement recorded"
    );

    Ok(RecordOutcome::Recorded(MovementEntry {
        id,
        goal_id,
        date: movement.date,
        applied_delta,
        requested_magnitude: applied_delta.unsigned_abs(),
        note,
    }))
}

/// Changes the magnitude and note of an entry, keeping its sign. The new
/// delta is clamped so the goal's total stays inside `[0, target]` given
/// every other entry.
pub fn revise_movement<S: LedgerStore>(
    store: &mut S,
    entry_id: EntryId,
    magnitude: u64,
    note: &str,
) -> Result<MovementEntry, LedgerError> {
    let entry = store
        .load_entry(entry_id)
        .ok_or(LedgerError::EntryNotFound(entry_id))?;
    let goal = store
        .load_goal(entry.goal_id)
        .ok_or(LedgerError::GoalNotFound(entry.goal_id))?;

    let others: Vec<MovementEntry> = store
        .load_entries(goal.id)
        .into_iter()
        .filter(|other| other.id != entry_id)
        .collect();
    let others_sum = raw_sum(&others);

    // Zero counts as positive.
    let sign = if entry.applied_delta < 0 { -1 } else { 1 };
    let desired = sign * i64::try_from(magnitude).unwrap_or(i64::MAX);
    let lower = others_sum.saturating_neg();
    let upper = i64::from(goal.target).saturating_sub(others_sum);
    let new_delta = desired.clamp(lower, upper);
    let note = note.trim();

    store.update_entry(entry_id, new_delta.unsigned_abs(), note, new_delta);
    info!(
        goal_id = goal.id,
        entry_id,
        requested = desired,
        applied = new_delta,
        previous = entry.applied_delta,
        "movement revised"
    );

    Ok(MovementEntry {
        applied_delta: new_delta,
        requested_magnitude: new_delta.unsigned_abs(),
        note: note.to_string(),
        ..entry
    })
}

pub fn delete_movement<S: LedgerStore>(
    store: &mut S,
    entry_id: EntryId,
) -> Result<DeleteOutcome, LedgerError> {
    let removed = store
        .delete_entry(entry_id)
        .ok_or(LedgerError::EntryNotFound(entry_id))?;
    let adjusted = match store.load_goal(removed.goal_id) {
        Some(goal) => rebalance(store, &goal),
        None => Vec::new(),
    };
    info!(
        goal_id = removed.goal_id,
        entry_id,
        removed = removed.applied_delta,
        adjusted = adjusted.len(),
        "movement deleted"
    );
    Ok(DeleteOutcome { removed, adjusted })
}

/// Trims the newest entries pushing the sum out of `[0, target]` until it
/// sits on the nearest bound. Returns the ids of the trimmed entries.
fn rebalance<S: LedgerStore>(store: &mut S, goal: &Goal) -> Vec<EntryId> {
    let entries = store.load_entries(goal.id);
    let sum = raw_sum(&entries);
    let target = i64::from(goal.target);
    let mut excess = if sum > target {
        sum - target
    } else if sum < 0 {
        sum
    } else {
        return Vec::new();
    };

    let mut adjusted = Vec::new();
    for entry in entries.iter().rev() {
        if excess == 0 {
            break;
        }
        if entry.applied_delta.signum() != excess.signum() {
            continue;
        }
        let cut = if excess > 0 {
            entry.applied_delta.min(excess)
        } else {
            entry.applied_delta.max(excess)
        };
        let delta = entry.applied_delta - cut;
        store.update_entry(entry.id, delta.unsigned_abs(), &entry.note, delta);
        excess -= cut;
        adjusted.push(entry.id);
    }

    warn!(goal_id = goal.id, ?adjusted, "trimmed entries after delete left progress out of range");
    adjusted
}

pub fn history<S: LedgerStore>(
    store: &S,
    goal_id: GoalId,
) -> Result<Vec<MovementEntry>, LedgerError> {
    store
        .load_goal(goal_id)
        .ok_or(LedgerError::GoalNotFound(goal_id))?;
    Ok(store.load_entries(goal_id))
}

pub fn create_goal<S: LedgerStore>(
    store: &mut S,
    label: &str,
    target: u32,
) -> Result<Goal, LedgerError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(LedgerError::InvalidGoal("label must not be empty".into()));
    }
    if target == 0 {
        return Err(LedgerError::InvalidGoal("target must be positive".into()));
    }
    let id = store.insert_goal(label, target);
    info!(goal_id = id, target, "goal created");
    Ok(Goal {
        id,
        label: label.to_string(),
        target,
    })
}

pub fn rename_goal<S: LedgerStore>(
    store: &mut S,
    goal_id: GoalId,
    label: &str,
) -> Result<Goal, LedgerError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(LedgerError::InvalidGoal("label must not be empty".into()));
    }
    if !store.update_goal_label(goal_id, label) {
        return Err(LedgerError::GoalNotFound(goal_id));
    }
    store
        .load_goal(goal_id)
        .ok_or(LedgerError::GoalNotFound(goal_id))
}

pub fn remove_goal<S: LedgerStore>(store: &mut S, goal_id: GoalId) -> Result<Goal, LedgerError> {
    let goal = store
        .delete_goal(goal_id)
        .ok_or(LedgerError::GoalNotFound(goal_id))?;
    info!(goal_id, "goal deleted with its movements");
    Ok(goal)
}
