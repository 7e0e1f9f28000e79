use crate::errors::AppError;
use crate::models::LedgerData;
use crate::store::LedgerStore;
use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct SeedGoal {
    pub label: String,
    pub target: u32,
}

const DEFAULT_GOALS: &[(&str, u32)] = &[
    ("Nighttime inter-agency operations", 24),
    ("Nighttime presence patrols", 184),
    ("Institutional liaison (official letters)", 1),
    ("Civic-police activities", 6),
    ("Nighttime joint operations", 184),
    ("Inter-agency control operations", 12),
    ("Preventive actions in public spaces", 12),
    ("Commercial security workshops", 1),
    ("Intelligence-led operations", 6),
    ("Community security training", 1),
];

pub fn default_goals() -> Vec<SeedGoal> {
    DEFAULT_GOALS
        .iter()
        .map(|(label, target)| SeedGoal {
            label: label.to_string(),
            target: *target,
        })
        .collect()
}

pub async fn load_seed(path: Option<&Path>) -> Result<Vec<SeedGoal>, AppError> {
    let Some(path) = path else {
        return Ok(default_goals());
    };
    let bytes = fs::read(path).await?;
    serde_json::from_slice(&bytes).map_err(AppError::internal)
}

/// Inserts the seed goals when the ledger holds none. Goals with a zero target
/// or a blank label are skipped. Returns how many goals were added.
pub fn seed_if_empty(data: &mut LedgerData, goals: &[SeedGoal]) -> usize {
    if !data.goals.is_empty() {
        return 0;
    }
    let mut added = 0;
    for goal in goals {
        let label = goal.label.trim();
        if goal.target == 0 || label.is_empty() {
            continue;
        }
        data.insert_goal(label, goal.target);
        added += 1;
    }
    info!(added, "seeded goals");
    added
}
