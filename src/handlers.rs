use crate::errors::AppError;
use crate::export::{summary_csv, summary_xlsx};
use crate::ledger::{self, LedgerError, Movement, RecordOutcome};
use crate::models::{
    DeleteResponse, EntryId, Goal, GoalId, GoalRequest, GoalSummary, HistoryResponse, LedgerData,
    MovementForm, MovementRequest, RecordResponse, RenameRequest, ReviseRequest, ReviseResponse,
    SummaryResponse, TopicCount,
};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::store::LedgerStore;
use crate::topics::topic_counts;
use crate::ui::render_index;
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Path, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};
use chrono::Local;
use tracing::warn;

pub const PASSWORD_HEADER: &str = "x-app-password";

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.data.lock().await;
    let goals = ledger::summarize(&*data);
    let overall = ledger::overall(&goals);
    Html(render_index(&goals, &overall, state.password.is_some()))
}

pub async fn list_goals(State(state): State<AppState>) -> Result<Json<SummaryResponse>, AppError> {
    let data = state.data.lock().await;
    let goals = ledger::summarize(&*data);
    let overall = ledger::overall(&goals);
    Ok(Json(SummaryResponse { goals, overall }))
}

pub async fn create_goal(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<GoalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Goal>), AppError> {
    authorize(&state, &headers)?;
    let Json(payload) = payload?;
    let goal = apply(&state, |data| {
        ledger::create_goal(data, &payload.label, payload.target)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn rename_goal(
    Path(goal_id): Path<GoalId>,
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RenameRequest>, JsonRejection>,
) -> Result<Json<Goal>, AppError> {
    authorize(&state, &headers)?;
    let Json(payload) = payload?;
    let goal = apply(&state, |data| ledger::rename_goal(data, goal_id, &payload.label)).await?;
    Ok(Json(goal))
}

pub async fn delete_goal(
    Path(goal_id): Path<GoalId>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Goal>, AppError> {
    authorize(&state, &headers)?;
    let goal = apply(&state, |data| ledger::remove_goal(data, goal_id)).await?;
    Ok(Json(goal))
}

pub async fn goal_history(
    Path(goal_id): Path<GoalId>,
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, AppError> {
    let data = state.data.lock().await;
    let entries = ledger::history(&*data, goal_id)?;
    let goal = data
        .load_goal(goal_id)
        .ok_or(LedgerError::GoalNotFound(goal_id))?;
    Ok(Json(HistoryResponse { goal, entries }))
}

pub async fn record_movement(
    Path(goal_id): Path<GoalId>,
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<MovementRequest>, JsonRejection>,
) -> Result<Json<RecordResponse>, AppError> {
    authorize(&state, &headers)?;
    let Json(payload) = payload?;
    let delta = ledger::amount_from_json(&payload.amount)?;
    let movement = Movement {
        delta,
        note: payload.note,
        date: payload.date.unwrap_or_else(|| Local::now().date_naive()),
    };
    let response = commit_movement(&state, goal_id, movement).await?;
    Ok(Json(response))
}

pub async fn record_movement_form(
    Path(goal_id): Path<GoalId>,
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<MovementForm>, FormRejection>,
) -> Result<Redirect, AppError> {
    let Form(form) = form?;
    let given = form.password.as_deref().or_else(|| header_password(&headers));
    if !state.accepts(given) {
        warn!(goal_id, "movement form rejected: wrong password");
        return Err(AppError::unauthorized());
    }
    let delta = ledger::parse_amount(&form.amount)?;
    commit_movement(&state, goal_id, Movement::new(delta, form.note)).await?;
    Ok(Redirect::to("/"))
}

pub async fn revise_movement(
    Path(entry_id): Path<EntryId>,
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ReviseRequest>, JsonRejection>,
) -> Result<Json<ReviseResponse>, AppError> {
    authorize(&state, &headers)?;
    let Json(payload) = payload?;
    let response = apply(&state, |data| {
        let entry = ledger::revise_movement(data, entry_id, payload.magnitude, &payload.note)?;
        let summary = goal_summary(data, entry.goal_id)?;
        Ok(ReviseResponse { entry, summary })
    })
    .await?;
    Ok(Json(response))
}

pub async fn delete_movement(
    Path(entry_id): Path<EntryId>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, AppError> {
    authorize(&state, &headers)?;
    let response = apply(&state, |data| {
        let outcome = ledger::delete_movement(data, entry_id)?;
        let summary = goal_summary(data, outcome.removed.goal_id)?;
        Ok(DeleteResponse {
            removed: outcome.removed,
            adjusted: outcome.adjusted,
            summary,
        })
    })
    .await?;
    Ok(Json(response))
}

pub async fn get_topics(State(state): State<AppState>) -> Json<Vec<TopicCount>> {
    let data = state.data.lock().await;
    Json(topic_counts(&data.entries))
}

pub async fn export_xlsx(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let data = state.data.lock().await;
    let bytes = summary_xlsx(&*data).map_err(AppError::internal)?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"goal_progress.xlsx\"",
            ),
        ],
        bytes,
    ))
}

pub async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    let data = state.data.lock().await;
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"goal_progress.csv\"",
            ),
        ],
        summary_csv(&*data),
    )
}

async fn commit_movement(
    state: &AppState,
    goal_id: GoalId,
    movement: Movement,
) -> Result<RecordResponse, AppError> {
    apply(state, |data| {
        let outcome = ledger::record_movement(data, goal_id, movement)?;
        let summary = goal_summary(data, goal_id)?;
        Ok(match outcome {
            RecordOutcome::Recorded(entry) => RecordResponse {
                recorded: true,
                entry: Some(entry),
                summary,
            },
            RecordOutcome::NotRecorded => RecordResponse {
                recorded: false,
                entry: None,
                summary,
            },
        })
    })
    .await
}

/// Runs `op` on a copy of the ledger, persists the copy, then swaps it in.
/// A rejected operation or a failed write leaves the shared state untouched.
async fn apply<T>(
    state: &AppState,
    op: impl FnOnce(&mut LedgerData) -> Result<T, LedgerError>,
) -> Result<T, AppError> {
    let mut data = state.data.lock().await;
    let mut working = data.clone();
    let result = op(&mut working)?;
    persist_data(&state.data_path, &working).await?;
    *data = working;
    Ok(result)
}

fn goal_summary(data: &LedgerData, goal_id: GoalId) -> Result<GoalSummary, LedgerError> {
    let goal = data
        .load_goal(goal_id)
        .ok_or(LedgerError::GoalNotFound(goal_id))?;
    Ok(ledger::summarize_goal(data, &goal))
}

fn header_password(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(PASSWORD_HEADER)
        .and_then(|value| value.to_str().ok())
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    if state.accepts(header_password(headers)) {
        Ok(())
    } else {
        warn!("request rejected: wrong or missing password");
        Err(AppError::unauthorized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_in(dir: &std::path::Path) -> AppState {
        let mut data = LedgerData::default();
        let goal = ledger::create_goal(&mut data, "Nighttime patrols", 10).unwrap();
        ledger::record_movement(&mut data, goal.id, Movement::new(4, "first")).unwrap();
        AppState::new(dir.join("missing").join("ledger.json"), None, data)
    }

    #[tokio::test]
    async fn failed_write_leaves_ledger_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_in(dir.path());
        let before = state.data.lock().await.clone();

        let payload = MovementRequest {
            amount: serde_json::json!(3),
            note: "second".to_string(),
            date: None,
        };
        let err = record_movement(
            Path(1),
            State(state.clone()),
            HeaderMap::new(),
            Ok(Json(payload)),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let err = delete_movement(Path(1), State(state.clone()), HeaderMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let after = state.data.lock().await;
        assert_eq!(after.entries, before.entries);
        assert_eq!(after.next_entry_id, before.next_entry_id);
        assert_eq!(after.goals, before.goals);
    }

    #[tokio::test]
    async fn successful_write_swaps_in_the_new_ledger() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("missing")).unwrap();
        let state = state_in(dir.path());

        let payload = ReviseRequest {
            magnitude: 20,
            note: "corrected".to_string(),
        };
        let Json(response) =
            revise_movement(Path(1), State(state.clone()), HeaderMap::new(), Ok(Json(payload)))
                .await
                .unwrap();
        assert_eq!(response.entry.applied_delta, 10);
        assert_eq!(state.data.lock().await.entries[0].applied_delta, 10);
        assert!(dir.path().join("missing").join("ledger.json").exists());
    }
}
