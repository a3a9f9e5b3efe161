use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use log::{info, warn};

use crate::commands::db::InsertTicket;
use crate::error::{ApiError, PersistenceFailure};
use crate::models::{CreateFeedbackRequest, FeedbackDraft, FeedbackRecord, StoredFields};
use crate::state::AppState;
use crate::validation::validate_submission;

pub async fn create_feedback(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<FeedbackRecord>), ApiError> {
    let request: CreateFeedbackRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected malformed feedback payload: {e}");
        ApiError::MalformedPayload(e.to_string())
    })?;

    let draft = validate_submission(request).inspect_err(|e| warn!("Rejected feedback: {e}"))?;
    let (draft, stored) = persist(&state, draft).await?;
    let record = FeedbackRecord::assemble(draft, stored)?;

    info!(
        "Created feedback {} ({}, {})",
        record.id, record.category, record.sentiment
    );
    Ok((StatusCode::CREATED, Json(record)))
}

// A timed-out insert is cancelled through its ticket and rolls back. If it committed before the
// cancel landed, the real result is awaited instead.
async fn persist(
    state: &AppState,
    draft: FeedbackDraft,
) -> Result<(FeedbackDraft, StoredFields), PersistenceFailure> {
    let store = Arc::clone(&state.store);
    let ticket = Arc::new(InsertTicket::default());
    let task_ticket = Arc::clone(&ticket);
    let mut task = tokio::task::spawn_blocking(move || -> Result<_, PersistenceFailure> {
        let stored = store.insert(&draft, &task_ticket)?;
        Ok((draft, stored))
    });

    match tokio::time::timeout(state.persistence_timeout, &mut task).await {
        Ok(joined) => joined?,
        Err(_) if ticket.cancel() => Err(PersistenceFailure::Timeout(state.persistence_timeout)),
        Err(_) => task.await?,
    }
}
