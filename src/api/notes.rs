//! Public note endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;

use super::{Ack, ApiResult, JsonOrForm};
use crate::errors::AppError;
use crate::models::{NoteIdRequest, PublicNote, RandomQuery, ReportOutcome, SubmitNoteRequest};
use crate::moderation::{require_id, validate_submission, REPORT_THRESHOLD};
use crate::AppState;

/// Tag filter value meaning "any tag".
const ALL_TAGS: &str = "all";

/// Response for a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub id: i64,
}

/// Response for the visible note count.
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

/// Response for a report.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub success: bool,
    #[serde(flatten)]
    pub outcome: ReportOutcome,
}

/// POST /submit - Create a new note.
pub async fn submit_note(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<SubmitNoteRequest>,
) -> ApiResult<SubmitResponse> {
    let features = &state.config.features;
    let note = validate_submission(request, features.require_title, features.tags)?;

    let created = state.repo.create_note(&note).await?;
    tracing::info!(id = created.id, tags = created.tags.len(), "Note submitted");

    Ok(Json(SubmitResponse {
        success: true,
        id: created.id,
    }))
}

/// GET /random - Fetch one visible note, optionally filtered by `tag`.
pub async fn random_note(
    State(state): State<AppState>,
    Query(params): Query<RandomQuery>,
) -> ApiResult<PublicNote> {
    let tag = if state.config.features.tags {
        params
            .tag
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != ALL_TAGS)
    } else {
        None
    };

    let note = state.repo.random_visible_note(tag).await?;

    Ok(Json(note.map(PublicNote::from).unwrap_or_else(PublicNote::placeholder)))
}

/// GET /count - Number of visible notes.
pub async fn count_notes(State(state): State<AppState>) -> ApiResult<CountResponse> {
    let count = state.repo.count_visible().await?;
    Ok(Json(CountResponse { count }))
}

/// POST /like - Increment a note's likes.
///
/// Unknown ids succeed as well; the response does not reveal whether a note matched.
pub async fn like_note(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<NoteIdRequest>,
) -> ApiResult<Ack> {
    let id = require_id(request.id)?;

    if !state.repo.like_note(id).await? {
        tracing::debug!(id, "Like for unknown note ignored");
    }

    Ok(Ack::ok())
}

/// POST /report - Increment a note's report count, hiding it at the threshold.
pub async fn report_note(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<NoteIdRequest>,
) -> ApiResult<ReportResponse> {
    let id = require_id(request.id)?;

    let outcome = state
        .repo
        .report_note(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;

    if outcome.reportcount == REPORT_THRESHOLD {
        tracing::info!(id, reportcount = outcome.reportcount, "Note hidden after reports");
    }

    Ok(Json(ReportResponse {
        success: true,
        outcome,
    }))
}
