//! Admin moderation endpoints.
//!
//! All of these sit behind the admin guard. Mutations on unknown ids succeed
//! without effect, so repeating a request is harmless.

use axum::{extract::State, Json};

use super::{Ack, ApiResult, JsonOrForm};
use crate::models::{AdminSnapshot, NoteIdRequest, ToggleHiddenRequest, UpdateTagsRequest};
use crate::moderation::require_id;
use crate::AppState;

/// GET /admin/data - All notes and feedback, newest first.
pub async fn admin_data(State(state): State<AppState>) -> ApiResult<AdminSnapshot> {
    let snapshot = state.repo.admin_snapshot().await?;
    Ok(Json(snapshot))
}

/// POST /admin/toggleHidden - Set a note's hidden flag.
pub async fn toggle_hidden(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<ToggleHiddenRequest>,
) -> ApiResult<Ack> {
    let id = require_id(request.id)?;

    let matched = state.repo.set_hidden(id, request.hidden).await?;
    tracing::info!(id, hidden = request.hidden, matched, "Admin set hidden flag");

    Ok(Ack::ok())
}

/// POST /admin/delete - Delete a note.
pub async fn delete_note(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<NoteIdRequest>,
) -> ApiResult<Ack> {
    let id = require_id(request.id)?;

    let matched = state.repo.delete_note(id).await?;
    tracing::info!(id, matched, "Admin deleted note");

    Ok(Ack::ok())
}

/// POST /admin/updateTags - Replace a note's tags.
pub async fn update_tags(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<UpdateTagsRequest>,
) -> ApiResult<Ack> {
    let id = require_id(request.id)?;
    let tags = request.tags.unwrap_or_default();

    let matched = state.repo.update_tags(id, &tags).await?;
    tracing::info!(id, tags = ?tags, matched, "Admin updated tags");

    Ok(Ack::ok())
}

/// POST /admin/resetReports - Zero a note's report count.
pub async fn reset_reports(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<NoteIdRequest>,
) -> ApiResult<Ack> {
    let id = require_id(request.id)?;

    let matched = state.repo.reset_reports(id).await?;
    tracing::info!(id, matched, "Admin reset report count");

    Ok(Ack::ok())
}
