//! Feedback endpoint.

use axum::extract::State;

use super::{Ack, ApiResult, JsonOrForm};
use crate::errors::AppError;
use crate::models::SubmitFeedbackRequest;
use crate::AppState;

/// POST /feedback - Store free-text feedback about the site.
pub async fn submit_feedback(
    State(state): State<AppState>,
    JsonOrForm(request): JsonOrForm<SubmitFeedbackRequest>,
) -> ApiResult<Ack> {
    let message = request.message.unwrap_or_default();
    let message = message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    let feedback = state.repo.create_feedback(message).await?;
    tracing::info!(id = feedback.id, "Feedback received");

    Ok(Ack::ok())
}
