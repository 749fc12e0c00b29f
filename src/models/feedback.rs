//! Site feedback model.

use serde::{Deserialize, Serialize};

/// Free-text feedback about the site. Unrelated to notes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub id: i64,
    pub message: String,
    pub created_at: Option<String>,
}

/// Request body for `POST /feedback`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmitFeedbackRequest {
    pub message: Option<String>,
}
