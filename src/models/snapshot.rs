//! Admin listing model.

use serde::{Deserialize, Serialize};

use super::{Feedback, Note};

/// Everything the moderation panel shows, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSnapshot {
    pub notes: Vec<Note>,
    pub feedback: Vec<Feedback>,
}
