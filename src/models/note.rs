//! Note model and the views derived from it.

use serde::{Deserialize, Serialize};

/// Title shown when no visible note is available.
pub const PLACEHOLDER_TITLE: &str = "No notes yet";
/// Message shown when no visible note is available.
pub const PLACEHOLDER_MESSAGE: &str = "Be the first to leave a note.";

/// A stored note with its moderation counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: i64,
    pub title: Option<String>,
    pub message: String,
    pub tags: Vec<String>,
    pub likes: i64,
    pub reportcount: i64,
    pub hidden: bool,
    pub created_at: Option<String>,
}

/// Fields a new note is created from.
#[derive(Debug, Clone, Default)]
pub struct NewNote {
    pub title: Option<String>,
    pub message: String,
    pub tags: Vec<String>,
}

/// Public view served by the random-note route.
///
/// Moderation counters stay private. `id` and `created_at` are null
/// for the placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicNote {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub message: String,
    pub tags: Vec<String>,
    pub likes: i64,
    pub created_at: Option<String>,
}

impl PublicNote {
    /// Synthetic note returned when nothing qualifies.
    pub fn placeholder() -> Self {
        Self {
            id: None,
            title: Some(PLACEHOLDER_TITLE.to_string()),
            message: PLACEHOLDER_MESSAGE.to_string(),
            tags: Vec::new(),
            likes: 0,
            created_at: None,
        }
    }
}

impl From<Note> for PublicNote {
    fn from(note: Note) -> Self {
        Self {
            id: Some(note.id),
            title: note.title,
            message: note.message,
            tags: note.tags,
            likes: note.likes,
            created_at: note.created_at,
        }
    }
}

/// Counter state after a report.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ReportOutcome {
    pub reportcount: i64,
    pub hidden: bool,
}

/// Request body for `POST /submit`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SubmitNoteRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(deserialize_with = "crate::api::lenient::tags")]
    pub tags: Option<Vec<String>>,
}

/// Request body carrying only a note id (`/like`, `/report`, `/admin/delete`, ...).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NoteIdRequest {
    #[serde(deserialize_with = "crate::api::lenient::id")]
    pub id: Option<NoteId>,
}

/// Request body for `POST /admin/toggleHidden`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToggleHiddenRequest {
    #[serde(deserialize_with = "crate::api::lenient::id")]
    pub id: Option<NoteId>,
    #[serde(deserialize_with = "crate::api::lenient::truthy")]
    pub hidden: bool,
}

/// Request body for `POST /admin/updateTags`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTagsRequest {
    #[serde(deserialize_with = "crate::api::lenient::id")]
    pub id: Option<NoteId>,
    #[serde(deserialize_with = "crate::api::lenient::tags")]
    pub tags: Option<Vec<String>>,
}

/// Query string for `GET /random`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RandomQuery {
    #[serde(default)]
    pub tag: Option<String>,
}

/// A note id as it arrived on the wire.
///
/// Form bodies deliver strings, JSON bodies usually integers. A value that
/// is present but not an integer is kept so the handler can reject it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteId {
    Valid(i64),
    Invalid(String),
}
