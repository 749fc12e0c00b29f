//! Moderation rules shared by the handlers.

use crate::errors::AppError;
use crate::models::{NewNote, NoteId, SubmitNoteRequest};

/// Maximum number of whitespace-separated words in a note message.
pub const MAX_MESSAGE_WORDS: usize = 500;

/// Reports after which a note is hidden automatically.
pub const REPORT_THRESHOLD: i64 = 3;

/// Number of whitespace-separated tokens in `text`.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Validate a submission and turn it into an insertable note.
///
/// Tags are dropped when `keep_tags` is false.
pub fn validate_submission(
    request: SubmitNoteRequest,
    require_title: bool,
    keep_tags: bool,
) -> Result<NewNote, AppError> {
    let title = request
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    if require_title && title.is_none() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let message = request.message.unwrap_or_default().trim().to_string();
    if message.is_empty() {
        return Err(AppError::Validation("Message is required".to_string()));
    }

    let words = word_count(&message);
    if words > MAX_MESSAGE_WORDS {
        return Err(AppError::Validation(format!(
            "Message is too long ({} words, max {})",
            words, MAX_MESSAGE_WORDS
        )));
    }

    let tags = if keep_tags {
        request.tags.unwrap_or_default()
    } else {
        Vec::new()
    };

    Ok(NewNote {
        title,
        message,
        tags,
    })
}

/// Trim labels, drop empty ones and remove duplicates, keeping first occurrence.
pub fn normalize_tags<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags: Vec<String> = Vec::new();
    for label in labels {
        let label = label.as_ref().trim();
        if !label.is_empty() && !tags.iter().any(|t| t == label) {
            tags.push(label.to_string());
        }
    }
    tags
}

/// Resolve a required note id or explain why it is unusable.
pub fn require_id(id: Option<NoteId>) -> Result<i64, AppError> {
    match id {
        Some(NoteId::Valid(id)) => Ok(id),
        Some(NoteId::Invalid(_)) => Err(AppError::Validation("Invalid id".to_string())),
        None => Err(AppError::Validation("Missing id".to_string())),
    }
}
