//! Lenient field deserializers.
//!
//! The pages post either JSON or urlencoded forms, so scalar fields can
//! arrive as numbers, booleans or strings. These helpers accept all of them.

use serde::{Deserialize, Deserializer};

use crate::models::NoteId;
use crate::moderation::normalize_tags;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TagsInput {
    List(Vec<String>),
    Text(String),
}

/// Note id from an integer or a numeric string. Blank counts as absent.
pub fn id<'de, D>(deserializer: D) -> Result<Option<NoteId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| match value {
        Scalar::Int(n) => Some(NoteId::Valid(n)),
        Scalar::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(NoteId::Valid(f as i64)),
        Scalar::Float(f) => Some(NoteId::Invalid(f.to_string())),
        Scalar::Bool(b) => Some(NoteId::Invalid(b.to_string())),
        Scalar::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(
                    trimmed
                        .parse()
                        .map(NoteId::Valid)
                        .unwrap_or_else(|_| NoteId::Invalid(trimmed.to_string())),
                )
            }
        }
    }))
}

/// Boolean coercion: non-zero numbers and `true/1/on/yes` strings are true.
pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Scalar>::deserialize(deserializer)?;
    Ok(match raw {
        None => false,
        Some(Scalar::Bool(b)) => b,
        Some(Scalar::Int(n)) => n != 0,
        Some(Scalar::Float(f)) => f != 0.0 && !f.is_nan(),
        Some(Scalar::Text(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "on" | "yes"
        ),
    })
}

/// Tag list from a JSON array or a comma-separated string, normalized.
pub fn tags<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<TagsInput>::deserialize(deserializer)?;
    Ok(raw.map(|input| match input {
        TagsInput::List(labels) => normalize_tags(labels),
        TagsInput::Text(text) => normalize_tags(text.split(',')),
    }))
}
