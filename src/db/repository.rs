//! Database repository for note and feedback operations.
//!
//! Every operation is a single statement; multi-step rules such as
//! report-then-hide are folded into one conditional update.

use chrono::{SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{AdminSnapshot, Feedback, NewNote, Note, ReportOutcome};
use crate::moderation::REPORT_THRESHOLD;

const NOTE_COLUMNS: &str = "id, title, message, tags, likes, reportcount, hidden, created_at";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Trivial round trip used by the health check.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ==================== NOTE OPERATIONS ====================

    /// Insert a new visible note with zeroed counters.
    pub async fn create_note(&self, note: &NewNote) -> Result<Note, AppError> {
        let now = timestamp();
        let tags_json = serde_json::to_string(&note.tags).unwrap_or_else(|_| "[]".to_string());

        let row = sqlx::query(
            "INSERT INTO notes (title, message, tags, likes, reportcount, hidden, created_at) VALUES (?, ?, ?, 0, 0, 0, ?) RETURNING id",
        )
        .bind(&note.title)
        .bind(&note.message)
        .bind(&tags_json)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        Ok(Note {
            id: row.get("id"),
            title: note.title.clone(),
            message: note.message.clone(),
            tags: note.tags.clone(),
            likes: 0,
            reportcount: 0,
            hidden: false,
            created_at: Some(now),
        })
    }

    /// Pick one visible note uniformly at random, optionally carrying `tag`.
    pub async fn random_visible_note(&self, tag: Option<&str>) -> Result<Option<Note>, AppError> {
        let sql = format!(
            r#"SELECT {NOTE_COLUMNS} FROM notes
               WHERE hidden = 0
                 AND (? IS NULL OR EXISTS (
                     SELECT 1 FROM json_each(notes.tags) WHERE json_each.value = ?
                 ))
               ORDER BY RANDOM() LIMIT 1"#
        );

        let row = sqlx::query(&sql)
            .bind(tag)
            .bind(tag)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(note_from_row))
    }

    /// Number of notes not hidden.
    pub async fn count_visible(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM notes WHERE hidden = 0")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("count"))
    }

    /// Increment likes. Returns whether a note matched.
    pub async fn like_note(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE notes SET likes = likes + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment the report count and hide the note once it reaches the threshold.
    ///
    /// Both changes happen in one statement, so concurrent reports can not
    /// observe a stale count. Returns `None` when no note matched.
    pub async fn report_note(&self, id: i64) -> Result<Option<ReportOutcome>, AppError> {
        let row = sqlx::query(
            r#"UPDATE notes
               SET reportcount = reportcount + 1,
                   hidden = CASE WHEN reportcount + 1 >= ? THEN 1 ELSE hidden END
               WHERE id = ?
               RETURNING reportcount, hidden"#,
        )
        .bind(REPORT_THRESHOLD)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let hidden: i32 = row.get("hidden");
            ReportOutcome {
                reportcount: row.get("reportcount"),
                hidden: hidden != 0,
            }
        }))
    }

    /// List all notes, hidden ones included, newest first.
    pub async fn list_notes(&self) -> Result<Vec<Note>, AppError> {
        let sql = format!(
            "SELECT {NOTE_COLUMNS} FROM notes ORDER BY created_at IS NULL, created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    /// Set the hidden flag. Returns whether a note matched.
    pub async fn set_hidden(&self, id: i64, hidden: bool) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE notes SET hidden = ? WHERE id = ?")
            .bind(hidden as i32)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace a note's tags wholesale. Returns whether a note matched.
    pub async fn update_tags(&self, id: i64, tags: &[String]) -> Result<bool, AppError> {
        let tags_json = serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string());
        let result = sqlx::query("UPDATE notes SET tags = ? WHERE id = ?")
            .bind(&tags_json)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Zero the report count. The hidden flag is left as is.
    pub async fn reset_reports(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE notes SET reportcount = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a note. Returns whether a note matched.
    pub async fn delete_note(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== FEEDBACK OPERATIONS ====================

    /// Store a feedback message.
    pub async fn create_feedback(&self, message: &str) -> Result<Feedback, AppError> {
        let now = timestamp();
        let row = sqlx::query("INSERT INTO feedback (message, created_at) VALUES (?, ?) RETURNING id")
            .bind(message)
            .bind(&now)
            .fetch_one(&self.pool)
            .await?;

        Ok(Feedback {
            id: row.get("id"),
            message: message.to_string(),
            created_at: Some(now),
        })
    }

    /// List all feedback, newest first.
    pub async fn list_feedback(&self) -> Result<Vec<Feedback>, AppError> {
        let rows = sqlx::query(
            "SELECT id, message, created_at FROM feedback ORDER BY created_at IS NULL, created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Feedback {
                id: row.get("id"),
                message: row.get("message"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    /// Everything the moderation panel lists.
    pub async fn admin_snapshot(&self) -> Result<AdminSnapshot, AppError> {
        let notes = self.list_notes().await?;
        let feedback = self.list_feedback().await?;
        Ok(AdminSnapshot { notes, feedback })
    }
}

// Helper functions for row conversion

/// Fixed-width UTC timestamp so text ordering matches time ordering.
fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn note_from_row(row: &sqlx::sqlite::SqliteRow) -> Note {
    let hidden: i32 = row.get("hidden");
    let tags_str: Option<String> = row.get("tags");
    Note {
        id: row.get("id"),
        title: row.get("title"),
        message: row.get("message"),
        tags: tags_str.map(|s| parse_json_array(&s)).unwrap_or_default(),
        likes: row.get("likes"),
        reportcount: row.get("reportcount"),
        hidden: hidden != 0,
        created_at: row.get("created_at"),
    }
}

fn parse_json_array(s: &str) -> Vec<String> {
    serde_json::from_str(s).unwrap_or_default()
}
