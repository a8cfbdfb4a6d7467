//! Essay thread persistence.
//!
//! Threads are created pending, marked completed when a run appends entries,
//! and marked errored when a run fails terminally after the thread already
//! exists. Entry appends share the store's bool policy: a failed append
//! becomes a warning on the response, not a request failure.

use anyhow::Result;
use sqlx::PgPool;
use tracing::error;
use uuid::Uuid;

use crate::models::suggestion::SuggestionRecord;
use crate::models::thread::{
    ThreadKind, ThreadRow, THREAD_STATUS_COMPLETED, THREAD_STATUS_ERROR,
};

pub struct NewBrainstormThread<'a> {
    pub college_name: &'a str,
    pub essay_prompt: &'a str,
    pub word_limit: Option<i32>,
}

pub struct NewFeedbackThread<'a> {
    pub college_name: &'a str,
    pub essay_prompt: &'a str,
    pub essay_text: &'a str,
    pub word_count: i32,
    pub feedback_questions: &'a [String],
}

pub async fn create_brainstorm_thread(
    pool: &PgPool,
    student_id: Uuid,
    new: &NewBrainstormThread<'_>,
) -> Result<ThreadRow> {
    let row = sqlx::query_as::<_, ThreadRow>(
        "INSERT INTO essay_threads (student_id, kind, college_name, essay_prompt, word_limit) \
         VALUES ($1, 'brainstorm', $2, $3, $4) \
         RETURNING *",
    )
    .bind(student_id)
    .bind(new.college_name)
    .bind(new.essay_prompt)
    .bind(new.word_limit)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn create_feedback_thread(
    pool: &PgPool,
    student_id: Uuid,
    new: &NewFeedbackThread<'_>,
) -> Result<ThreadRow> {
    let questions = serde_json::to_value(new.feedback_questions)?;
    let row = sqlx::query_as::<_, ThreadRow>(
        "INSERT INTO essay_threads \
         (student_id, kind, college_name, essay_prompt, essay_text, word_count, feedback_questions) \
         VALUES ($1, 'feedback', $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(student_id)
    .bind(new.college_name)
    .bind(new.essay_prompt)
    .bind(new.essay_text)
    .bind(new.word_count)
    .bind(questions)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn get_thread(
    pool: &PgPool,
    student_id: Uuid,
    thread_id: Uuid,
    kind: ThreadKind,
) -> Result<Option<ThreadRow>, sqlx::Error> {
    sqlx::query_as::<_, ThreadRow>(
        "SELECT * FROM essay_threads WHERE id = $1 AND student_id = $2 AND kind = $3",
    )
    .bind(thread_id)
    .bind(student_id)
    .bind(kind.as_str())
    .fetch_optional(pool)
    .await
}

/// Kind-agnostic lookup, for read endpoints addressing a thread by id alone.
pub async fn find_thread(
    pool: &PgPool,
    student_id: Uuid,
    thread_id: Uuid,
) -> Result<Option<ThreadRow>, sqlx::Error> {
    sqlx::query_as::<_, ThreadRow>(
        "SELECT * FROM essay_threads WHERE id = $1 AND student_id = $2",
    )
    .bind(thread_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

/// All of the student's threads of one kind, newest first.
pub async fn list_threads(
    pool: &PgPool,
    student_id: Uuid,
    kind: ThreadKind,
) -> Result<Vec<ThreadRow>, sqlx::Error> {
    sqlx::query_as::<_, ThreadRow>(
        "SELECT * FROM essay_threads \
         WHERE student_id = $1 AND kind = $2 \
         ORDER BY created_at DESC",
    )
    .bind(student_id)
    .bind(kind.as_str())
    .fetch_all(pool)
    .await
}

/// Append generated entries and mark the thread completed.
/// Returns false when the thread is gone or the write fails.
pub async fn append_entries(pool: &PgPool, thread_id: Uuid, entries: &[SuggestionRecord]) -> bool {
    match append_entries_inner(pool, thread_id, entries).await {
        Ok(found) => found,
        Err(e) => {
            error!(%thread_id, "failed to append thread entries: {e:#}");
            false
        }
    }
}

async fn append_entries_inner(
    pool: &PgPool,
    thread_id: Uuid,
    entries: &[SuggestionRecord],
) -> Result<bool> {
    let payload = serde_json::to_value(entries)?;
    let result = sqlx::query(
        "UPDATE essay_threads \
         SET entries = entries || $2::jsonb, status = $3, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(thread_id)
    .bind(payload)
    .bind(THREAD_STATUS_COMPLETED)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Best-effort status flip after a terminal pipeline failure.
pub async fn mark_error(pool: &PgPool, thread_id: Uuid) {
    let result = sqlx::query(
        "UPDATE essay_threads SET status = $2, updated_at = NOW() WHERE id = $1",
    )
    .bind(thread_id)
    .bind(THREAD_STATUS_ERROR)
    .execute(pool)
    .await;
    if let Err(e) = result {
        error!(%thread_id, "failed to mark thread errored: {e}");
    }
}

pub async fn delete_thread(
    pool: &PgPool,
    student_id: Uuid,
    thread_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM essay_threads WHERE id = $1 AND student_id = $2")
        .bind(thread_id)
        .bind(student_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
