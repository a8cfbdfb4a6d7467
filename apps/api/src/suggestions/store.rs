//! Two-phase suggestion store.
//!
//! Fresh pipeline output lands in `suggestion_staging`, one overwritable row
//! per student. Before the next run, staged records are promoted by
//! appending them to `suggestion_history` and clearing staging. Write entry
//! points return plain bool: a failed save or promote is reported to the
//! caller as a warning on an otherwise successful run, never as a request
//! failure.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{error, warn};
use uuid::Uuid;

use crate::models::suggestion::{
    paginate_records, SuggestionKind, SuggestionPage, SuggestionRecord,
};

/// Which table a lifecycle operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorePhase {
    Staging,
    History,
}

impl StorePhase {
    fn table(self) -> &'static str {
        match self {
            StorePhase::Staging => "suggestion_staging",
            StorePhase::History => "suggestion_history",
        }
    }
}

#[derive(Debug, FromRow)]
pub struct StagedSuggestions {
    pub college_suggestions: Json<Vec<SuggestionRecord>>,
    pub ec_suggestions: Json<Vec<SuggestionRecord>>,
}

pub async fn staged_suggestions(
    pool: &PgPool,
    student_id: Uuid,
) -> Result<Option<StagedSuggestions>, sqlx::Error> {
    sqlx::query_as::<_, StagedSuggestions>(
        "SELECT college_suggestions, ec_suggestions \
         FROM suggestion_staging WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

/// The student's current (staged) records of one kind, empty when none.
pub async fn current_suggestions(
    pool: &PgPool,
    student_id: Uuid,
    kind: SuggestionKind,
) -> Result<Vec<SuggestionRecord>, sqlx::Error> {
    let Some(column) = kind.store_column() else {
        return Ok(Vec::new());
    };
    let records: Option<Json<Vec<SuggestionRecord>>> = sqlx::query_scalar(&format!(
        "SELECT {column} FROM suggestion_staging WHERE student_id = $1"
    ))
    .bind(student_id)
    .fetch_optional(pool)
    .await?;
    Ok(records.map(|r| r.0).unwrap_or_default())
}

/// Overwrite the student's staged records of `kind` with `records`.
///
/// Every record is restamped to the save instant and must pass shape
/// validation; one bad record aborts the whole save. Returns false on empty
/// input, validation failure, or storage failure.
pub async fn save_temp(
    pool: &PgPool,
    student_id: Uuid,
    kind: SuggestionKind,
    records: &[SuggestionRecord],
) -> bool {
    match save_temp_inner(pool, student_id, kind, records).await {
        Ok(saved) => saved,
        Err(e) => {
            error!(%student_id, kind = kind.as_str(), "failed to stage suggestions: {e:#}");
            false
        }
    }
}

async fn save_temp_inner(
    pool: &PgPool,
    student_id: Uuid,
    kind: SuggestionKind,
    records: &[SuggestionRecord],
) -> Result<bool> {
    if records.is_empty() {
        warn!(%student_id, kind = kind.as_str(), "no records to stage");
        return Ok(false);
    }
    let Some(column) = kind.store_column() else {
        warn!(%student_id, kind = kind.as_str(), "kind is not storable, skipping stage");
        return Ok(false);
    };
    let Some(stamped) = stamped_valid_records(kind, records, Utc::now()) else {
        warn!(%student_id, kind = kind.as_str(), "records failed shape validation, staging aborted");
        return Ok(false);
    };

    let payload = serde_json::to_value(&stamped)?;
    sqlx::query(&format!(
        "INSERT INTO suggestion_staging (student_id, {column}, updated_at) \
         VALUES ($1, $2, NOW()) \
         ON CONFLICT (student_id) DO UPDATE \
         SET {column} = EXCLUDED.{column}, updated_at = NOW()"
    ))
    .bind(student_id)
    .bind(payload)
    .execute(pool)
    .await?;
    Ok(true)
}

/// Restamp all records to `now` and reject the batch if any record is of the
/// wrong kind or fails shape validation.
fn stamped_valid_records(
    kind: SuggestionKind,
    records: &[SuggestionRecord],
    now: DateTime<Utc>,
) -> Option<Vec<SuggestionRecord>> {
    let mut stamped = records.to_vec();
    for record in &mut stamped {
        if record.kind() != kind {
            return None;
        }
        record.set_timestamp(now);
        if !record.has_valid_shape() {
            return None;
        }
    }
    Some(stamped)
}

/// Move every staged record into history and clear staging.
///
/// No staging row, or a staging row with both arrays empty, promotes
/// trivially. Appends are per-kind and not transactional: a failure midway
/// leaves earlier appends in place and staging untouched, and the next
/// promote retries everything still staged.
pub async fn promote_temp_to_permanent(pool: &PgPool, student_id: Uuid) -> bool {
    match promote_inner(pool, student_id).await {
        Ok(()) => true,
        Err(e) => {
            error!(%student_id, "failed to promote staged suggestions: {e:#}");
            false
        }
    }
}

async fn promote_inner(pool: &PgPool, student_id: Uuid) -> Result<()> {
    let Some(staged) = staged_suggestions(pool, student_id).await? else {
        return Ok(());
    };

    if !staged.college_suggestions.0.is_empty() {
        append_to_history(
            pool,
            student_id,
            "college_suggestions",
            serde_json::to_value(&staged.college_suggestions.0)?,
        )
        .await?;
    }
    if !staged.ec_suggestions.0.is_empty() {
        append_to_history(
            pool,
            student_id,
            "ec_suggestions",
            serde_json::to_value(&staged.ec_suggestions.0)?,
        )
        .await?;
    }

    sqlx::query(
        "UPDATE suggestion_staging \
         SET college_suggestions = '[]'::jsonb, ec_suggestions = '[]'::jsonb, updated_at = NOW() \
         WHERE student_id = $1",
    )
    .bind(student_id)
    .execute(pool)
    .await?;
    Ok(())
}

async fn append_to_history(
    pool: &PgPool,
    student_id: Uuid,
    column: &str,
    records: serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO suggestion_history (student_id, {column}, updated_at) \
         VALUES ($1, $2, NOW()) \
         ON CONFLICT (student_id) DO UPDATE \
         SET {column} = suggestion_history.{column} || EXCLUDED.{column}, updated_at = NOW()"
    ))
    .bind(student_id)
    .bind(records)
    .execute(pool)
    .await?;
    Ok(())
}

/// Look up one record by name in the given phase, for promotion to a
/// target list.
pub async fn find_suggestion(
    pool: &PgPool,
    student_id: Uuid,
    phase: StorePhase,
    kind: SuggestionKind,
    name: &str,
) -> Result<Option<SuggestionRecord>, sqlx::Error> {
    let Some(column) = kind.store_column() else {
        return Ok(None);
    };
    let records: Option<Json<Vec<SuggestionRecord>>> = sqlx::query_scalar(&format!(
        "SELECT {column} FROM {} WHERE student_id = $1",
        phase.table()
    ))
    .bind(student_id)
    .fetch_optional(pool)
    .await?;
    Ok(records.and_then(|r| r.0.into_iter().find(|record| record.primary_key() == name)))
}

/// Remove the named record from staging or history.
/// Ok(false) when the student row or the record is absent.
pub async fn remove_suggestion(
    pool: &PgPool,
    student_id: Uuid,
    phase: StorePhase,
    kind: SuggestionKind,
    name: &str,
) -> Result<bool, sqlx::Error> {
    let Some(column) = kind.store_column() else {
        return Ok(false);
    };
    let result = sqlx::query(&format!(
        "UPDATE {table} \
         SET {column} = (SELECT COALESCE(jsonb_agg(elem), '[]'::jsonb) \
                         FROM jsonb_array_elements({column}) AS elem \
                         WHERE elem->>'name' IS DISTINCT FROM $2), \
             updated_at = NOW() \
         WHERE student_id = $1 \
           AND {column} @> jsonb_build_array(jsonb_build_object('name', $2::text))",
        table = phase.table()
    ))
    .bind(student_id)
    .bind(name)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// One page of the student's suggestion history for `kind`, most recent
/// records first.
pub async fn past_suggestions_page(
    pool: &PgPool,
    student_id: Uuid,
    kind: SuggestionKind,
    page: u32,
    per_page: u32,
) -> Result<SuggestionPage, sqlx::Error> {
    let Some(column) = kind.store_column() else {
        return Ok(SuggestionPage::empty(page, per_page));
    };
    let records: Option<Json<Vec<SuggestionRecord>>> = sqlx::query_scalar(&format!(
        "SELECT {column} FROM suggestion_history WHERE student_id = $1"
    ))
    .bind(student_id)
    .fetch_optional(pool)
    .await?;

    let mut records = records.map(|r| r.0).unwrap_or_default();
    records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    Ok(paginate_records(records, page, per_page))
}

/// Names of everything in the student's history for `kind`. Pipelines feed
/// this into research stages so past suggestions are not repeated.
pub async fn past_suggestion_names(
    pool: &PgPool,
    student_id: Uuid,
    kind: SuggestionKind,
) -> Result<Vec<String>, sqlx::Error> {
    let Some(column) = kind.store_column() else {
        return Ok(Vec::new());
    };
    let records: Option<Json<Vec<SuggestionRecord>>> = sqlx::query_scalar(&format!(
        "SELECT {column} FROM suggestion_history WHERE student_id = $1"
    ))
    .bind(student_id)
    .fetch_optional(pool)
    .await?;
    Ok(records
        .map(|r| r.0)
        .unwrap_or_default()
        .iter()
        .map(|record| record.primary_key().to_string())
        .collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
