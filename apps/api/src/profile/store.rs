//! Student profile reads and target list mutations.
//!
//! Target lists are the student-curated destination of the suggestion
//! lifecycle. Promotion into a target list is keyed on record name; adding a
//! name that is already present succeeds without inserting a duplicate.

use anyhow::Result;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::student::StudentRow;
use crate::models::suggestion::{
    paginate_records, SuggestionKind, SuggestionPage, SuggestionRecord,
};

pub async fn get_student(
    pool: &PgPool,
    student_id: Uuid,
) -> Result<Option<StudentRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentRow>("SELECT * FROM students WHERE id = $1")
        .bind(student_id)
        .fetch_optional(pool)
        .await
}

fn target_column(kind: SuggestionKind) -> Option<&'static str> {
    match kind {
        SuggestionKind::College => Some("target_colleges"),
        SuggestionKind::Activity => Some("target_activities"),
        SuggestionKind::Idea | SuggestionKind::Feedback => None,
    }
}

/// Append `record` to the student's target list for its kind.
///
/// Returns true when the record is on the list afterwards, including the
/// duplicate-name case where nothing was inserted. Returns false when the
/// student does not exist or the kind has no target list.
pub async fn add_target(
    pool: &PgPool,
    student_id: Uuid,
    record: &SuggestionRecord,
) -> Result<bool> {
    let Some(column) = target_column(record.kind()) else {
        return Ok(false);
    };

    let already: Option<bool> = sqlx::query_scalar(&format!(
        "SELECT {column} @> jsonb_build_array(jsonb_build_object('name', $2::text)) \
         FROM students WHERE id = $1"
    ))
    .bind(student_id)
    .bind(record.primary_key())
    .fetch_optional(pool)
    .await?;

    let Some(already) = already else {
        return Ok(false);
    };
    if already {
        info!(
            %student_id,
            name = record.primary_key(),
            "target already contains this record, skipping insert"
        );
        return Ok(true);
    }

    let mut stamped = record.clone();
    stamped.set_timestamp(Utc::now());
    let appended = serde_json::to_value(vec![stamped])?;

    let result = sqlx::query(&format!(
        "UPDATE students SET {column} = {column} || $2::jsonb, updated_at = NOW() WHERE id = $1"
    ))
    .bind(student_id)
    .bind(appended)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove the named record from the student's target list.
/// Ok(false) when the student or the record is absent.
pub async fn remove_target(
    pool: &PgPool,
    student_id: Uuid,
    kind: SuggestionKind,
    name: &str,
) -> Result<bool, sqlx::Error> {
    let Some(column) = target_column(kind) else {
        return Ok(false);
    };

    let result = sqlx::query(&format!(
        "UPDATE students \
         SET {column} = (SELECT COALESCE(jsonb_agg(elem), '[]'::jsonb) \
                         FROM jsonb_array_elements({column}) AS elem \
                         WHERE elem->>'name' IS DISTINCT FROM $2), \
             updated_at = NOW() \
         WHERE id = $1 \
           AND {column} @> jsonb_build_array(jsonb_build_object('name', $2::text))"
    ))
    .bind(student_id)
    .bind(name)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// One page of the student's target list in stored (insertion) order.
/// A missing student yields an empty page rather than an error.
pub async fn target_page(
    pool: &PgPool,
    student_id: Uuid,
    kind: SuggestionKind,
    page: u32,
    per_page: u32,
) -> Result<SuggestionPage, sqlx::Error> {
    let Some(column) = target_column(kind) else {
        return Ok(SuggestionPage::empty(page, per_page));
    };

    let records: Option<Json<Vec<SuggestionRecord>>> =
        sqlx::query_scalar(&format!("SELECT {column} FROM students WHERE id = $1"))
            .bind(student_id)
            .fetch_optional(pool)
            .await?;

    let records = records.map(|r| r.0).unwrap_or_default();
    Ok(paginate_records(records, page, per_page))
}
