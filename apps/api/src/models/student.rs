#![allow(dead_code)]

//! Student profile rows and the nested profile blocks stored as JSONB.
//!
//! Profile data arrives from an upstream intake service and is frequently
//! partial. Block columns are nullable; inside a block, scalar fields default
//! to sentinels (empty string, zero) while the three context booleans stay
//! `Option` so "never answered" is distinguishable from "answered no".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::suggestion::{ActivitySuggestion, CollegeSuggestion};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentContext {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub ethnicity: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub estimated_contribution: f64,
    #[serde(default)]
    pub financial_aid_required: Option<bool>,
    #[serde(default)]
    pub first_generation: Option<bool>,
    #[serde(default)]
    pub international_student: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentStatistics {
    #[serde(default)]
    pub class_rank: i32,
    #[serde(default)]
    pub unweighted_gpa: f64,
    #[serde(default)]
    pub weighted_gpa: f64,
    #[serde(default)]
    pub sat_score: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentPreferences {
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub campus_sizes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub college_types: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub preferred_regions: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string_list")]
    pub preferred_states: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extracurricular {
    pub name: String,
    #[serde(default)]
    pub activity_type: String,
    #[serde(default)]
    pub position_leadership: String,
    #[serde(default)]
    pub organization_description: String,
    #[serde(default)]
    pub activity_description: String,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Award {
    pub title: String,
    #[serde(default)]
    pub grade_levels: Vec<String>,
    #[serde(default)]
    pub recognition_levels: Vec<String>,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StudentRow {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub major: Option<String>,
    pub personality_type: Option<String>,
    pub student_context: Option<Json<StudentContext>>,
    pub student_statistics: Option<Json<StudentStatistics>>,
    pub student_preferences: Option<Json<StudentPreferences>>,
    pub student_theme: Option<String>,
    pub hooks: Vec<String>,
    pub extracurriculars: Json<Vec<Extracurricular>>,
    pub awards: Json<Vec<Award>>,
    pub target_colleges: Json<Vec<CollegeSuggestion>>,
    pub target_activities: Json<Vec<ActivitySuggestion>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentRow {
    /// Display name for user-facing validation messages.
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            "Student"
        } else {
            trimmed
        }
    }
}

/// Accepts a JSON array of strings, a bare string, or null. Upstream intake
/// has produced all three shapes for preference lists.
fn lenient_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(coerce_string_list(&value))
}

fn coerce_string_list(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        serde_json::Value::String(s) if !s.is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_accept_bare_string() {
        let prefs: StudentPreferences = serde_json::from_value(serde_json::json!({
            "campus_sizes": "Medium",
            "college_types": ["Liberal Arts", "Research University"],
        }))
        .unwrap();
        assert_eq!(prefs.campus_sizes, vec!["Medium"]);
        assert_eq!(prefs.college_types.len(), 2);
        assert!(prefs.preferred_regions.is_empty());
    }

    #[test]
    fn test_preferences_drop_non_string_entries() {
        let prefs: StudentPreferences = serde_json::from_value(serde_json::json!({
            "preferred_states": ["TX", 42, null, "CA"],
        }))
        .unwrap();
        assert_eq!(prefs.preferred_states, vec!["TX", "CA"]);
    }

    #[test]
    fn test_preferences_null_list_is_empty() {
        let prefs: StudentPreferences = serde_json::from_value(serde_json::json!({
            "campus_sizes": null,
        }))
        .unwrap();
        assert!(prefs.campus_sizes.is_empty());
    }

    #[test]
    fn test_context_booleans_distinguish_unset_from_false() {
        let context: StudentContext = serde_json::from_value(serde_json::json!({
            "country": "USA",
            "financial_aid_required": false,
        }))
        .unwrap();
        assert_eq!(context.financial_aid_required, Some(false));
        assert_eq!(context.first_generation, None);
        assert_eq!(context.international_student, None);
    }

    #[test]
    fn test_statistics_default_to_zero_sentinels() {
        let stats: StudentStatistics = serde_json::from_value(serde_json::json!({
            "sat_score": 1480,
        }))
        .unwrap();
        assert_eq!(stats.sat_score, 1480);
        assert_eq!(stats.class_rank, 0);
        assert_eq!(stats.unweighted_gpa, 0.0);
    }
}
