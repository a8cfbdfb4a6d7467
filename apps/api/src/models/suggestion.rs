//! Suggestion records produced by the generation pipelines.
//!
//! Every record type carries its own timestamp so lifecycle moves (staging,
//! history, target lists) preserve when a suggestion was produced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification categories a college suggestion must carry one of.
pub const COLLEGE_CATEGORIES: &[&str] = &["reach", "target", "safety"];

/// Question posed to the feedback pipeline when the caller supplies none.
pub const DEFAULT_FEEDBACK_QUESTION: &str = "Provide general feedback on the essay";

/// The four record kinds the pipelines produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    College,
    Activity,
    Idea,
    Feedback,
}

impl SuggestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SuggestionKind::College => "college",
            SuggestionKind::Activity => "activity",
            SuggestionKind::Idea => "idea",
            SuggestionKind::Feedback => "feedback",
        }
    }

    /// Column holding this kind in the staging and history tables.
    /// Idea and feedback records live on essay threads, not in the store.
    pub fn store_column(self) -> Option<&'static str> {
        match self {
            SuggestionKind::College => Some("college_suggestions"),
            SuggestionKind::Activity => Some("ec_suggestions"),
            SuggestionKind::Idea | SuggestionKind::Feedback => None,
        }
    }
}

/// A recommended college with its admissions classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollegeSuggestion {
    pub name: String,
    /// E.g. "Private (reach)". Must mention reach, target, or safety.
    #[serde(rename = "type")]
    pub classification: String,
    pub added_at: DateTime<Utc>,
}

impl CollegeSuggestion {
    pub fn new(name: impl Into<String>, classification: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classification: classification.into(),
            added_at: Utc::now(),
        }
    }

    pub fn has_valid_shape(&self) -> bool {
        if self.name.trim().is_empty() {
            return false;
        }
        let lowered = self.classification.to_lowercase();
        COLLEGE_CATEGORIES.iter().any(|c| lowered.contains(c))
    }
}

/// A recommended extracurricular activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySuggestion {
    pub name: String,
    pub description: String,
    pub hours_per_week: u32,
    pub position: String,
    #[serde(default)]
    pub activity_type: String,
    pub added_at: DateTime<Utc>,
}

impl ActivitySuggestion {
    pub fn has_valid_shape(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// A single brainstormed essay idea on a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssayIdea {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// One round of essay feedback on a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssayFeedback {
    pub content: String,
    pub feedback_questions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Any suggestion record, serialized as the bare inner object.
///
/// Variant order matters for deserialization: serde tries untagged variants
/// in declaration order, and `Idea` would otherwise swallow `Feedback`
/// payloads since both carry `content`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionRecord {
    Activity(ActivitySuggestion),
    College(CollegeSuggestion),
    Feedback(EssayFeedback),
    Idea(EssayIdea),
}

impl SuggestionRecord {
    pub fn kind(&self) -> SuggestionKind {
        match self {
            SuggestionRecord::Activity(_) => SuggestionKind::Activity,
            SuggestionRecord::College(_) => SuggestionKind::College,
            SuggestionRecord::Feedback(_) => SuggestionKind::Feedback,
            SuggestionRecord::Idea(_) => SuggestionKind::Idea,
        }
    }

    /// The field lifecycle operations key on: name for store records,
    /// content for thread entries.
    pub fn primary_key(&self) -> &str {
        match self {
            SuggestionRecord::Activity(a) => &a.name,
            SuggestionRecord::College(c) => &c.name,
            SuggestionRecord::Feedback(f) => &f.content,
            SuggestionRecord::Idea(i) => &i.content,
        }
    }

    pub fn has_valid_shape(&self) -> bool {
        match self {
            SuggestionRecord::Activity(a) => a.has_valid_shape(),
            SuggestionRecord::College(c) => c.has_valid_shape(),
            SuggestionRecord::Feedback(f) => !f.content.trim().is_empty(),
            SuggestionRecord::Idea(i) => !i.content.trim().is_empty(),
        }
    }

    /// Restamp the record's timestamp. The store does this at save time so
    /// history ordering reflects when a suggestion entered the system.
    pub fn set_timestamp(&mut self, at: DateTime<Utc>) {
        match self {
            SuggestionRecord::Activity(a) => a.added_at = at,
            SuggestionRecord::College(c) => c.added_at = at,
            SuggestionRecord::Feedback(f) => f.created_at = at,
            SuggestionRecord::Idea(i) => i.created_at = at,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SuggestionRecord::Activity(a) => a.added_at,
            SuggestionRecord::College(c) => c.added_at,
            SuggestionRecord::Feedback(f) => f.created_at,
            SuggestionRecord::Idea(i) => i.created_at,
        }
    }
}

/// One page of suggestion records plus pagination bookkeeping.
#[derive(Debug, Serialize)]
pub struct SuggestionPage {
    pub suggestions: Vec<SuggestionRecord>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl SuggestionPage {
    pub fn empty(page: u32, per_page: u32) -> Self {
        Self {
            suggestions: Vec::new(),
            total: 0,
            page,
            per_page,
            total_pages: 0,
        }
    }
}

/// Slice `records` into the requested page. Pages are 1-based; a page past
/// the end yields an empty slice with the bookkeeping intact.
pub fn paginate_records(records: Vec<SuggestionRecord>, page: u32, per_page: u32) -> SuggestionPage {
    let page = page.max(1);
    let per_page = per_page.max(1);
    let total = records.len();
    let total_pages = (total as u32 + per_page - 1) / per_page;
    let start = ((page - 1) * per_page) as usize;
    let suggestions = if start >= total {
        Vec::new()
    } else {
        let end = (start + per_page as usize).min(total);
        records[start..end].to_vec()
    };
    SuggestionPage {
        suggestions,
        total,
        page,
        per_page,
        total_pages,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn college(name: &str, classification: &str) -> SuggestionRecord {
        SuggestionRecord::College(CollegeSuggestion::new(name, classification))
    }

    #[test]
    fn test_college_shape_requires_known_category() {
        assert!(CollegeSuggestion::new("Rice University", "Private (target)").has_valid_shape());
        assert!(CollegeSuggestion::new("MIT", "REACH").has_valid_shape());
        assert!(!CollegeSuggestion::new("Somewhere", "Private (unknown)").has_valid_shape());
        assert!(!CollegeSuggestion::new("   ", "Public (safety)").has_valid_shape());
    }

    #[test]
    fn test_activity_shape_requires_name() {
        let mut activity = ActivitySuggestion {
            name: "Robotics Club".to_string(),
            description: "Build competition robots".to_string(),
            hours_per_week: 6,
            position: "Member".to_string(),
            activity_type: String::new(),
            added_at: Utc::now(),
        };
        assert!(activity.has_valid_shape());
        activity.name = "  ".to_string();
        assert!(!activity.has_valid_shape());
    }

    #[test]
    fn test_college_type_field_round_trips_as_type() {
        let record = CollegeSuggestion::new("Rice University", "Private (target)");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "Private (target)");
        assert!(value.get("classification").is_none());
    }

    #[test]
    fn test_untagged_record_distinguishes_feedback_from_idea() {
        let json = serde_json::json!({
            "content": "Strong opening, weak conclusion",
            "feedback_questions": ["How is the structure?"],
            "created_at": "2026-01-10T00:00:00Z"
        });
        let record: SuggestionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.kind(), SuggestionKind::Feedback);

        let json = serde_json::json!({
            "content": "Write about the robotics failure",
            "created_at": "2026-01-10T00:00:00Z"
        });
        let record: SuggestionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.kind(), SuggestionKind::Idea);
    }

    #[test]
    fn test_untagged_record_distinguishes_college_from_activity() {
        let json = serde_json::json!({
            "name": "Debate Team",
            "description": "Regional debate",
            "hours_per_week": 5,
            "position": "Captain",
            "added_at": "2026-01-10T00:00:00Z"
        });
        let record: SuggestionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.kind(), SuggestionKind::Activity);

        let json = serde_json::json!({
            "name": "Rice University",
            "type": "Private (target)",
            "added_at": "2026-01-10T00:00:00Z"
        });
        let record: SuggestionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.kind(), SuggestionKind::College);
    }

    #[test]
    fn test_store_column_only_for_store_kinds() {
        assert_eq!(
            SuggestionKind::College.store_column(),
            Some("college_suggestions")
        );
        assert_eq!(
            SuggestionKind::Activity.store_column(),
            Some("ec_suggestions")
        );
        assert_eq!(SuggestionKind::Idea.store_column(), None);
        assert_eq!(SuggestionKind::Feedback.store_column(), None);
    }

    #[test]
    fn test_paginate_records_slices_and_counts() {
        let records: Vec<SuggestionRecord> = (0..25)
            .map(|i| college(&format!("College {i}"), "Public (target)"))
            .collect();
        let page = paginate_records(records, 2, 10);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.suggestions.len(), 10);
        assert_eq!(page.suggestions[0].primary_key(), "College 10");
    }

    #[test]
    fn test_paginate_records_past_end_is_empty() {
        let records = vec![college("A", "Public (target)")];
        let page = paginate_records(records, 5, 10);
        assert_eq!(page.total, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.suggestions.is_empty());
    }

    #[test]
    fn test_paginate_records_clamps_page_zero() {
        let records = vec![
            college("A", "Public (target)"),
            college("B", "Public (reach)"),
        ];
        let page = paginate_records(records, 0, 1);
        assert_eq!(page.page, 1);
        assert_eq!(page.suggestions[0].primary_key(), "A");
    }
}
