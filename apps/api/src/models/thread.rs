//! Essay thread rows. A thread anchors one essay conversation (brainstorm or
//! feedback) and accumulates generated entries across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::suggestion::SuggestionRecord;

// Threads are created 'pending' by the schema default.
pub const THREAD_STATUS_COMPLETED: &str = "completed";
pub const THREAD_STATUS_ERROR: &str = "error";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadKind {
    Brainstorm,
    Feedback,
}

impl ThreadKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreadKind::Brainstorm => "brainstorm",
            ThreadKind::Feedback => "feedback",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ThreadRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub kind: String,
    pub college_name: String,
    pub essay_prompt: String,
    pub word_limit: Option<i32>,
    pub essay_text: Option<String>,
    pub word_count: Option<i32>,
    pub feedback_questions: Json<Vec<String>>,
    pub entries: Json<Vec<SuggestionRecord>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ThreadRow {
    /// Text of every entry already on the thread, oldest first. Pipelines
    /// feed this back as conversation memory.
    pub fn entry_texts(&self) -> Vec<&str> {
        self.entries
            .0
            .iter()
            .map(|entry| entry.primary_key())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(ThreadKind::Brainstorm).unwrap(),
            serde_json::json!("brainstorm")
        );
        let kind: ThreadKind = serde_json::from_value(serde_json::json!("feedback")).unwrap();
        assert_eq!(kind, ThreadKind::Feedback);
    }

    #[test]
    fn test_entry_texts_reads_idea_content() {
        let row = ThreadRow {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            kind: ThreadKind::Brainstorm.as_str().to_string(),
            college_name: "Rice University".to_string(),
            essay_prompt: "Describe a challenge you overcame".to_string(),
            word_limit: Some(500),
            essay_text: None,
            word_count: None,
            feedback_questions: Json(Vec::new()),
            entries: Json(
                serde_json::from_value(serde_json::json!([
                    {"content": "The robotics season that fell apart", "created_at": "2026-01-10T00:00:00Z"},
                    {"content": "Teaching my grandmother to code", "created_at": "2026-01-11T00:00:00Z"}
                ]))
                .unwrap(),
            ),
            status: THREAD_STATUS_COMPLETED.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(
            row.entry_texts(),
            vec![
                "The robotics season that fell apart",
                "Teaching my grandmother to code"
            ]
        );
    }
}
