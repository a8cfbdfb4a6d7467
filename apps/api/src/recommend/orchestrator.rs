//! Generation flow orchestration.
//!
//! Every flow follows the same shape: gate on profile completeness, promote
//! leftover staged suggestions, run the plan, parse the final output, and
//! persist what parsed. Domain outcomes (blocked, failed) are values here;
//! `AppError` is reserved for missing resources and infrastructure faults.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::essays::threads::{self, NewBrainstormThread, NewFeedbackThread};
use crate::llm_client::prompts::PROFILE_GROUNDING_INSTRUCTION;
use crate::models::student::StudentRow;
use crate::models::suggestion::{SuggestionKind, SuggestionRecord, DEFAULT_FEEDBACK_QUESTION};
use crate::models::thread::ThreadKind;
use crate::pipeline::executor::execute_plan;
use crate::pipeline::plans::{
    COLLEGE_LIST_PLAN, EC_RECOMMENDATIONS_PLAN, ESSAY_BRAINSTORM_PLAN, ESSAY_FEEDBACK_PLAN,
};
use crate::pipeline::runner::StageRunner;
use crate::pipeline::StageInputs;
use crate::profile::{store as profile_store, validation};
use crate::suggestions::{parser, store};

const SUGGESTIONS_SAVE_WARNING: &str = "Generated suggestions but failed to save them temporarily";
const IDEAS_SAVE_WARNING: &str = "Generated ideas but failed to save them to the thread";
const FEEDBACK_SAVE_WARNING: &str = "Generated feedback but failed to save it to the thread";

/// Domain-level result of one generation run.
#[derive(Debug)]
pub enum RunOutcome {
    Success {
        raw_output: String,
        warning: Option<String>,
        resumed_from: Option<usize>,
        thread_id: Option<Uuid>,
    },
    /// Request was understood but the profile or request data blocks the run.
    Blocked(String),
    /// Pipeline failed terminally after its one resume.
    Failed(String),
}

#[derive(Debug, Deserialize)]
pub struct EssayIdeasRequest {
    pub student_id: Uuid,
    #[serde(default)]
    pub college_name: Option<String>,
    #[serde(default)]
    pub essay_prompt: Option<String>,
    #[serde(default)]
    pub word_limit: Option<i32>,
    #[serde(default = "default_true")]
    pub is_new_thread: bool,
    #[serde(default)]
    pub thread_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct EssayFeedbackRequest {
    pub student_id: Uuid,
    #[serde(default)]
    pub college_name: Option<String>,
    #[serde(default)]
    pub essay_prompt: Option<String>,
    #[serde(default)]
    pub essay_text: Option<String>,
    #[serde(default)]
    pub word_count: Option<i32>,
    #[serde(default)]
    pub feedback_questions: Vec<String>,
    #[serde(default = "default_true")]
    pub is_new_thread: bool,
    #[serde(default)]
    pub thread_id: Option<Uuid>,
}

fn default_true() -> bool {
    true
}

/// Run the college list plan for one student.
pub async fn generate_college_list(
    pool: &PgPool,
    runner: &dyn StageRunner,
    student_id: Uuid,
    college_type: Option<&str>,
) -> Result<RunOutcome, AppError> {
    let student = require_student(pool, student_id).await?;

    if let Some(message) = validation::validate_for_college_list(&student) {
        info!(%student_id, "college list run blocked by incomplete profile");
        return Ok(RunOutcome::Blocked(message));
    }

    if !store::promote_temp_to_permanent(pool, student_id).await {
        warn!(%student_id, "promote before college run failed, staging left as is");
    }

    let past = store::past_suggestion_names(pool, student_id, SuggestionKind::College).await?;
    let inputs = profile_inputs(&student)
        .with(
            "college_type",
            college_type.unwrap_or("any").to_lowercase(),
        )
        .with("past_suggestions", bullet_list(&past));

    let run = match execute_plan(runner, &COLLEGE_LIST_PLAN, &inputs).await {
        Ok(run) => run,
        Err(failure) => {
            error!(%student_id, "college list pipeline failed: {failure}");
            return Ok(RunOutcome::Failed(format!(
                "Failed to generate recommendations after retries ({failure})"
            )));
        }
    };

    let records = parser::parse(&run.output, SuggestionKind::College);
    if records.is_empty() {
        warn!(%student_id, "no structured college suggestions parsed from output");
    }
    let warning = (!store::save_temp(pool, student_id, SuggestionKind::College, &records).await)
        .then(|| SUGGESTIONS_SAVE_WARNING.to_string());

    Ok(RunOutcome::Success {
        raw_output: run.output,
        warning,
        resumed_from: run.resumed_from,
        thread_id: None,
    })
}

/// Run the extracurricular plan for one student.
pub async fn generate_activity_recommendations(
    pool: &PgPool,
    runner: &dyn StageRunner,
    student_id: Uuid,
    activity_type: &str,
    hours_per_week: u32,
) -> Result<RunOutcome, AppError> {
    let student = require_student(pool, student_id).await?;

    if let Some(message) = validation::validate_for_ec(&student) {
        info!(%student_id, "activity run blocked by incomplete profile");
        return Ok(RunOutcome::Blocked(message));
    }

    if !store::promote_temp_to_permanent(pool, student_id).await {
        warn!(%student_id, "promote before activity run failed, staging left as is");
    }

    let past = store::past_suggestion_names(pool, student_id, SuggestionKind::Activity).await?;
    let inputs = profile_inputs(&student)
        .with("activity_type", activity_type.to_lowercase())
        .with("hrs_per_wk", hours_per_week.to_string())
        .with("past_suggestions", bullet_list(&past));

    let run = match execute_plan(runner, &EC_RECOMMENDATIONS_PLAN, &inputs).await {
        Ok(run) => run,
        Err(failure) => {
            error!(%student_id, "activity pipeline failed: {failure}");
            return Ok(RunOutcome::Failed(format!(
                "Failed to generate recommendations after retries ({failure})"
            )));
        }
    };

    let mut records = parser::parse(&run.output, SuggestionKind::Activity);
    for record in &mut records {
        if let SuggestionRecord::Activity(activity) = record {
            if activity.activity_type.is_empty() {
                activity.activity_type = activity_type.to_string();
            }
        }
    }
    if records.is_empty() {
        warn!(%student_id, "no structured activity recommendations parsed from output");
    }
    let warning = (!store::save_temp(pool, student_id, SuggestionKind::Activity, &records).await)
        .then(|| SUGGESTIONS_SAVE_WARNING.to_string());

    Ok(RunOutcome::Success {
        raw_output: run.output,
        warning,
        resumed_from: run.resumed_from,
        thread_id: None,
    })
}

/// Run the brainstorm plan against a new or existing thread.
pub async fn generate_essay_ideas(
    pool: &PgPool,
    runner: &dyn StageRunner,
    request: EssayIdeasRequest,
) -> Result<RunOutcome, AppError> {
    let student = require_student(pool, request.student_id).await?;
    if let Some(message) = essay_profile_gate(&student) {
        return Ok(RunOutcome::Blocked(message));
    }

    let (thread, created_now) = match (request.is_new_thread, request.thread_id) {
        (true, Some(_)) => {
            return Ok(RunOutcome::Blocked(
                "thread_id should not be provided for new threads".to_string(),
            ))
        }
        (false, None) => {
            return Ok(RunOutcome::Blocked(
                "thread_id is required for existing threads".to_string(),
            ))
        }
        (true, None) => {
            let college_name = trimmed(&request.college_name);
            let essay_prompt = trimmed(&request.essay_prompt);
            let mut missing = Vec::new();
            if college_name.is_empty() {
                missing.push("college_name");
            }
            if essay_prompt.is_empty() {
                missing.push("essay_prompt");
            }
            if !missing.is_empty() {
                return Ok(RunOutcome::Blocked(format!(
                    "Missing required fields: {}",
                    missing.join(", ")
                )));
            }
            let thread = threads::create_brainstorm_thread(
                pool,
                student.id,
                &NewBrainstormThread {
                    college_name,
                    essay_prompt,
                    word_limit: request.word_limit,
                },
            )
            .await?;
            info!(thread_id = %thread.id, "created brainstorm thread");
            (thread, true)
        }
        (false, Some(thread_id)) => {
            let thread = threads::get_thread(pool, student.id, thread_id, ThreadKind::Brainstorm)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Thread {thread_id} not found")))?;
            (thread, false)
        }
    };

    let past_ideas: Vec<String> = threads::list_threads(pool, student.id, ThreadKind::Brainstorm)
        .await?
        .iter()
        .flat_map(|t| t.entry_texts().into_iter().map(str::to_string).collect::<Vec<_>>())
        .collect();

    let inputs = profile_inputs(&student)
        .with("college_name", thread.college_name.clone())
        .with("essay_prompt", thread.essay_prompt.clone())
        .with(
            "word_limit",
            thread
                .word_limit
                .map(|w| w.to_string())
                .unwrap_or_else(|| "not specified".to_string()),
        )
        .with("past_ideas", bullet_list(&past_ideas));

    let run = match execute_plan(runner, &ESSAY_BRAINSTORM_PLAN, &inputs).await {
        Ok(run) => run,
        Err(failure) => {
            error!(thread_id = %thread.id, "brainstorm pipeline failed: {failure}");
            if created_now {
                threads::mark_error(pool, thread.id).await;
            }
            return Ok(RunOutcome::Failed(format!(
                "Failed to generate essay ideas after retries ({failure})"
            )));
        }
    };

    if run.output.trim().is_empty() {
        if created_now {
            threads::mark_error(pool, thread.id).await;
        }
        return Ok(RunOutcome::Failed("Generated essay ideas are empty".to_string()));
    }

    let ideas = parser::parse(&run.output, SuggestionKind::Idea);
    let warning = if ideas.is_empty() {
        warn!(thread_id = %thread.id, "no structured ideas parsed from output, thread left as is");
        None
    } else if threads::append_entries(pool, thread.id, &ideas).await {
        None
    } else {
        Some(IDEAS_SAVE_WARNING.to_string())
    };

    Ok(RunOutcome::Success {
        raw_output: run.output,
        warning,
        resumed_from: run.resumed_from,
        thread_id: Some(thread.id),
    })
}

/// Run the feedback plan against a new or existing thread.
pub async fn generate_essay_feedback(
    pool: &PgPool,
    runner: &dyn StageRunner,
    request: EssayFeedbackRequest,
) -> Result<RunOutcome, AppError> {
    let student = require_student(pool, request.student_id).await?;
    if let Some(message) = essay_profile_gate(&student) {
        return Ok(RunOutcome::Blocked(message));
    }

    let (thread, created_now) = match (request.is_new_thread, request.thread_id) {
        (true, Some(_)) => {
            return Ok(RunOutcome::Blocked(
                "thread_id should not be provided for new threads".to_string(),
            ))
        }
        (false, None) => {
            return Ok(RunOutcome::Blocked(
                "thread_id is required for existing threads".to_string(),
            ))
        }
        (true, None) => {
            if let Some(message) = feedback_request_gate(&request) {
                return Ok(RunOutcome::Blocked(message));
            }
            let questions = effective_questions(&request.feedback_questions);
            let thread = threads::create_feedback_thread(
                pool,
                student.id,
                &NewFeedbackThread {
                    college_name: trimmed(&request.college_name),
                    essay_prompt: trimmed(&request.essay_prompt),
                    essay_text: trimmed(&request.essay_text),
                    word_count: request.word_count.unwrap_or_default(),
                    feedback_questions: &questions,
                },
            )
            .await?;
            info!(thread_id = %thread.id, "created feedback thread");
            (thread, true)
        }
        (false, Some(thread_id)) => {
            let thread = threads::get_thread(pool, student.id, thread_id, ThreadKind::Feedback)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Thread {thread_id} not found")))?;
            (thread, false)
        }
    };

    let questions = effective_questions(&thread.feedback_questions.0);
    let inputs = profile_inputs(&student)
        .with("college_name", thread.college_name.clone())
        .with("essay_prompt", thread.essay_prompt.clone())
        .with(
            "essay_text",
            thread.essay_text.clone().unwrap_or_default(),
        )
        .with(
            "word_count",
            thread.word_count.unwrap_or_default().to_string(),
        )
        .with("feedback_questions", bullet_list(&questions))
        .with(
            "thread_history",
            bullet_list(
                &thread
                    .entry_texts()
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>(),
            ),
        );

    let run = match execute_plan(runner, &ESSAY_FEEDBACK_PLAN, &inputs).await {
        Ok(run) => run,
        Err(failure) => {
            error!(thread_id = %thread.id, "feedback pipeline failed: {failure}");
            if created_now {
                threads::mark_error(pool, thread.id).await;
            }
            return Ok(RunOutcome::Failed(format!(
                "Failed to generate essay feedback after retries ({failure})"
            )));
        }
    };

    if run.output.trim().is_empty() {
        if created_now {
            threads::mark_error(pool, thread.id).await;
        }
        return Ok(RunOutcome::Failed("Generated feedback is empty".to_string()));
    }

    let warning = match parser::parse_essay_feedback(&run.output, &questions) {
        Some(feedback) => {
            if threads::append_entries(pool, thread.id, &[SuggestionRecord::Feedback(feedback)])
                .await
            {
                None
            } else {
                Some(FEEDBACK_SAVE_WARNING.to_string())
            }
        }
        None => None,
    };

    Ok(RunOutcome::Success {
        raw_output: run.output,
        warning,
        resumed_from: run.resumed_from,
        thread_id: Some(thread.id),
    })
}

async fn require_student(pool: &PgPool, student_id: Uuid) -> Result<StudentRow, AppError> {
    profile_store::get_student(pool, student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Student {student_id} not found")))
}

/// Essays only need the student addressable by name and major; the full
/// profile gates apply to the recommendation flows.
fn essay_profile_gate(student: &StudentRow) -> Option<String> {
    let mut missing = Vec::new();
    if student.name.trim().is_empty() {
        missing.push("name");
    }
    if student
        .major
        .as_deref()
        .map_or(true, |major| major.trim().is_empty())
    {
        missing.push("major");
    }
    (!missing.is_empty()).then(|| {
        format!(
            "Please complete these required profile fields: {}",
            missing.join(", ")
        )
    })
}

fn feedback_request_gate(request: &EssayFeedbackRequest) -> Option<String> {
    let mut missing = Vec::new();
    if trimmed(&request.college_name).is_empty() {
        missing.push("college_name");
    }
    if trimmed(&request.essay_prompt).is_empty() {
        missing.push("essay_prompt");
    }
    if trimmed(&request.essay_text).is_empty() {
        missing.push("essay_text");
    }
    if request.word_count.is_none() {
        missing.push("word_count");
    }
    if !missing.is_empty() {
        return Some(format!("Missing required fields: {}", missing.join(", ")));
    }
    if let Some(count) = request.word_count {
        if count <= 0 {
            return Some("Word count must be positive".to_string());
        }
    }
    None
}

fn effective_questions(questions: &[String]) -> Vec<String> {
    if questions.is_empty() {
        vec![DEFAULT_FEEDBACK_QUESTION.to_string()]
    } else {
        questions.to_vec()
    }
}

fn profile_inputs(student: &StudentRow) -> StageInputs {
    StageInputs::new(profile_summary(student))
        .with("profile_grounding", PROFILE_GROUNDING_INSTRUCTION.to_string())
}

/// JSON view of the profile blocks the stage prompts reference.
fn profile_summary(student: &StudentRow) -> String {
    serde_json::json!({
        "name": student.name,
        "major": student.major,
        "personality_type": student.personality_type,
        "student_context": student.student_context.as_ref().map(|j| &j.0),
        "student_statistics": student.student_statistics.as_ref().map(|j| &j.0),
        "student_preferences": student.student_preferences.as_ref().map(|j| &j.0),
        "student_theme": student.student_theme,
        "hooks": student.hooks,
        "extracurriculars": &student.extracurriculars.0,
        "awards": &student.awards.0,
        "target_colleges": &student.target_colleges.0,
        "target_activities": &student.target_activities.0,
    })
    .to_string()
}

fn trimmed(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("").trim()
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items
            .iter()
            .map(|item| format!("- {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;

    fn student_with(name: &str, major: Option<&str>) -> StudentRow {
        StudentRow {
            id: Uuid::new_v4(),
            external_id: "stu-1".to_string(),
            email: "s@example.com".to_string(),
            name: name.to_string(),
            major: major.map(str::to_string),
            personality_type: None,
            student_context: None,
            student_statistics: None,
            student_preferences: None,
            student_theme: Some("Marine biology storyteller".to_string()),
            hooks: vec!["Published tide pool survey".to_string()],
            extracurriculars: Json(Vec::new()),
            awards: Json(Vec::new()),
            target_colleges: Json(Vec::new()),
            target_activities: Json(Vec::new()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_essay_gate_lists_missing_fields_in_order() {
        let student = student_with("", None);
        assert_eq!(
            essay_profile_gate(&student).unwrap(),
            "Please complete these required profile fields: name, major"
        );
    }

    #[test]
    fn test_essay_gate_passes_with_name_and_major() {
        let student = student_with("Maya", Some("Biology"));
        assert_eq!(essay_profile_gate(&student), None);
    }

    #[test]
    fn test_feedback_gate_reports_missing_fields() {
        let request = EssayFeedbackRequest {
            student_id: Uuid::new_v4(),
            college_name: Some("Rice University".to_string()),
            essay_prompt: None,
            essay_text: Some("   ".to_string()),
            word_count: None,
            feedback_questions: Vec::new(),
            is_new_thread: true,
            thread_id: None,
        };
        assert_eq!(
            feedback_request_gate(&request).unwrap(),
            "Missing required fields: essay_prompt, essay_text, word_count"
        );
    }

    #[test]
    fn test_feedback_gate_rejects_non_positive_word_count() {
        let request = EssayFeedbackRequest {
            student_id: Uuid::new_v4(),
            college_name: Some("Rice University".to_string()),
            essay_prompt: Some("Why us?".to_string()),
            essay_text: Some("Because of the labs.".to_string()),
            word_count: Some(0),
            feedback_questions: Vec::new(),
            is_new_thread: true,
            thread_id: None,
        };
        assert_eq!(
            feedback_request_gate(&request).unwrap(),
            "Word count must be positive"
        );
    }

    #[test]
    fn test_effective_questions_default_when_empty() {
        assert_eq!(
            effective_questions(&[]),
            vec![DEFAULT_FEEDBACK_QUESTION.to_string()]
        );
        let custom = vec!["Is the hook strong?".to_string()];
        assert_eq!(effective_questions(&custom), custom);
    }

    #[test]
    fn test_profile_summary_carries_profile_blocks() {
        let student = student_with("Maya", Some("Biology"));
        let summary = profile_summary(&student);
        assert!(summary.contains("Marine biology storyteller"));
        assert!(summary.contains("Published tide pool survey"));
        assert!(summary.contains("\"student_context\":null"));
    }

    #[test]
    fn test_bullet_list_formats_or_marks_none() {
        assert_eq!(bullet_list(&[]), "(none)");
        assert_eq!(
            bullet_list(&["Rice University".to_string(), "MIT".to_string()]),
            "- Rice University\n- MIT"
        );
    }
}
