//! Profile completeness gates.
//!
//! Each generation flow requires a different slice of the profile. The
//! checks accumulate every missing field rather than stopping at the first,
//! so a student sees the full punch list in one message. Numeric zeros and
//! empty strings count as missing; the three context booleans are only
//! missing when never set, since `false` is a real answer.

use crate::models::student::StudentRow;

/// Fields the college list pipeline needs, in the order they are reported.
pub fn college_list_missing_fields(student: &StudentRow) -> Vec<String> {
    let mut missing = Vec::new();

    match &student.student_context {
        None => missing.push("Student Context".to_string()),
        Some(context) => {
            let context = &context.0;
            if context.country.trim().is_empty() {
                missing.push("Country".to_string());
            }
            if context.ethnicity.trim().is_empty() {
                missing.push("Ethnicity".to_string());
            }
            if context.gender.trim().is_empty() {
                missing.push("Gender".to_string());
            }
            if context.estimated_contribution == 0.0 {
                missing.push("Estimated Contribution".to_string());
            }
            if context.financial_aid_required.is_none() {
                missing.push("Financial Aid Required (needs to be explicitly set)".to_string());
            }
            if context.first_generation.is_none() {
                missing.push("First Generation Status (needs to be explicitly set)".to_string());
            }
            if context.international_student.is_none() {
                missing.push("International Student Status (needs to be explicitly set)".to_string());
            }
        }
    }

    match &student.student_statistics {
        None => missing.push("Student Statistics".to_string()),
        Some(stats) => {
            let stats = &stats.0;
            if stats.class_rank == 0 {
                missing.push("Class Rank".to_string());
            }
            if stats.unweighted_gpa == 0.0 {
                missing.push("Unweighted GPA".to_string());
            }
            if stats.weighted_gpa == 0.0 {
                missing.push("Weighted GPA".to_string());
            }
            if stats.sat_score == 0 {
                missing.push("SAT Score".to_string());
            }
        }
    }

    match &student.student_preferences {
        None => missing.push("Student Preferences".to_string()),
        Some(prefs) => {
            let prefs = &prefs.0;
            if prefs.campus_sizes.is_empty() {
                missing.push("Campus Sizes".to_string());
            }
            if prefs.college_types.is_empty() {
                missing.push("College Types".to_string());
            }
            if prefs.preferred_regions.is_empty() {
                missing.push("Preferred Regions".to_string());
            }
            if prefs.preferred_states.is_empty() {
                missing.push("Preferred States".to_string());
            }
        }
    }

    if student
        .student_theme
        .as_deref()
        .map_or(true, |theme| theme.trim().is_empty())
    {
        missing.push("Student Theme".to_string());
    }

    if student.hooks.is_empty() {
        missing.push("Hooks".to_string());
    }

    missing
}

/// Fields the extracurricular pipeline needs, in the order they are reported.
pub fn ec_missing_fields(student: &StudentRow) -> Vec<String> {
    let mut missing = Vec::new();

    if student
        .major
        .as_deref()
        .map_or(true, |major| major.trim().is_empty())
    {
        missing.push("Major".to_string());
    }

    if student
        .personality_type
        .as_deref()
        .map_or(true, |pt| pt.trim().is_empty())
    {
        missing.push("Personality Type".to_string());
    }

    if student.extracurriculars.0.is_empty() {
        missing.push("Current Extracurricular Activities".to_string());
    }

    match &student.student_statistics {
        None => missing.push("Student Statistics".to_string()),
        Some(stats) => {
            let stats = &stats.0;
            if stats.class_rank == 0 {
                missing.push("Class Rank".to_string());
            }
            if stats.unweighted_gpa == 0.0 {
                missing.push("Unweighted GPA".to_string());
            }
            if stats.weighted_gpa == 0.0 {
                missing.push("Weighted GPA".to_string());
            }
        }
    }

    match &student.student_context {
        None => missing.push("Student Context".to_string()),
        Some(context) => {
            let context = &context.0;
            if context.international_student.is_none() {
                missing.push("International Student Status".to_string());
            }
            if context.first_generation.is_none() {
                missing.push("First Generation Status".to_string());
            }
            if context.ethnicity.trim().is_empty() {
                missing.push("Ethnicity".to_string());
            }
        }
    }

    if student
        .student_theme
        .as_deref()
        .map_or(true, |theme| theme.trim().is_empty())
    {
        missing.push("Student Theme".to_string());
    }

    missing
}

/// None when the profile is complete enough for college list generation,
/// otherwise the full user-facing message.
pub fn validate_for_college_list(student: &StudentRow) -> Option<String> {
    let missing = college_list_missing_fields(student);
    if missing.is_empty() {
        None
    } else {
        Some(format_missing_fields(
            student.display_name(),
            "college recommendations",
            &missing,
        ))
    }
}

/// None when the profile is complete enough for activity recommendations.
pub fn validate_for_ec(student: &StudentRow) -> Option<String> {
    let missing = ec_missing_fields(student);
    if missing.is_empty() {
        None
    } else {
        Some(format_missing_fields(
            student.display_name(),
            "extracurricular activity recommendations",
            &missing,
        ))
    }
}

fn format_missing_fields(student_name: &str, goal: &str, missing: &[String]) -> String {
    let fields = missing
        .iter()
        .map(|field| format!("- {field}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{student_name}, please complete the following fields in your profile \
         to help me provide the best {goal}:\n\n{fields}"
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::student::{
        Extracurricular, StudentContext, StudentPreferences, StudentStatistics,
    };
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn complete_student() -> StudentRow {
        StudentRow {
            id: Uuid::new_v4(),
            external_id: "stu-100".to_string(),
            email: "maya@example.com".to_string(),
            name: "Maya".to_string(),
            major: Some("Computer Science".to_string()),
            personality_type: Some("INTJ".to_string()),
            student_context: Some(Json(StudentContext {
                country: "USA".to_string(),
                ethnicity: "Hispanic".to_string(),
                gender: "Female".to_string(),
                estimated_contribution: 15000.0,
                financial_aid_required: Some(true),
                first_generation: Some(false),
                international_student: Some(false),
            })),
            student_statistics: Some(Json(StudentStatistics {
                class_rank: 12,
                unweighted_gpa: 3.9,
                weighted_gpa: 4.4,
                sat_score: 1480,
            })),
            student_preferences: Some(Json(StudentPreferences {
                campus_sizes: vec!["Medium".to_string()],
                college_types: vec!["Research University".to_string()],
                preferred_regions: vec!["Southwest".to_string()],
                preferred_states: vec!["TX".to_string()],
            })),
            student_theme: Some("Builder of accessible technology".to_string()),
            hooks: vec!["First robotics state champion".to_string()],
            extracurriculars: Json(vec![Extracurricular {
                name: "Robotics Club".to_string(),
                activity_type: "STEM".to_string(),
                position_leadership: "Captain".to_string(),
                organization_description: "School robotics team".to_string(),
                activity_description: "Lead builds and competition strategy".to_string(),
                added_at: Utc::now(),
            }]),
            awards: Json(Vec::new()),
            target_colleges: Json(Vec::new()),
            target_activities: Json(Vec::new()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_complete_profile_passes_both_gates() {
        let student = complete_student();
        assert_eq!(validate_for_college_list(&student), None);
        assert_eq!(validate_for_ec(&student), None);
    }

    #[test]
    fn test_missing_context_block_reported_as_one_field() {
        let mut student = complete_student();
        student.student_context = None;
        let missing = college_list_missing_fields(&student);
        assert_eq!(missing, vec!["Student Context"]);
    }

    #[test]
    fn test_context_fields_reported_individually() {
        let mut student = complete_student();
        if let Some(context) = &mut student.student_context {
            context.0.country = String::new();
            context.0.estimated_contribution = 0.0;
            context.0.financial_aid_required = None;
        }
        let missing = college_list_missing_fields(&student);
        assert_eq!(
            missing,
            vec![
                "Country",
                "Estimated Contribution",
                "Financial Aid Required (needs to be explicitly set)",
            ]
        );
    }

    #[test]
    fn test_explicit_false_booleans_are_not_missing() {
        let mut student = complete_student();
        if let Some(context) = &mut student.student_context {
            context.0.financial_aid_required = Some(false);
            context.0.first_generation = Some(false);
            context.0.international_student = Some(false);
        }
        assert!(college_list_missing_fields(&student).is_empty());
    }

    #[test]
    fn test_zero_statistics_count_as_missing() {
        let mut student = complete_student();
        if let Some(stats) = &mut student.student_statistics {
            stats.0.class_rank = 0;
            stats.0.sat_score = 0;
        }
        let missing = college_list_missing_fields(&student);
        assert_eq!(missing, vec!["Class Rank", "SAT Score"]);
    }

    #[test]
    fn test_empty_preference_lists_reported_by_name() {
        let mut student = complete_student();
        if let Some(prefs) = &mut student.student_preferences {
            prefs.0.preferred_regions.clear();
            prefs.0.preferred_states.clear();
        }
        let missing = college_list_missing_fields(&student);
        assert_eq!(missing, vec!["Preferred Regions", "Preferred States"]);
    }

    #[test]
    fn test_theme_and_hooks_message_format() {
        let mut student = complete_student();
        student.student_theme = None;
        student.hooks.clear();
        let message = validate_for_college_list(&student).unwrap();
        assert_eq!(
            message,
            "Maya, please complete the following fields in your profile to help \
             me provide the best college recommendations:\n\n- Student Theme\n- Hooks"
        );
    }

    #[test]
    fn test_unnamed_student_addressed_generically() {
        let mut student = complete_student();
        student.name = "  ".to_string();
        student.hooks.clear();
        let message = validate_for_college_list(&student).unwrap();
        assert!(message.starts_with("Student, please complete"));
    }

    #[test]
    fn test_empty_profile_lists_every_college_field() {
        let student = StudentRow {
            student_context: None,
            student_statistics: None,
            student_preferences: None,
            student_theme: None,
            hooks: Vec::new(),
            ..complete_student()
        };
        let missing = college_list_missing_fields(&student);
        assert_eq!(
            missing,
            vec![
                "Student Context",
                "Student Statistics",
                "Student Preferences",
                "Student Theme",
                "Hooks",
            ]
        );
    }

    #[test]
    fn test_ec_gate_checks_major_and_personality_first() {
        let mut student = complete_student();
        student.major = None;
        student.personality_type = Some(String::new());
        let missing = ec_missing_fields(&student);
        assert_eq!(missing, vec!["Major", "Personality Type"]);
    }

    #[test]
    fn test_ec_gate_requires_existing_activities() {
        let mut student = complete_student();
        student.extracurriculars = Json(Vec::new());
        let missing = ec_missing_fields(&student);
        assert_eq!(missing, vec!["Current Extracurricular Activities"]);
    }

    #[test]
    fn test_ec_gate_ignores_sat_and_preferences() {
        let mut student = complete_student();
        if let Some(stats) = &mut student.student_statistics {
            stats.0.sat_score = 0;
        }
        student.student_preferences = None;
        assert!(ec_missing_fields(&student).is_empty());
    }

    #[test]
    fn test_ec_context_fields_lack_explicit_suffix() {
        let mut student = complete_student();
        if let Some(context) = &mut student.student_context {
            context.0.international_student = None;
            context.0.first_generation = None;
        }
        let missing = ec_missing_fields(&student);
        assert_eq!(
            missing,
            vec!["International Student Status", "First Generation Status"]
        );
    }

    #[test]
    fn test_ec_message_names_activity_recommendations() {
        let mut student = complete_student();
        student.major = None;
        let message = validate_for_ec(&student).unwrap();
        assert!(message.contains("the best extracurricular activity recommendations:"));
        assert!(message.ends_with("- Major"));
    }
}
