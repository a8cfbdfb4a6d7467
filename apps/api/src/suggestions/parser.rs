//! Parsers that turn free-form pipeline output into typed suggestion records.
//!
//! Output shape drifts between runs, so each parser accepts every format the
//! final pipeline stages have been observed to emit and silently drops lines
//! it cannot understand. Parsing never fails: unusable input yields an empty
//! list and the caller decides what that means.

use chrono::Utc;

use crate::models::suggestion::{
    ActivitySuggestion, CollegeSuggestion, EssayFeedback, EssayIdea, SuggestionKind,
    SuggestionRecord, DEFAULT_FEEDBACK_QUESTION,
};

/// Lines marking the start of the suggestion section. Preamble before the
/// first marker is skipped; without a marker the whole output is scanned.
const SECTION_MARKERS: &[&str] = &[
    "available new matches:",
    "limited suggestions",
    "match #",
    "1.",
];

/// Header lines inside the section that carry no suggestion.
const SKIP_MARKERS: &[&str] = &[
    "available new matches:",
    "limited suggestions",
    "modify preferences",
];

/// Parse `raw` as the given kind. Feedback parsing gets the default question
/// here; callers with real questions use [`parse_essay_feedback`] directly.
pub fn parse(raw: &str, kind: SuggestionKind) -> Vec<SuggestionRecord> {
    match kind {
        SuggestionKind::College => parse_college_suggestions(raw)
            .into_iter()
            .map(SuggestionRecord::College)
            .collect(),
        SuggestionKind::Activity => parse_ec_recommendations(raw)
            .into_iter()
            .map(SuggestionRecord::Activity)
            .collect(),
        SuggestionKind::Idea => parse_essay_ideas(raw)
            .into_iter()
            .map(SuggestionRecord::Idea)
            .collect(),
        SuggestionKind::Feedback => parse_essay_feedback(raw, &[])
            .into_iter()
            .map(SuggestionRecord::Feedback)
            .collect(),
    }
}

/// Extract college suggestions from pipeline output.
///
/// Recognized line shapes, tried in order:
/// 1. `3. Rice University | Private (target)` - name and classification
///    split on a single pipe
/// 2. `Match #2: Boston College (safety)` or `Boston College (safety)` -
///    a single-word category in parentheses, normalized to `Public (...)`
/// 3. `1. University of Washington` - bare numbered name, defaulting to
///    `Public (target)`
pub fn parse_college_suggestions(raw: &str) -> Vec<CollegeSuggestion> {
    let lines: Vec<&str> = raw.lines().collect();
    let start = lines
        .iter()
        .position(|line| {
            let lowered = line.trim().to_lowercase();
            SECTION_MARKERS.iter().any(|marker| lowered.contains(marker))
        })
        .unwrap_or(0);

    let mut suggestions = Vec::new();
    for line in &lines[start..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let lowered = line.to_lowercase();
        if SKIP_MARKERS.iter().any(|marker| lowered.contains(marker)) {
            continue;
        }

        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() == 2 {
            let name = strip_number_prefix(parts[0].trim()).trim();
            if !name.is_empty() {
                suggestions.push(CollegeSuggestion::new(name, parts[1].trim()));
            }
            continue;
        }

        if let Some((name, category)) = name_with_category(line) {
            suggestions.push(CollegeSuggestion::new(name, format!("Public ({category})")));
            continue;
        }

        if let Some(name) = numbered_line_content(line) {
            suggestions.push(CollegeSuggestion::new(name, "Public (target)"));
        }
    }
    suggestions
}

/// Extract activity recommendations from labeled blocks:
///
/// ```text
/// Activity Name: Science Olympiad
/// Position: Team Member
/// Hours per Week: 5
/// Description: Compete in regional science events
/// ```
///
/// A new `Activity Name:` line flushes the previous block; blocks missing
/// any of the four required labels are dropped. `Activity Type:` is an
/// optional fifth label.
pub fn parse_ec_recommendations(raw: &str) -> Vec<ActivitySuggestion> {
    let mut recommendations = Vec::new();
    let mut draft = ActivityDraft::default();

    for line in raw.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Activity Name:") {
            if let Some(done) = std::mem::take(&mut draft).finish() {
                recommendations.push(done);
            }
            draft.name = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Position:") {
            draft.position = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Hours per Week:") {
            draft.hours_per_week = Some(first_integer(rest));
        } else if let Some(rest) = line.strip_prefix("Description:") {
            draft.description = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("Activity Type:") {
            draft.activity_type = Some(rest.trim().to_string());
        }
    }

    if let Some(done) = draft.finish() {
        recommendations.push(done);
    }
    recommendations
}

/// Extract essay ideas from numbered lines (`1. <idea text>`).
pub fn parse_essay_ideas(raw: &str) -> Vec<EssayIdea> {
    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            let first = line.chars().next()?;
            if !first.is_ascii_digit() {
                return None;
            }
            let (_, content) = line.split_once(". ")?;
            let content = content.trim();
            (!content.is_empty()).then(|| EssayIdea {
                content: content.to_string(),
                created_at: Utc::now(),
            })
        })
        .collect()
}

/// Wrap feedback output as a single record. Feedback is prose, so the whole
/// output is the content; empty output yields no record.
pub fn parse_essay_feedback(raw: &str, questions: &[String]) -> Option<EssayFeedback> {
    let content = raw.trim();
    if content.is_empty() {
        return None;
    }
    let feedback_questions = if questions.is_empty() {
        vec![DEFAULT_FEEDBACK_QUESTION.to_string()]
    } else {
        questions.to_vec()
    };
    Some(EssayFeedback {
        content: content.to_string(),
        feedback_questions,
        created_at: Utc::now(),
    })
}

#[derive(Default)]
struct ActivityDraft {
    name: Option<String>,
    position: Option<String>,
    hours_per_week: Option<u32>,
    description: Option<String>,
    activity_type: Option<String>,
}

impl ActivityDraft {
    fn finish(self) -> Option<ActivitySuggestion> {
        let name = self.name?;
        let position = self.position?;
        let hours_per_week = self.hours_per_week?;
        let description = self.description?;
        if name.trim().is_empty() {
            return None;
        }
        Some(ActivitySuggestion {
            name,
            description,
            hours_per_week,
            position,
            activity_type: self.activity_type.unwrap_or_default(),
            added_at: Utc::now(),
        })
    }
}

/// `"12. Rest"` → `"Rest"`; anything without a `<digits>.` prefix is
/// returned unchanged.
fn strip_number_prefix(s: &str) -> &str {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return s;
    }
    match s[digits..].strip_prefix('.') {
        Some(rest) => rest.trim_start(),
        None => s,
    }
}

/// Content of a `<digits>. <text>` line. Unlike [`strip_number_prefix`] this
/// requires whitespace after the dot and non-empty content.
fn numbered_line_content(s: &str) -> Option<&str> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = s[digits..].strip_prefix('.')?;
    let content = rest.trim_start();
    (content.len() < rest.len() && !content.is_empty()).then_some(content)
}

/// `"Match #2: rest"` → `Some("rest")`.
fn match_prefix_rest(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("Match #")?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    rest[digits..].strip_prefix(':')
}

fn single_word(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Split a `Name (category)` line, tolerating an optional `Match #N:` prefix
/// and a number prefix on the name. The category must be the first
/// parenthesized single word; names containing parentheses are rejected so
/// lines like `Foo (strong reach)` fall through to the numbered format, and
/// names containing a pipe are rejected so malformed pipe lines stay dropped.
fn name_with_category(line: &str) -> Option<(String, String)> {
    let rest = match_prefix_rest(line).unwrap_or(line);
    let mut search_from = 0;
    while let Some(open_rel) = rest[search_from..].find('(') {
        let open = search_from + open_rel;
        let tail = &rest[open + 1..];
        let close = tail.find(')')?;
        let category = &tail[..close];
        if single_word(category) {
            let name = strip_number_prefix(rest[..open].trim()).trim();
            if name.is_empty() || name.contains(['(', ')', '|']) {
                return None;
            }
            return Some((name.to_string(), category.to_string()));
        }
        search_from = open + 1;
    }
    None
}

/// First run of digits in `s`, or 0 when there is none or it overflows.
fn first_integer(s: &str) -> u32 {
    s.chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
