// Shared prompt constants and prompt-building utilities.
// Each pipeline defines its own stage prompts in pipeline/prompts.rs.
// This file contains cross-cutting prompt fragments.

/// Common instruction appended to all profile-driven generation prompts.
pub const PROFILE_GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Base every statement on the student profile provided in the context. \
    Do NOT infer, interpolate, or invent grades, scores, activities, or preferences \
    that are not in the profile. If a detail is missing, treat it as missing \
    instead of guessing.";
