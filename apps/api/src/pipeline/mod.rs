//! Multi-stage generation pipelines.
//!
//! Each recommendation kind runs a fixed, strictly sequential plan of stages.
//! Later stages see the transcript of earlier outputs through their prompt
//! templates. Recovery is a single resume from the failed stage with the
//! original inputs; a second failure anywhere ends the run.

pub mod executor;
pub mod plans;
pub mod prompts;
pub mod runner;

use std::fmt;
use std::time::Duration;

/// One named unit of work in a plan.
#[derive(Debug)]
pub struct Stage {
    pub name: &'static str,
    /// Wall-clock budget for the stage, including the runner's own retries.
    pub budget: Duration,
    pub system: &'static str,
    pub template: &'static str,
}

/// Ordered stages for one generation kind.
#[derive(Debug)]
pub struct StagePlan {
    pub name: &'static str,
    pub stages: &'static [Stage],
}

/// Inputs rendered into stage prompt templates. `student_profile` fills the
/// `{student_profile}` placeholder; extras fill `{key}` placeholders.
#[derive(Debug, Clone, Default)]
pub struct StageInputs {
    pub student_profile: String,
    pub extras: Vec<(&'static str, String)>,
}

impl StageInputs {
    pub fn new(student_profile: String) -> Self {
        Self {
            student_profile,
            extras: Vec::new(),
        }
    }

    pub fn with(mut self, key: &'static str, value: String) -> Self {
        self.extras.push((key, value));
        self
    }
}

/// A stage-level failure, carrying the stage's identity so the executor can
/// route a resume back to it.
#[derive(Debug, Clone)]
pub struct StageFailure {
    pub stage_index: usize,
    pub stage_name: &'static str,
    pub detail: String,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage '{}' failed: {}", self.stage_name, self.detail)
    }
}

impl std::error::Error for StageFailure {}
