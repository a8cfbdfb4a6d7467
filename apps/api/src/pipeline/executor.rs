//! Plan execution with per-stage budgets and resume-from-failure recovery.

use tokio::time::timeout;
use tracing::{debug, warn};

use crate::pipeline::runner::StageRunner;
use crate::pipeline::{Stage, StageFailure, StageInputs, StagePlan};

/// Output of one completed stage, kept for the prompts of later stages.
#[derive(Debug, Clone)]
pub struct StageOutput {
    pub stage_name: &'static str,
    pub text: String,
}

/// A completed plan run. `output` is the final stage's text.
#[derive(Debug)]
pub struct PipelineRun {
    pub output: String,
    pub transcript: Vec<StageOutput>,
    /// Stage index the run was resumed from, when recovery kicked in.
    pub resumed_from: Option<usize>,
}

/// Run `plan` to completion.
///
/// On the first stage failure the run is retried once, starting at the
/// failed stage with the original inputs and an empty transcript. Outputs
/// from before the failure are not reused: a failed run's partial state is
/// treated as suspect. A failure during the resumed run is terminal.
pub async fn execute_plan(
    runner: &dyn StageRunner,
    plan: &StagePlan,
    inputs: &StageInputs,
) -> Result<PipelineRun, StageFailure> {
    let run = match run_from(runner, plan, inputs, 0).await {
        Ok(run) => run,
        Err(first) => {
            warn!(
                plan = plan.name,
                stage = first.stage_name,
                "stage failed, resuming once from it: {}",
                first.detail
            );
            let resume_at = first.stage_index;
            let mut run = run_from(runner, plan, inputs, resume_at).await?;
            run.resumed_from = Some(resume_at);
            run
        }
    };
    debug!(
        plan = plan.name,
        stages = run.transcript.len(),
        "plan completed"
    );
    Ok(run)
}

async fn run_from(
    runner: &dyn StageRunner,
    plan: &StagePlan,
    inputs: &StageInputs,
    start: usize,
) -> Result<PipelineRun, StageFailure> {
    let mut transcript: Vec<StageOutput> = Vec::new();

    for (offset, stage) in plan.stages[start..].iter().enumerate() {
        let index = start + offset;
        debug!(
            plan = plan.name,
            stage = stage.name,
            "running stage {}/{}",
            index + 1,
            plan.stages.len()
        );
        let prompt = render_prompt(stage, inputs, &transcript);

        let text = match timeout(stage.budget, runner.run_stage(stage, &prompt)).await {
            Err(_) => {
                return Err(StageFailure {
                    stage_index: index,
                    stage_name: stage.name,
                    detail: format!("timed out after {}s", stage.budget.as_secs()),
                })
            }
            Ok(Err(e)) => {
                return Err(StageFailure {
                    stage_index: index,
                    stage_name: stage.name,
                    detail: e.to_string(),
                })
            }
            Ok(Ok(text)) => text,
        };

        transcript.push(StageOutput {
            stage_name: stage.name,
            text,
        });
    }

    let output = transcript
        .last()
        .map(|stage| stage.text.clone())
        .unwrap_or_default();
    Ok(PipelineRun {
        output,
        transcript,
        resumed_from: None,
    })
}

fn render_prompt(stage: &Stage, inputs: &StageInputs, transcript: &[StageOutput]) -> String {
    let mut prompt = stage
        .template
        .replace("{student_profile}", &inputs.student_profile);
    for (key, value) in &inputs.extras {
        prompt = prompt.replace(&format!("{{{key}}}"), value);
    }
    let prior = if transcript.is_empty() {
        "(none)".to_string()
    } else {
        transcript
            .iter()
            .map(|stage| format!("## {}\n{}", stage.stage_name, stage.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    };
    prompt.replace("{prior_stages}", &prior)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    const STAGES: &[Stage] = &[
        Stage {
            name: "analyze",
            budget: Duration::from_secs(60),
            system: "sys",
            template: "analyze {student_profile}\nprior:\n{prior_stages}",
        },
        Stage {
            name: "research",
            budget: Duration::from_secs(60),
            system: "sys",
            template: "research\nprior:\n{prior_stages}",
        },
        Stage {
            name: "rank",
            budget: Duration::from_secs(60),
            system: "sys",
            template: "rank\nprior:\n{prior_stages}",
        },
        Stage {
            name: "write",
            budget: Duration::from_secs(60),
            system: "sys",
            template: "write\nprior:\n{prior_stages}",
        },
    ];

    const PLAN: StagePlan = StagePlan {
        name: "test_plan",
        stages: STAGES,
    };

    /// Scripted backend: fails each named stage the scripted number of times,
    /// recording every call and the prompt it saw.
    struct ScriptedRunner {
        failures_left: Mutex<HashMap<&'static str, u32>>,
        calls: Mutex<Vec<&'static str>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(failures: &[(&'static str, u32)]) -> Self {
            Self {
                failures_left: Mutex::new(failures.iter().copied().collect()),
                calls: Mutex::new(Vec::new()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StageRunner for ScriptedRunner {
        async fn run_stage(&self, stage: &Stage, prompt: &str) -> Result<String, AppError> {
            self.calls.lock().unwrap().push(stage.name);
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(left) = self.failures_left.lock().unwrap().get_mut(stage.name) {
                if *left > 0 {
                    *left -= 1;
                    return Err(AppError::Llm(format!("{} blew up", stage.name)));
                }
            }
            Ok(format!("{} output", stage.name))
        }
    }

    struct SleepyRunner;

    #[async_trait]
    impl StageRunner for SleepyRunner {
        async fn run_stage(&self, _stage: &Stage, _prompt: &str) -> Result<String, AppError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("too late".to_string())
        }
    }

    fn inputs() -> StageInputs {
        StageInputs::new("profile-json".to_string())
    }

    #[tokio::test]
    async fn test_stages_run_in_order_and_final_output_wins() {
        let runner = ScriptedRunner::new(&[]);
        let run = execute_plan(&runner, &PLAN, &inputs()).await.unwrap();
        assert_eq!(runner.calls(), vec!["analyze", "research", "rank", "write"]);
        assert_eq!(run.output, "write output");
        assert_eq!(run.transcript.len(), 4);
        assert_eq!(run.resumed_from, None);
    }

    #[tokio::test]
    async fn test_profile_and_transcript_rendered_into_prompts() {
        let runner = ScriptedRunner::new(&[]);
        execute_plan(&runner, &PLAN, &inputs()).await.unwrap();
        let prompts = runner.prompts();
        assert!(prompts[0].contains("analyze profile-json"));
        assert!(prompts[0].contains("(none)"));
        assert!(prompts[1].contains("## analyze\nanalyze output"));
        assert!(prompts[3].contains("## rank\nrank output"));
    }

    #[tokio::test]
    async fn test_failure_resumes_from_failed_stage() {
        let runner = ScriptedRunner::new(&[("research", 1)]);
        let run = execute_plan(&runner, &PLAN, &inputs()).await.unwrap();
        assert_eq!(
            runner.calls(),
            vec!["analyze", "research", "research", "rank", "write"]
        );
        assert_eq!(run.resumed_from, Some(1));
        assert_eq!(run.output, "write output");
    }

    #[tokio::test]
    async fn test_resumed_run_starts_with_empty_transcript() {
        let runner = ScriptedRunner::new(&[("rank", 1)]);
        let run = execute_plan(&runner, &PLAN, &inputs()).await.unwrap();
        // Calls: analyze, research, rank(fail), rank, write. The resumed
        // rank prompt must not carry the discarded analyze/research outputs.
        let prompts = runner.prompts();
        assert!(prompts[2].contains("## research"));
        assert!(prompts[3].contains("(none)"));
        assert!(!prompts[3].contains("## analyze"));
        assert_eq!(run.transcript.len(), 2);
    }

    #[tokio::test]
    async fn test_second_failure_of_same_stage_is_terminal() {
        let runner = ScriptedRunner::new(&[("research", 2)]);
        let failure = execute_plan(&runner, &PLAN, &inputs()).await.unwrap_err();
        assert_eq!(runner.calls(), vec!["analyze", "research", "research"]);
        assert_eq!(failure.stage_name, "research");
        assert_eq!(failure.stage_index, 1);
        assert!(failure.to_string().contains("research blew up"));
    }

    #[tokio::test]
    async fn test_failure_after_resume_is_terminal() {
        let runner = ScriptedRunner::new(&[("research", 1), ("write", 1)]);
        let failure = execute_plan(&runner, &PLAN, &inputs()).await.unwrap_err();
        assert_eq!(
            runner.calls(),
            vec!["analyze", "research", "research", "rank", "write"]
        );
        assert_eq!(failure.stage_name, "write");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stage_budget_timeout_is_a_stage_failure() {
        const SLOW_STAGES: &[Stage] = &[Stage {
            name: "stall",
            budget: Duration::from_secs(5),
            system: "sys",
            template: "{prior_stages}",
        }];
        const SLOW_PLAN: StagePlan = StagePlan {
            name: "slow",
            stages: SLOW_STAGES,
        };
        let failure = execute_plan(&SleepyRunner, &SLOW_PLAN, &inputs())
            .await
            .unwrap_err();
        assert_eq!(failure.stage_name, "stall");
        assert!(failure.detail.contains("timed out after 5s"));
    }

    #[tokio::test]
    async fn test_extras_fill_placeholders() {
        const EXTRA_STAGES: &[Stage] = &[Stage {
            name: "scout",
            budget: Duration::from_secs(60),
            system: "sys",
            template: "type={activity_type} hours={hrs_per_wk} {prior_stages}",
        }];
        const EXTRA_PLAN: StagePlan = StagePlan {
            name: "extras",
            stages: EXTRA_STAGES,
        };
        let runner = ScriptedRunner::new(&[]);
        let inputs = inputs()
            .with("activity_type", "stem".to_string())
            .with("hrs_per_wk", "6".to_string());
        execute_plan(&runner, &EXTRA_PLAN, &inputs).await.unwrap();
        assert!(runner.prompts()[0].starts_with("type=stem hours=6"));
    }
}
