//! The four generation plans.
//!
//! Stage budgets are generous because a stage wraps a Messages API call that
//! itself retries on rate limits; the budget is a backstop against a wedged
//! stage, not a latency target. Research stages get the largest budgets.

use std::time::Duration;

use crate::pipeline::prompts;
use crate::pipeline::{Stage, StagePlan};

const fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

pub static COLLEGE_LIST_PLAN: StagePlan = StagePlan {
    name: "college_list",
    stages: &[
        Stage {
            name: "analyze_profile",
            budget: minutes(10),
            system: prompts::COLLEGE_ANALYZE_SYSTEM,
            template: prompts::COLLEGE_ANALYZE_TEMPLATE,
        },
        Stage {
            name: "research_colleges",
            budget: minutes(30),
            system: prompts::COLLEGE_RESEARCH_SYSTEM,
            template: prompts::COLLEGE_RESEARCH_TEMPLATE,
        },
    ],
};

pub static EC_RECOMMENDATIONS_PLAN: StagePlan = StagePlan {
    name: "ec_recommendations",
    stages: &[
        Stage {
            name: "analyze_student_profile",
            budget: minutes(10),
            system: prompts::EC_ANALYZE_SYSTEM,
            template: prompts::EC_ANALYZE_TEMPLATE,
        },
        Stage {
            name: "check_past_suggestions",
            budget: minutes(10),
            system: prompts::EC_HISTORY_SYSTEM,
            template: prompts::EC_HISTORY_TEMPLATE,
        },
        Stage {
            name: "scout_activities",
            budget: minutes(30),
            system: prompts::EC_SCOUT_SYSTEM,
            template: prompts::EC_SCOUT_TEMPLATE,
        },
        Stage {
            name: "generate_recommendations",
            budget: minutes(20),
            system: prompts::EC_WRITE_SYSTEM,
            template: prompts::EC_WRITE_TEMPLATE,
        },
    ],
};

pub static ESSAY_BRAINSTORM_PLAN: StagePlan = StagePlan {
    name: "essay_brainstorm",
    stages: &[
        Stage {
            name: "analyze_student_profile",
            budget: minutes(10),
            system: prompts::BRAINSTORM_ANALYZE_SYSTEM,
            template: prompts::BRAINSTORM_ANALYZE_TEMPLATE,
        },
        Stage {
            name: "check_ideas_history",
            budget: minutes(10),
            system: prompts::BRAINSTORM_HISTORY_SYSTEM,
            template: prompts::BRAINSTORM_HISTORY_TEMPLATE,
        },
        Stage {
            name: "research_college_values",
            budget: minutes(30),
            system: prompts::BRAINSTORM_VALUES_SYSTEM,
            template: prompts::BRAINSTORM_VALUES_TEMPLATE,
        },
        Stage {
            name: "research_essay_examples",
            budget: minutes(30),
            system: prompts::BRAINSTORM_EXAMPLES_SYSTEM,
            template: prompts::BRAINSTORM_EXAMPLES_TEMPLATE,
        },
        Stage {
            name: "generate_essay_ideas",
            budget: minutes(20),
            system: prompts::BRAINSTORM_WRITE_SYSTEM,
            template: prompts::BRAINSTORM_WRITE_TEMPLATE,
        },
    ],
};

pub static ESSAY_FEEDBACK_PLAN: StagePlan = StagePlan {
    name: "essay_feedback",
    stages: &[
        Stage {
            name: "analyze_essay",
            budget: minutes(10),
            system: prompts::FEEDBACK_ESSAY_SYSTEM,
            template: prompts::FEEDBACK_ESSAY_TEMPLATE,
        },
        Stage {
            name: "analyze_student_profile",
            budget: minutes(10),
            system: prompts::FEEDBACK_PROFILE_SYSTEM,
            template: prompts::FEEDBACK_PROFILE_TEMPLATE,
        },
        Stage {
            name: "analyze_college_data",
            budget: minutes(30),
            system: prompts::FEEDBACK_COLLEGE_SYSTEM,
            template: prompts::FEEDBACK_COLLEGE_TEMPLATE,
        },
        Stage {
            name: "analyze_thread_memory",
            budget: minutes(10),
            system: prompts::FEEDBACK_MEMORY_SYSTEM,
            template: prompts::FEEDBACK_MEMORY_TEMPLATE,
        },
        Stage {
            name: "research_college_preferences",
            budget: minutes(40),
            system: prompts::FEEDBACK_PREFERENCES_SYSTEM,
            template: prompts::FEEDBACK_PREFERENCES_TEMPLATE,
        },
        Stage {
            name: "generate_feedback",
            budget: minutes(20),
            system: prompts::FEEDBACK_WRITE_SYSTEM,
            template: prompts::FEEDBACK_WRITE_TEMPLATE,
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    fn all_plans() -> [&'static StagePlan; 4] {
        [
            &COLLEGE_LIST_PLAN,
            &EC_RECOMMENDATIONS_PLAN,
            &ESSAY_BRAINSTORM_PLAN,
            &ESSAY_FEEDBACK_PLAN,
        ]
    }

    #[test]
    fn test_stage_names_are_unique_within_each_plan() {
        for plan in all_plans() {
            let mut names: Vec<&str> = plan.stages.iter().map(|s| s.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), plan.stages.len(), "plan {}", plan.name);
        }
    }

    #[test]
    fn test_every_template_carries_the_transcript_placeholder() {
        for plan in all_plans() {
            for stage in plan.stages {
                assert!(
                    stage.template.contains("{prior_stages}"),
                    "{}/{} lacks {{prior_stages}}",
                    plan.name,
                    stage.name
                );
            }
        }
    }

    #[test]
    fn test_final_stage_templates_pin_parser_contracts() {
        let college_final = COLLEGE_LIST_PLAN.stages.last().unwrap();
        assert!(college_final.template.contains("Available new matches:"));

        let ec_final = EC_RECOMMENDATIONS_PLAN.stages.last().unwrap();
        for label in ["Activity Name:", "Position:", "Hours per Week:", "Description:"] {
            assert!(ec_final.template.contains(label));
        }

        let brainstorm_final = ESSAY_BRAINSTORM_PLAN.stages.last().unwrap();
        assert!(brainstorm_final.template.contains("numbered"));
    }

    #[test]
    fn test_research_stages_get_the_largest_budgets() {
        assert!(
            COLLEGE_LIST_PLAN.stages[1].budget > COLLEGE_LIST_PLAN.stages[0].budget
        );
        let feedback_budgets: Vec<_> = ESSAY_FEEDBACK_PLAN
            .stages
            .iter()
            .map(|s| s.budget)
            .collect();
        assert_eq!(
            feedback_budgets.iter().max(),
            Some(&ESSAY_FEEDBACK_PLAN.stages[4].budget)
        );
    }
}
