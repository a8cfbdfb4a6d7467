//! Stage execution backends.
//!
//! The executor only sees the [`StageRunner`] trait, so tests script stage
//! outcomes without network access and production swaps in the LLM-backed
//! runner.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::pipeline::Stage;

#[async_trait]
pub trait StageRunner: Send + Sync {
    async fn run_stage(&self, stage: &Stage, prompt: &str) -> Result<String, AppError>;
}

/// Production runner: one Messages API call per stage.
pub struct LlmStageRunner {
    llm: LlmClient,
}

impl LlmStageRunner {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl StageRunner for LlmStageRunner {
    async fn run_stage(&self, stage: &Stage, prompt: &str) -> Result<String, AppError> {
        self.llm
            .call_text(prompt, stage.system)
            .await
            .map_err(|e| AppError::Llm(e.to_string()))
    }
}
