//! Judging capability contract
//!
//! Judge-based graders delegate semantic checks to an external evaluation
//! capability. The graders own prompt construction and verdict parsing;
//! the backend only needs to turn a prompt into free text.

use async_trait::async_trait;

/// Capability contract for the external judging backend.
#[async_trait]
pub trait LLMJudge: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}
