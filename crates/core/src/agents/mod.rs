//! # Agents
//!
//! The four agent variants. Each is a thin prompt-template wrapper around
//! one text-generation call: build a prompt from the input (pure), call the
//! backend exactly once, return its trimmed output verbatim. Agents never
//! write to the log store; that is the dispatcher's job alone.

pub mod prompts;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::llm::TextGenerator;
use crate::models::AgentId;

/// Input to one agent run. `query` is only meaningful for Research; the
/// dispatcher validates its presence before any agent runs.
#[derive(Debug, Clone, Copy)]
pub struct AgentInput<'a> {
    pub topic: &'a str,
    pub query: Option<&'a str>,
}

/// One named prompt-template + generation-call unit.
#[async_trait]
pub trait Agent: Send + Sync {
    fn id(&self) -> AgentId;

    /// Build the prompt for this input. Pure; no side effects.
    fn build_prompt(&self, input: &AgentInput<'_>) -> String;

    /// Build the prompt, make exactly one generation call, return the
    /// trimmed output.
    async fn run(
        &self,
        llm: &dyn TextGenerator,
        input: &AgentInput<'_>,
    ) -> Result<String, GenerationError> {
        let prompt = self.build_prompt(input);
        tracing::debug!(agent = %self.id(), prompt_len = prompt.len(), "running agent");
        let output = llm.generate(&prompt).await?;
        Ok(output.trim().to_string())
    }
}

/// Contrarian critique of the topic
pub struct DevilAgent;

impl Agent for DevilAgent {
    fn id(&self) -> AgentId {
        AgentId::Devil
    }

    fn build_prompt(&self, input: &AgentInput<'_>) -> String {
        prompts::render(prompts::DEVIL, input.topic, None)
    }
}

/// Non-obvious analysis of the topic
pub struct InsightAgent;

impl Agent for InsightAgent {
    fn id(&self) -> AgentId {
        AgentId::Insight
    }

    fn build_prompt(&self, input: &AgentInput<'_>) -> String {
        prompts::render(prompts::INSIGHT, input.topic, None)
    }
}

/// Answers a specific query within the topic
pub struct ResearchAgent;

impl Agent for ResearchAgent {
    fn id(&self) -> AgentId {
        AgentId::Research
    }

    fn build_prompt(&self, input: &AgentInput<'_>) -> String {
        prompts::render(prompts::RESEARCH, input.topic, input.query)
    }
}

/// Neutral recap of the discussion. Prior log context is the caller's
/// responsibility to supply; the core does not auto-aggregate it.
pub struct SummarizerAgent;

impl Agent for SummarizerAgent {
    fn id(&self) -> AgentId {
        AgentId::Summarizer
    }

    fn build_prompt(&self, input: &AgentInput<'_>) -> String {
        prompts::render(prompts::SUMMARIZER, input.topic, None)
    }
}

/// The variant for an agent id. The match is exhaustive: extending the
/// set means a new variant here, not a plugin registry.
pub fn agent_for(id: AgentId) -> Box<dyn Agent> {
    match id {
        AgentId::Devil => Box::new(DevilAgent),
        AgentId::Insight => Box::new(InsightAgent),
        AgentId::Research => Box::new(ResearchAgent),
        AgentId::Summarizer => Box::new(SummarizerAgent),
    }
}
