//! Prompt templates bundled at compile time.
//!
//! Templates use `{topic}` and `{query}` placeholders filled in by
//! [`render`]. Rendering is pure; no template touches the store or the
//! generation backend.

use crate::models::AgentId;

/// Devil's Advocate - contrarian critique of the topic
pub const DEVIL: &str = include_str!("defaults/devil.md");

/// Insight - non-obvious analysis of the topic
pub const INSIGHT: &str = include_str!("defaults/insight.md");

/// Research - answers a specific query within the topic
pub const RESEARCH: &str = include_str!("defaults/research.md");

/// Summarizer - neutral recap of the discussion
pub const SUMMARIZER: &str = include_str!("defaults/summarizer.md");

/// Template for an agent
pub fn template(agent: AgentId) -> &'static str {
    match agent {
        AgentId::Devil => DEVIL,
        AgentId::Insight => INSIGHT,
        AgentId::Research => RESEARCH,
        AgentId::Summarizer => SUMMARIZER,
    }
}

/// Fill `{topic}` (and `{query}`, when given) into a template
pub fn render(template: &str, topic: &str, query: Option<&str>) -> String {
    let mut prompt = template.replace("{topic}", topic);
    if let Some(query) = query {
        prompt = prompt.replace("{query}", query);
    }
    prompt
}
