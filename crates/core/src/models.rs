//! # Roundtable Models
//!
//! Agent identifiers and log entry records shared by the store, the
//! dispatch layer, and the HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of agents that can be dispatched.
///
/// The set is closed: adding an agent means adding a variant here and a
/// branch in the dispatcher, not registering a plugin. Wire names are the
/// capitalized variant names (`"Devil"`, `"Insight"`, ...), case-sensitive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AgentId {
    Devil,
    Insight,
    Research,
    Summarizer,
}

impl AgentId {
    /// All known agents, in a stable order
    pub fn all() -> Vec<AgentId> {
        vec![
            AgentId::Devil,
            AgentId::Insight,
            AgentId::Research,
            AgentId::Summarizer,
        ]
    }

    /// Wire/display name
    pub fn name(&self) -> &'static str {
        match self {
            AgentId::Devil => "Devil",
            AgentId::Insight => "Insight",
            AgentId::Research => "Research",
            AgentId::Summarizer => "Summarizer",
        }
    }

    /// One-line description for agent listings
    pub fn description(&self) -> &'static str {
        match self {
            AgentId::Devil => "Plays devil's advocate against the topic",
            AgentId::Insight => "Surfaces non-obvious insights about the topic",
            AgentId::Research => "Researches a specific query within the topic",
            AgentId::Summarizer => "Summarizes the discussion on the topic",
        }
    }

    /// Whether this agent requires the `query` parameter
    pub fn requires_query(&self) -> bool {
        matches!(self, AgentId::Research)
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AgentId {
    type Err = crate::error::DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Devil" => Ok(AgentId::Devil),
            "Insight" => Ok(AgentId::Insight),
            "Research" => Ok(AgentId::Research),
            "Summarizer" => Ok(AgentId::Summarizer),
            other => Err(crate::error::DispatchError::UnknownAgent(other.to_string())),
        }
    }
}

/// One immutable, timestamped, agent-attributed record of generated content.
///
/// Entries are created exactly once at append time and never mutated.
/// `timestamp` is assigned by the store in UTC; ties between entries created
/// in the same instant are broken by insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogEntry {
    pub agent: AgentId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of a successful dispatch: the agent's output plus the log entry
/// that was persisted for it. `output` always equals `entry.content`.
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub agent: AgentId,
    pub topic: String,
    pub output: String,
    pub entry: LogEntry,
}
