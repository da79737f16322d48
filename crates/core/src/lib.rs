//! # Roundtable Core
//!
//! The "Brain" of the Roundtable system - agents, the topic log store,
//! and the dispatch layer that ties them together.
//!
//! ## Architecture
//!
//! - `agents/` - The four agent variants (Devil, Insight, Research, Summarizer)
//!   and their prompt templates
//! - `models` - Agent identifiers and log entry records
//! - `store` - Append-only per-topic log persistence (SQLite)
//! - `llm` - Text generation client (Ollama-compatible backend)
//! - `dispatch` - Validated agent invocation with logging side effect
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roundtable_core::dispatch::Dispatcher;
//! use roundtable_core::llm::OllamaClient;
//! use roundtable_core::store::TopicLogStore;
//!
//! let store = Arc::new(TopicLogStore::open()?);
//! let llm = Arc::new(OllamaClient::default());
//! let dispatcher = Dispatcher::new(store, llm);
//! let outcome = dispatcher.dispatch(AgentId::Devil, "climate-policy", None).await?;
//! ```

pub mod agents;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod models;
pub mod store;
