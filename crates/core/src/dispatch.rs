//! # Dispatch
//!
//! Validated agent invocation: map an agent id to its variant, check the
//! per-agent input requirements, run it, persist the output. Each call
//! moves Received -> Validated -> Generating -> Logged -> Completed; bad
//! input exits after Validated and backend failure exits after Generating,
//! both without touching the log.

use std::sync::Arc;

use crate::agents::{agent_for, AgentInput};
use crate::error::DispatchError;
use crate::llm::TextGenerator;
use crate::models::{AgentId, DispatchOutcome};
use crate::store::TopicLogStore;

/// Single writer to the topic log. Holds the injected store and generation
/// client; constructed once at startup and shared.
pub struct Dispatcher {
    store: Arc<TopicLogStore>,
    llm: Arc<dyn TextGenerator>,
}

impl Dispatcher {
    pub fn new(store: Arc<TopicLogStore>, llm: Arc<dyn TextGenerator>) -> Self {
        Self { store, llm }
    }

    pub fn store(&self) -> &TopicLogStore {
        &self.store
    }

    /// Run `agent` against `topic` and append its output to the topic log.
    ///
    /// The caller-visible output and the persisted entry are always
    /// consistent: no result without an append, no append without a
    /// result. On any failure nothing is persisted.
    pub async fn dispatch(
        &self,
        agent: AgentId,
        topic: &str,
        query: Option<&str>,
    ) -> Result<DispatchOutcome, DispatchError> {
        // Validated
        if agent.requires_query() && query.map_or(true, |q| q.trim().is_empty()) {
            return Err(DispatchError::MissingParameter {
                agent,
                param: "query",
            });
        }

        let input = AgentInput { topic, query };

        // Generating
        tracing::info!(agent = %agent, topic, "dispatching agent");
        let output = agent_for(agent).run(self.llm.as_ref(), &input).await?;

        // Logged
        let entry = self.store.append(topic, agent, &output)?;
        tracing::info!(agent = %agent, topic, chars = output.len(), "agent output logged");

        Ok(DispatchOutcome {
            agent,
            topic: topic.to_string(),
            output,
            entry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use async_trait::async_trait;
    use std::fs;

    /// Echoes a canned reply, or fails, without a live backend
    struct StubGenerator {
        reply: Result<String, ()>,
    }

    impl StubGenerator {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: Err(()) })
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(GenerationError::Backend {
                    status: 500,
                    message: "backend down".to_string(),
                }),
            }
        }
    }

    fn dispatcher_at(path: &str, llm: Arc<dyn TextGenerator>) -> Dispatcher {
        let _ = fs::remove_file(path);
        let store = Arc::new(TopicLogStore::open_at(path).unwrap());
        Dispatcher::new(store, llm)
    }

    #[tokio::test]
    async fn test_dispatch_logs_exactly_one_entry() {
        let path = ".roundtable/test_dispatch_one.db";
        let llm = StubGenerator::replying("This plan ignores second-order effects.");
        let dispatcher = dispatcher_at(path, llm);

        let outcome = dispatcher
            .dispatch(AgentId::Devil, "climate-policy", None)
            .await
            .unwrap();

        assert_eq!(outcome.agent, AgentId::Devil);
        assert_eq!(outcome.topic, "climate-policy");
        assert_eq!(outcome.output, "This plan ignores second-order effects.");
        assert_eq!(outcome.entry.content, outcome.output);

        let log = dispatcher.store().read_all("climate-policy").unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].agent, AgentId::Devil);
        assert_eq!(log[0].content, outcome.output);

        let _ = fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_sequential_dispatches_preserve_order() {
        let path = ".roundtable/test_dispatch_order.db";
        let dispatcher = dispatcher_at(path, StubGenerator::replying("take"));

        dispatcher
            .dispatch(AgentId::Insight, "x", None)
            .await
            .unwrap();
        dispatcher
            .dispatch(AgentId::Summarizer, "x", None)
            .await
            .unwrap();

        let log = dispatcher.store().read_all("x").unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].agent, AgentId::Insight);
        assert_eq!(log[1].agent, AgentId::Summarizer);

        let _ = fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_research_without_query_logs_nothing() {
        let path = ".roundtable/test_dispatch_noquery.db";
        let dispatcher = dispatcher_at(path, StubGenerator::replying("unused"));

        let err = dispatcher
            .dispatch(AgentId::Research, "x", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::MissingParameter { .. }));

        // Blank query counts as missing
        let err = dispatcher
            .dispatch(AgentId::Research, "x", Some("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::MissingParameter { .. }));

        assert!(dispatcher.store().read_all("x").unwrap().is_empty());

        let _ = fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_research_with_query_runs() {
        let path = ".roundtable/test_dispatch_query.db";
        let dispatcher = dispatcher_at(path, StubGenerator::replying("findings"));

        let outcome = dispatcher
            .dispatch(AgentId::Research, "x", Some("carbon pricing"))
            .await
            .unwrap();
        assert_eq!(outcome.output, "findings");

        let _ = fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_generation_failure_logs_nothing() {
        let path = ".roundtable/test_dispatch_genfail.db";
        let dispatcher = dispatcher_at(path, StubGenerator::failing());

        let err = dispatcher
            .dispatch(AgentId::Devil, "x", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Generation(_)));
        assert!(dispatcher.store().read_all("x").unwrap().is_empty());

        let _ = fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_output_is_trimmed() {
        let path = ".roundtable/test_dispatch_trim.db";
        let dispatcher = dispatcher_at(path, StubGenerator::replying("  padded reply \n"));

        let outcome = dispatcher
            .dispatch(AgentId::Insight, "x", None)
            .await
            .unwrap();
        assert_eq!(outcome.output, "padded reply");

        let _ = fs::remove_file(path);
    }
}
