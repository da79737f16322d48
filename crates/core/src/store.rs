//! # Topic Log Store
//!
//! Append-only per-topic log persisted in a single SQLite database at
//! `.roundtable/roundtable.db`. The store is the single source of truth;
//! there is no authoritative in-memory cache.
//!
//! One row per log entry, keyed by topic. Read-back order is rowid order,
//! which is physical append order, so timestamp ties resolve to insertion
//! order. A topic exists iff it has rows: the first append to an unseen
//! name creates it.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StorageError;
use crate::models::{AgentId, LogEntry};

/// Schema version for migrations
const SCHEMA_VERSION: i32 = 1;

/// Durable mapping from topic name to an ordered sequence of log entries.
///
/// The connection mutex makes each append a single atomic unit, so
/// concurrent appends to the same topic cannot lose entries.
pub struct TopicLogStore {
    conn: Arc<Mutex<Connection>>,
}

impl TopicLogStore {
    /// Open or create the database at `.roundtable/roundtable.db`
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(".roundtable/roundtable.db")
    }

    /// Open the database at a specific path (useful for testing)
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let conn = Connection::open(path.as_ref())?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.run_migrations()?;

        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))
    }

    /// Run schema migrations
    fn run_migrations(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY)",
            [],
        )?;

        let current_version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |row| row.get(0),
            )
            .unwrap_or(0);

        if current_version < 1 {
            conn.execute(
                r#"
                CREATE TABLE IF NOT EXISTS topic_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    topic TEXT NOT NULL,
                    agent TEXT NOT NULL,
                    content TEXT NOT NULL,
                    timestamp TEXT NOT NULL
                )
                "#,
                [],
            )?;
            conn.execute(
                "CREATE INDEX IF NOT EXISTS idx_topic_logs_topic ON topic_logs(topic)",
                [],
            )?;
            conn.execute(
                "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
                [1],
            )?;
        }

        tracing::debug!(
            "TopicLogStore initialized with schema version {}",
            SCHEMA_VERSION
        );

        Ok(())
    }

    /// Append one entry to `topic`'s log, creating the topic if unseen.
    ///
    /// The timestamp is stamped here, immediately before persistence, in
    /// UTC. Prior entries are never touched; a failed insert leaves them
    /// exactly as committed.
    pub fn append(
        &self,
        topic: &str,
        agent: AgentId,
        content: &str,
    ) -> Result<LogEntry, StorageError> {
        let timestamp = Utc::now();
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO topic_logs (topic, agent, content, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![topic, agent.name(), content, timestamp.to_rfc3339()],
        )?;

        tracing::debug!(topic, agent = agent.name(), "appended log entry");

        Ok(LogEntry {
            agent,
            content: content.to_string(),
            timestamp,
        })
    }

    /// Full log for `topic` in append order. An unseen topic yields an
    /// empty vec, not an error.
    pub fn read_all(&self, topic: &str) -> Result<Vec<LogEntry>, StorageError> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT agent, content, timestamp
            FROM topic_logs
            WHERE topic = ?1
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map(params![topic], |row| {
            let agent: String = row.get(0)?;
            let content: String = row.get(1)?;
            let timestamp: String = row.get(2)?;
            Ok((agent, content, timestamp))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (agent, content, timestamp) = row?;
            // Rows are only ever written through `append`; anything that
            // fails to parse back means the database was tampered with.
            entries.push(LogEntry {
                agent: agent
                    .parse()
                    .map_err(|_| StorageError::Corrupt(format!("agent column: {agent}")))?,
                content,
                timestamp: DateTime::parse_from_rfc3339(&timestamp)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|_| {
                        StorageError::Corrupt(format!("timestamp column: {timestamp}"))
                    })?,
            });
        }

        Ok(entries)
    }

    /// Distinct topic names, in first-append order
    pub fn topics(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.lock()?;

        let mut stmt =
            conn.prepare("SELECT topic FROM topic_logs GROUP BY topic ORDER BY MIN(id)")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut topics = Vec::new();
        for row in rows {
            topics.push(row?);
        }
        Ok(topics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_all_on_unseen_topic_is_empty() {
        let path = ".roundtable/test_store_unseen.db";
        let _ = fs::remove_file(path);

        let store = TopicLogStore::open_at(path).unwrap();
        let entries = store.read_all("never-appended").unwrap();
        assert!(entries.is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_append_creates_topic_and_preserves_order() {
        let path = ".roundtable/test_store_order.db";
        let _ = fs::remove_file(path);

        let store = TopicLogStore::open_at(path).unwrap();
        store.append("x", AgentId::Insight, "first").unwrap();
        store.append("x", AgentId::Summarizer, "second").unwrap();

        let entries = store.read_all("x").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].agent, AgentId::Insight);
        assert_eq!(entries[0].content, "first");
        assert_eq!(entries[1].agent, AgentId::Summarizer);
        assert_eq!(entries[1].content, "second");
        assert!(entries[0].timestamp <= entries[1].timestamp);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_topics_are_isolated() {
        let path = ".roundtable/test_store_isolation.db";
        let _ = fs::remove_file(path);

        let store = TopicLogStore::open_at(path).unwrap();
        store.append("a", AgentId::Devil, "about a").unwrap();
        store.append("b", AgentId::Devil, "about b").unwrap();

        let a = store.read_all("a").unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].content, "about a");
        assert_eq!(store.read_all("b").unwrap().len(), 1);
        assert_eq!(store.topics().unwrap(), vec!["a", "b"]);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_entries_survive_reopen() {
        let path = ".roundtable/test_store_reopen.db";
        let _ = fs::remove_file(path);

        {
            let store = TopicLogStore::open_at(path).unwrap();
            store.append("durable", AgentId::Research, "kept").unwrap();
        }

        let store = TopicLogStore::open_at(path).unwrap();
        let entries = store.read_all("durable").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content, "kept");

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let path = ".roundtable/test_store_concurrent.db";
        let _ = fs::remove_file(path);

        let store = std::sync::Arc::new(TopicLogStore::open_at(path).unwrap());
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = std::sync::Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for j in 0..25 {
                    store
                        .append("contended", AgentId::Insight, &format!("{i}-{j}"))
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let entries = store.read_all("contended").unwrap();
        assert_eq!(entries.len(), 200, "no appends may be lost");

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_case_sensitive_topic_names() {
        let path = ".roundtable/test_store_case.db";
        let _ = fs::remove_file(path);

        let store = TopicLogStore::open_at(path).unwrap();
        store.append("Topic", AgentId::Devil, "upper").unwrap();

        assert!(store.read_all("topic").unwrap().is_empty());
        assert_eq!(store.read_all("Topic").unwrap().len(), 1);

        let _ = fs::remove_file(path);
    }
}
