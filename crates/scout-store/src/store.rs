use chrono::Utc;
use scout_llm::Message;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::models::{Exchange, SessionRecord, SessionSummary, StoredMessage};

const NAME_MAX_LEN: usize = 60;
const FIRST_QUERY_MAX_LEN: usize = 100;

/// Append-only, whole-file JSON persistence of sessions.
///
/// One file per session under the storage directory. A write is a full
/// read-modify-write overwrite; the store assumes a single writer per
/// session id and concurrent appenders can lose updates (last-writer-wins).
pub struct ConversationStore {
    storage_dir: PathBuf,
}

impl ConversationStore {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Result<Self> {
        let storage_dir = storage_dir.into();
        fs::create_dir_all(&storage_dir)?;
        Ok(Self { storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Persist one completed exchange.
    ///
    /// With no session id a new record is created (generated id, name derived
    /// from the query). With an existing id the exchange and the turn's new
    /// messages are appended, caller metadata keys are upserted, and
    /// `last_updated` advances. Prior exchanges are never reordered or
    /// dropped.
    pub fn create_or_append(
        &self,
        session_id: Option<&str>,
        query: &str,
        answer: &str,
        new_messages: &[Message],
        citations: Vec<Value>,
        metadata: Map<String, Value>,
    ) -> Result<String> {
        let now = Utc::now();
        let stored: Vec<StoredMessage> = new_messages.iter().map(StoredMessage::from).collect();
        let exchange = Exchange {
            query: query.to_string(),
            answer: answer.to_string(),
            timestamp: now,
        };

        match session_id {
            Some(id) => {
                let mut record = self.load(id)?;
                record.exchanges.push(exchange);
                record.messages.extend(stored);
                record.citations.extend(citations);
                for (key, value) in metadata {
                    record.metadata.insert(key, value);
                }
                record.last_updated = now;
                self.write_record(&record)?;
                Ok(record.id)
            }
            None => {
                let id = self.generate_session_id();
                let record = SessionRecord {
                    id: id.clone(),
                    name: derive_session_name(query),
                    created_at: now,
                    last_updated: now,
                    exchanges: vec![exchange],
                    messages: stored,
                    citations,
                    metadata,
                };
                self.write_record(&record)?;
                tracing::debug!(session_id = %id, "Created session");
                Ok(id)
            }
        }
    }

    /// List saved sessions, most recently updated first
    pub fn list(&self, limit: usize) -> Result<Vec<SessionSummary>> {
        let mut summaries = Vec::new();

        for entry in fs::read_dir(&self.storage_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match self.read_record(&path) {
                Ok(record) => {
                    let first_query = record
                        .exchanges
                        .first()
                        .map(|ex| truncate_chars(&ex.query, FIRST_QUERY_MAX_LEN))
                        .unwrap_or_default();
                    summaries.push(SessionSummary {
                        id: record.id,
                        name: record.name,
                        created_at: record.created_at,
                        last_updated: record.last_updated,
                        first_query,
                        exchange_count: record.exchanges.len(),
                    });
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable session file");
                }
            }
        }

        summaries.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        summaries.truncate(limit);
        Ok(summaries)
    }

    /// Load the full session record
    pub fn load(&self, session_id: &str) -> Result<SessionRecord> {
        let path = self.session_path(session_id);
        if !path.exists() {
            return Err(StoreError::NotFound(session_id.to_string()));
        }
        self.read_record(&path)
    }

    /// Rebuild the in-memory message sequence for continuing a session.
    ///
    /// System/user/assistant messages come back in original order; tool
    /// results are dropped (see `StoredMessage::to_context_message`).
    pub fn context_messages(&self, record: &SessionRecord) -> Vec<Message> {
        record
            .messages
            .iter()
            .filter_map(StoredMessage::to_context_message)
            .collect()
    }

    /// Delete a session. Returns false when the id does not exist.
    pub fn delete(&self, session_id: &str) -> Result<bool> {
        let path = self.session_path(session_id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        tracing::debug!(session_id = %session_id, "Deleted session");
        Ok(true)
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.storage_dir.join(format!("{}.json", session_id))
    }

    fn read_record(&self, path: &Path) -> Result<SessionRecord> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn write_record(&self, record: &SessionRecord) -> Result<()> {
        let path = self.session_path(&record.id);
        let data = serde_json::to_string_pretty(record)?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Timestamp-derived id with millisecond disambiguation; a numeric
    /// suffix covers residual collisions within the same millisecond.
    fn generate_session_id(&self) -> String {
        let now = Utc::now();
        let base = format!(
            "{}_{:03}",
            now.format("%Y%m%d_%H%M%S"),
            now.timestamp_subsec_millis()
        );

        let mut id = base.clone();
        let mut n = 1;
        while self.session_path(&id).exists() {
            id = format!("{}_{}", base, n);
            n += 1;
        }
        id
    }
}

/// Display name from the first query: lowercase, punctuation stripped,
/// whitespace collapsed, capped in length.
fn derive_session_name(query: &str) -> String {
    let cleaned: String = query
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let name = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&name, NAME_MAX_LEN)
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect::<String>().trim_end().to_string()
    }
}
