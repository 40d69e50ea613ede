//! Optional per-session conversation history. Purely in-process; kept so a
//! calling chat layer can show recent context without its own store.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::{EngineError, EngineResult};

/// Most recent entries retained per `(user, session)` transcript.
pub const MAX_HISTORY_ENTRIES: usize = 20;

#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// In-memory transcript store keyed by `(user_id, session_id)`.
pub struct ConversationLog {
    inner: Mutex<HashMap<String, Vec<ChatTurn>>>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Append a user message and the engine's reply, truncating the
    /// transcript to the most recent [`MAX_HISTORY_ENTRIES`] entries.
    pub fn record(
        &self,
        user_id: i64,
        session_id: &str,
        user_message: &str,
        reply: &str,
    ) -> EngineResult<()> {
        let mut inner = self.lock()?;
        let transcript = inner.entry(key(user_id, session_id)).or_default();
        let now = Utc::now();
        transcript.push(ChatTurn {
            role: "user".to_string(),
            content: user_message.to_string(),
            timestamp: now,
        });
        transcript.push(ChatTurn {
            role: "assistant".to_string(),
            content: reply.to_string(),
            timestamp: now,
        });
        if transcript.len() > MAX_HISTORY_ENTRIES {
            let excess = transcript.len() - MAX_HISTORY_ENTRIES;
            transcript.drain(0..excess);
        }
        Ok(())
    }

    pub fn history(&self, user_id: i64, session_id: &str) -> EngineResult<Vec<ChatTurn>> {
        let inner = self.lock()?;
        Ok(inner.get(&key(user_id, session_id)).cloned().unwrap_or_default())
    }

    fn lock(&self) -> EngineResult<std::sync::MutexGuard<'_, HashMap<String, Vec<ChatTurn>>>> {
        self.inner
            .lock()
            .map_err(|_| EngineError::Internal("conversation log lock poisoned".to_string()))
    }
}

impl Default for ConversationLog {
    fn default() -> Self {
        Self::new()
    }
}

fn key(user_id: i64, session_id: &str) -> String {
    format!("{user_id}_{session_id}")
}
