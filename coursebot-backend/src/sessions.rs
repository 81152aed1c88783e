//! In-memory conversation session store

use dashmap::DashMap;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Exchange {
    user: String,
    assistant: String,
}

/// Tracks per-session conversation history, bounded to the most recent
/// `max_history` exchanges. Sessions live for the process lifetime only.
pub struct SessionManager {
    sessions: DashMap<String, Vec<Exchange>>,
    max_history: usize,
}

impl SessionManager {
    pub fn new(max_history: usize) -> Self {
        SessionManager {
            sessions: DashMap::new(),
            max_history,
        }
    }

    pub fn create_session(&self) -> String {
        let session_id = Uuid::new_v4().to_string();
        self.sessions.insert(session_id.clone(), Vec::new());
        session_id
    }

    /// Record a completed question/answer exchange
    pub fn add_exchange(&self, session_id: &str, user_message: &str, assistant_message: &str) {
        let mut entry = self.sessions.entry(session_id.to_string()).or_default();
        entry.push(Exchange {
            user: user_message.to_string(),
            assistant: assistant_message.to_string(),
        });
        let len = entry.len();
        if len > self.max_history {
            entry.drain(..len - self.max_history);
        }
    }

    /// Formatted history for prompt injection, or None when the session has
    /// no recorded exchanges
    pub fn get_conversation_history(&self, session_id: &str) -> Option<String> {
        let exchanges = self.sessions.get(session_id)?;
        if exchanges.is_empty() {
            return None;
        }

        let lines: Vec<String> = exchanges
            .iter()
            .map(|e| format!("User: {}\nAssistant: {}", e.user, e.assistant))
            .collect();
        Some(lines.join("\n"))
    }
}
