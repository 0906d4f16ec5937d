use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Engine-wide knobs.
///
/// The statutory investigation window is fixed by regulation; it is
/// configurable only so tests can shorten it, never mutated at runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Days from `sent_at` to the response deadline.
    pub response_window_days: i64,
    /// When true, the scheduler inserts a `draft` follow-up dispute at
    /// `round + 1` for every record it escalates. Off by default: operators
    /// review an escalation before the next round is produced.
    pub auto_redraft: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            response_window_days: 30,
            auto_redraft: false,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn response_window(&self) -> Duration {
        Duration::days(self.response_window_days)
    }
}
