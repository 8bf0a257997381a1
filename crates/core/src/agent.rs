//! Agent runtime state.

use serde::{Deserialize, Serialize};

/// Default ceiling on chained backend requests per submission.
pub const DEFAULT_MAX_DEPTH: u32 = 10;

/// The system prompt an agent opens with when none is configured.
pub const DEFAULT_SYSTEM_MESSAGE: &str =
    "You are a friendly and helpful agent. Answer the user questions as good as you can.";

/// Snapshot of an agent's runtime state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentState {
    /// Whether a top-level request is in flight
    pub is_busy: bool,

    /// Backend requests made by the in-flight chain (0 when idle)
    pub depth: u32,

    /// Number of submissions completed since construction
    pub requests_processed: u64,

    /// Messages in the conversation context
    pub context_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_state_starts_idle() {
        let state = AgentState::default();
        assert!(!state.is_busy);
        assert_eq!(state.depth, 0);
        assert_eq!(state.requests_processed, 0);
    }
}
