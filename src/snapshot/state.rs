use std::fmt;

use serde::Serialize;

/// Progress of one route through the capture state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteState {
    Pending,
    Navigating,
    WaitingForReady,
    /// Readiness predicate held before capture.
    Captured,
    /// Readiness wait expired; whatever DOM was present got captured.
    TimedOut,
}

impl fmt::Display for RouteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Navigating => "navigating",
            Self::WaitingForReady => "waiting for ready",
            Self::Captured => "captured",
            Self::TimedOut => "timed out",
        })
    }
}
