use std::fmt;

use serde::Serialize;

/// Coarse provisioning stage of a deployment instance.
///
/// `Unknown` is only ever produced when reading; the orchestrator never
/// persists it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LifecycleState {
    Ready,
    Initialized,
    Deployed,
    Destroyed,
    Unknown,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Ready => "READY",
            LifecycleState::Initialized => "INITIALIZED",
            LifecycleState::Deployed => "DEPLOYED",
            LifecycleState::Destroyed => "DESTROYED",
            LifecycleState::Unknown => "UNKNOWN",
        }
    }

    /// Parses a persisted state name. Anything unrecognized reads as `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "READY" => LifecycleState::Ready,
            "INITIALIZED" => LifecycleState::Initialized,
            "DEPLOYED" => LifecycleState::Deployed,
            "DESTROYED" => LifecycleState::Destroyed,
            _ => LifecycleState::Unknown,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StateRecord {
    pub state: LifecycleState,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub last_action: String,
}

impl StateRecord {
    pub fn unknown() -> Self {
        Self {
            state: LifecycleState::Unknown,
            timestamp: String::new(),
            last_action: String::new(),
        }
    }
}
