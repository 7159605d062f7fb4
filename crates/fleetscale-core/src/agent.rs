//! Agent records as returned by the runner directory.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an agent, assigned by the CI provider.
pub type AgentUuid = String;

/// Registration state of an agent on the CI provider side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgentStatus {
    /// Created but its backing job has not registered yet.
    Unregistered,
    /// Registered and reachable; may be idle or busy.
    Online,
    /// Registered but currently unreachable.
    Offline,
    /// Administratively disabled.
    Disabled,
    /// Enabled but not currently connected.
    Enabled,
}

impl AgentStatus {
    /// Stable display name, matching the provider's wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentStatus::Unregistered => "UNREGISTERED",
            AgentStatus::Online => "ONLINE",
            AgentStatus::Offline => "OFFLINE",
            AgentStatus::Disabled => "DISABLED",
            AgentStatus::Enabled => "ENABLED",
        }
    }
}

/// One agent as observed through the runner directory.
///
/// Fetched fresh every poll tick and discarded after the cycle; never
/// cached across ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub uuid: AgentUuid,
    pub name: String,
    pub labels: BTreeSet<String>,
    pub status: AgentStatus,
    /// The in-progress work unit, if any. Presence means the agent is
    /// busy.
    pub current_step: Option<String>,
    pub created_on: DateTime<Utc>,
}

impl AgentRecord {
    /// Whether the agent is currently executing a work unit.
    pub fn is_busy(&self) -> bool {
        self.current_step.is_some()
    }
}
