//! Fleet snapshot classification.

use std::collections::BTreeSet;

use fleetscale_core::{AgentRecord, AgentStatus};

/// The classified view of one group's fleet for a single poll cycle.
///
/// Computed fresh each cycle and discarded once the decision is made.
/// All three partitions preserve the order the directory returned.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetSnapshot {
    /// Online agents whose label set equals the group's label set.
    pub online: Vec<AgentRecord>,
    /// Online agents with no in-progress work unit.
    pub idle: Vec<AgentRecord>,
    /// Online agents currently executing a work unit.
    pub busy: Vec<AgentRecord>,
    /// `|busy| / |online|`, 0.0 when no agents are online.
    pub busy_ratio: f64,
}

/// Partition a raw agent list against a group's label set.
///
/// Label matching is set equality, not subset: labels act as an
/// exclusive partition key, so groups can target overlapping workspaces
/// without double-counting each other's agents. Agents that are not
/// `ONLINE`, or whose labels differ at all, are excluded entirely.
pub fn classify(agents: &[AgentRecord], wanted: &BTreeSet<String>) -> FleetSnapshot {
    let online: Vec<AgentRecord> = agents
        .iter()
        .filter(|a| a.status == AgentStatus::Online && a.labels == *wanted)
        .cloned()
        .collect();

    let idle: Vec<AgentRecord> = online.iter().filter(|a| !a.is_busy()).cloned().collect();
    let busy: Vec<AgentRecord> = online.iter().filter(|a| a.is_busy()).cloned().collect();

    let busy_ratio = if online.is_empty() {
        0.0
    } else {
        busy.len() as f64 / online.len() as f64
    };

    FleetSnapshot {
        online,
        idle,
        busy,
        busy_ratio,
    }
}
