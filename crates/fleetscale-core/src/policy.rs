//! Validated per-group scaling policies.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Reconciliation strategy for a runner group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Scale on the percentage of busy agents among the online fleet.
    #[serde(rename = "percentageAgentsIdle")]
    PercentageAgentsIdle,
    /// No scaling; retire agents stuck in non-online states.
    #[serde(rename = "cleaner")]
    Cleaner,
}

/// Scaling parameters for the `percentageAgentsIdle` strategy.
///
/// Validated at config load: `min <= max`, thresholds within `[0, 1]`,
/// `scale_up_multiplier > 1`, `scale_down_multiplier` within `(0, 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleParameters {
    pub min: u32,
    pub max: u32,
    pub scale_up_threshold: f64,
    pub scale_down_threshold: f64,
    pub scale_up_multiplier: f64,
    pub scale_down_multiplier: f64,
}

/// The immutable configuration of one runner group.
///
/// Constructed once at config load, then shared read-only across the
/// scheduler's worker tasks for the lifetime of the poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupPolicy {
    /// Group name; unique per configuration, used as the correlation
    /// key on every log line.
    pub name: String,
    /// Workspace the group's agents register under.
    pub workspace: String,
    /// Optional repository scope. `None` targets the whole workspace.
    pub repository: Option<String>,
    /// Compute namespace the backing jobs run in.
    pub namespace: String,
    /// Full label set, defaults included. Agents are matched by set
    /// equality, so this doubles as the group's partition key.
    pub labels: BTreeSet<String>,
    pub strategy: Strategy,
    /// Present for scaling strategies; `None` for cleaner-only groups.
    pub parameters: Option<ScaleParameters>,
}

impl GroupPolicy {
    /// Human-readable scope for log messages.
    pub fn scope(&self) -> String {
        match &self.repository {
            Some(repo) => format!("{} repository: {}", self.workspace, repo),
            None => self.workspace.clone(),
        }
    }
}
