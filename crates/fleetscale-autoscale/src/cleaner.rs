//! Cleanup-only reconciliation.
//!
//! Groups configured with the `cleaner` strategy never scale. Instead
//! they retire agents stuck in non-online states (never registered,
//! gone offline, administratively disabled) together with their backing
//! jobs, through the same cooldown-filtered retirement path the scaler
//! uses for scale-down.

use std::sync::Arc;

use tracing::{debug, info};

use fleetscale_core::{AgentRecord, AgentStatus, GlobalConstants, GroupPolicy};
use fleetscale_provider::{JobOrchestrator, RunnerDirectory};

use crate::error::ScaleResult;
use crate::lifecycle::{retire_agents, status_histogram};

/// Retires non-online agents for one runner group.
pub struct Cleaner<D, O> {
    policy: Arc<GroupPolicy>,
    constants: Arc<GlobalConstants>,
    directory: Arc<D>,
    orchestrator: Arc<O>,
}

impl<D, O> Cleaner<D, O>
where
    D: RunnerDirectory,
    O: JobOrchestrator,
{
    pub fn new(
        policy: Arc<GroupPolicy>,
        constants: Arc<GlobalConstants>,
        directory: Arc<D>,
        orchestrator: Arc<O>,
    ) -> Self {
        Self {
            policy,
            constants,
            directory,
            orchestrator,
        }
    }

    /// Run one cleanup cycle for this group.
    pub async fn process(&self) -> ScaleResult<()> {
        let agents = self
            .directory
            .get_agents(&self.policy.workspace, self.policy.repository.as_deref())
            .await?;

        info!(
            group = %self.policy.name,
            count = agents.len(),
            scope = %self.policy.scope(),
            "found agents"
        );
        if !agents.is_empty() {
            debug!(group = %self.policy.name, histogram = ?status_histogram(&agents));
        }

        let stuck: Vec<AgentRecord> = agents
            .iter()
            .filter(|a| a.status != AgentStatus::Online)
            .cloned()
            .collect();

        info!(
            group = %self.policy.name,
            count = stuck.len(),
            "found non-online agents"
        );

        if stuck.is_empty() {
            info!(group = %self.policy.name, "nothing to do");
            return Ok(());
        }

        retire_agents(
            &self.policy,
            &self.constants,
            self.directory.as_ref(),
            self.orchestrator.as_ref(),
            &stuck,
        )
        .await
        .map(|_| ())
    }
}
