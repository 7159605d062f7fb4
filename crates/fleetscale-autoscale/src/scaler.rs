//! The per-group reconciler.
//!
//! `Scaler::process` runs one poll cycle for one runner group: ensure
//! the namespace exists, fetch the fleet, classify, decide, execute.
//! Creates and deletes within the cycle are strictly sequential with
//! pacing sleeps between units, which bounds burst load on the upstream
//! API and the orchestrator.

use std::sync::Arc;

use tracing::{debug, info, warn};

use fleetscale_core::constants::MAX_AGENTS_COUNT;
use fleetscale_core::{AgentRecord, GlobalConstants, GroupPolicy};
use fleetscale_provider::{JobOrchestrator, RunnerDirectory};

use crate::classifier::classify;
use crate::decision::{decide, NoOpReason, ScalingAction};
use crate::error::{ScaleError, ScaleResult};
use crate::lifecycle::{retire_agents, status_histogram};

/// Reconciles one runner group against its scaling policy.
pub struct Scaler<D, O> {
    policy: Arc<GroupPolicy>,
    constants: Arc<GlobalConstants>,
    directory: Arc<D>,
    orchestrator: Arc<O>,
}

impl<D, O> Scaler<D, O>
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

    /// Run one poll cycle for this group.
    pub async fn process(&self) -> ScaleResult<()> {
        info!(group = %self.policy.name, scope = %self.policy.scope(), "reconciling runner group");

        self.ensure_namespace().await?;
        self.run().await
    }

    /// Idempotent namespace bootstrap: fetch, create when missing.
    ///
    /// Any error other than not-found is fatal for this group's cycle.
    pub async fn ensure_namespace(&self) -> ScaleResult<()> {
        let namespace = &self.policy.namespace;

        match self.orchestrator.get_namespace(namespace).await {
            Ok(()) => {
                debug!(group = %self.policy.name, %namespace, "namespace found");
                Ok(())
            }
            Err(err) if err.is_not_found() => {
                info!(group = %self.policy.name, %namespace, "namespace not found, creating");
                self.orchestrator
                    .create_namespace(namespace)
                    .await
                    .map_err(|source| ScaleError::Namespace {
                        namespace: namespace.clone(),
                        source,
                    })?;
                info!(group = %self.policy.name, %namespace, "namespace created");
                Ok(())
            }
            Err(source) => Err(ScaleError::Namespace {
                namespace: namespace.clone(),
                source,
            }),
        }
    }

    async fn run(&self) -> ScaleResult<()> {
        let params = self
            .policy
            .parameters
            .as_ref()
            .ok_or_else(|| ScaleError::MissingParameters {
                group: self.policy.name.clone(),
            })?;

        let agents = self.fetch_agents().await?;
        let snapshot = classify(&agents, &self.policy.labels);

        info!(
            group = %self.policy.name,
            online = snapshot.online.len(),
            idle = snapshot.idle.len(),
            busy = snapshot.busy.len(),
            busy_ratio = snapshot.busy_ratio,
            "classified fleet"
        );

        let action = decide(&snapshot, params, agents.len());

        match action {
            ScalingAction::Bootstrap { count } => {
                info!(
                    group = %self.policy.name,
                    min = params.min,
                    max = params.max,
                    current = 0,
                    desired = count,
                    "bootstrapping agents from zero"
                );
                self.create_agents(count).await
            }
            ScalingAction::ScaleUp { desired, count } => {
                info!(
                    group = %self.policy.name,
                    min = params.min,
                    max = params.max,
                    current = snapshot.online.len(),
                    desired,
                    "changing the desired capacity"
                );
                self.create_agents(count).await
            }
            ScalingAction::ScaleDown { desired, candidates } => {
                info!(
                    group = %self.policy.name,
                    min = params.min,
                    max = params.max,
                    idle = snapshot.idle.len(),
                    desired,
                    "changing the desired capacity"
                );
                retire_agents(
                    &self.policy,
                    &self.constants,
                    self.directory.as_ref(),
                    self.orchestrator.as_ref(),
                    &candidates,
                )
                .await
                .map(|_| ())
            }
            ScalingAction::NoOp { reason: NoOpReason::MaxReached } => {
                info!(
                    group = %self.policy.name,
                    max = params.max,
                    "max agents count reached"
                );
                Ok(())
            }
            ScalingAction::NoOp { reason: NoOpReason::Steady } => {
                info!(
                    group = %self.policy.name,
                    min = params.min,
                    max = params.max,
                    current = snapshot.online.len(),
                    "nothing to do"
                );
                Ok(())
            }
        }
    }

    async fn fetch_agents(&self) -> ScaleResult<Vec<AgentRecord>> {
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

        Ok(agents)
    }

    /// Create `count` agents, one at a time.
    ///
    /// The live agent count is re-checked against the hard ceiling
    /// immediately before every create: the fleet may have grown since
    /// the decision was computed, and creation is sequential enough for
    /// that to matter.
    async fn create_agents(&self, count: u32) -> ScaleResult<()> {
        for unit in 0..count {
            let live = self
                .directory
                .get_agents(&self.policy.workspace, self.policy.repository.as_deref())
                .await?;

            if live.len() >= MAX_AGENTS_COUNT {
                warn!(
                    group = %self.policy.name,
                    total = live.len(),
                    limit = MAX_AGENTS_COUNT,
                    scope = %self.policy.scope(),
                    "max agents count limit reached, no new agents will be created"
                );
                return Ok(());
            }
            debug!(group = %self.policy.name, histogram = ?status_histogram(&live));

            info!(
                group = %self.policy.name,
                unit = unit + 1,
                namespace = %self.policy.namespace,
                "setting up agent"
            );

            let created = self
                .directory
                .create_agent(
                    &self.policy.workspace,
                    &self.policy.name,
                    &self.policy.labels,
                    self.policy.repository.as_deref(),
                )
                .await?;

            self.orchestrator
                .setup_job(&created.credentials, &self.policy.namespace)
                .await?;

            info!(
                group = %self.policy.name,
                uuid = %created.uuid,
                workspace = %self.policy.workspace,
                "agent setup complete"
            );

            tokio::time::sleep(self.constants.setup_delay()).await;
        }

        Ok(())
    }
}
