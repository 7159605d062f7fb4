//! Per-tick fan-out over the configured groups.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use fleetscale_autoscale::{Cleaner, Scaler};
use fleetscale_core::constants::MAX_GROUPS_COUNT;
use fleetscale_core::{GlobalConstants, GroupPolicy, Strategy};
use fleetscale_provider::{JobOrchestrator, RunnerDirectory};

/// Outcome of one tick, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub groups: usize,
    pub failures: usize,
}

/// Drives the reconcilers for all configured groups.
pub struct Poller<D, O> {
    directory: Arc<D>,
    orchestrator: Arc<O>,
}

impl<D, O> Poller<D, O>
where
    D: RunnerDirectory + 'static,
    O: JobOrchestrator + 'static,
{
    pub fn new(directory: Arc<D>, orchestrator: Arc<O>) -> Self {
        Self {
            directory,
            orchestrator,
        }
    }

    /// Run one tick: one reconciliation task per group, full barrier.
    ///
    /// Tasks run concurrently, capped at [`MAX_GROUPS_COUNT`] in
    /// flight. The next tick must not start before every group's cycle
    /// has finished, so this awaits them all. Per-group errors are
    /// logged with the group name and swallowed here; the group is
    /// simply retried on the next tick.
    pub async fn tick(
        &self,
        policies: &[Arc<GroupPolicy>],
        constants: &Arc<GlobalConstants>,
    ) -> TickSummary {
        let pool = Arc::new(Semaphore::new(MAX_GROUPS_COUNT));
        let mut tasks: JoinSet<(String, Result<(), fleetscale_autoscale::ScaleError>)> =
            JoinSet::new();

        for policy in policies {
            let policy = policy.clone();
            let constants = constants.clone();
            let directory = self.directory.clone();
            let orchestrator = self.orchestrator.clone();
            let pool = pool.clone();

            tasks.spawn(async move {
                let _permit = pool.acquire_owned().await.expect("pool semaphore closed");

                let result = match policy.strategy {
                    Strategy::PercentageAgentsIdle => {
                        Scaler::new(policy.clone(), constants, directory, orchestrator)
                            .process()
                            .await
                    }
                    Strategy::Cleaner => {
                        Cleaner::new(policy.clone(), constants, directory, orchestrator)
                            .process()
                            .await
                    }
                };

                (policy.name.clone(), result)
            });
        }

        let groups = policies.len();
        let mut failures = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((group, Ok(()))) => {
                    debug!(%group, "group cycle complete");
                }
                Ok((group, Err(err))) => {
                    failures += 1;
                    error!(%group, error = %err, "group cycle failed");
                }
                Err(err) => {
                    failures += 1;
                    error!(error = %err, "group task aborted");
                }
            }
        }

        TickSummary { groups, failures }
    }

    /// Tick, sleep, repeat.
    ///
    /// `max_ticks` bounds the loop for tests; `None` runs forever.
    pub async fn run(
        &self,
        policies: &[Arc<GroupPolicy>],
        constants: &Arc<GlobalConstants>,
        max_ticks: Option<u64>,
    ) {
        let mut completed: u64 = 0;

        loop {
            let summary = self.tick(policies, constants).await;
            completed += 1;

            if summary.failures > 0 {
                info!(
                    tick = completed,
                    groups = summary.groups,
                    failures = summary.failures,
                    "tick finished with failures"
                );
            }

            if let Some(max) = max_ticks
                && completed >= max
            {
                info!(ticks = completed, "configured tick count reached, stopping");
                return;
            }

            info!(
                seconds = constants.poll_interval_seconds,
                "next attempt scheduled"
            );
            tokio::time::sleep(constants.poll_interval()).await;
        }
    }
}
