//! Shared agent retirement path and fleet observation helpers.
//!
//! Both the scaler's scale-down branch and the cleaner retire agents
//! through [`retire_agents`], so cooldown filtering, not-found
//! tolerance, and delete pacing behave identically across strategies.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use fleetscale_core::{AgentRecord, GlobalConstants, GroupPolicy};
use fleetscale_provider::{JobOrchestrator, RunnerDirectory};

use crate::error::ScaleResult;

/// Histogram of raw agent statuses, for the per-fetch log line.
pub(crate) fn status_histogram(agents: &[AgentRecord]) -> BTreeMap<&'static str, usize> {
    let mut histogram = BTreeMap::new();
    for agent in agents {
        *histogram.entry(agent.status.as_str()).or_insert(0) += 1;
    }
    histogram
}

/// Drop candidates younger than the cooldown period.
///
/// An agent created within the cooldown window is never deleted, even
/// when the decision function selected it.
pub(crate) fn filter_cooled_down(
    candidates: &[AgentRecord],
    cooldown: chrono::Duration,
    now: DateTime<Utc>,
) -> Vec<AgentRecord> {
    candidates
        .iter()
        .filter(|a| a.created_on + cooldown < now)
        .cloned()
        .collect()
}

/// Delete the eligible candidates, agent first, then its backing job.
///
/// Strictly sequential with a pacing sleep after each deletion; a
/// not-found from either side is an idempotent success, any other
/// provider error aborts the cycle. Returns the number of agents
/// actually retired.
pub(crate) async fn retire_agents<D, O>(
    policy: &GroupPolicy,
    constants: &GlobalConstants,
    directory: &D,
    orchestrator: &O,
    candidates: &[AgentRecord],
) -> ScaleResult<usize>
where
    D: RunnerDirectory,
    O: JobOrchestrator,
{
    let eligible = filter_cooled_down(candidates, constants.cooldown(), Utc::now());

    if eligible.is_empty() {
        warn!(
            group = %policy.name,
            cooldown_seconds = constants.cooldown_seconds,
            "nothing to delete, all candidates were created less than the cooldown period ago"
        );
        return Ok(0);
    }

    let uuids: Vec<&str> = eligible.iter().map(|a| a.uuid.as_str()).collect();
    warn!(
        group = %policy.name,
        count = eligible.len(),
        ?uuids,
        "agents selected for deletion"
    );

    let mut retired = 0;
    for agent in &eligible {
        match directory
            .delete_agent(&policy.workspace, &agent.uuid, policy.repository.as_deref())
            .await
        {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                warn!(group = %policy.name, uuid = %agent.uuid, "agent already gone from directory");
            }
            Err(err) => return Err(err.into()),
        }

        match orchestrator.delete_job(&agent.uuid, &policy.namespace).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                warn!(group = %policy.name, uuid = %agent.uuid, "backing job already gone");
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            group = %policy.name,
            uuid = %agent.uuid,
            workspace = %policy.workspace,
            "agent deleted"
        );
        retired += 1;

        tokio::time::sleep(constants.delete_delay()).await;
    }

    Ok(retired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use fleetscale_core::AgentStatus;
    use std::collections::BTreeSet;

    fn agent_created_at(uuid: &str, created_on: DateTime<Utc>) -> AgentRecord {
        AgentRecord {
            uuid: uuid.to_string(),
            name: "group".to_string(),
            labels: BTreeSet::new(),
            status: AgentStatus::Online,
            current_step: None,
            created_on,
        }
    }

    #[test]
    fn young_agents_are_filtered_out() {
        let now = Utc::now();
        let candidates = vec![
            agent_created_at("old", now - Duration::seconds(600)),
            agent_created_at("young", now - Duration::seconds(10)),
        ];

        let eligible = filter_cooled_down(&candidates, Duration::seconds(300), now);
        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].uuid, "old");
    }

    #[test]
    fn agent_exactly_at_cooldown_is_kept_back() {
        let now = Utc::now();
        let candidates = vec![agent_created_at("edge", now - Duration::seconds(300))];

        // created_on + cooldown == now is not strictly before now.
        let eligible = filter_cooled_down(&candidates, Duration::seconds(300), now);
        assert!(eligible.is_empty());
    }

    #[test]
    fn histogram_counts_by_status() {
        let now = Utc::now();
        let mut agents = vec![
            agent_created_at("a", now),
            agent_created_at("b", now),
        ];
        agents[1].status = AgentStatus::Offline;

        let histogram = status_histogram(&agents);
        assert_eq!(histogram.get("ONLINE"), Some(&1));
        assert_eq!(histogram.get("OFFLINE"), Some(&1));
    }
}
