//! Reconciliation tests against the in-memory providers.
//!
//! Drives full `Scaler` and `Cleaner` cycles and asserts on the
//! resulting directory and orchestrator state: agents created or
//! retired, jobs provisioned or torn down, namespaces bootstrapped.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};

use fleetscale_autoscale::{Cleaner, Scaler};
use fleetscale_core::{
    AgentRecord, AgentStatus, GlobalConstants, GroupPolicy, ScaleParameters, Strategy,
};
use fleetscale_provider::{
    AgentCredentials, InMemoryDirectory, InMemoryOrchestrator, JobOrchestrator,
};

const WORKSPACE: &str = "acme";
const NAMESPACE: &str = "runners-test";

fn group_labels() -> BTreeSet<String> {
    ["self.hosted", "linux", "fleetscale.managed", "test"]
        .iter()
        .map(|l| l.to_string())
        .collect()
}

fn test_constants() -> Arc<GlobalConstants> {
    Arc::new(GlobalConstants {
        setup_delay_seconds: 0,
        delete_delay_seconds: 0,
        poll_interval_seconds: 0,
        cooldown_seconds: 300,
    })
}

fn scaling_policy(min: u32, max: u32) -> Arc<GroupPolicy> {
    Arc::new(GroupPolicy {
        name: "group-1".to_string(),
        workspace: WORKSPACE.to_string(),
        repository: None,
        namespace: NAMESPACE.to_string(),
        labels: group_labels(),
        strategy: Strategy::PercentageAgentsIdle,
        parameters: Some(ScaleParameters {
            min,
            max,
            scale_up_threshold: 0.5,
            scale_down_threshold: 0.2,
            scale_up_multiplier: 1.5,
            scale_down_multiplier: 0.5,
        }),
    })
}

fn cleaner_policy() -> Arc<GroupPolicy> {
    Arc::new(GroupPolicy {
        name: "sweeper".to_string(),
        workspace: WORKSPACE.to_string(),
        repository: None,
        namespace: NAMESPACE.to_string(),
        labels: group_labels(),
        strategy: Strategy::Cleaner,
        parameters: None,
    })
}

fn agent(uuid: &str, status: AgentStatus, busy: bool, age_seconds: i64) -> AgentRecord {
    AgentRecord {
        uuid: uuid.to_string(),
        name: "group-1".to_string(),
        labels: group_labels(),
        status,
        current_step: busy.then(|| "step".to_string()),
        created_on: Utc::now() - Duration::seconds(age_seconds),
    }
}

#[tokio::test]
async fn bootstrap_provisions_min_agents_and_namespace() {
    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());
    let scaler = Scaler::new(
        scaling_policy(2, 10),
        test_constants(),
        directory.clone(),
        orchestrator.clone(),
    );

    scaler.process().await.unwrap();

    assert!(orchestrator.has_namespace(NAMESPACE).await);
    assert_eq!(directory.agent_count(WORKSPACE, None).await, 2);
    assert_eq!(orchestrator.job_count(NAMESPACE).await, 2);
}

#[tokio::test]
async fn repeated_bootstrap_is_idempotent_on_namespace() {
    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());
    let scaler = Scaler::new(
        scaling_policy(1, 10),
        test_constants(),
        directory.clone(),
        orchestrator.clone(),
    );

    scaler.process().await.unwrap();
    scaler.process().await.unwrap();

    assert!(orchestrator.has_namespace(NAMESPACE).await);
    // Second cycle sees one online idle agent, inside the steady band.
    assert_eq!(directory.agent_count(WORKSPACE, None).await, 1);
}

#[tokio::test]
async fn busy_fleet_scales_up() {
    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());

    for i in 0..4 {
        directory
            .seed_agent(WORKSPACE, None, agent(&format!("busy-{i}"), AgentStatus::Online, true, 3600))
            .await;
    }

    let scaler = Scaler::new(
        scaling_policy(1, 10),
        test_constants(),
        directory.clone(),
        orchestrator.clone(),
    );
    scaler.process().await.unwrap();

    // ratio 1.0 -> desired ceil(4 * 1.5) = 6 -> two new agents.
    assert_eq!(directory.agent_count(WORKSPACE, None).await, 6);
    assert_eq!(orchestrator.job_count(NAMESPACE).await, 2);
}

#[tokio::test]
async fn scale_down_deletes_in_directory_order() {
    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());
    orchestrator.create_namespace(NAMESPACE).await.unwrap();

    for i in 1..=6 {
        let uuid = format!("a{i}");
        directory
            .seed_agent(WORKSPACE, None, agent(&uuid, AgentStatus::Online, false, 3600))
            .await;
        let credentials = AgentCredentials {
            account_uuid: WORKSPACE.to_string(),
            repository_uuid: None,
            agent_uuid: uuid.clone(),
            oauth_client_id_b64: String::new(),
            oauth_client_secret_b64: String::new(),
        };
        orchestrator.setup_job(&credentials, NAMESPACE).await.unwrap();
    }

    let scaler = Scaler::new(
        scaling_policy(1, 10),
        test_constants(),
        directory.clone(),
        orchestrator.clone(),
    );
    scaler.process().await.unwrap();

    // idle 6, desired floor(3) = 3: the first three entries in
    // directory-return order go, the tail stays.
    assert_eq!(
        directory.agent_uuids(WORKSPACE, None).await,
        vec!["a4", "a5", "a6"]
    );
    assert_eq!(orchestrator.job_count(NAMESPACE).await, 3);
}

#[tokio::test]
async fn scale_down_tolerates_already_missing_jobs() {
    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());
    orchestrator.create_namespace(NAMESPACE).await.unwrap();

    // Agents exist in the directory but none of their jobs survive.
    for i in 1..=4 {
        directory
            .seed_agent(WORKSPACE, None, agent(&format!("a{i}"), AgentStatus::Online, false, 3600))
            .await;
    }

    let scaler = Scaler::new(
        scaling_policy(1, 10),
        test_constants(),
        directory.clone(),
        orchestrator.clone(),
    );
    scaler.process().await.unwrap();

    // idle 4, desired floor(2) = 2: deletion proceeds despite the
    // orchestrator reporting every job as already gone.
    assert_eq!(directory.agent_count(WORKSPACE, None).await, 2);
}

#[tokio::test]
async fn cooldown_blocks_executed_deletions() {
    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());

    // Three idle agents created seconds ago, cooldown five minutes.
    for i in 1..=3 {
        directory
            .seed_agent(WORKSPACE, None, agent(&format!("a{i}"), AgentStatus::Online, false, 10))
            .await;
    }

    let scaler = Scaler::new(
        scaling_policy(1, 10),
        test_constants(),
        directory.clone(),
        orchestrator.clone(),
    );
    scaler.process().await.unwrap();

    // The decision selected candidates, the cooldown filter dropped
    // them all: executed deletions must be zero.
    assert_eq!(directory.agent_count(WORKSPACE, None).await, 3);
}

#[tokio::test]
async fn executor_recheck_stops_creation_at_the_ceiling() {
    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());

    // The scope already holds 100 agents owned by other label sets.
    for i in 0..100 {
        let mut foreign = agent(&format!("foreign-{i}"), AgentStatus::Online, false, 3600);
        foreign.labels = ["other"].iter().map(|l| l.to_string()).collect();
        directory.seed_agent(WORKSPACE, None, foreign).await;
    }

    let scaler = Scaler::new(
        scaling_policy(2, 10),
        test_constants(),
        directory.clone(),
        orchestrator.clone(),
    );
    scaler.process().await.unwrap();

    // Bootstrap fires (nothing online for this group) but the live
    // count is already at the ceiling, so nothing is created.
    assert_eq!(directory.agent_count(WORKSPACE, None).await, 100);
    assert_eq!(orchestrator.job_count(NAMESPACE).await, 0);
}

#[tokio::test]
async fn namespace_upstream_error_aborts_the_cycle() {
    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());
    orchestrator.set_failing(NAMESPACE, true).await;

    let scaler = Scaler::new(
        scaling_policy(2, 10),
        test_constants(),
        directory.clone(),
        orchestrator.clone(),
    );

    let err = scaler.process().await.unwrap_err();
    assert!(err.to_string().contains(NAMESPACE));
    // The cycle never reached the creation step.
    assert_eq!(directory.agent_count(WORKSPACE, None).await, 0);
}

#[tokio::test]
async fn repository_scoped_group_targets_its_own_registry() {
    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());

    let mut policy = (*scaling_policy(1, 10)).clone();
    policy.repository = Some("widget".to_string());
    let scaler = Scaler::new(
        Arc::new(policy),
        test_constants(),
        directory.clone(),
        orchestrator.clone(),
    );

    scaler.process().await.unwrap();

    assert_eq!(directory.agent_count(WORKSPACE, Some("widget")).await, 1);
    assert_eq!(directory.agent_count(WORKSPACE, None).await, 0);
}

#[tokio::test]
async fn cleaner_retires_only_non_online_agents() {
    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());
    orchestrator.create_namespace(NAMESPACE).await.unwrap();

    directory
        .seed_agent(WORKSPACE, None, agent("live-1", AgentStatus::Online, true, 3600))
        .await;
    directory
        .seed_agent(WORKSPACE, None, agent("stale-1", AgentStatus::Offline, false, 3600))
        .await;
    directory
        .seed_agent(WORKSPACE, None, agent("stale-2", AgentStatus::Unregistered, false, 3600))
        .await;

    let cleaner = Cleaner::new(
        cleaner_policy(),
        test_constants(),
        directory.clone(),
        orchestrator.clone(),
    );
    cleaner.process().await.unwrap();

    assert_eq!(directory.agent_uuids(WORKSPACE, None).await, vec!["live-1"]);
}

#[tokio::test]
async fn cleaner_honors_the_cooldown() {
    let directory = Arc::new(InMemoryDirectory::new());
    let orchestrator = Arc::new(InMemoryOrchestrator::new());

    // Freshly created and not yet registered: still inside the
    // cooldown window, so the cleaner must leave it alone.
    directory
        .seed_agent(WORKSPACE, None, agent("fresh", AgentStatus::Unregistered, false, 10))
        .await;

    let cleaner = Cleaner::new(
        cleaner_policy(),
        test_constants(),
        directory.clone(),
        orchestrator.clone(),
    );
    cleaner.process().await.unwrap();

    assert_eq!(directory.agent_count(WORKSPACE, None).await, 1);
}
