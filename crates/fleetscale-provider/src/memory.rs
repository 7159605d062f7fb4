//! Deterministic in-memory providers.
//!
//! Back the test suite and the daemon's simulation mode. Agents are
//! held per scope (workspace, or workspace plus repository, mirroring
//! the upstream API's separate registries) in insertion order, which is
//! what the directory-return ordering guarantees of the decision engine
//! are tested against.

use std::collections::{BTreeSet, HashMap, HashSet};

use base64::Engine;
use chrono::Utc;
use tokio::sync::Mutex;

use fleetscale_core::{AgentRecord, AgentStatus};

use crate::directory::{AgentCredentials, CreatedAgent, RunnerDirectory};
use crate::error::{ProviderError, ProviderResult};
use crate::orchestrator::JobOrchestrator;

use async_trait::async_trait;

fn scope_key(workspace: &str, repository: Option<&str>) -> String {
    match repository {
        Some(repo) => format!("{workspace}/{repo}"),
        None => workspace.to_string(),
    }
}

#[derive(Default)]
struct DirectoryState {
    agents: HashMap<String, Vec<AgentRecord>>,
    next_id: u64,
    failing: HashSet<String>,
}

/// In-memory [`RunnerDirectory`].
#[derive(Default)]
pub struct InMemoryDirectory {
    state: Mutex<DirectoryState>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an agent directly, bypassing `create_agent`. Test seam.
    pub async fn seed_agent(
        &self,
        workspace: &str,
        repository: Option<&str>,
        record: AgentRecord,
    ) {
        let mut state = self.state.lock().await;
        state
            .agents
            .entry(scope_key(workspace, repository))
            .or_default()
            .push(record);
    }

    /// Force `get_agents` for a workspace to fail with an upstream
    /// error. Test seam for group-isolation scenarios.
    pub async fn set_failing(&self, workspace: &str, failing: bool) {
        let mut state = self.state.lock().await;
        if failing {
            state.failing.insert(workspace.to_string());
        } else {
            state.failing.remove(workspace);
        }
    }

    pub async fn agent_count(&self, workspace: &str, repository: Option<&str>) -> usize {
        let state = self.state.lock().await;
        state
            .agents
            .get(&scope_key(workspace, repository))
            .map_or(0, Vec::len)
    }

    /// Uuids currently registered for the scope, in insertion order.
    pub async fn agent_uuids(&self, workspace: &str, repository: Option<&str>) -> Vec<String> {
        let state = self.state.lock().await;
        state
            .agents
            .get(&scope_key(workspace, repository))
            .map(|agents| agents.iter().map(|a| a.uuid.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RunnerDirectory for InMemoryDirectory {
    async fn get_agents(
        &self,
        workspace: &str,
        repository: Option<&str>,
    ) -> ProviderResult<Vec<AgentRecord>> {
        let state = self.state.lock().await;
        if state.failing.contains(workspace) {
            return Err(ProviderError::Upstream(format!(
                "directory unavailable for workspace {workspace}"
            )));
        }
        Ok(state
            .agents
            .get(&scope_key(workspace, repository))
            .cloned()
            .unwrap_or_default())
    }

    async fn create_agent(
        &self,
        workspace: &str,
        name: &str,
        labels: &BTreeSet<String>,
        repository: Option<&str>,
    ) -> ProviderResult<CreatedAgent> {
        let mut state = self.state.lock().await;
        if state.failing.contains(workspace) {
            return Err(ProviderError::Upstream(format!(
                "directory unavailable for workspace {workspace}"
            )));
        }

        state.next_id += 1;
        let uuid = format!("agent-{}", state.next_id);

        let record = AgentRecord {
            uuid: uuid.clone(),
            name: name.to_string(),
            labels: labels.clone(),
            status: AgentStatus::Online,
            current_step: None,
            created_on: Utc::now(),
        };
        state
            .agents
            .entry(scope_key(workspace, repository))
            .or_default()
            .push(record);

        let b64 = base64::engine::general_purpose::STANDARD;
        let credentials = AgentCredentials {
            account_uuid: workspace.to_string(),
            repository_uuid: repository.map(str::to_string),
            agent_uuid: uuid.clone(),
            oauth_client_id_b64: b64.encode(format!("client-{uuid}")),
            oauth_client_secret_b64: b64.encode(format!("secret-{uuid}")),
        };

        Ok(CreatedAgent { uuid, credentials })
    }

    async fn delete_agent(
        &self,
        workspace: &str,
        uuid: &str,
        repository: Option<&str>,
    ) -> ProviderResult<()> {
        let mut state = self.state.lock().await;
        let agents = state
            .agents
            .entry(scope_key(workspace, repository))
            .or_default();
        let before = agents.len();
        agents.retain(|a| a.uuid != uuid);
        if agents.len() == before {
            return Err(ProviderError::NotFound(format!("agent {uuid}")));
        }
        Ok(())
    }
}

#[derive(Default)]
struct OrchestratorState {
    namespaces: HashSet<String>,
    /// namespace -> agent uuid -> secret material.
    jobs: HashMap<String, HashMap<String, AgentCredentials>>,
    failing: HashSet<String>,
}

/// In-memory [`JobOrchestrator`].
#[derive(Default)]
pub struct InMemoryOrchestrator {
    state: Mutex<OrchestratorState>,
}

impl InMemoryOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn has_namespace(&self, namespace: &str) -> bool {
        let state = self.state.lock().await;
        state.namespaces.contains(namespace)
    }

    pub async fn job_count(&self, namespace: &str) -> usize {
        let state = self.state.lock().await;
        state.jobs.get(namespace).map_or(0, HashMap::len)
    }

    /// Remove a job behind the reconciler's back. Test seam for
    /// already-gone delete paths.
    pub async fn evict_job(&self, agent_uuid: &str, namespace: &str) {
        let mut state = self.state.lock().await;
        if let Some(jobs) = state.jobs.get_mut(namespace) {
            jobs.remove(agent_uuid);
        }
    }

    /// Force namespace lookups for `namespace` to fail with an upstream
    /// error. Test seam for fatal-namespace scenarios.
    pub async fn set_failing(&self, namespace: &str, failing: bool) {
        let mut state = self.state.lock().await;
        if failing {
            state.failing.insert(namespace.to_string());
        } else {
            state.failing.remove(namespace);
        }
    }
}

#[async_trait]
impl JobOrchestrator for InMemoryOrchestrator {
    async fn get_namespace(&self, namespace: &str) -> ProviderResult<()> {
        let state = self.state.lock().await;
        if state.failing.contains(namespace) {
            return Err(ProviderError::Upstream(format!(
                "orchestrator unavailable for namespace {namespace}"
            )));
        }
        if state.namespaces.contains(namespace) {
            Ok(())
        } else {
            Err(ProviderError::NotFound(format!("namespace {namespace}")))
        }
    }

    async fn create_namespace(&self, namespace: &str) -> ProviderResult<()> {
        let mut state = self.state.lock().await;
        state.namespaces.insert(namespace.to_string());
        Ok(())
    }

    async fn setup_job(
        &self,
        credentials: &AgentCredentials,
        namespace: &str,
    ) -> ProviderResult<()> {
        let mut state = self.state.lock().await;
        if !state.namespaces.contains(namespace) {
            return Err(ProviderError::NotFound(format!("namespace {namespace}")));
        }
        // Idempotently keyed by agent uuid.
        state
            .jobs
            .entry(namespace.to_string())
            .or_default()
            .insert(credentials.agent_uuid.clone(), credentials.clone());
        Ok(())
    }

    async fn delete_job(&self, agent_uuid: &str, namespace: &str) -> ProviderResult<()> {
        let mut state = self.state.lock().await;
        let removed = state
            .jobs
            .get_mut(namespace)
            .and_then(|jobs| jobs.remove(agent_uuid));
        if removed.is_none() {
            return Err(ProviderError::NotFound(format!(
                "job for agent {agent_uuid} in namespace {namespace}"
            )));
        }
        Ok(())
    }
}
