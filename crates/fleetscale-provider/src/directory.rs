//! The runner directory contract.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use fleetscale_core::{AgentRecord, AgentUuid};

use crate::error::ProviderResult;

/// Secret material for one agent's backing compute job.
///
/// The OAuth client id and secret are carried base64-encoded, ready to
/// be placed into the orchestrator's secret construct as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCredentials {
    pub account_uuid: String,
    pub repository_uuid: Option<String>,
    pub agent_uuid: AgentUuid,
    pub oauth_client_id_b64: String,
    pub oauth_client_secret_b64: String,
}

/// The directory's response to a successful agent registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAgent {
    pub uuid: AgentUuid,
    pub credentials: AgentCredentials,
}

/// Access to the hosted CI provider's agent registry.
///
/// Implementations own pagination, auth, and per-request retry; the
/// reconciler only sees complete agent lists and explicit outcomes.
#[async_trait]
pub trait RunnerDirectory: Send + Sync {
    /// List all agents registered under the workspace, optionally
    /// scoped to one repository.
    async fn get_agents(
        &self,
        workspace: &str,
        repository: Option<&str>,
    ) -> ProviderResult<Vec<AgentRecord>>;

    /// Register a new agent and return its identity plus the secret
    /// material its compute job needs to connect.
    async fn create_agent(
        &self,
        workspace: &str,
        name: &str,
        labels: &BTreeSet<String>,
        repository: Option<&str>,
    ) -> ProviderResult<CreatedAgent>;

    /// Remove an agent from the registry. Surfaces `NotFound` when the
    /// agent is already gone; the caller decides whether that matters.
    async fn delete_agent(
        &self,
        workspace: &str,
        uuid: &str,
        repository: Option<&str>,
    ) -> ProviderResult<()>;
}
