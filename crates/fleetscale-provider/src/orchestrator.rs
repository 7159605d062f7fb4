//! The job orchestrator contract.

use async_trait::async_trait;

use crate::directory::AgentCredentials;
use crate::error::ProviderResult;

/// Access to the compute backend that runs agents.
///
/// `setup_job` provisions whatever backing construct executes the agent
/// (typically a secret plus a job, both keyed by agent uuid). The
/// reconciler drives these calls strictly sequentially within a group.
#[async_trait]
pub trait JobOrchestrator: Send + Sync {
    /// Check that the namespace exists. Surfaces `NotFound` when it
    /// does not, which the reconciler answers with `create_namespace`.
    async fn get_namespace(&self, namespace: &str) -> ProviderResult<()>;

    /// Create the namespace.
    async fn create_namespace(&self, namespace: &str) -> ProviderResult<()>;

    /// Provision the compute job (and its secret material) for one
    /// agent.
    async fn setup_job(
        &self,
        credentials: &AgentCredentials,
        namespace: &str,
    ) -> ProviderResult<()>;

    /// Tear down the compute job for one agent. Surfaces `NotFound`
    /// when the job is already gone.
    async fn delete_job(&self, agent_uuid: &str, namespace: &str) -> ProviderResult<()>;
}
