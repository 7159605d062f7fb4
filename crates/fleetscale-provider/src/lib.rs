//! Provider seams for the fleetscale autoscaler.
//!
//! The decision engine never talks to the hosted CI provider or the
//! container orchestrator directly. It sees them through two narrow
//! traits: [`RunnerDirectory`] (list/create/delete agents) and
//! [`JobOrchestrator`] (namespace init, create/delete the compute job
//! backing an agent). "Not found" is an explicit outcome on
//! [`ProviderError`] rather than an exception class, because for delete
//! and bootstrap paths it is routine control flow.
//!
//! The in-memory implementations back the test suite and the daemon's
//! simulation mode. Production deployments supply their own
//! implementations of the same traits.

pub mod directory;
pub mod error;
pub mod memory;
pub mod orchestrator;

pub use directory::{AgentCredentials, CreatedAgent, RunnerDirectory};
pub use error::{ProviderError, ProviderResult};
pub use memory::{InMemoryDirectory, InMemoryOrchestrator};
pub use orchestrator::JobOrchestrator;
