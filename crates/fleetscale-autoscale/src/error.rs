//! Reconciliation error types.

use thiserror::Error;

use fleetscale_provider::ProviderError;

/// Result type alias for reconciliation operations.
pub type ScaleResult<T> = Result<T, ScaleError>;

/// Errors that abort one group's poll cycle.
///
/// None of these escape the scheduler's per-group task boundary; they
/// are logged with the group name and the group is retried next tick.
#[derive(Debug, Error)]
pub enum ScaleError {
    #[error("cannot ensure namespace {namespace}: {source}")]
    Namespace {
        namespace: String,
        source: ProviderError,
    },

    #[error("group {group} has no scaling parameters")]
    MissingParameters { group: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
