//! Provider outcome types.

use thiserror::Error;

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Outcome of a runner directory or job orchestrator call.
///
/// `NotFound` is distinguished from other upstream failures because the
/// reconciler treats it as an idempotent success on delete paths and as
/// a create-if-missing trigger during namespace bootstrap. Everything
/// else aborts the current group's cycle.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream error: {0}")]
    Upstream(String),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguished() {
        assert!(ProviderError::NotFound("agent-1".to_string()).is_not_found());
        assert!(!ProviderError::Upstream("timeout".to_string()).is_not_found());
    }
}
