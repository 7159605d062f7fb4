//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating the policy file.
///
/// All of these are fatal at load time: the process reports the message
/// and exits non-zero before the scheduler starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("error in configuration file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("configuration defines no runner groups")]
    NoGroups,

    #[error("groups count {count} exceeds maximum allowed count of {max}")]
    TooManyGroups { count: usize, max: usize },

    #[error("{group}: group name is not unique")]
    DuplicateGroupName { group: String },

    #[error("{group}: namespace `{namespace}` is reserved and not available")]
    ReservedNamespace { group: String, namespace: String },

    #[error("{group}: label set {labels:?} is already claimed by group `{other}`")]
    DuplicateLabels {
        group: String,
        other: String,
        labels: Vec<String>,
    },

    #[error("{group}: parameters required for strategy `percentageAgentsIdle`")]
    MissingParameters { group: String },

    #[error("{group}: {reason}")]
    InvalidParameters { group: String, reason: String },
}
