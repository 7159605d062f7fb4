//! Policy file loading and validation.
//!
//! The daemon reads a single YAML file describing global constants and
//! the runner groups. Everything here is checked at load time so the
//! reconcilers can assume well-formed, immutable input.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CONTROL_PLANE_NAMESPACE, DEFAULT_COOLDOWN_SECONDS, DEFAULT_DELETE_DELAY_SECONDS,
    DEFAULT_LABELS, DEFAULT_POLL_INTERVAL_SECONDS, DEFAULT_SETUP_DELAY_SECONDS,
    MAX_GROUPS_COUNT,
};
use crate::error::ConfigError;
use crate::policy::{GroupPolicy, ScaleParameters, Strategy};

/// Shared, overridable timing defaults. Loaded once, read-only, shared
/// by all reconcilers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConstants {
    /// Sleep between successive agent setups within one group's cycle.
    pub setup_delay_seconds: u64,
    /// Sleep between successive agent deletes within one group's cycle.
    pub delete_delay_seconds: u64,
    /// Sleep between poll ticks.
    pub poll_interval_seconds: u64,
    /// Minimum agent age before it is eligible for deletion.
    pub cooldown_seconds: u64,
}

impl Default for GlobalConstants {
    fn default() -> Self {
        Self {
            setup_delay_seconds: DEFAULT_SETUP_DELAY_SECONDS,
            delete_delay_seconds: DEFAULT_DELETE_DELAY_SECONDS,
            poll_interval_seconds: DEFAULT_POLL_INTERVAL_SECONDS,
            cooldown_seconds: DEFAULT_COOLDOWN_SECONDS,
        }
    }
}

impl GlobalConstants {
    pub fn setup_delay(&self) -> Duration {
        Duration::from_secs(self.setup_delay_seconds)
    }

    pub fn delete_delay(&self) -> Duration {
        Duration::from_secs(self.delete_delay_seconds)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Cooldown as a chrono duration, for comparing against agent
    /// creation timestamps.
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_seconds as i64)
    }
}

/// One group as written in the policy file, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    pub workspace: String,
    #[serde(default)]
    pub repository: Option<String>,
    pub namespace: String,
    #[serde(default)]
    pub labels: Vec<String>,
    pub strategy: Strategy,
    #[serde(default)]
    pub parameters: Option<ScaleParameters>,
}

/// The raw policy file: a `constants` section plus the group list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetConfig {
    #[serde(default)]
    pub constants: GlobalConstants,
    pub groups: Vec<GroupConfig>,
}

/// Validated configuration, ready to drive the scheduler.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub constants: GlobalConstants,
    pub policies: Vec<GroupPolicy>,
}

impl FleetConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Validate the raw file and produce immutable group policies.
    ///
    /// Group label sets are unioned with the mandatory default labels
    /// before the cross-group uniqueness check, since the full set is
    /// what partitions agent ownership.
    pub fn validate(self) -> Result<LoadedConfig, ConfigError> {
        if self.groups.is_empty() {
            return Err(ConfigError::NoGroups);
        }
        if self.groups.len() > MAX_GROUPS_COUNT {
            return Err(ConfigError::TooManyGroups {
                count: self.groups.len(),
                max: MAX_GROUPS_COUNT,
            });
        }

        let mut policies: Vec<GroupPolicy> = Vec::with_capacity(self.groups.len());

        for group in &self.groups {
            if policies.iter().any(|p| p.name == group.name) {
                return Err(ConfigError::DuplicateGroupName {
                    group: group.name.clone(),
                });
            }

            if group.namespace == CONTROL_PLANE_NAMESPACE {
                return Err(ConfigError::ReservedNamespace {
                    group: group.name.clone(),
                    namespace: group.namespace.clone(),
                });
            }

            let mut labels: BTreeSet<String> =
                DEFAULT_LABELS.iter().map(|l| l.to_string()).collect();
            labels.extend(group.labels.iter().cloned());

            if let Some(other) = policies.iter().find(|p| p.labels == labels) {
                return Err(ConfigError::DuplicateLabels {
                    group: group.name.clone(),
                    other: other.name.clone(),
                    labels: labels.into_iter().collect(),
                });
            }

            let parameters = match (group.strategy, &group.parameters) {
                (Strategy::PercentageAgentsIdle, Some(params)) => {
                    validate_parameters(&group.name, params)?;
                    Some(params.clone())
                }
                (Strategy::PercentageAgentsIdle, None) => {
                    return Err(ConfigError::MissingParameters {
                        group: group.name.clone(),
                    });
                }
                // Cleaner groups carry no scaling parameters.
                (Strategy::Cleaner, _) => None,
            };

            policies.push(GroupPolicy {
                name: group.name.clone(),
                workspace: group.workspace.clone(),
                repository: group.repository.clone(),
                namespace: group.namespace.clone(),
                labels,
                strategy: group.strategy,
                parameters,
            });
        }

        Ok(LoadedConfig {
            constants: self.constants,
            policies,
        })
    }
}

fn validate_parameters(group: &str, params: &ScaleParameters) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidParameters {
        group: group.to_string(),
        reason,
    };

    if params.min > params.max {
        return Err(invalid(format!(
            "min {} must not exceed max {}",
            params.min, params.max
        )));
    }
    if !(0.0..=1.0).contains(&params.scale_up_threshold) {
        return Err(invalid(format!(
            "scaleUpThreshold {} must be within [0, 1]",
            params.scale_up_threshold
        )));
    }
    if !(0.0..=1.0).contains(&params.scale_down_threshold) {
        return Err(invalid(format!(
            "scaleDownThreshold {} must be within [0, 1]",
            params.scale_down_threshold
        )));
    }
    if params.scale_up_multiplier <= 1.0 {
        return Err(invalid(format!(
            "scaleUpMultiplier {} must be greater than 1",
            params.scale_up_multiplier
        )));
    }
    if params.scale_down_multiplier <= 0.0 || params.scale_down_multiplier >= 1.0 {
        return Err(invalid(format!(
            "scaleDownMultiplier {} must be within (0, 1)",
            params.scale_down_multiplier
        )));
    }

    Ok(())
}
