//! Shared constants and overridable defaults.

/// Absolute upper bound on agent count per workspace, independent of any
/// group's configured `max`. Mirrors the limit enforced by the hosted CI
/// provider's API.
pub const MAX_AGENTS_COUNT: usize = 100;

/// Maximum number of runner groups a single configuration may define.
/// Also bounds the scheduler's worker pool.
pub const MAX_GROUPS_COUNT: usize = 10;

/// Namespace reserved for the autoscaler control plane itself. Runner
/// groups must not target it.
pub const CONTROL_PLANE_NAMESPACE: &str = "fleetscale-control-plane";

/// Labels attached to every agent the autoscaler manages, in addition
/// to whatever the group configures. The marker label lets operators
/// tell autoscaler-created agents apart from manually registered ones.
pub const DEFAULT_LABELS: &[&str] = &["self.hosted", "linux", "fleetscale.managed"];

/// Sleep between successive agent setups within one group's cycle.
pub const DEFAULT_SETUP_DELAY_SECONDS: u64 = 5;

/// Sleep between successive agent deletes within one group's cycle.
pub const DEFAULT_DELETE_DELAY_SECONDS: u64 = 5;

/// Sleep between poll ticks.
pub const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 10 * 60;

/// Minimum age an agent must reach before it is eligible for deletion.
pub const DEFAULT_COOLDOWN_SECONDS: u64 = 5 * 60;
