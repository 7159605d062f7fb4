//! The scaling decision function.

use fleetscale_core::constants::MAX_AGENTS_COUNT;
use fleetscale_core::{AgentRecord, ScaleParameters};

use crate::classifier::FleetSnapshot;

/// Why a cycle ended without a scaling action. The two cases log
/// differently but behave identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// A scale-up was warranted but the group already sits at `max`.
    MaxReached,
    /// Thresholds place the fleet inside the steady band.
    Steady,
}

/// The action one poll cycle should execute for one group.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalingAction {
    /// Create `count` agents for a fleet with nothing online.
    Bootstrap { count: u32 },
    /// Grow the online fleet towards `desired` by creating `count`.
    ScaleUp { desired: u32, count: u32 },
    /// Shrink the idle fleet towards `desired` by deleting the
    /// candidates, which are the leading entries of the idle list in
    /// directory-return order.
    ScaleDown {
        desired: u32,
        candidates: Vec<AgentRecord>,
    },
    /// Nothing to execute.
    NoOp { reason: NoOpReason },
}

/// How many of `want` creations fit under the hard ceiling.
///
/// The i-th creation (0-based) is allowed while `total + i` stays at or
/// below the ceiling. The executor still re-checks the live count
/// before every create, so this bound only trims obviously doomed work
/// from the plan.
fn cap_to_ceiling(want: u32, total_agents: usize) -> u32 {
    let headroom = if total_agents > MAX_AGENTS_COUNT {
        0
    } else {
        MAX_AGENTS_COUNT - total_agents + 1
    };
    (want as usize).min(headroom) as u32
}

/// Map a classified snapshot and a group's parameters to a scaling
/// action.
///
/// Total function: never fails, never performs I/O. `total_agents` is
/// the size of the raw (unclassified) agent list, which is what the
/// hard ceiling is measured against. First matching rule wins:
/// bootstrap, scale up, scale down, no-op.
pub fn decide(
    snapshot: &FleetSnapshot,
    params: &ScaleParameters,
    total_agents: usize,
) -> ScalingAction {
    let online = snapshot.online.len();
    let idle = snapshot.idle.len();

    if online == 0 && params.min > 0 {
        return ScalingAction::Bootstrap {
            count: cap_to_ceiling(params.min, total_agents),
        };
    }

    if (snapshot.busy_ratio > params.scale_up_threshold || online < params.min as usize)
        && online <= params.max as usize
        && total_agents <= MAX_AGENTS_COUNT
    {
        let desired = (online as f64 * params.scale_up_multiplier).ceil() as u32;
        let (desired, to_create) = if desired <= params.max {
            (desired, desired - online as u32)
        } else {
            (params.max, params.max - online as u32)
        };

        if to_create == 0 {
            return ScalingAction::NoOp {
                reason: NoOpReason::MaxReached,
            };
        }

        return ScalingAction::ScaleUp {
            desired,
            count: cap_to_ceiling(to_create, total_agents),
        };
    }

    if snapshot.busy_ratio < params.scale_down_threshold && idle > params.min as usize {
        let desired = (idle as f64 * params.scale_down_multiplier).floor() as u32;
        let (desired, to_delete) = if desired > params.min {
            (desired, idle as u32 - desired)
        } else {
            (params.min, idle as u32 - params.min)
        };

        // Order-preserving truncation: whatever order the directory
        // returned is the deletion order.
        let candidates = snapshot.idle[..to_delete as usize].to_vec();

        return ScalingAction::ScaleDown { desired, candidates };
    }

    ScalingAction::NoOp {
        reason: NoOpReason::Steady,
    }
}
