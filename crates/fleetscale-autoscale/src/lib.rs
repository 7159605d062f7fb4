//! Fleet classification, scaling decisions, and per-group
//! reconciliation.
//!
//! One poll cycle for one runner group runs through three stages:
//! classify the raw agent list into online/idle/busy partitions
//! ([`classifier`]), map the partitions and the group's policy to a
//! bounded [`ScalingAction`] ([`decision`]), then execute that action
//! against the runner directory and job orchestrator with ceiling
//! re-checks, cooldown filtering, and pacing delays ([`scaler`]).
//!
//! # Scaling algorithm
//!
//! ```text
//! busy_ratio = |busy| / |online|      (0 when no agents are online)
//!
//! if online == 0 and min > 0:
//!     Bootstrap(min)                  capped by the hard agent ceiling
//!
//! if (busy_ratio > scale_up_threshold or online < min)
//!         and online <= max and total <= ceiling:
//!     desired = ceil(online * scale_up_multiplier), clipped to max
//!     ScaleUp(desired - online)       0 to create means max was reached
//!
//! if busy_ratio < scale_down_threshold and idle > min:
//!     desired = floor(idle * scale_down_multiplier), clipped up to min
//!     ScaleDown(first idle - desired entries of the idle list)
//! ```
//!
//! Agents younger than the cooldown period are never deleted, even when
//! selected; the cut happens at execution time, not decision time.
//!
//! The [`cleaner`] strategy shares the same retirement path but targets
//! agents stuck in non-online states instead of surplus idle capacity.

pub mod classifier;
pub mod cleaner;
pub mod decision;
pub mod error;
mod lifecycle;
pub mod scaler;

pub use classifier::{classify, FleetSnapshot};
pub use cleaner::Cleaner;
pub use decision::{decide, NoOpReason, ScalingAction};
pub use error::{ScaleError, ScaleResult};
pub use scaler::Scaler;
