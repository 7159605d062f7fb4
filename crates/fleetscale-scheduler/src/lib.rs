//! The outer polling loop.
//!
//! Each tick runs one reconciliation task per configured group on the
//! tokio runtime, bounded by a semaphore sized to the maximum group
//! count, then waits for every task to finish before sleeping until the
//! next tick. A group's failure is logged and contained; it never
//! reaches a sibling group or the loop itself.

pub mod poller;

pub use poller::{Poller, TickSummary};
