//! AntsReview Engine - The review/escrow workflow
//!
//! The engine owns every Task, Contribution and PeerReview record. It asks
//! the [`CapabilityCheck`] registry for authorisation, moves funds through
//! an [`EscrowLedger`], and records one event per committed mutation.
//!
//! # Invariants
//!
//! 1. `balance == contributed - refunded - paid out` for every task
//! 2. A contribution is refunded at most once, by its contributor, after the deadline
//! 3. A review is accepted at most once, by one of the task's approvers
//! 4. A failed operation mutates nothing and emits nothing
//! 5. Operations on the same task are serialised; different tasks never contend
//!
//! [`CapabilityCheck`]: antsreview_roles::CapabilityCheck
//! [`EscrowLedger`]: antsreview_ledger::EscrowLedger

pub mod records;
pub mod engine;
pub mod query;

pub use engine::ReviewEngine;
pub use records::{Contribution, PeerReview, Task, TaskStatus};
