//! AntsReview Roles - Capability registry and pause switch
//!
//! The registry owns three independent membership sets (admin, issuer,
//! peer reviewer) and the global pause flag. The review engine only sees it
//! through the [`CapabilityCheck`] trait.
//!
//! # Invariants
//!
//! 1. Every mutation is admin-gated
//! 2. The admin set is never empty
//! 3. Pause and unpause are guarded against repetition
//! 4. Each effective mutation emits exactly one event

pub mod registry;

pub use registry::RoleRegistry;

use antsreview_types::Address;

/// Capability checks consumed by the review engine
#[async_trait::async_trait]
pub trait CapabilityCheck: Send + Sync {
    async fn is_admin(&self, account: &Address) -> bool;

    async fn is_issuer(&self, account: &Address) -> bool;

    async fn is_peer_reviewer(&self, account: &Address) -> bool;

    async fn is_paused(&self) -> bool;
}
