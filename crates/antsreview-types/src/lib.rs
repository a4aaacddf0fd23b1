//! AntsReview Types - Canonical domain types for the peer-review escrow protocol
//!
//! This crate contains all foundational types for AntsReview with zero
//! dependencies on other antsreview crates. It defines:
//!
//! - Identity types (Address, TaskId, ContributionId, ReviewId)
//! - Opaque content references (ContentHash)
//! - Token amounts in the smallest unit (Amount)
//! - Role capabilities (Role)
//! - The injected time source (Clock)
//! - The unified error type (ReviewError)
//!
//! # Invariants
//!
//! 1. Amounts are unsigned integers, never floating point
//! 2. Content hashes are never interpreted
//! 3. Every failure is explicit and carries its category

pub mod identity;
pub mod amount;
pub mod role;
pub mod clock;
pub mod error;

pub use identity::*;
pub use amount::*;
pub use role::*;
pub use clock::*;
pub use error::*;
