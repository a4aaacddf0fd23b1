//! AntsReview Events - Observational change notifications
//!
//! Every committed mutation in the role registry or the review engine
//! appends exactly one [`ProtocolEvent`] (cancellation also appends one
//! per refunded contribution) to the shared [`EventLog`]. Observers never
//! mutate protocol state.
//!
//! ```text
//! RoleRegistry ─┐
//!               ├─→ EventLog (append-only, sequenced) ─→ broadcast subscribers
//! ReviewEngine ─┘                                  └──→ replay via since(seq)
//! ```
//!
//! Subscribers must tolerate replay and gaps (a lagging broadcast receiver
//! drops messages). The engine's query surface is always authoritative.

pub mod event;
pub mod log;

pub use event::ProtocolEvent;
pub use log::{EventLog, RecordedEvent, DEFAULT_EVENT_BUFFER};
