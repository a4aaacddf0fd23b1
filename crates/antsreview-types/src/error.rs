//! Error types for AntsReview
//!
//! Every failure is explicit and caller-visible. A failed operation never
//! mutates a record and never emits an event.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{Address, ContributionId, ReviewId, TaskId};

/// Result type for AntsReview operations
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Broad classification of a [`ReviewError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller lacks the capability or positional relationship
    Authorization,
    /// Valid in principle, but the record is in the wrong state
    State,
    /// Requested amount exceeds available funds
    Resource,
    /// Referenced record does not exist
    NotFound,
    /// Malformed input
    Validation,
}

/// AntsReview error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    // ========================================================================
    // Authorization Errors
    // ========================================================================

    /// Caller is not an admin
    #[error("{caller} is not an admin and cannot {action}")]
    NotAuthorized { caller: Address, action: String },

    /// Caller is not a registered issuer, or not the task issuer at the given position
    #[error("{caller} is not an issuer{}", task_scope(.task_id))]
    NotIssuer {
        caller: Address,
        task_id: Option<TaskId>,
    },

    /// Caller is not among the task's approvers
    #[error("{caller} is not an approver of {task_id}")]
    NotApprover { caller: Address, task_id: TaskId },

    /// Caller did not submit the review
    #[error("{caller} did not submit {review_id} of {task_id}")]
    NotSubmitter {
        caller: Address,
        task_id: TaskId,
        review_id: ReviewId,
    },

    /// Caller is not a registered peer reviewer
    #[error("{caller} is not a peer reviewer")]
    NotPeerReviewer { caller: Address },

    /// Caller did not make the contribution
    #[error("{caller} is not the contributor of {contribution_id} of {task_id}")]
    NotContributor {
        caller: Address,
        task_id: TaskId,
        contribution_id: ContributionId,
    },

    // ========================================================================
    // State Errors
    // ========================================================================

    /// Contribution was already refunded
    #[error("{contribution_id} of {task_id} has already been refunded")]
    AlreadyRefunded {
        task_id: TaskId,
        contribution_id: ContributionId,
    },

    /// Review was already accepted
    #[error("{review_id} of {task_id} has already been accepted")]
    AlreadyAccepted { task_id: TaskId, review_id: ReviewId },

    /// Refund attempted before the task deadline
    #[error("{task_id} deadline {deadline} has not been reached")]
    DeadlineNotReached {
        task_id: TaskId,
        deadline: DateTime<Utc>,
    },

    /// Deadline is not strictly in the future
    #[error("deadline {deadline} is not after {now}")]
    InvalidDeadline {
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    /// Protocol is paused
    #[error("protocol is paused")]
    SystemPaused,

    /// Pause requested while already paused
    #[error("protocol is already paused")]
    AlreadyPaused,

    /// Unpause requested while not paused
    #[error("protocol is not paused")]
    NotPaused,

    /// Task was cancelled and is closed to mutation
    #[error("{task_id} has been cancelled")]
    TaskCancelled { task_id: TaskId },

    /// Task cannot be cancelled once a review has been paid
    #[error("{task_id} has accepted reviews and cannot be cancelled")]
    ReviewsAlreadyAccepted { task_id: TaskId },

    /// Removing this admin would leave the registry without one
    #[error("{account} is the last admin")]
    LastAdmin { account: Address },

    // ========================================================================
    // Resource Errors
    // ========================================================================

    /// Account balance on the external ledger is too low
    #[error("insufficient balance for {account}: have {available}, need {required}")]
    InsufficientBalance {
        account: Address,
        available: u64,
        required: u64,
    },

    /// Escrow has not been approved to pull enough from the account
    #[error("insufficient allowance from {account}: have {available}, need {required}")]
    InsufficientAllowance {
        account: Address,
        available: u64,
        required: u64,
    },

    /// Payout exceeds the task's escrow balance
    #[error("insufficient balance in {task_id}: have {available}, need {required}")]
    InsufficientTaskBalance {
        task_id: TaskId,
        available: u64,
        required: u64,
    },

    /// Aggregate custody cannot cover a payout
    #[error("insufficient custody balance: have {available}, need {required}")]
    InsufficientCustodyBalance { available: u64, required: u64 },

    /// External ledger rejected or could not process the transfer
    #[error("ledger unavailable: {message}")]
    LedgerUnavailable { message: String },

    /// Arithmetic overflow in balance accounting
    #[error("amount overflow")]
    AmountOverflow,

    // ========================================================================
    // Lookup Errors
    // ========================================================================

    #[error("{task_id} not found")]
    TaskNotFound { task_id: TaskId },

    #[error("{contribution_id} of {task_id} not found")]
    ContributionNotFound {
        task_id: TaskId,
        contribution_id: ContributionId,
    },

    #[error("{review_id} of {task_id} not found")]
    ReviewNotFound { task_id: TaskId, review_id: ReviewId },

    #[error("{task_id} has no approver at index {index}")]
    ApproverNotFound { task_id: TaskId, index: usize },

    #[error("{task_id} has no issuer at index {index}")]
    IssuerNotFound { task_id: TaskId, index: usize },

    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("invalid task: {message}")]
    InvalidTask { message: String },
}

fn task_scope(task_id: &Option<TaskId>) -> String {
    match task_id {
        Some(id) => format!(" of {}", id),
        None => String::new(),
    }
}

impl ReviewError {
    /// Classification used by callers to decide how to react
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotAuthorized { .. }
            | Self::NotIssuer { .. }
            | Self::NotApprover { .. }
            | Self::NotSubmitter { .. }
            | Self::NotPeerReviewer { .. }
            | Self::NotContributor { .. } => ErrorCategory::Authorization,

            Self::AlreadyRefunded { .. }
            | Self::AlreadyAccepted { .. }
            | Self::DeadlineNotReached { .. }
            | Self::InvalidDeadline { .. }
            | Self::SystemPaused
            | Self::AlreadyPaused
            | Self::NotPaused
            | Self::TaskCancelled { .. }
            | Self::ReviewsAlreadyAccepted { .. }
            | Self::LastAdmin { .. } => ErrorCategory::State,

            Self::InsufficientBalance { .. }
            | Self::InsufficientAllowance { .. }
            | Self::InsufficientTaskBalance { .. }
            | Self::InsufficientCustodyBalance { .. }
            | Self::LedgerUnavailable { .. }
            | Self::AmountOverflow => ErrorCategory::Resource,

            Self::TaskNotFound { .. }
            | Self::ContributionNotFound { .. }
            | Self::ReviewNotFound { .. }
            | Self::ApproverNotFound { .. }
            | Self::IssuerNotFound { .. } => ErrorCategory::NotFound,

            Self::InvalidAmount { .. } | Self::InvalidTask { .. } => ErrorCategory::Validation,
        }
    }

    /// Shorthand for an admin-gated action refused to `caller`
    pub fn not_admin(caller: &Address, action: impl Into<String>) -> Self {
        Self::NotAuthorized {
            caller: caller.clone(),
            action: action.into(),
        }
    }
}
