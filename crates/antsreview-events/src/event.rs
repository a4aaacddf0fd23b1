//! Protocol events emitted after committed mutations

use antsreview_types::{Address, Amount, ContentHash, ContributionId, ReviewId, Role, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Protocol-wide events emitted by the registry and the review engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProtocolEvent {
    // ====================================================================
    // Role Registry
    // ====================================================================

    /// An address gained a role
    RoleGranted {
        role: Role,
        account: Address,
        sender: Address,
    },

    /// An address lost a role
    RoleRevoked {
        role: Role,
        account: Address,
        sender: Address,
    },

    /// Engine mutations are suspended
    Paused { account: Address },

    /// Engine mutations are resumed
    Unpaused { account: Address },

    // ====================================================================
    // Review Task Engine
    // ====================================================================

    /// A review task was created
    TaskIssued {
        task_id: TaskId,
        issuers: Vec<Address>,
        approvers: Vec<Address>,
        paper_hash: ContentHash,
        requirements_hash: ContentHash,
        deadline: DateTime<Utc>,
        sender: Address,
    },

    /// Paper, requirements, deadline and issuer list were replaced
    TaskChanged {
        task_id: TaskId,
        issuers: Vec<Address>,
        paper_hash: ContentHash,
        requirements_hash: ContentHash,
        deadline: DateTime<Utc>,
        sender: Address,
    },

    /// An approver was appended to a task
    ApproverAdded {
        task_id: TaskId,
        approver: Address,
        sender: Address,
    },

    /// Funds were pulled into a task's escrow
    ContributionAdded {
        task_id: TaskId,
        contribution_id: ContributionId,
        contributor: Address,
        amount: Amount,
    },

    /// A contribution was returned to its contributor.
    ///
    /// `shortfall` is the part of the nominal contribution that could not be
    /// returned because acceptances had already consumed the escrow.
    ContributionRefunded {
        task_id: TaskId,
        contribution_id: ContributionId,
        contributor: Address,
        amount: Amount,
        shortfall: Amount,
    },

    /// A peer reviewer submitted a review
    ReviewFulfilled {
        task_id: TaskId,
        review_id: ReviewId,
        peer_reviewer: Address,
        review_hash: ContentHash,
    },

    /// A submitter replaced their review content
    ReviewUpdated {
        task_id: TaskId,
        review_id: ReviewId,
        review_hash: ContentHash,
    },

    /// An approver accepted a review and paid the reviewer
    ReviewAccepted {
        task_id: TaskId,
        review_id: ReviewId,
        approver: Address,
        peer_reviewer: Address,
        amount: Amount,
    },

    /// An issuer closed the task and every open contribution was returned
    TaskCancelled {
        task_id: TaskId,
        sender: Address,
        refunded: Amount,
    },
}

impl ProtocolEvent {
    /// The task this event concerns, if any
    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            Self::RoleGranted { .. }
            | Self::RoleRevoked { .. }
            | Self::Paused { .. }
            | Self::Unpaused { .. } => None,
            Self::TaskIssued { task_id, .. }
            | Self::TaskChanged { task_id, .. }
            | Self::ApproverAdded { task_id, .. }
            | Self::ContributionAdded { task_id, .. }
            | Self::ContributionRefunded { task_id, .. }
            | Self::ReviewFulfilled { task_id, .. }
            | Self::ReviewUpdated { task_id, .. }
            | Self::ReviewAccepted { task_id, .. }
            | Self::TaskCancelled { task_id, .. } => Some(*task_id),
        }
    }

    /// Event name as it appears in the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            Self::RoleGranted { .. } => "RoleGranted",
            Self::RoleRevoked { .. } => "RoleRevoked",
            Self::Paused { .. } => "Paused",
            Self::Unpaused { .. } => "Unpaused",
            Self::TaskIssued { .. } => "TaskIssued",
            Self::TaskChanged { .. } => "TaskChanged",
            Self::ApproverAdded { .. } => "ApproverAdded",
            Self::ContributionAdded { .. } => "ContributionAdded",
            Self::ContributionRefunded { .. } => "ContributionRefunded",
            Self::ReviewFulfilled { .. } => "ReviewFulfilled",
            Self::ReviewUpdated { .. } => "ReviewUpdated",
            Self::ReviewAccepted { .. } => "ReviewAccepted",
            Self::TaskCancelled { .. } => "TaskCancelled",
        }
    }

    /// Get a short description for logging
    pub fn summary(&self) -> String {
        match self {
            Self::RoleGranted { role, account, .. } => {
                format!("{} granted {}", account, role)
            }
            Self::RoleRevoked { role, account, .. } => {
                format!("{} revoked {}", account, role)
            }
            Self::Paused { account } => format!("Paused by {}", account),
            Self::Unpaused { account } => format!("Unpaused by {}", account),
            Self::TaskIssued { task_id, deadline, .. } => {
                format!("{} issued (deadline {})", task_id, deadline.format("%Y-%m-%d"))
            }
            Self::TaskChanged { task_id, .. } => format!("{} changed", task_id),
            Self::ApproverAdded { task_id, approver, .. } => {
                format!("{}: approver {} added", task_id, approver)
            }
            Self::ContributionAdded { task_id, contributor, amount, .. } => {
                format!("{}: {} contributed {}", task_id, contributor, amount)
            }
            Self::ContributionRefunded { task_id, contributor, amount, shortfall, .. } => {
                if shortfall.is_zero() {
                    format!("{}: {} refunded {}", task_id, contributor, amount)
                } else {
                    format!(
                        "{}: {} refunded {} (shortfall {})",
                        task_id, contributor, amount, shortfall
                    )
                }
            }
            Self::ReviewFulfilled { task_id, review_id, peer_reviewer, .. } => {
                format!("{}: {} submitted by {}", task_id, review_id, peer_reviewer)
            }
            Self::ReviewUpdated { task_id, review_id, .. } => {
                format!("{}: {} updated", task_id, review_id)
            }
            Self::ReviewAccepted { task_id, review_id, peer_reviewer, amount, .. } => {
                format!("{}: {} accepted, {} paid {}", task_id, review_id, peer_reviewer, amount)
            }
            Self::TaskCancelled { task_id, refunded, .. } => {
                format!("{} cancelled, {} returned", task_id, refunded)
            }
        }
    }
}
