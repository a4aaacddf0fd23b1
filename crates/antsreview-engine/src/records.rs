//! Task, contribution and peer-review records
//!
//! Records are owned by the engine. Contributions and reviews are
//! append-only; their flags only ever move from false to true.

use antsreview_types::{Address, Amount, ContentHash, ContributionId, ReviewId, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Contribution
// ============================================================================

/// One funding deposit toward a task's escrow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: ContributionId,
    pub contributor: Address,
    pub amount: Amount,
    pub refunded: bool,
    /// What was actually returned; below `amount` when acceptances drained the escrow
    pub refunded_amount: Amount,
    pub contributed_at: DateTime<Utc>,
}

impl Contribution {
    /// Part of the nominal amount that was never returned
    pub fn shortfall(&self) -> Amount {
        if self.refunded {
            self.amount.saturating_sub(self.refunded_amount)
        } else {
            Amount::zero()
        }
    }
}

// ============================================================================
// Peer Review
// ============================================================================

/// One reviewer's submission against a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerReview {
    pub id: ReviewId,
    pub peer_reviewer: Address,
    pub review_hash: ContentHash,
    pub accepted: bool,
    /// Amount released to the reviewer on acceptance
    pub payout: Amount,
    pub submitted_at: DateTime<Utc>,
}

// ============================================================================
// Task
// ============================================================================

/// Phase of a task, derived from its records and the current time.
///
/// Several conditions can hold at once; the most final one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Accepting contributions, submissions and acceptances
    Open,
    /// Escrow drained to zero by acceptances
    Exhausted,
    /// Deadline passed with escrow still owed to contributors
    Refundable,
    /// Closed by an issuer
    Cancelled,
}

/// A funded review request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub issuers: Vec<Address>,
    pub approvers: Vec<Address>,
    pub paper_hash: ContentHash,
    pub requirements_hash: ContentHash,
    pub deadline: DateTime<Utc>,
    pub balance: Amount,
    pub contributions: Vec<Contribution>,
    pub reviews: Vec<PeerReview>,
    pub cancelled: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub(crate) fn new(
        id: TaskId,
        issuers: Vec<Address>,
        approvers: Vec<Address>,
        paper_hash: ContentHash,
        requirements_hash: ContentHash,
        deadline: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            issuers,
            approvers,
            paper_hash,
            requirements_hash,
            deadline,
            balance: Amount::zero(),
            contributions: Vec::new(),
            reviews: Vec::new(),
            cancelled: false,
            created_at,
        }
    }

    pub fn contribution(&self, id: ContributionId) -> Option<&Contribution> {
        id.index().and_then(|i| self.contributions.get(i))
    }

    pub fn review(&self, id: ReviewId) -> Option<&PeerReview> {
        id.index().and_then(|i| self.reviews.get(i))
    }

    pub(crate) fn contribution_mut(&mut self, id: ContributionId) -> Option<&mut Contribution> {
        id.index().and_then(move |i| self.contributions.get_mut(i))
    }

    pub(crate) fn review_mut(&mut self, id: ReviewId) -> Option<&mut PeerReview> {
        id.index().and_then(move |i| self.reviews.get_mut(i))
    }

    pub fn next_contribution_id(&self) -> ContributionId {
        ContributionId::new(self.contributions.len() as u64)
    }

    pub fn next_review_id(&self) -> ReviewId {
        ReviewId::new(self.reviews.len() as u64)
    }

    /// Whether `caller` sits at `index` in the issuer list
    pub fn is_issuer_at(&self, caller: &Address, index: usize) -> bool {
        self.issuers.get(index) == Some(caller)
    }

    pub fn is_approver(&self, account: &Address) -> bool {
        self.approvers.contains(account)
    }

    pub fn has_accepted_reviews(&self) -> bool {
        self.reviews.iter().any(|r| r.accepted)
    }

    pub fn deadline_reached(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    /// Total ever pulled into escrow for this task
    pub fn total_contributed(&self) -> Option<Amount> {
        Amount::checked_sum(self.contributions.iter().map(|c| c.amount))
    }

    /// Total returned to contributors
    pub fn total_refunded(&self) -> Option<Amount> {
        Amount::checked_sum(self.contributions.iter().map(|c| c.refunded_amount))
    }

    /// Total released to accepted reviewers
    pub fn total_paid_out(&self) -> Option<Amount> {
        Amount::checked_sum(self.reviews.iter().map(|r| r.payout))
    }

    /// `balance == contributed - refunded - paid out`
    pub fn accounting_holds(&self) -> bool {
        let (Some(contributed), Some(refunded), Some(paid)) = (
            self.total_contributed(),
            self.total_refunded(),
            self.total_paid_out(),
        ) else {
            return false;
        };
        contributed
            .checked_sub(refunded)
            .and_then(|rest| rest.checked_sub(paid))
            == Some(self.balance)
    }

    pub fn status(&self, now: DateTime<Utc>) -> TaskStatus {
        if self.cancelled {
            TaskStatus::Cancelled
        } else if self.deadline_reached(now)
            && !self.balance.is_zero()
            && self.contributions.iter().any(|c| !c.refunded)
        {
            TaskStatus::Refundable
        } else if self.balance.is_zero() && self.has_accepted_reviews() {
            TaskStatus::Exhausted
        } else {
            TaskStatus::Open
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task(now: DateTime<Utc>) -> Task {
        Task::new(
            TaskId::new(0),
            vec![Address::from("0xissuer")],
            vec![Address::from("0xapprover")],
            ContentHash::from("Qm1"),
            ContentHash::from("Qm2"),
            now + Duration::days(7),
            now,
        )
    }

    fn contribution(id: u64, amount: u64, at: DateTime<Utc>) -> Contribution {
        Contribution {
            id: ContributionId::new(id),
            contributor: Address::from("0xanter"),
            amount: Amount::new(amount),
            refunded: false,
            refunded_amount: Amount::zero(),
            contributed_at: at,
        }
    }

    #[test]
    fn test_new_task_is_open_and_balanced() {
        let now = Utc::now();
        let task = task(now);

        assert_eq!(task.balance, Amount::zero());
        assert!(task.accounting_holds());
        assert_eq!(task.status(now), TaskStatus::Open);
        assert_eq!(task.next_contribution_id(), ContributionId::new(0));
        assert_eq!(task.next_review_id(), ReviewId::new(0));
    }

    #[test]
    fn test_accounting_tracks_refunds_and_payouts() {
        let now = Utc::now();
        let mut task = task(now);
        task.contributions.push(contribution(0, 100, now));
        task.balance = Amount::new(100);
        assert!(task.accounting_holds());

        task.reviews.push(PeerReview {
            id: ReviewId::new(0),
            peer_reviewer: Address::from("0xreviewer"),
            review_hash: ContentHash::from("Qm3"),
            accepted: true,
            payout: Amount::new(60),
            submitted_at: now,
        });
        task.balance = Amount::new(40);
        assert!(task.accounting_holds());

        let c = task.contribution_mut(ContributionId::new(0)).unwrap();
        c.refunded = true;
        c.refunded_amount = Amount::new(40);
        task.balance = Amount::zero();
        assert!(task.accounting_holds());
        assert_eq!(task.contributions[0].shortfall(), Amount::new(60));

        task.balance = Amount::new(1);
        assert!(!task.accounting_holds());
    }

    #[test]
    fn test_positional_issuer_check() {
        let now = Utc::now();
        let mut task = task(now);
        let co_issuer = Address::from("0xco");
        task.issuers.push(co_issuer.clone());

        assert!(task.is_issuer_at(&co_issuer, 1));
        assert!(!task.is_issuer_at(&co_issuer, 0));
        assert!(!task.is_issuer_at(&co_issuer, 5));
    }

    #[test]
    fn test_status_transitions() {
        let now = Utc::now();
        let mut task = task(now);
        task.contributions.push(contribution(0, 10, now));
        task.balance = Amount::new(10);

        assert_eq!(task.status(now), TaskStatus::Open);
        assert_eq!(task.status(task.deadline), TaskStatus::Refundable);

        task.cancelled = true;
        assert_eq!(task.status(now), TaskStatus::Cancelled);
    }

    #[test]
    fn test_exhausted_after_full_payout() {
        let now = Utc::now();
        let mut task = task(now);
        task.contributions.push(contribution(0, 10, now));
        task.reviews.push(PeerReview {
            id: ReviewId::new(0),
            peer_reviewer: Address::from("0xreviewer"),
            review_hash: ContentHash::from("Qm3"),
            accepted: true,
            payout: Amount::new(10),
            submitted_at: now,
        });

        assert_eq!(task.status(now), TaskStatus::Exhausted);
    }

    #[test]
    fn test_lookup_out_of_range() {
        let task = task(Utc::now());
        assert!(task.contribution(ContributionId::new(3)).is_none());
        assert!(task.review(ReviewId::new(0)).is_none());
    }
}
