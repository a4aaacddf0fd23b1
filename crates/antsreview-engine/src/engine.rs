//! Review Task Engine
//!
//! Every operation runs inside the mutual-exclusion section of the task it
//! touches: checks, the ledger movement, the record mutation and the event
//! all happen under one lock, so a failure leaves no trace. Operations on
//! different tasks never contend.

use std::sync::Arc;

use antsreview_events::{EventLog, ProtocolEvent};
use antsreview_ledger::EscrowLedger;
use antsreview_roles::CapabilityCheck;
use antsreview_types::{
    Address, Amount, Clock, ContentHash, ContributionId, ReviewError, ReviewId, Result, TaskId,
};
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::records::{Contribution, PeerReview, Task};

/// Shared handle to one task's critical section
pub(crate) type TaskHandle = Arc<Mutex<Task>>;

/// The review/escrow workflow engine
pub struct ReviewEngine {
    tasks: RwLock<Vec<TaskHandle>>,
    registry: Arc<dyn CapabilityCheck>,
    escrow: Arc<dyn EscrowLedger>,
    events: Arc<EventLog>,
    clock: Arc<dyn Clock>,
}

impl ReviewEngine {
    pub fn new(
        registry: Arc<dyn CapabilityCheck>,
        escrow: Arc<dyn EscrowLedger>,
        events: Arc<EventLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tasks: RwLock::new(Vec::new()),
            registry,
            escrow,
            events,
            clock,
        }
    }

    // ========================================================================
    // Task lifecycle
    // ========================================================================

    /// Create a task. The caller must be a registered issuer.
    pub async fn issue_ant_review(
        &self,
        caller: &Address,
        issuers: Vec<Address>,
        approvers: Vec<Address>,
        paper_hash: ContentHash,
        requirements_hash: ContentHash,
        deadline: DateTime<Utc>,
    ) -> Result<TaskId> {
        self.ensure_running().await?;
        if !self.registry.is_issuer(caller).await {
            warn!(caller = %caller, "issue rejected: not an issuer");
            return Err(ReviewError::NotIssuer {
                caller: caller.clone(),
                task_id: None,
            });
        }
        validate_parties(&issuers, "issuer")?;
        validate_parties(&approvers, "approver")?;
        validate_hashes(&paper_hash, &requirements_hash)?;
        let now = self.clock.now();
        validate_deadline(deadline, now)?;

        let mut tasks = self.tasks.write().await;
        self.ensure_running().await?;
        let task_id = TaskId::new(tasks.len() as u64);
        let task = Task::new(
            task_id,
            issuers.clone(),
            approvers.clone(),
            paper_hash.clone(),
            requirements_hash.clone(),
            deadline,
            now,
        );
        tasks.push(Arc::new(Mutex::new(task)));

        self.events
            .record(ProtocolEvent::TaskIssued {
                task_id,
                issuers,
                approvers,
                paper_hash,
                requirements_hash,
                deadline,
                sender: caller.clone(),
            })
            .await;
        info!(task_id = %task_id, caller = %caller, deadline = %deadline, "task issued");
        Ok(task_id)
    }

    /// Replace issuers, content references and deadline in one step.
    ///
    /// Authorised positionally: `caller` must sit at `issuer_index`.
    #[allow(clippy::too_many_arguments)]
    pub async fn change_ant_review(
        &self,
        caller: &Address,
        task_id: TaskId,
        issuer_index: usize,
        issuers: Vec<Address>,
        paper_hash: ContentHash,
        requirements_hash: ContentHash,
        deadline: DateTime<Utc>,
    ) -> Result<()> {
        self.ensure_running().await?;
        let handle = self.task_handle(task_id).await?;
        let mut task = handle.lock().await;
        self.ensure_running().await?;

        require_issuer_at(&task, caller, issuer_index)?;
        require_open(&task)?;
        validate_parties(&issuers, "issuer")?;
        validate_hashes(&paper_hash, &requirements_hash)?;
        validate_deadline(deadline, self.clock.now())?;

        task.issuers = issuers.clone();
        task.paper_hash = paper_hash.clone();
        task.requirements_hash = requirements_hash.clone();
        task.deadline = deadline;

        self.events
            .record(ProtocolEvent::TaskChanged {
                task_id,
                issuers,
                paper_hash,
                requirements_hash,
                deadline,
                sender: caller.clone(),
            })
            .await;
        info!(task_id = %task_id, caller = %caller, deadline = %deadline, "task changed");
        Ok(())
    }

    /// Append an approver; existing approvers are kept
    pub async fn add_approver(
        &self,
        caller: &Address,
        task_id: TaskId,
        issuer_index: usize,
        approver: Address,
    ) -> Result<()> {
        self.ensure_running().await?;
        let handle = self.task_handle(task_id).await?;
        let mut task = handle.lock().await;
        self.ensure_running().await?;

        require_issuer_at(&task, caller, issuer_index)?;
        require_open(&task)?;

        task.approvers.push(approver.clone());

        self.events
            .record(ProtocolEvent::ApproverAdded {
                task_id,
                approver: approver.clone(),
                sender: caller.clone(),
            })
            .await;
        info!(task_id = %task_id, caller = %caller, approver = %approver, "approver added");
        Ok(())
    }

    /// Close the task and return every open contribution to its contributor.
    ///
    /// Only possible while no review has been accepted. Returns the total
    /// refunded.
    pub async fn cancel_ant_review(&self, caller: &Address, task_id: TaskId) -> Result<Amount> {
        self.ensure_running().await?;
        let handle = self.task_handle(task_id).await?;
        let mut task = handle.lock().await;
        self.ensure_running().await?;

        if !task.issuers.contains(caller) {
            warn!(task_id = %task_id, caller = %caller, "cancel rejected: not an issuer");
            return Err(ReviewError::NotIssuer {
                caller: caller.clone(),
                task_id: Some(task_id),
            });
        }
        require_open(&task)?;
        if task.has_accepted_reviews() {
            return Err(ReviewError::ReviewsAlreadyAccepted { task_id });
        }

        let mut remaining = task.balance;
        let mut refunds: Vec<(ContributionId, Address, Amount)> = Vec::new();
        for c in task.contributions.iter().filter(|c| !c.refunded) {
            let paid = c.amount.min(remaining);
            remaining = remaining.saturating_sub(paid);
            refunds.push((c.id, c.contributor.clone(), paid));
        }
        let payouts: Vec<(Address, Amount)> = refunds
            .iter()
            .filter(|(_, _, paid)| !paid.is_zero())
            .map(|(_, to, paid)| (to.clone(), *paid))
            .collect();
        let total = task
            .balance
            .checked_sub(remaining)
            .ok_or(ReviewError::AmountOverflow)?;

        self.escrow.push_batch(&payouts).await?;

        for (id, _, paid) in &refunds {
            if let Some(c) = task.contribution_mut(*id) {
                c.refunded = true;
                c.refunded_amount = *paid;
            }
        }
        task.balance = remaining;
        task.cancelled = true;
        debug_assert!(task.accounting_holds());

        for (id, contributor, paid) in refunds {
            let shortfall = task
                .contribution(id)
                .map(Contribution::shortfall)
                .unwrap_or_default();
            self.events
                .record(ProtocolEvent::ContributionRefunded {
                    task_id,
                    contribution_id: id,
                    contributor,
                    amount: paid,
                    shortfall,
                })
                .await;
        }
        self.events
            .record(ProtocolEvent::TaskCancelled {
                task_id,
                sender: caller.clone(),
                refunded: total,
            })
            .await;
        info!(task_id = %task_id, caller = %caller, refunded = total.0, "task cancelled");
        Ok(total)
    }

    // ========================================================================
    // Funding
    // ========================================================================

    /// Pull `amount` from the caller into the task's escrow
    pub async fn contribute(
        &self,
        caller: &Address,
        task_id: TaskId,
        amount: Amount,
    ) -> Result<ContributionId> {
        self.ensure_running().await?;
        if amount.is_zero() {
            return Err(ReviewError::InvalidAmount {
                message: "contribution must be positive".to_string(),
            });
        }
        let handle = self.task_handle(task_id).await?;
        let mut task = handle.lock().await;
        self.ensure_running().await?;

        require_open(&task)?;
        let balance = task
            .balance
            .checked_add(amount)
            .ok_or(ReviewError::AmountOverflow)?;

        self.escrow.pull(caller, amount).await?;

        let contribution_id = task.next_contribution_id();
        task.contributions.push(Contribution {
            id: contribution_id,
            contributor: caller.clone(),
            amount,
            refunded: false,
            refunded_amount: Amount::zero(),
            contributed_at: self.clock.now(),
        });
        task.balance = balance;
        debug_assert!(task.accounting_holds());

        self.events
            .record(ProtocolEvent::ContributionAdded {
                task_id,
                contribution_id,
                contributor: caller.clone(),
                amount,
            })
            .await;
        info!(
            task_id = %task_id,
            contribution_id = %contribution_id,
            caller = %caller,
            amount = amount.0,
            balance = balance.0,
            "contribution added"
        );
        Ok(contribution_id)
    }

    /// Return a contribution after the deadline.
    ///
    /// Pays at most the task's remaining balance; returns what was paid.
    pub async fn refund(
        &self,
        caller: &Address,
        task_id: TaskId,
        contribution_id: ContributionId,
    ) -> Result<Amount> {
        self.ensure_running().await?;
        let handle = self.task_handle(task_id).await?;
        let mut task = handle.lock().await;
        self.ensure_running().await?;

        let contribution = task
            .contribution(contribution_id)
            .ok_or(ReviewError::ContributionNotFound {
                task_id,
                contribution_id,
            })?;
        if &contribution.contributor != caller {
            warn!(task_id = %task_id, caller = %caller, "refund rejected: not the contributor");
            return Err(ReviewError::NotContributor {
                caller: caller.clone(),
                task_id,
                contribution_id,
            });
        }
        if contribution.refunded {
            return Err(ReviewError::AlreadyRefunded {
                task_id,
                contribution_id,
            });
        }
        if !task.deadline_reached(self.clock.now()) {
            return Err(ReviewError::DeadlineNotReached {
                task_id,
                deadline: task.deadline,
            });
        }

        let amount = contribution.amount;
        let paid = amount.min(task.balance);
        let shortfall = amount.saturating_sub(paid);
        if !paid.is_zero() {
            self.escrow.push(caller, paid).await?;
        }

        task.balance = task.balance.saturating_sub(paid);
        if let Some(c) = task.contribution_mut(contribution_id) {
            c.refunded = true;
            c.refunded_amount = paid;
        }
        debug_assert!(task.accounting_holds());

        self.events
            .record(ProtocolEvent::ContributionRefunded {
                task_id,
                contribution_id,
                contributor: caller.clone(),
                amount: paid,
                shortfall,
            })
            .await;
        if shortfall.is_zero() {
            info!(task_id = %task_id, contribution_id = %contribution_id, caller = %caller, amount = paid.0, "contribution refunded");
        } else {
            warn!(
                task_id = %task_id,
                contribution_id = %contribution_id,
                caller = %caller,
                amount = paid.0,
                shortfall = shortfall.0,
                "contribution refunded with shortfall"
            );
        }
        Ok(paid)
    }

    // ========================================================================
    // Reviews
    // ========================================================================

    /// Submit a review. The caller must be a registered peer reviewer.
    pub async fn fulfill_ant_review(
        &self,
        caller: &Address,
        task_id: TaskId,
        review_hash: ContentHash,
    ) -> Result<ReviewId> {
        self.ensure_running().await?;
        if !self.registry.is_peer_reviewer(caller).await {
            warn!(task_id = %task_id, caller = %caller, "fulfil rejected: not a peer reviewer");
            return Err(ReviewError::NotPeerReviewer {
                caller: caller.clone(),
            });
        }
        validate_hash(&review_hash, "review")?;
        let handle = self.task_handle(task_id).await?;
        let mut task = handle.lock().await;
        self.ensure_running().await?;

        require_open(&task)?;

        let review_id = task.next_review_id();
        task.reviews.push(PeerReview {
            id: review_id,
            peer_reviewer: caller.clone(),
            review_hash: review_hash.clone(),
            accepted: false,
            payout: Amount::zero(),
            submitted_at: self.clock.now(),
        });

        self.events
            .record(ProtocolEvent::ReviewFulfilled {
                task_id,
                review_id,
                peer_reviewer: caller.clone(),
                review_hash,
            })
            .await;
        info!(task_id = %task_id, review_id = %review_id, caller = %caller, "review fulfilled");
        Ok(review_id)
    }

    /// Replace the content of a review. Only its submitter may do this.
    pub async fn update_review(
        &self,
        caller: &Address,
        task_id: TaskId,
        review_id: ReviewId,
        review_hash: ContentHash,
    ) -> Result<()> {
        self.ensure_running().await?;
        validate_hash(&review_hash, "review")?;
        let handle = self.task_handle(task_id).await?;
        let mut task = handle.lock().await;
        self.ensure_running().await?;

        let review = task
            .review(review_id)
            .ok_or(ReviewError::ReviewNotFound { task_id, review_id })?;
        if &review.peer_reviewer != caller {
            warn!(task_id = %task_id, review_id = %review_id, caller = %caller, "update rejected: not the submitter");
            return Err(ReviewError::NotSubmitter {
                caller: caller.clone(),
                task_id,
                review_id,
            });
        }
        require_open(&task)?;

        if let Some(review) = task.review_mut(review_id) {
            review.review_hash = review_hash.clone();
        }

        self.events
            .record(ProtocolEvent::ReviewUpdated {
                task_id,
                review_id,
                review_hash,
            })
            .await;
        info!(task_id = %task_id, review_id = %review_id, caller = %caller, "review updated");
        Ok(())
    }

    /// Accept a review and release `amount` of the escrow to its submitter
    pub async fn accept_ant_review(
        &self,
        caller: &Address,
        task_id: TaskId,
        review_id: ReviewId,
        amount: Amount,
    ) -> Result<()> {
        self.ensure_running().await?;
        let handle = self.task_handle(task_id).await?;
        let mut task = handle.lock().await;
        self.ensure_running().await?;

        if !task.is_approver(caller) {
            warn!(task_id = %task_id, caller = %caller, "accept rejected: not an approver");
            return Err(ReviewError::NotApprover {
                caller: caller.clone(),
                task_id,
            });
        }
        require_open(&task)?;
        let review = task
            .review(review_id)
            .ok_or(ReviewError::ReviewNotFound { task_id, review_id })?;
        if review.accepted {
            return Err(ReviewError::AlreadyAccepted { task_id, review_id });
        }
        if amount.is_zero() {
            return Err(ReviewError::InvalidAmount {
                message: "payout must be positive".to_string(),
            });
        }
        let balance = task
            .balance
            .checked_sub(amount)
            .ok_or(ReviewError::InsufficientTaskBalance {
                task_id,
                available: task.balance.0,
                required: amount.0,
            })?;
        let peer_reviewer = review.peer_reviewer.clone();

        self.escrow.push(&peer_reviewer, amount).await?;

        task.balance = balance;
        if let Some(review) = task.review_mut(review_id) {
            review.accepted = true;
            review.payout = amount;
        }
        debug_assert!(task.accounting_holds());

        self.events
            .record(ProtocolEvent::ReviewAccepted {
                task_id,
                review_id,
                approver: caller.clone(),
                peer_reviewer: peer_reviewer.clone(),
                amount,
            })
            .await;
        info!(
            task_id = %task_id,
            review_id = %review_id,
            caller = %caller,
            peer_reviewer = %peer_reviewer,
            amount = amount.0,
            balance = balance.0,
            "review accepted"
        );
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    pub(crate) async fn task_handle(&self, task_id: TaskId) -> Result<TaskHandle> {
        let tasks = self.tasks.read().await;
        task_id
            .index()
            .and_then(|i| tasks.get(i))
            .cloned()
            .ok_or(ReviewError::TaskNotFound { task_id })
    }

    pub(crate) async fn task_handles(&self) -> Vec<TaskHandle> {
        self.tasks.read().await.clone()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The log every committed mutation is recorded to
    pub fn events(&self) -> &Arc<EventLog> {
        &self.events
    }

    /// Checked on entry and again once the task lock is held, so a pause
    /// that lands while an operation waits commits nothing after it.
    async fn ensure_running(&self) -> Result<()> {
        if self.registry.is_paused().await {
            return Err(ReviewError::SystemPaused);
        }
        Ok(())
    }
}

fn require_issuer_at(task: &Task, caller: &Address, index: usize) -> Result<()> {
    if task.is_issuer_at(caller, index) {
        Ok(())
    } else {
        warn!(task_id = %task.id, caller = %caller, index, "rejected: not the issuer at index");
        Err(ReviewError::NotIssuer {
            caller: caller.clone(),
            task_id: Some(task.id),
        })
    }
}

fn require_open(task: &Task) -> Result<()> {
    if task.cancelled {
        Err(ReviewError::TaskCancelled { task_id: task.id })
    } else {
        Ok(())
    }
}

fn validate_parties(parties: &[Address], role: &str) -> Result<()> {
    if parties.is_empty() {
        return Err(ReviewError::InvalidTask {
            message: format!("at least one {} is required", role),
        });
    }
    Ok(())
}

fn validate_hash(hash: &ContentHash, what: &str) -> Result<()> {
    if hash.is_empty() {
        return Err(ReviewError::InvalidTask {
            message: format!("{} hash is empty", what),
        });
    }
    Ok(())
}

fn validate_hashes(paper: &ContentHash, requirements: &ContentHash) -> Result<()> {
    validate_hash(paper, "paper")?;
    validate_hash(requirements, "requirements")
}

fn validate_deadline(deadline: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
    if deadline <= now {
        return Err(ReviewError::InvalidDeadline { deadline, now });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use antsreview_ledger::{TokenEscrow, TokenLedger};
    use antsreview_roles::RoleRegistry;
    use antsreview_types::ManualClock;
    use chrono::Duration;

    struct Fixture {
        engine: ReviewEngine,
        roles: Arc<RoleRegistry>,
        escrow: Arc<TokenEscrow>,
        clock: Arc<ManualClock>,
        owner: Address,
        issuer: Address,
        approver: Address,
        anter: Address,
        reviewer: Address,
    }

    async fn setup() -> Fixture {
        let clock = Arc::new(ManualClock::starting_now());
        let events = Arc::new(EventLog::with_clock(64, clock.clone()));
        let owner = Address::from("0xowner");
        let issuer = Address::from("0xissuer");
        let approver = Address::from("0xapprover");
        let anter = Address::from("0xanter");
        let reviewer = Address::from("0xreviewer");

        let roles = Arc::new(RoleRegistry::new(owner.clone(), events.clone()));
        roles.add_issuer(&owner, &issuer).await.unwrap();
        roles.add_peer_reviewer(&owner, &reviewer).await.unwrap();

        let ledger = TokenLedger::new();
        ledger.allocate(&anter, Amount::new(1_000)).await.unwrap();
        let escrow = Arc::new(TokenEscrow::with_default_custody(ledger));
        escrow
            .ledger()
            .approve(&anter, escrow.custody(), Amount::new(1_000))
            .await;

        let engine = ReviewEngine::new(roles.clone(), escrow.clone(), events, clock.clone());
        Fixture {
            engine,
            roles,
            escrow,
            clock,
            owner,
            issuer,
            approver,
            anter,
            reviewer,
        }
    }

    async fn issue(f: &Fixture) -> TaskId {
        f.engine
            .issue_ant_review(
                &f.issuer,
                vec![f.issuer.clone()],
                vec![f.approver.clone()],
                ContentHash::from("Qm1"),
                ContentHash::from("Qm2"),
                f.clock.now() + Duration::days(7),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_issue_assigns_sequential_ids() {
        let f = setup().await;

        assert_eq!(issue(&f).await, TaskId::new(0));
        assert_eq!(issue(&f).await, TaskId::new(1));
    }

    #[tokio::test]
    async fn test_issue_requires_issuer_role() {
        let f = setup().await;

        let result = f
            .engine
            .issue_ant_review(
                &f.anter,
                vec![f.anter.clone()],
                vec![f.approver.clone()],
                ContentHash::from("Qm1"),
                ContentHash::from("Qm2"),
                f.clock.now() + Duration::days(1),
            )
            .await;

        assert!(matches!(result, Err(ReviewError::NotIssuer { task_id: None, .. })));
    }

    #[tokio::test]
    async fn test_issue_rejects_past_deadline_and_empty_lists() {
        let f = setup().await;
        let now = f.clock.now();

        let past = f
            .engine
            .issue_ant_review(
                &f.issuer,
                vec![f.issuer.clone()],
                vec![f.approver.clone()],
                ContentHash::from("Qm1"),
                ContentHash::from("Qm2"),
                now,
            )
            .await;
        assert!(matches!(past, Err(ReviewError::InvalidDeadline { .. })));

        let no_approvers = f
            .engine
            .issue_ant_review(
                &f.issuer,
                vec![f.issuer.clone()],
                vec![],
                ContentHash::from("Qm1"),
                ContentHash::from("Qm2"),
                now + Duration::days(1),
            )
            .await;
        assert!(matches!(no_approvers, Err(ReviewError::InvalidTask { .. })));
        assert_eq!(f.engine.task_count().await, 0);
    }

    #[tokio::test]
    async fn test_contribute_rejects_zero_and_failed_pull() {
        let f = setup().await;
        let task_id = issue(&f).await;

        assert!(matches!(
            f.engine.contribute(&f.anter, task_id, Amount::zero()).await,
            Err(ReviewError::InvalidAmount { .. })
        ));
        assert!(matches!(
            f.engine.contribute(&f.anter, task_id, Amount::new(5_000)).await,
            Err(ReviewError::InsufficientAllowance { .. })
        ));

        let task = f.engine.get_task(task_id).await.unwrap();
        assert!(task.contributions.is_empty());
        assert_eq!(task.balance, Amount::zero());
    }

    #[tokio::test]
    async fn test_accept_checks_approver_and_balance() {
        let f = setup().await;
        let task_id = issue(&f).await;
        f.engine.contribute(&f.anter, task_id, Amount::new(100)).await.unwrap();
        let review_id = f
            .engine
            .fulfill_ant_review(&f.reviewer, task_id, ContentHash::from("Qm3"))
            .await
            .unwrap();

        assert!(matches!(
            f.engine.accept_ant_review(&f.issuer, task_id, review_id, Amount::new(10)).await,
            Err(ReviewError::NotApprover { .. })
        ));
        assert_eq!(
            f.engine.accept_ant_review(&f.approver, task_id, review_id, Amount::new(101)).await,
            Err(ReviewError::InsufficientTaskBalance {
                task_id,
                available: 100,
                required: 101,
            })
        );

        f.engine
            .accept_ant_review(&f.approver, task_id, review_id, Amount::new(100))
            .await
            .unwrap();
        assert_eq!(f.escrow.balance_of(&f.reviewer).await, Amount::new(100));
        assert!(matches!(
            f.engine.accept_ant_review(&f.approver, task_id, review_id, Amount::new(1)).await,
            Err(ReviewError::AlreadyAccepted { .. })
        ));
    }

    #[tokio::test]
    async fn test_update_review_only_by_submitter() {
        let f = setup().await;
        let task_id = issue(&f).await;
        let review_id = f
            .engine
            .fulfill_ant_review(&f.reviewer, task_id, ContentHash::from("Qm3"))
            .await
            .unwrap();

        assert!(matches!(
            f.engine
                .update_review(&f.anter, task_id, review_id, ContentHash::from("Qm4"))
                .await,
            Err(ReviewError::NotSubmitter { .. })
        ));

        f.engine
            .update_review(&f.reviewer, task_id, review_id, ContentHash::from("Qm4"))
            .await
            .unwrap();
        let review = f.engine.get_review(task_id, review_id).await.unwrap();
        assert_eq!(review.review_hash, ContentHash::from("Qm4"));
        assert!(!review.accepted);
    }

    #[tokio::test]
    async fn test_refund_requires_contributor() {
        let f = setup().await;
        let task_id = issue(&f).await;
        let contribution_id = f
            .engine
            .contribute(&f.anter, task_id, Amount::new(50))
            .await
            .unwrap();
        f.clock.advance(Duration::days(8));

        assert!(matches!(
            f.engine.refund(&f.reviewer, task_id, contribution_id).await,
            Err(ReviewError::NotContributor { .. })
        ));
        assert_eq!(
            f.engine.refund(&f.anter, task_id, contribution_id).await,
            Ok(Amount::new(50))
        );
        assert_eq!(f.escrow.balance_of(&f.anter).await, Amount::new(1_000));
    }

    #[tokio::test]
    async fn test_cancel_returns_contributions() {
        let f = setup().await;
        let task_id = issue(&f).await;
        f.engine.contribute(&f.anter, task_id, Amount::new(30)).await.unwrap();
        f.engine.contribute(&f.anter, task_id, Amount::new(20)).await.unwrap();

        let refunded = f.engine.cancel_ant_review(&f.issuer, task_id).await.unwrap();

        assert_eq!(refunded, Amount::new(50));
        assert_eq!(f.escrow.balance_of(&f.anter).await, Amount::new(1_000));
        let task = f.engine.get_task(task_id).await.unwrap();
        assert!(task.cancelled);
        assert!(task.contributions.iter().all(|c| c.refunded));
        assert!(task.accounting_holds());
        assert_eq!(
            f.engine.contribute(&f.anter, task_id, Amount::new(1)).await,
            Err(ReviewError::TaskCancelled { task_id })
        );
    }

    #[tokio::test]
    async fn test_pause_blocks_issue() {
        let f = setup().await;
        f.roles.pause(&f.owner).await.unwrap();

        let result = f
            .engine
            .issue_ant_review(
                &f.issuer,
                vec![f.issuer.clone()],
                vec![f.approver.clone()],
                ContentHash::from("Qm1"),
                ContentHash::from("Qm2"),
                f.clock.now() + Duration::days(1),
            )
            .await;

        assert_eq!(result, Err(ReviewError::SystemPaused));
    }

    #[tokio::test]
    async fn test_pause_while_waiting_for_task_lock() {
        let f = setup().await;
        let task_id = issue(&f).await;
        let handle = f.engine.task_handle(task_id).await.unwrap();
        let guard = handle.lock().await;

        let contribution = f.engine.contribute(&f.anter, task_id, Amount::new(10));
        let pause_then_release = async {
            tokio::task::yield_now().await;
            f.roles.pause(&f.owner).await.unwrap();
            drop(guard);
        };
        let (result, ()) = tokio::join!(contribution, pause_then_release);

        assert_eq!(result, Err(ReviewError::SystemPaused));
        assert_eq!(f.escrow.balance_of(&f.anter).await, Amount::new(1_000));
        let task = f.engine.get_task(task_id).await.unwrap();
        assert!(task.contributions.is_empty());
        let last = f.engine.events().last().await.unwrap();
        assert_eq!(last.event.name(), "Paused");
    }
}
