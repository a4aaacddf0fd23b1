//! Shared harness for engine integration tests

#![allow(dead_code)]

use std::sync::Arc;

use antsreview_engine::ReviewEngine;
use antsreview_events::EventLog;
use antsreview_ledger::{TokenEscrow, TokenLedger};
use antsreview_roles::RoleRegistry;
use antsreview_types::{Address, Amount, Clock, ContentHash, ManualClock, TaskId};
use chrono::Duration;

pub const ALLOCATION: u64 = 10_000;

pub struct Harness {
    pub engine: Arc<ReviewEngine>,
    pub roles: Arc<RoleRegistry>,
    pub escrow: Arc<TokenEscrow>,
    pub events: Arc<EventLog>,
    pub clock: Arc<ManualClock>,
    pub owner: Address,
    pub issuer: Address,
    pub approver: Address,
    pub reviewer: Address,
}

impl Harness {
    /// Registry with one issuer and one peer reviewer, and a ledger where
    /// every anter in `anters` holds [`ALLOCATION`] approved to custody
    pub async fn new(anters: &[&str]) -> Self {
        let clock = Arc::new(ManualClock::starting_now());
        let events = Arc::new(EventLog::with_clock(1024, clock.clone()));
        let owner = Address::from("0xowner");
        let issuer = Address::from("0xissuer");
        let approver = Address::from("0xapprover");
        let reviewer = Address::from("0xreviewer");

        let roles = Arc::new(RoleRegistry::new(owner.clone(), events.clone()));
        roles.add_issuer(&owner, &issuer).await.unwrap();
        roles.add_peer_reviewer(&owner, &reviewer).await.unwrap();

        let escrow = Arc::new(TokenEscrow::with_default_custody(TokenLedger::new()));
        for anter in anters {
            let anter = Address::from(*anter);
            escrow
                .ledger()
                .allocate(&anter, Amount::new(ALLOCATION))
                .await
                .unwrap();
            escrow
                .ledger()
                .approve(&anter, escrow.custody(), Amount::new(ALLOCATION))
                .await;
        }

        let engine = Arc::new(ReviewEngine::new(
            roles.clone(),
            escrow.clone(),
            events.clone(),
            clock.clone(),
        ));

        Self {
            engine,
            roles,
            escrow,
            events,
            clock,
            owner,
            issuer,
            approver,
            reviewer,
        }
    }

    /// Issue a task owned by the harness issuer, due in seven days
    pub async fn issue(&self) -> TaskId {
        self.issue_with(vec![self.issuer.clone()]).await
    }

    pub async fn issue_with(&self, issuers: Vec<Address>) -> TaskId {
        self.engine
            .issue_ant_review(
                &self.issuer,
                issuers,
                vec![self.approver.clone()],
                ContentHash::from("QmPaper"),
                ContentHash::from("QmRequirements"),
                self.clock.now() + Duration::days(7),
            )
            .await
            .unwrap()
    }

    pub fn pass_deadline(&self) {
        self.clock.advance(Duration::days(8));
    }
}
