//! Scripted walkthrough of one review task
//!
//! Issue, fund, review, accept, an early refund that fails, then the
//! deadline passes and the anter recovers what is left of the escrow.
//! Time is driven by a [`ManualClock`] so the run is deterministic.

use std::sync::Arc;

use anyhow::Context;
use chrono::TimeDelta;
use serde::Serialize;
use tracing::info;

use antsreview_engine::{ReviewEngine, TaskStatus};
use antsreview_events::{EventLog, RecordedEvent};
use antsreview_ledger::{EscrowLedger, TokenEscrow, TokenLedger};
use antsreview_roles::RoleRegistry;
use antsreview_types::{Address, Amount, Clock, ContentHash, ManualClock, ReviewError, TaskId};

use crate::config::AppConfig;

/// Outcome of a walkthrough
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub task_id: TaskId,
    pub status: TaskStatus,
    pub task_balance: Amount,
    pub refunded: Amount,
    pub shortfall: Amount,
    pub anter_balance: Amount,
    pub reviewer_balance: Amount,
    pub custody_balance: Amount,
    pub early_refund_error: String,
    pub events: Vec<RecordedEvent>,
}

/// Run the walkthrough against fresh in-memory state
pub async fn run(config: &AppConfig) -> anyhow::Result<DemoReport> {
    config.validate()?;
    let settings = &config.demo;

    let clock = Arc::new(ManualClock::starting_now());
    let events = Arc::new(EventLog::with_clock(
        config.protocol.event_buffer,
        clock.clone(),
    ));

    let owner = Address::new(config.protocol.owner.as_str());
    let issuer = Address::new(settings.issuer.as_str());
    let approver = Address::new(settings.approver.as_str());
    let anter = Address::new(settings.anter.as_str());
    let reviewer = Address::new(settings.peer_reviewer.as_str());

    let roles = Arc::new(RoleRegistry::new(owner.clone(), events.clone()));
    roles.add_issuer(&owner, &issuer).await?;
    roles.add_peer_reviewer(&owner, &reviewer).await?;

    let ledger = TokenLedger::new();
    let escrow = Arc::new(TokenEscrow::new(
        ledger,
        Address::new(config.protocol.custody_account.as_str()),
    ));
    escrow
        .ledger()
        .allocate(&anter, Amount::new(settings.anter_allocation))
        .await
        .context("allocating anter balance")?;
    escrow
        .ledger()
        .approve(&anter, escrow.custody(), Amount::new(settings.contribution))
        .await;

    let engine = ReviewEngine::new(roles.clone(), escrow.clone(), events.clone(), clock.clone());

    let period_days = config.protocol.default_review_period_days;
    let deadline = TimeDelta::try_days(period_days)
        .and_then(|period| clock.now().checked_add_signed(period))
        .with_context(|| format!("review period of {} days is out of range", period_days))?;
    let task_id = engine
        .issue_ant_review(
            &issuer,
            vec![issuer.clone()],
            vec![approver.clone()],
            ContentHash::new("QmPaperHashPlaceholder000000000000000000000000"),
            ContentHash::new("QmRequirementsHashPlaceholder00000000000000000"),
            deadline,
        )
        .await?;

    let contribution_id = engine
        .contribute(&anter, task_id, Amount::new(settings.contribution))
        .await?;
    let review_id = engine
        .fulfill_ant_review(
            &reviewer,
            task_id,
            ContentHash::new("QmReviewHashPlaceholder00000000000000000000000"),
        )
        .await?;
    engine
        .accept_ant_review(&approver, task_id, review_id, Amount::new(settings.payout))
        .await?;

    let early_refund_error = match engine.refund(&anter, task_id, contribution_id).await {
        Err(e @ ReviewError::DeadlineNotReached { .. }) => {
            info!(error = %e, "early refund rejected");
            e.to_string()
        }
        Err(e) => return Err(e.into()),
        Ok(paid) => anyhow::bail!("refund of {} succeeded before the deadline", paid),
    };

    clock.set(deadline);
    let refunded = engine.refund(&anter, task_id, contribution_id).await?;

    let contribution = engine.get_contribution(task_id, contribution_id).await?;
    let task = engine.get_task(task_id).await?;
    if !task.accounting_holds() {
        anyhow::bail!("escrow accounting does not balance for {}", task_id);
    }

    Ok(DemoReport {
        task_id,
        status: engine.task_status(task_id).await?,
        task_balance: task.balance,
        refunded,
        shortfall: contribution.shortfall(),
        anter_balance: escrow.balance_of(&anter).await,
        reviewer_balance: escrow.balance_of(&reviewer).await,
        custody_balance: escrow.custody_balance().await,
        early_refund_error,
        events: events.since(0).await,
    })
}

/// Human-readable rendering of a report
pub fn render(report: &DemoReport, config: &AppConfig) -> String {
    let token = &config.token;
    let mut out = String::new();
    out.push_str("Events:\n");
    for record in &report.events {
        out.push_str(&format!("  #{:<3} {}\n", record.sequence, record.event.summary()));
    }
    out.push_str(&format!("\n{} is {:?}\n", report.task_id, report.status));
    out.push_str(&format!("  early refund:     {}\n", report.early_refund_error));
    out.push_str(&format!("  refunded:         {}\n", token.format(report.refunded)));
    out.push_str(&format!("  shortfall:        {}\n", token.format(report.shortfall)));
    out.push_str(&format!("  task balance:     {}\n", token.format(report.task_balance)));
    out.push_str(&format!("  anter balance:    {}\n", token.format(report.anter_balance)));
    out.push_str(&format!("  reviewer balance: {}\n", token.format(report.reviewer_balance)));
    out.push_str(&format!("  custody balance:  {}\n", token.format(report.custody_balance)));
    out
}
