//! Escrow custody adapter
//!
//! Funds pulled from contributors sit in a single custody account. Per-task
//! balances are tracked by the engine, not here.

use antsreview_types::{Address, Amount, ReviewError, Result};
use tracing::{debug, error};

use crate::{LedgerError, TokenLedger};

/// Custody account used when none is configured
pub const DEFAULT_CUSTODY_ACCOUNT: &str = "antsreview-escrow";

/// Balance movement consumed by the review engine
#[async_trait::async_trait]
pub trait EscrowLedger: Send + Sync {
    /// Move `amount` from `from` into custody using a prior allowance
    async fn pull(&self, from: &Address, amount: Amount) -> Result<()>;

    /// Move `amount` out of custody to `to`
    async fn push(&self, to: &Address, amount: Amount) -> Result<()>;

    /// Several pushes that either all happen or none do
    async fn push_batch(&self, payouts: &[(Address, Amount)]) -> Result<()>;

    /// Balance of an account on the underlying ledger
    async fn balance_of(&self, account: &Address) -> Amount;

    /// Aggregate balance held in custody across all tasks
    async fn custody_balance(&self) -> Amount;
}

impl From<LedgerError> for ReviewError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientBalance {
                account,
                available,
                required,
            } => ReviewError::InsufficientBalance {
                account,
                available,
                required,
            },
            LedgerError::InsufficientAllowance {
                owner,
                available,
                required,
                ..
            } => ReviewError::InsufficientAllowance {
                account: owner,
                available,
                required,
            },
            LedgerError::InvalidAmount { message } => ReviewError::InvalidAmount { message },
            LedgerError::Overflow { .. } => ReviewError::AmountOverflow,
        }
    }
}

/// Escrow adapter over a [`TokenLedger`]
#[derive(Clone)]
pub struct TokenEscrow {
    ledger: TokenLedger,
    custody: Address,
}

impl TokenEscrow {
    pub fn new(ledger: TokenLedger, custody: Address) -> Self {
        Self { ledger, custody }
    }

    /// Adapter using [`DEFAULT_CUSTODY_ACCOUNT`]
    pub fn with_default_custody(ledger: TokenLedger) -> Self {
        Self::new(ledger, Address::from(DEFAULT_CUSTODY_ACCOUNT))
    }

    /// The account contributors must approve as spender
    pub fn custody(&self) -> &Address {
        &self.custody
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    async fn require_custody(&self, required: Amount) -> Result<()> {
        let available = self.ledger.balance_of(&self.custody).await;
        if available < required {
            error!(
                available = available.0,
                required = required.0,
                "custody cannot cover payout"
            );
            return Err(ReviewError::InsufficientCustodyBalance {
                available: available.0,
                required: required.0,
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EscrowLedger for TokenEscrow {
    async fn pull(&self, from: &Address, amount: Amount) -> Result<()> {
        self.ledger
            .transfer_from(&self.custody, from, &self.custody, amount)
            .await?;
        debug!(from = %from, amount = amount.0, "pulled into custody");
        Ok(())
    }

    async fn push(&self, to: &Address, amount: Amount) -> Result<()> {
        self.require_custody(amount).await?;
        self.ledger
            .transfer(&self.custody, to, amount)
            .await
            .map_err(|e| ReviewError::LedgerUnavailable {
                message: e.to_string(),
            })?;
        debug!(to = %to, amount = amount.0, "pushed out of custody");
        Ok(())
    }

    async fn push_batch(&self, payouts: &[(Address, Amount)]) -> Result<()> {
        if payouts.is_empty() {
            return Ok(());
        }
        let total = Amount::checked_sum(payouts.iter().map(|(_, a)| *a))
            .ok_or(ReviewError::AmountOverflow)?;
        self.require_custody(total).await?;
        self.ledger
            .transfer_batch(&self.custody, payouts)
            .await
            .map_err(|e| ReviewError::LedgerUnavailable {
                message: e.to_string(),
            })?;
        debug!(payouts = payouts.len(), total = total.0, "batch pushed out of custody");
        Ok(())
    }

    async fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.balance_of(account).await
    }

    async fn custody_balance(&self) -> Amount {
        self.ledger.balance_of(&self.custody).await
    }
}
