//! In-memory fungible token ledger
//!
//! Balances and allowances behind one lock. A transfer validates both sides
//! before touching either.

use std::collections::HashMap;
use std::sync::Arc;

use antsreview_types::{Address, Amount};
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors that can occur in ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance for {account}: have {available}, need {required}")]
    InsufficientBalance {
        account: Address,
        available: u64,
        required: u64,
    },

    #[error("Insufficient allowance from {owner} to {spender}: have {available}, need {required}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        available: u64,
        required: u64,
    },

    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("Balance overflow for {account}")]
    Overflow { account: Address },
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Debug, Default)]
struct LedgerState {
    balances: HashMap<Address, Amount>,
    /// (owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

impl LedgerState {
    fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(Amount::zero())
    }

    fn check_debit(&self, account: &Address, amount: Amount) -> Result<Amount> {
        let current = self.balance(account);
        current
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientBalance {
                account: account.clone(),
                available: current.0,
                required: amount.0,
            })
    }

    fn check_credit(&self, account: &Address, amount: Amount) -> Result<Amount> {
        self.balance(account)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow {
                account: account.clone(),
            })
    }

    /// Debit then credit. Both checks run before either side is applied.
    fn transfer(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let from_after = self.check_debit(from, amount)?;
        if from != to {
            let to_after = self.check_credit(to, amount)?;
            self.balances.insert(to.clone(), to_after);
            self.balances.insert(from.clone(), from_after);
        }
        Ok(())
    }
}

fn require_positive(amount: Amount) -> Result<()> {
    if amount.is_zero() {
        return Err(LedgerError::InvalidAmount {
            message: "Amount must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// The token ledger
#[derive(Clone, Default)]
pub struct TokenLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl TokenLedger {
    /// Create a new in-memory ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account with a genesis allocation
    ///
    /// Returns the new balance.
    pub async fn allocate(&self, to: &Address, amount: Amount) -> Result<Amount> {
        require_positive(amount)?;
        let mut state = self.state.write().await;
        let new_balance = state.check_credit(to, amount)?;
        let new_supply = state
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow { account: to.clone() })?;
        state.balances.insert(to.clone(), new_balance);
        state.total_supply = new_supply;
        Ok(new_balance)
    }

    /// Get the balance of an account
    pub async fn balance_of(&self, account: &Address) -> Amount {
        self.state.read().await.balance(account)
    }

    /// Sum of every allocation ever made
    pub async fn total_supply(&self) -> Amount {
        self.state.read().await.total_supply
    }

    /// Set the amount `spender` may move out of `owner`'s balance
    pub async fn approve(&self, owner: &Address, spender: &Address, amount: Amount) {
        let mut state = self.state.write().await;
        state
            .allowances
            .insert((owner.clone(), spender.clone()), amount);
    }

    pub async fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        let state = self.state.read().await;
        state
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(Amount::zero())
    }

    /// Move funds owned by `from`
    pub async fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        require_positive(amount)?;
        let mut state = self.state.write().await;
        state.transfer(from, to, amount)
    }

    /// Move funds on behalf of `from`, consuming `spender`'s allowance
    pub async fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        require_positive(amount)?;
        let mut state = self.state.write().await;

        let key = (from.clone(), spender.clone());
        let allowed = state.allowances.get(&key).copied().unwrap_or(Amount::zero());
        let remaining = allowed
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientAllowance {
                owner: from.clone(),
                spender: spender.clone(),
                available: allowed.0,
                required: amount.0,
            })?;

        state.transfer(from, to, amount)?;
        state.allowances.insert(key, remaining);
        Ok(())
    }

    /// Pay several recipients from one account, all or nothing
    pub async fn transfer_batch(&self, from: &Address, payouts: &[(Address, Amount)]) -> Result<()> {
        for (_, amount) in payouts {
            require_positive(*amount)?;
        }
        let mut state = self.state.write().await;

        let total = Amount::checked_sum(payouts.iter().map(|(_, a)| *a))
            .ok_or_else(|| LedgerError::Overflow { account: from.clone() })?;
        state.check_debit(from, total)?;
        for (to, amount) in payouts {
            if to != from {
                state.check_credit(to, *amount)?;
            }
        }

        for (to, amount) in payouts {
            state.transfer(from, to, *amount)?;
        }
        Ok(())
    }
}
