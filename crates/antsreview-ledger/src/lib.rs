//! AntsReview Ledger - Fungible token balances and escrow custody
//!
//! Two layers live here:
//!
//! - [`TokenLedger`]: an in-memory ERC20-style balance/allowance ledger.
//!   It stands in for the external token contract; it never mints or burns,
//!   balances enter only through genesis [`TokenLedger::allocate`].
//! - [`TokenEscrow`]: the escrow adapter. It implements [`EscrowLedger`],
//!   pulling approved funds into a custody account and pushing them out
//!   again. It performs no per-task bookkeeping.
//!
//! # Invariants
//!
//! 1. No negative balances
//! 2. Transfers are atomic (debit and credit under one lock)
//! 3. A failed transfer leaves balances and allowances untouched

pub mod token;
pub mod escrow;

pub use token::{LedgerError, TokenLedger};
pub use escrow::{EscrowLedger, TokenEscrow, DEFAULT_CUSTODY_ACCOUNT};
