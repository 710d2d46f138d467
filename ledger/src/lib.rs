//! Tally ledger core
//!
//! An account-based, multi-input/multi-output transaction chain. Every
//! accepted transaction is hashed into a receipt linked to its
//! predecessor, so receipts form a forest of chains rooted at a genesis
//! sentinel, and the engine can navigate that forest while keeping the
//! account table consistent with wherever its cursor points.
//!
//! # Module organization
//!
//! - [`transaction`](Transaction): flows, signoffs, and signature coverage
//! - [`receipt`](Receipt): hash-linked acceptance records
//! - [`store`](Stored): the owning index of accounts, receipts, and tips
//! - [`engine`](Ledger): validation, apply/unapply, and navigation

mod engine;
mod error;
mod receipt;
mod store;
mod transaction;

pub use engine::{shared_ledger, Ledger, SharedLedger};
pub use error::{LedgerResult, TxnError};
pub use receipt::{ChainLength, HashPointer, Hashed, Receipt};
pub use store::{Account, Stored};
pub use transaction::{Amount, Flow, Nonce, Signoff, Transaction};
