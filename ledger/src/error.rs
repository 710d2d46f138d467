//! Ledger errors

use thiserror::Error;

/// Ledger result type
pub type LedgerResult<T> = Result<T, TxnError>;

/// Transaction validation and navigation errors.
///
/// Validation failures leave the ledger untouched; they describe why a
/// transaction cannot be applied at the current cursor, on this branch.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnError {
    /// Flows and signoffs are not parallel arrays
    #[error("malformed transaction")]
    Malformed,

    /// A required outflow signature is missing or does not verify
    #[error("signature verification failed")]
    SigFail,

    /// Flow amounts do not net to zero
    #[error("flow amounts do not sum to zero")]
    NonZeroSum,

    /// An outflow would take a non-bank account below zero
    #[error("balance would go below zero")]
    BelowZero,

    /// The signoff nonce is ahead of the account; the transaction may
    /// apply later
    #[error("transaction is for a future nonce")]
    Wait,

    /// The signoff nonce was already consumed on this branch
    #[error("transaction was already applied on this branch")]
    Replay,

    /// No receipt at the requested position
    #[error("receipt not found")]
    NotFound,

    /// The operation does not apply to the genesis receipt
    #[error("at genesis")]
    Genesis,

    /// Account balances no longer net to zero: internal corruption
    #[error("account totals do not sum to zero")]
    TotalNonZeroSum,
}
