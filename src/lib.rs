//! Tally: receipt-chain ledger with a commutative checksum
//!
//! This is the root crate that re-exports the tally components for
//! integration testing and provides unified access to the primitives.
//!
//! ## Architecture Overview
//!
//! Tally is two interlocking state machines sharing one set of crypto
//! primitives:
//!
//! - **Ledger engine**: validates account-based multi-input/multi-output
//!   transactions, hashes each accepted one into a receipt linked to its
//!   predecessor, and navigates the resulting forest of chains while
//!   keeping the account table consistent with the cursor.
//! - **Commutative accumulator**: a sharded record store whose aggregate
//!   identity is a curve point, so the checksum of a compacted database
//!   equals the checksum of the original.
//!
//! ## Crate Organization
//!
//! - `tally-crypto`: ECDSA keys, curve points, SHA-256, canonical form
//! - `tally-ledger`: transactions, receipts, storage index, engine
//! - `tally-accumulator`: sharded commutative checksum store

pub use tally_accumulator as accumulator;
pub use tally_crypto as crypto;
pub use tally_ledger as ledger;

/// Tally protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use tally_accumulator::{Action, Command, DataRecord, Db};
    pub use tally_crypto::{CurvePoint, KeyPair, PublicKey, Signature};
    pub use tally_ledger::{
        shared_ledger, Flow, Ledger, Receipt, SharedLedger, Signoff, Transaction, TxnError,
    };
}
