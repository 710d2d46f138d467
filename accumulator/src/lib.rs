//! Tally commutative accumulator
//!
//! A sharded record store whose aggregate identity is a curve point: each
//! insert adds `H(record)·G` to the owning shard's checksum and each
//! remove subtracts it, so the checksum depends only on the multiset of
//! records currently present — not on the order the operations arrived
//! in. Compacting a shard (remove + reinsert, in any interleaving)
//! therefore leaves its checksum bit-identical.
//!
//! Shard checksums can be signed with a per-shard ECDSA keypair to attest
//! to a database state.

mod db;
mod record;

pub use db::Db;
pub use record::{Action, Command, DataRecord, RecordId, Reference, ShardId};

use thiserror::Error;

use tally_crypto::CryptoError;

/// Accumulator result type
pub type AccumulatorResult<T> = Result<T, AccumulatorError>;

/// Accumulator errors
#[derive(Error, Debug)]
pub enum AccumulatorError {
    /// Insert target id is already present in the shard
    #[error("object {shard}:{id} already exists")]
    AlreadyExists { shard: ShardId, id: RecordId },

    /// Remove target is not in the shard
    #[error("object {shard}:{id} cannot be removed, because it does not exist")]
    NotPresent { shard: ShardId, id: RecordId },

    /// Remove argument hashes differently from the stored record
    #[error("object {shard}:{id} is not the object we think we are removing")]
    IdentityMismatch { shard: ShardId, id: RecordId },

    /// Shard was never given a signing keypair
    #[error("shard {shard} has no keypair")]
    NoKeyPair { shard: ShardId },

    /// Underlying crypto failure
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
