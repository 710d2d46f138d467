//! Receipts: hash-linked records of accepted transactions.

use serde::{Deserialize, Serialize};
use std::fmt;

use tally_crypto::{canonical, sha256_hex};

use crate::transaction::Transaction;

/// Number of receipts between genesis and a receipt (genesis = 0).
pub type ChainLength = u64;

/// Hex SHA-256 of a receipt header. Links receipts into chains; the
/// genesis receipt's `previous` pointer is the empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HashPointer(pub String);

impl HashPointer {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for HashPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The hashed portion of a receipt. Everything here is covered by the
/// receipt's hash pointer; nothing else is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Hashed {
    pub transaction: Transaction,
    #[serde(rename = "chainlength")]
    pub chain_length: ChainLength,
    pub previous: HashPointer,
}

/// An accepted transaction, hash-linked to its predecessor.
///
/// `next` is a navigation index maintained by the store as children are
/// appended. It is mutable after insertion, not covered by `this`, and
/// never serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub hashed: Hashed,
    pub this: HashPointer,
    #[serde(skip)]
    pub next: Vec<HashPointer>,
}

impl Receipt {
    /// The hash pointer of this receipt's header, computed over the
    /// canonical form.
    pub fn hash_pointer(&self) -> HashPointer {
        HashPointer(sha256_hex(&canonical::to_bytes(&self.hashed)))
    }

    /// The sentinel chain root: empty transaction, chain length zero,
    /// empty previous pointer.
    pub fn genesis() -> Self {
        let mut receipt = Receipt::default();
        receipt.this = receipt.hash_pointer();
        receipt
    }

    pub fn chain_length(&self) -> ChainLength {
        self.hashed.chain_length
    }

    pub fn is_genesis(&self) -> bool {
        self.hashed.chain_length == 0
    }
}
