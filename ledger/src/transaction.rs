//! Transactions: parallel flow and signoff arrays.
//!
//! A transaction moves value between any number of accounts at once:
//!
//! ```text
//! (alice: -5, bob: -6)  ->  (charles: +10, taxman: +1)
//! ```
//!
//! Negative flows take value out of an account and must be signed by that
//! account's key; positive flows deposit value and need no signature.

use serde::{Deserialize, Serialize};

use tally_crypto::{canonical, sha256, KeyPair, PublicKey, Signature};

use crate::error::{LedgerResult, TxnError};

/// Signed 64-bit token amount. Negative values are outflows.
pub type Amount = i64;

/// Per-account counter that makes each outflow single-use.
pub type Nonce = u64;

/// One input or output line of a transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub amount: Amount,
    #[serde(rename = "publickey")]
    pub public_key: PublicKey,
}

/// The nonce and optional signature paired with one flow.
///
/// The signature is absent until [`Transaction::sign`] fills it, and may
/// stay absent forever on inflow positions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Signoff {
    pub nonce: Nonce,
    pub signature: Option<Signature>,
}

/// A multi-input, multi-output transfer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub flows: Vec<Flow>,
    pub signoffs: Vec<Signoff>,
}

impl Transaction {
    /// Build an unsigned transaction from parallel flow/nonce pairs.
    pub fn new(entries: Vec<(Flow, Nonce)>) -> Self {
        let mut flows = Vec::with_capacity(entries.len());
        let mut signoffs = Vec::with_capacity(entries.len());
        for (flow, nonce) in entries {
            flows.push(flow);
            signoffs.push(Signoff {
                nonce,
                signature: None,
            });
        }
        Self { flows, signoffs }
    }

    /// Digest covered by the signature at position `i`:
    /// `SHA256(canonical(flows) || ascii(signoffs[i].nonce))`.
    fn flow_hash(&self, i: usize) -> [u8; 32] {
        let mut data = canonical::to_bytes(&self.flows);
        data.extend_from_slice(self.signoffs[i].nonce.to_string().as_bytes());
        sha256(&data)
    }

    /// Sign position `i`, filling its signoff.
    ///
    /// Each required signer fills its own slot, so a transaction can be
    /// passed around until everyone who must sign has signed. Signing an
    /// inflow position is legal, just never required.
    pub fn sign(&mut self, keypair: &KeyPair, i: usize) -> LedgerResult<()> {
        if self.flows.len() != self.signoffs.len() || i >= self.signoffs.len() {
            return Err(TxnError::Malformed);
        }
        let digest = self.flow_hash(i);
        let signature = keypair
            .sign_digest(&digest)
            .map_err(|_| TxnError::SigFail)?;
        self.signoffs[i].signature = Some(signature);
        Ok(())
    }

    /// Check signature coverage: every outflow must carry a valid
    /// signature by its own key over that position's flow hash. Inflow
    /// positions are skipped.
    pub fn verify_signatures(&self) -> bool {
        if self.flows.len() != self.signoffs.len() {
            return false;
        }
        for (i, flow) in self.flows.iter().enumerate() {
            if flow.amount >= 0 {
                continue;
            }
            let Some(signature) = &self.signoffs[i].signature else {
                return false;
            };
            if !flow.public_key.verify_digest(&self.flow_hash(i), signature) {
                return false;
            }
        }
        true
    }

    /// Net of all flow amounts; a valid transaction nets to zero.
    pub fn net_amount(&self) -> i64 {
        self.flows.iter().map(|f| f.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}
