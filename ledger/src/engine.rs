//! The ledger engine: validation, apply/unapply, and chain navigation.
//!
//! # Navigation model
//!
//! Accepted transactions become receipts linked into a forest rooted at
//! genesis. The engine keeps one cursor into that forest, and the account
//! table always reflects the state reached by applying every receipt on
//! the path from genesis to the cursor. Moving the cursor therefore means
//! un-applying receipts on the way down and replaying them on the way up,
//! never recomputing from scratch.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use tally_crypto::{KeyPair, PublicKey, PublicKeyString};

use crate::error::{LedgerResult, TxnError};
use crate::receipt::{HashPointer, Hashed, Receipt};
use crate::store::{Account, Stored};
use crate::transaction::{Nonce, Transaction};

/// Account-based ledger over a forest of receipt chains.
///
/// Mutating operations take `&mut self`, so a [`SharedLedger`] gives the
/// single-writer discipline directly: the write lock covers the account
/// table, the receipt store, and the cursor as one atomic unit, and
/// readers share the same lock.
pub struct Ledger {
    store: Stored,
    banks: HashSet<PublicKeyString>,
}

/// Thread-safe ledger handle.
pub type SharedLedger = Arc<RwLock<Ledger>>;

/// Create a ledger behind a process-wide read-write lock.
pub fn shared_ledger() -> SharedLedger {
    Arc::new(RwLock::new(Ledger::new()))
}

impl Ledger {
    /// Create a ledger holding only the genesis receipt.
    pub fn new() -> Self {
        let ledger = Self {
            store: Stored::new(),
            banks: HashSet::new(),
        };
        debug_assert!(ledger
            .verify_transaction(&Transaction::default(), false)
            .is_ok());
        ledger
    }

    /// Mark a key as a bank: exempt from the non-negative balance rule.
    /// Without at least one bank no value can ever enter the ledger.
    pub fn as_bank(&mut self, public_key: &PublicKey) {
        debug!(key = %public_key.key_string(), "bank registered");
        self.banks.insert(public_key.key_string());
    }

    /// Sign position `i` of a transaction; see [`Transaction::sign`].
    pub fn sign(&self, keypair: &KeyPair, txn: &mut Transaction, i: usize) -> LedgerResult<()> {
        txn.sign(keypair, i)
    }

    /// The receipt under the cursor.
    pub fn this(&self) -> Receipt {
        self.store.current_receipt().clone()
    }

    /// The chain root.
    pub fn genesis(&self) -> Receipt {
        self.store.genesis_receipt().clone()
    }

    /// All receipts tied for the maximum chain length.
    pub fn highest(&self) -> Vec<Receipt> {
        self.store
            .highest()
            .iter()
            .filter_map(|pointer| self.store.find_receipt(pointer))
            .cloned()
            .collect()
    }

    /// Children of the cursor, in insertion order.
    pub fn peek_next(&self) -> Vec<Receipt> {
        self.nexts(&self.store.current_receipt().this)
    }

    fn nexts(&self, pointer: &HashPointer) -> Vec<Receipt> {
        self.store
            .find_next_receipts(pointer)
            .iter()
            .filter_map(|child| self.store.find_receipt(child))
            .cloned()
            .collect()
    }

    pub fn can_pop_receipt(&self) -> bool {
        !self.store.current_receipt().is_genesis()
    }

    /// The stored parent of a receipt: `Genesis` for the chain root,
    /// `NotFound` when the parent was never stored.
    pub fn parent_of(&self, receipt: &Receipt) -> LedgerResult<Receipt> {
        if receipt.is_genesis() {
            return Err(TxnError::Genesis);
        }
        self.store
            .find_receipt(&receipt.hashed.previous)
            .cloned()
            .ok_or(TxnError::NotFound)
    }

    /// Current account row for a key, if the key has ever been touched.
    pub fn account(&self, public_key: &PublicKey) -> Option<Account> {
        self.store.find_account(&public_key.key_string()).cloned()
    }

    /// Balance at the cursor; zero for untouched accounts.
    pub fn balance(&self, public_key: &PublicKey) -> i64 {
        self.account(public_key).map(|a| a.amount).unwrap_or(0)
    }

    /// Next expected outflow nonce for a key.
    pub fn nonce(&self, public_key: &PublicKey) -> Nonce {
        self.account(public_key).map(|a| a.nonce).unwrap_or(0)
    }

    /// Validate a transaction against the account table at the cursor.
    ///
    /// `before_apply` selects the vantage point: once a transaction's
    /// outflows have been applied each outflow account's nonce is one
    /// ahead of its signoff and its balance already includes the outflow,
    /// so both comparisons shift accordingly.
    fn verify_transaction(&self, txn: &Transaction, before_apply: bool) -> LedgerResult<()> {
        if txn.flows.len() != txn.signoffs.len() {
            return Err(TxnError::Malformed);
        }
        // One outflow per account per transaction; a second one could not
        // carry a meaningful nonce.
        let mut outflow_keys = HashSet::new();
        for flow in &txn.flows {
            if flow.amount < 0 && !outflow_keys.insert(flow.public_key.key_string()) {
                return Err(TxnError::Malformed);
            }
        }
        if !txn.verify_signatures() {
            return Err(TxnError::SigFail);
        }
        if txn.net_amount() != 0 {
            return Err(TxnError::NonZeroSum);
        }

        let nonce_diff: Nonce = if before_apply { 0 } else { 1 };
        for (flow, signoff) in txn.flows.iter().zip(&txn.signoffs) {
            if flow.amount >= 0 {
                continue;
            }
            let account = self.store.account_or_zero(&flow.public_key);
            let projected = if before_apply {
                account.amount + flow.amount
            } else {
                account.amount
            };
            if projected < 0 && !self.banks.contains(&flow.public_key.key_string()) {
                return Err(TxnError::BelowZero);
            }
            let expected = signoff.nonce + nonce_diff;
            if account.nonce < expected {
                return Err(TxnError::Wait);
            }
            if account.nonce > expected {
                return Err(TxnError::Replay);
            }
        }

        // Value only moves in matched outflow/inflow pairs, so the table
        // nets to zero at every reachable state (banks included, through
        // their negative balances).
        let total: i64 = self.store.accounts().map(|a| a.amount).sum();
        if total != 0 {
            return Err(TxnError::TotalNonZeroSum);
        }

        Ok(())
    }

    /// Validate and apply a transaction: update the account table, link a
    /// new receipt under the cursor, and advance the cursor to it. On
    /// error nothing changes.
    ///
    /// # Panics
    ///
    /// Panics if the post-apply self-check fails. At that point the
    /// account table no longer matches the receipt chain and the ledger
    /// must not be used further.
    pub fn push_transaction(&mut self, txn: Transaction) -> LedgerResult<()> {
        let previous = self.store.current_receipt().clone();

        if let Err(err) = self.verify_transaction(&txn, true) {
            warn!(%err, "transaction rejected");
            return Err(err);
        }

        self.apply_flows(&txn);

        let mut receipt = Receipt {
            hashed: Hashed {
                transaction: txn,
                chain_length: previous.chain_length() + 1,
                previous: previous.this.clone(),
            },
            this: HashPointer::default(),
            next: Vec::new(),
        };
        receipt.this = receipt.hash_pointer();
        let pointer = receipt.this.clone();

        self.store.insert_receipt(receipt);
        self.store.set_current(pointer.clone());

        let applied = self.store.current_receipt().hashed.transaction.clone();
        if let Err(err) = self.verify_transaction(&applied, false) {
            panic!("ledger corrupted after apply at {pointer}: {err}");
        }

        debug!(receipt = %pointer, "transaction applied");
        Ok(())
    }

    /// Step the cursor back to its parent, un-applying the current
    /// receipt's transaction. Returns `false` at genesis.
    pub fn pop_receipt(&mut self) -> bool {
        let current = self.store.current_receipt().clone();
        let parent = match self.parent_of(&current) {
            Ok(parent) => parent,
            Err(TxnError::Genesis) => return false,
            Err(err) => panic!(
                "missing parent receipt {}: {err}",
                current.hashed.previous
            ),
        };

        self.unapply_flows(&current.hashed.transaction);
        self.store.set_current(parent.this.clone());

        if let Err(err) = self.verify_transaction(&parent.hashed.transaction, false) {
            panic!("ledger corrupted after unapply at {}: {err}", parent.this);
        }

        debug!(receipt = %parent.this, "cursor popped");
        true
    }

    /// Re-apply child `i` of the cursor (insertion order) and advance to
    /// it. `NotFound` when the index is out of range.
    pub fn push_receipt(&mut self, i: usize) -> LedgerResult<()> {
        let redos = self.peek_next();
        let Some(child) = redos.get(i) else {
            return Err(TxnError::NotFound);
        };
        let child = child.clone();

        self.apply_flows(&child.hashed.transaction);
        self.store.set_current(child.this.clone());

        if let Err(err) = self.verify_transaction(&child.hashed.transaction, false) {
            panic!("ledger corrupted after replay at {}: {err}", child.this);
        }

        debug!(receipt = %child.this, index = i, "child replayed");
        Ok(())
    }

    /// Move the cursor to `target`, un-applying and replaying receipts
    /// along the way: descend to the target's chain length, walk both
    /// sides to the common ancestor while recording child indices, then
    /// replay the recorded path.
    ///
    /// Returns `false` when the target is not reachable in the stored
    /// forest; the cursor position is unspecified in that case.
    pub fn goto_receipt(&mut self, target: &Receipt) -> bool {
        while self.this().chain_length() > target.chain_length() && self.can_pop_receipt() {
            self.pop_receipt();
        }
        if self.this().this == target.this {
            return true;
        }

        let mut there = target.clone();
        let mut path = Vec::new();
        while self.this().chain_length() < there.chain_length() {
            match self.step_toward_root(&there) {
                Some((index, parent)) => {
                    path.push(index);
                    there = parent;
                }
                None => {
                    warn!(receipt = %target.this, "target is not linked to the stored forest");
                    return false;
                }
            }
        }

        while self.this().this != there.this && self.can_pop_receipt() {
            match self.step_toward_root(&there) {
                Some((index, parent)) => {
                    path.push(index);
                    there = parent;
                }
                None => {
                    warn!(receipt = %target.this, "target is not linked to the stored forest");
                    return false;
                }
            }
            self.pop_receipt();
        }

        if self.this().this != there.this {
            return false;
        }

        while let Some(index) = path.pop() {
            if self.push_receipt(index).is_err() {
                return false;
            }
        }

        let arrived = self.this().this == target.this;
        debug!(receipt = %target.this, arrived, "navigation finished");
        arrived
    }

    /// One step of the ascent walk: the receipt's index within its
    /// parent's children list, and the parent itself.
    fn step_toward_root(&self, receipt: &Receipt) -> Option<(usize, Receipt)> {
        let index = self
            .store
            .find_next_receipts(&receipt.hashed.previous)
            .iter()
            .position(|child| *child == receipt.this)?;
        let parent = self.store.find_receipt(&receipt.hashed.previous)?.clone();
        Some((index, parent))
    }

    /// Queue a transaction for later application.
    pub fn queue_transaction(&mut self, txn: Transaction) {
        self.store.queue_transaction(txn);
    }

    pub fn pending_len(&self) -> usize {
        self.store.pending_len()
    }

    /// Drain the pending queue through [`Ledger::push_transaction`],
    /// reporting the outcome per transaction. Rejected transactions are
    /// dropped from the queue, not retried.
    pub fn apply_pending(&mut self) -> Vec<(Transaction, LedgerResult<()>)> {
        let mut results = Vec::new();
        while let Some(txn) = self.store.pop_pending() {
            let outcome = self.push_transaction(txn.clone());
            results.push((txn, outcome));
        }
        results
    }

    fn apply_flows(&mut self, txn: &Transaction) {
        for flow in &txn.flows {
            let mut account = self.store.account_or_zero(&flow.public_key);
            account.amount += flow.amount;
            if flow.amount < 0 {
                account.nonce += 1;
            }
            self.store.insert_account(account);
        }
    }

    fn unapply_flows(&mut self, txn: &Transaction) {
        for flow in &txn.flows {
            let mut account = self.store.account_or_zero(&flow.public_key);
            account.amount -= flow.amount;
            if flow.amount < 0 {
                account.nonce -= 1;
            }
            self.store.insert_account(account);
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
