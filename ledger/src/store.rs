//! In-memory index of accounts, receipts, and chain tips.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use tally_crypto::{PublicKey, PublicKeyString};

use crate::receipt::{ChainLength, HashPointer, Receipt};
use crate::transaction::{Nonce, Transaction};

/// An account row: the balance and replay nonce for one public key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "publickey")]
    pub public_key: PublicKey,
    pub amount: i64,
    pub nonce: Nonce,
}

impl Account {
    /// The zero account a key gets on first reference.
    pub fn materialize(public_key: PublicKey) -> Self {
        Self {
            public_key,
            amount: 0,
            nonce: 0,
        }
    }
}

/// Owning store for receipts, accounts, and the navigation cursors.
///
/// Receipts are held by value and addressed by hash pointer; children
/// lists hold pointer copies in insertion order, so parents never own
/// their children. The cursors are pointers too, never references into
/// the maps.
#[derive(Debug)]
pub struct Stored {
    accounts: HashMap<PublicKeyString, Account>,
    receipts: HashMap<HashPointer, Receipt>,
    next_receipts: HashMap<HashPointer, Vec<HashPointer>>,
    highest: Vec<HashPointer>,
    genesis: HashPointer,
    current: HashPointer,
    pending: VecDeque<Transaction>,
}

impl Stored {
    /// Create a store seeded with the genesis receipt.
    pub fn new() -> Self {
        let genesis = Receipt::genesis();
        let pointer = genesis.this.clone();
        let mut store = Self {
            accounts: HashMap::new(),
            receipts: HashMap::new(),
            next_receipts: HashMap::new(),
            highest: Vec::new(),
            genesis: pointer.clone(),
            current: pointer,
            pending: VecDeque::new(),
        };
        store.insert_receipt(genesis);
        store
    }

    /// Insert a receipt: store it by `this`, index it under its parent
    /// (idempotently), and maintain the highest-chain-length set — append
    /// on a tie, replace on a strictly greater length.
    pub fn insert_receipt(&mut self, receipt: Receipt) {
        let this = receipt.this.clone();

        let children = self
            .next_receipts
            .entry(receipt.hashed.previous.clone())
            .or_default();
        if !children.contains(&this) {
            children.push(this.clone());
        }

        // Mirror the children index onto the parent receipt itself.
        if let Some(parent) = self.receipts.get_mut(&receipt.hashed.previous) {
            if !parent.next.contains(&this) {
                parent.next.push(this.clone());
            }
        }

        match self.highest_chain_length() {
            Some(max) if receipt.chain_length() < max => {}
            Some(max) if receipt.chain_length() == max => {
                if !self.highest.contains(&this) {
                    self.highest.push(this.clone());
                }
            }
            _ => self.highest = vec![this.clone()],
        }

        self.receipts.insert(this, receipt);
    }

    /// The chain length shared by the current tips, if any receipt is
    /// stored yet.
    pub fn highest_chain_length(&self) -> Option<ChainLength> {
        self.highest
            .iter()
            .filter_map(|pointer| self.receipts.get(pointer))
            .map(Receipt::chain_length)
            .max()
    }

    pub fn find_receipt(&self, pointer: &HashPointer) -> Option<&Receipt> {
        self.receipts.get(pointer)
    }

    /// Children of a receipt in insertion order; empty on a miss.
    pub fn find_next_receipts(&self, pointer: &HashPointer) -> Vec<HashPointer> {
        self.next_receipts.get(pointer).cloned().unwrap_or_default()
    }

    pub fn insert_account(&mut self, account: Account) {
        self.accounts
            .insert(account.public_key.key_string(), account);
    }

    pub fn find_account(&self, key: &PublicKeyString) -> Option<&Account> {
        self.accounts.get(key)
    }

    /// The account for a key, materialized at zero if never seen.
    pub fn account_or_zero(&self, public_key: &PublicKey) -> Account {
        self.accounts
            .get(&public_key.key_string())
            .cloned()
            .unwrap_or_else(|| Account::materialize(public_key.clone()))
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn genesis_receipt(&self) -> &Receipt {
        self.receipts
            .get(&self.genesis)
            .expect("genesis receipt is seeded at construction")
    }

    pub fn current_receipt(&self) -> &Receipt {
        self.receipts
            .get(&self.current)
            .expect("cursor always points at a stored receipt")
    }

    /// Move the cursor. The caller is responsible for keeping the account
    /// table in step.
    pub fn set_current(&mut self, pointer: HashPointer) {
        self.current = pointer;
    }

    /// Receipts tied for the maximum chain length.
    pub fn highest(&self) -> &[HashPointer] {
        &self.highest
    }

    /// Queue a transaction for later application.
    pub fn queue_transaction(&mut self, transaction: Transaction) {
        self.pending.push_back(transaction);
    }

    /// Take the oldest queued transaction.
    pub fn pop_pending(&mut self) -> Option<Transaction> {
        self.pending.pop_front()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl Default for Stored {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::Hashed;
    use tally_crypto::KeyPair;

    fn child_of(parent: &Receipt, chain_length: ChainLength, tag: i64) -> Receipt {
        // Distinct tag amounts make distinct hashes.
        let keypair = KeyPair::generate();
        let transaction = Transaction::new(vec![(
            crate::transaction::Flow {
                amount: tag,
                public_key: keypair.public_key().clone(),
            },
            0,
        )]);
        let mut receipt = Receipt {
            hashed: Hashed {
                transaction,
                chain_length,
                previous: parent.this.clone(),
            },
            this: HashPointer::default(),
            next: Vec::new(),
        };
        receipt.this = receipt.hash_pointer();
        receipt
    }

    #[test]
    fn test_new_store_holds_genesis() {
        let store = Stored::new();
        let genesis = store.genesis_receipt().clone();

        assert_eq!(store.current_receipt(), &genesis);
        assert_eq!(store.find_receipt(&genesis.this), Some(&genesis));
        assert_eq!(store.highest(), [genesis.this.clone()]);
        assert_eq!(store.highest_chain_length(), Some(0));
    }

    #[test]
    fn test_children_indexed_in_insertion_order() {
        let mut store = Stored::new();
        let genesis = store.genesis_receipt().clone();

        let a = child_of(&genesis, 1, 1);
        let b = child_of(&genesis, 1, 2);
        store.insert_receipt(a.clone());
        store.insert_receipt(b.clone());

        assert_eq!(
            store.find_next_receipts(&genesis.this),
            vec![a.this.clone(), b.this.clone()]
        );
    }

    #[test]
    fn test_parent_receipt_mirrors_children() {
        let mut store = Stored::new();
        let genesis = store.genesis_receipt().clone();

        let a = child_of(&genesis, 1, 1);
        let b = child_of(&genesis, 1, 2);
        store.insert_receipt(a.clone());
        store.insert_receipt(b.clone());

        let parent = store.find_receipt(&genesis.this).unwrap();
        assert_eq!(parent.next, vec![a.this, b.this]);
    }

    #[test]
    fn test_reinsert_does_not_duplicate_child() {
        let mut store = Stored::new();
        let genesis = store.genesis_receipt().clone();

        let a = child_of(&genesis, 1, 1);
        store.insert_receipt(a.clone());
        store.insert_receipt(a.clone());

        assert_eq!(store.find_next_receipts(&genesis.this), vec![a.this]);
    }

    #[test]
    fn test_highest_tracks_ties_and_replacement() {
        let mut store = Stored::new();
        let genesis = store.genesis_receipt().clone();

        let a = child_of(&genesis, 1, 1);
        let b = child_of(&genesis, 1, 2);
        store.insert_receipt(a.clone());
        store.insert_receipt(b.clone());
        assert_eq!(store.highest(), [a.this.clone(), b.this.clone()]);

        let deeper = child_of(&a, 2, 3);
        store.insert_receipt(deeper.clone());
        assert_eq!(store.highest(), [deeper.this]);
        assert_eq!(store.highest_chain_length(), Some(2));
    }

    #[test]
    fn test_miss_is_not_an_error() {
        let store = Stored::new();
        let missing = HashPointer("no such receipt".into());

        assert!(store.find_receipt(&missing).is_none());
        assert!(store.find_next_receipts(&missing).is_empty());
    }

    #[test]
    fn test_account_round_trip() {
        let mut store = Stored::new();
        let keypair = KeyPair::generate();

        let fresh = store.account_or_zero(keypair.public_key());
        assert_eq!(fresh.amount, 0);
        assert_eq!(fresh.nonce, 0);

        let mut account = fresh;
        account.amount = 42;
        account.nonce = 2;
        store.insert_account(account.clone());

        assert_eq!(
            store.find_account(&keypair.public_key().key_string()),
            Some(&account)
        );
        assert_eq!(store.account_or_zero(keypair.public_key()).amount, 42);
    }

    #[test]
    fn test_pending_queue_is_fifo() {
        let mut store = Stored::new();
        let keypair = KeyPair::generate();

        for amount in [1, 2, 3] {
            store.queue_transaction(Transaction::new(vec![(
                crate::transaction::Flow {
                    amount,
                    public_key: keypair.public_key().clone(),
                },
                0,
            )]));
        }
        assert_eq!(store.pending_len(), 3);

        assert_eq!(store.pop_pending().unwrap().flows[0].amount, 1);
        assert_eq!(store.pop_pending().unwrap().flows[0].amount, 2);
        assert_eq!(store.pop_pending().unwrap().flows[0].amount, 3);
        assert!(store.pop_pending().is_none());
    }
}
