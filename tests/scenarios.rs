//! End-to-end ledger and accumulator scenarios.

use tally::prelude::*;
use tally_crypto::PublicKey;
use tally_ledger::Nonce;

fn transfer(from: &KeyPair, to: &PublicKey, amount: i64, nonce: Nonce) -> Transaction {
    let mut txn = Transaction::new(vec![
        (
            Flow {
                amount: -amount,
                public_key: from.public_key().clone(),
            },
            nonce,
        ),
        (
            Flow {
                amount,
                public_key: to.clone(),
            },
            0,
        ),
    ]);
    txn.sign(from, 0).unwrap();
    txn
}

struct Session {
    ledger: Ledger,
    treasury: KeyPair,
    alice: KeyPair,
    bob: KeyPair,
}

/// Mint 100 treasury->alice, move 20 treasury->bob, move 5 alice->bob.
fn mint_and_spend() -> Session {
    let mut ledger = Ledger::new();
    let treasury = KeyPair::generate();
    let alice = KeyPair::generate();
    let bob = KeyPair::generate();

    ledger.as_bank(treasury.public_key());

    // The recipient co-signs the mint; signing an inflow is legal.
    let mut mint = transfer(&treasury, alice.public_key(), 100, 0);
    mint.sign(&alice, 1).unwrap();
    ledger.push_transaction(mint).unwrap();
    assert_eq!(ledger.this().chain_length(), 1);

    ledger
        .push_transaction(transfer(&treasury, bob.public_key(), 20, 1))
        .unwrap();
    ledger
        .push_transaction(transfer(&alice, bob.public_key(), 5, 0))
        .unwrap();

    Session {
        ledger,
        treasury,
        alice,
        bob,
    }
}

fn assert_terminal_balances(session: &Session) {
    assert_eq!(session.ledger.balance(session.treasury.public_key()), -120);
    assert_eq!(session.ledger.balance(session.alice.public_key()), 95);
    assert_eq!(session.ledger.balance(session.bob.public_key()), 25);
}

#[test]
fn test_mint_and_spend() {
    let session = mint_and_spend();

    assert_eq!(session.ledger.this().chain_length(), 3);
    assert_terminal_balances(&session);

    // Banks contribute their negative balances, so the table nets to zero.
    let total = session.ledger.balance(session.treasury.public_key())
        + session.ledger.balance(session.alice.public_key())
        + session.ledger.balance(session.bob.public_key());
    assert_eq!(total, 0);
}

#[test]
fn test_double_spend_rejected() {
    let mut session = mint_and_spend();

    // The exact transaction that already landed, replayed verbatim.
    let replay = session.ledger.this().hashed.transaction.clone();
    assert_eq!(
        session.ledger.push_transaction(replay),
        Err(TxnError::Replay)
    );
    assert_terminal_balances(&session);
}

#[test]
fn test_future_nonce_waits() {
    let mut session = mint_and_spend();

    let nonce = session.ledger.nonce(session.alice.public_key());
    let txn = transfer(&session.alice, session.bob.public_key(), 5, nonce + 2);
    assert_eq!(session.ledger.push_transaction(txn), Err(TxnError::Wait));
    assert_terminal_balances(&session);
}

#[test]
fn test_insufficient_balance_rejected() {
    let mut session = mint_and_spend();
    let charles = KeyPair::generate();

    let txn = transfer(&session.bob, charles.public_key(), 1000, 0);
    assert_eq!(
        session.ledger.push_transaction(txn),
        Err(TxnError::BelowZero)
    );
    assert_terminal_balances(&session);
}

#[test]
fn test_pop_push_round_trip() {
    let mut session = mint_and_spend();

    for _ in 0..3 {
        assert!(session.ledger.pop_receipt());
    }
    assert_eq!(session.ledger.this(), session.ledger.genesis());
    assert!(!session.ledger.can_pop_receipt());
    assert_eq!(session.ledger.balance(session.alice.public_key()), 0);

    // The chain is linear, so child 0 leads back to the tip.
    for _ in 0..3 {
        session.ledger.push_receipt(0).unwrap();
    }
    assert_eq!(session.ledger.this().chain_length(), 3);
    assert_terminal_balances(&session);
}

#[test]
fn test_goto_revisits_any_receipt() {
    let mut session = mint_and_spend();
    let tip = session.ledger.this();
    let genesis = session.ledger.genesis();

    assert!(session.ledger.goto_receipt(&genesis));
    assert_eq!(session.ledger.this().this, genesis.this);

    assert!(session.ledger.goto_receipt(&tip));
    assert_eq!(session.ledger.this().this, tip.this);
    assert_terminal_balances(&session);
}

#[test]
fn test_accumulator_commutativity() {
    const SHARD: i64 = 7;

    let make = |ttl: i64, id: u64| {
        let mut record = DataRecord {
            shard: SHARD,
            id,
            ttl,
            ..DataRecord::default()
        };
        record.strings.insert("name".into(), format!("r{id}"));
        record
    };
    let r1 = make(10, 1);
    let r2 = make(20, 2);
    let r3 = make(30, 3);

    let db_a = Db::new(SHARD);
    let db_b = Db::new(SHARD);

    // Order A: 1, 2, 3. Order B: 3, 1, 2.
    for r in [&r1, &r2, &r3] {
        db_a.insert(r.clone()).unwrap();
    }
    for r in [&r3, &r1, &r2] {
        db_b.insert(r.clone()).unwrap();
    }
    assert_eq!(db_a.checksum(SHARD), db_b.checksum(SHARD));

    db_a.remove(&r2).unwrap();
    db_b.remove(&r2).unwrap();
    assert_eq!(db_a.checksum(SHARD), db_b.checksum(SHARD));

    // Removing and reinserting the same record is a no-op for the
    // aggregate.
    let step = db_a.checksum(SHARD);
    db_a.remove(&r1).unwrap();
    db_a.insert(r1.clone()).unwrap();
    assert_eq!(db_a.checksum(SHARD), step);
}
