//! Mint-and-spend ledger walkthrough

use clap::Args;
use tracing::info;

use tally_crypto::{KeyPair, PublicKey};
use tally_ledger::{Flow, Ledger, Nonce, Transaction};

/// Run a small mint-and-spend session and print the results
#[derive(Args)]
pub struct DemoCommand {
    /// Amount minted from the treasury to alice
    #[arg(long, default_value_t = 100)]
    mint: i64,
}

impl DemoCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let mut ledger = Ledger::new();

        let treasury = KeyPair::generate();
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        // The treasury may go negative; that is how value enters.
        ledger.as_bank(treasury.public_key());

        let mut mint = transfer(&treasury, alice.public_key(), self.mint, 0);
        ledger.sign(&treasury, &mut mint, 0)?;
        ledger
            .push_transaction(mint)
            .map_err(|e| anyhow::anyhow!("mint failed: {e}"))?;
        info!(chain_length = ledger.this().chain_length(), "minted");

        let mut seed_bob = transfer(&treasury, bob.public_key(), 20, 1);
        ledger.sign(&treasury, &mut seed_bob, 0)?;
        ledger
            .push_transaction(seed_bob)
            .map_err(|e| anyhow::anyhow!("transfer failed: {e}"))?;

        let mut spend = transfer(&alice, bob.public_key(), 5, 0);
        ledger.sign(&alice, &mut spend, 0)?;
        ledger
            .push_transaction(spend)
            .map_err(|e| anyhow::anyhow!("spend failed: {e}"))?;

        println!("final receipt:");
        println!("{}", serde_json::to_string_pretty(&ledger.this())?);
        println!();
        println!("balances:");
        println!("  treasury: {}", ledger.balance(treasury.public_key()));
        println!("  alice:    {}", ledger.balance(alice.public_key()));
        println!("  bob:      {}", ledger.balance(bob.public_key()));

        Ok(())
    }
}

fn transfer(from: &KeyPair, to: &PublicKey, amount: i64, nonce: Nonce) -> Transaction {
    Transaction::new(vec![
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
    ])
}
