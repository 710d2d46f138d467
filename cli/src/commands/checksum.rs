//! Commutative checksum walkthrough

use clap::Args;

use tally_accumulator::{Action, Command, DataRecord, Db, ShardId};

/// Insert and remove records across two shards, printing checksums and
/// verifying a signature over an earlier state
#[derive(Args)]
pub struct ChecksumDemoCommand {
    /// Primary shard id
    #[arg(long, default_value_t = 22)]
    shard: ShardId,
}

impl ChecksumDemoCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let shard = self.shard;
        let db = Db::new(shard);
        println!("initial checksum: {}", db.checksum(shard));

        db.run(Command {
            action: Action::Insert,
            record: record(shard, 20),
        })?;
        println!("id1: {}", db.checksum(shard));

        let signature = db.sign(shard)?;
        println!("sign {shard}: {}", serde_json::to_string(&signature)?);

        db.run(Command {
            action: Action::Insert,
            record: record(shard, 21),
        })?;
        println!("id1+id2: {}", db.checksum(shard));

        let second = db
            .get(shard, 2)
            .ok_or_else(|| anyhow::anyhow!("record {shard}:2 vanished"))?;
        db.run(Command {
            action: Action::Remove,
            record: second,
        })?;
        println!("id1: {}", db.checksum(shard));

        // A second shard; its churn must not move the first checksum.
        let other_shard = shard + 180;
        db.run(Command {
            action: Action::Insert,
            record: record(other_shard, 50),
        })?;
        println!("shard {other_shard}, id1: {}", db.checksum(other_shard));

        let other = db
            .get(other_shard, 1)
            .ok_or_else(|| anyhow::anyhow!("record {other_shard}:1 vanished"))?;
        db.run(Command {
            action: Action::Remove,
            record: other,
        })?;

        // Back to the state that was signed, so this verifies.
        println!("verify: {}", db.verify(shard, &signature));

        let first = db
            .get(shard, 1)
            .ok_or_else(|| anyhow::anyhow!("record {shard}:1 vanished"))?;
        db.run(Command {
            action: Action::Remove,
            record: first,
        })?;
        println!("empty checksum: {}", db.checksum(shard));

        Ok(())
    }
}

fn record(shard: ShardId, ttl: i64) -> DataRecord {
    DataRecord {
        shard,
        ttl,
        ..DataRecord::default()
    }
}
