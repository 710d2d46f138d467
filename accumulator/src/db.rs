//! Sharded store with a commutative curve-point checksum.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::{debug, warn};

use tally_crypto::{canonical, sha256, CurvePoint, KeyPair, Signature};

use crate::record::{Action, Command, DataRecord, RecordId, ShardId};
use crate::{AccumulatorError, AccumulatorResult};

/// Per-shard state.
///
/// Each shard owns its checksum point by value, so folding a record into
/// one shard can never disturb another shard's aggregate.
struct ShardState {
    records: HashMap<RecordId, DataRecord>,
    checksum: CurvePoint,
    highest_id: RecordId,
    keypair: Option<KeyPair>,
}

impl ShardState {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            checksum: CurvePoint::identity(),
            highest_id: 0,
            keypair: None,
        }
    }

    /// Fold a record digest into the checksum, subtracting when `negate`.
    fn sum(&mut self, digest: &[u8; 32], negate: bool) {
        let mut term = CurvePoint::mul_base(digest);
        if negate {
            term = term.negate();
        }
        self.checksum = self.checksum.add(&term);
    }
}

/// The record database: shards of records plus their running checksums.
///
/// All operations lock internally, so a `Db` can be shared by reference
/// across threads.
pub struct Db {
    shards: Mutex<HashMap<ShardId, ShardState>>,
}

impl Db {
    /// Create a database with `shard` initialized and given a signing
    /// keypair. Other shards materialize on first use, without keypairs.
    pub fn new(shard: ShardId) -> Self {
        let mut state = ShardState::new();
        state.keypair = Some(KeyPair::generate());

        let mut shards = HashMap::new();
        shards.insert(shard, state);
        Self {
            shards: Mutex::new(shards),
        }
    }

    /// Insert a record. A zero id is assigned the next free id for the
    /// shard; inserting over an existing id is an error and leaves the
    /// checksum untouched.
    pub fn insert(&self, mut record: DataRecord) -> AccumulatorResult<DataRecord> {
        let mut shards = self.shards.lock();
        let state = shards.entry(record.shard).or_insert_with(ShardState::new);

        if record.id == 0 {
            state.highest_id += 1;
            record.id = state.highest_id;
        }
        if state.records.contains_key(&record.id) {
            return Err(AccumulatorError::AlreadyExists {
                shard: record.shard,
                id: record.id,
            });
        }

        let digest = record_digest(&record);
        state.sum(&digest, false);
        state.records.insert(record.id, record.clone());
        Ok(record)
    }

    /// Remove a record. The argument must hash identically to the stored
    /// record, otherwise nothing is removed: subtracting a different
    /// digest would silently corrupt the checksum.
    pub fn remove(&self, record: &DataRecord) -> AccumulatorResult<DataRecord> {
        let mut shards = self.shards.lock();
        let state = shards.entry(record.shard).or_insert_with(ShardState::new);

        let stored = state
            .records
            .get(&record.id)
            .ok_or(AccumulatorError::NotPresent {
                shard: record.shard,
                id: record.id,
            })?;

        let stored_digest = record_digest(stored);
        if stored_digest != record_digest(record) {
            return Err(AccumulatorError::IdentityMismatch {
                shard: record.shard,
                id: record.id,
            });
        }

        let removed = stored.clone();
        state.sum(&stored_digest, true);
        state.records.remove(&record.id);
        Ok(removed)
    }

    /// Dispatch a command, logging the outcome.
    pub fn run(&self, command: Command) -> AccumulatorResult<DataRecord> {
        let result = match command.action {
            Action::Insert => self.insert(command.record.clone()),
            Action::Remove => self.remove(&command.record),
        };
        match &result {
            Ok(record) => debug!(
                shard = record.shard,
                id = record.id,
                action = ?command.action,
                "command applied"
            ),
            Err(err) => warn!(%err, action = ?command.action, "command failed"),
        }
        result
    }

    /// The shard checksum as `shard:xhex,yhex`. An absent shard and the
    /// identity point both print empty coordinates.
    pub fn checksum(&self, shard: ShardId) -> String {
        let shards = self.shards.lock();
        checksum_string(shard, shards.get(&shard))
    }

    /// Sign the current shard checksum with the shard keypair.
    pub fn sign(&self, shard: ShardId) -> AccumulatorResult<Signature> {
        let shards = self.shards.lock();
        let digest = sha256(checksum_string(shard, shards.get(&shard)).as_bytes());
        let keypair = shards
            .get(&shard)
            .and_then(|state| state.keypair.as_ref())
            .ok_or(AccumulatorError::NoKeyPair { shard })?;
        Ok(keypair.sign_digest(&digest)?)
    }

    /// Verify a signature against the current shard checksum. Any change
    /// to the shard since signing makes this fail.
    pub fn verify(&self, shard: ShardId, signature: &Signature) -> bool {
        let shards = self.shards.lock();
        let digest = sha256(checksum_string(shard, shards.get(&shard)).as_bytes());
        let Some(keypair) = shards.get(&shard).and_then(|state| state.keypair.as_ref()) else {
            return false;
        };
        keypair.public_key().verify_digest(&digest, signature)
    }

    /// Fetch a copy of a record.
    pub fn get(&self, shard: ShardId, id: RecordId) -> Option<DataRecord> {
        self.shards
            .lock()
            .get(&shard)
            .and_then(|state| state.records.get(&id))
            .cloned()
    }

    /// Number of records currently in a shard.
    pub fn len(&self, shard: ShardId) -> usize {
        self.shards
            .lock()
            .get(&shard)
            .map(|state| state.records.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, shard: ShardId) -> bool {
        self.len(shard) == 0
    }
}

fn checksum_string(shard: ShardId, state: Option<&ShardState>) -> String {
    match state.and_then(|state| state.checksum.coordinates()) {
        Some((x, y)) => format!("{shard}:{x},{y}"),
        None => format!("{shard}:,"),
    }
}

/// SHA-256 of a record's canonical form.
fn record_digest(record: &DataRecord) -> [u8; 32] {
    sha256(&canonical::to_bytes(record))
}
