//! Records addressed by shard and id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Shard identifier.
pub type ShardId = i64;

/// Record identifier within a shard. Zero on insert means "assign the
/// next free id".
pub type RecordId = u64;

/// A pointer from one record to another, possibly across shards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub shard: ShardId,
    pub id: RecordId,
}

/// A schemaless record: scalar fields plus string-keyed maps.
///
/// The maps are ordered so the record's canonical form — and therefore
/// the digest folded into the shard checksum — is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    pub shard: ShardId,
    pub id: RecordId,
    pub ttl: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub refs: BTreeMap<String, Reference>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ints: BTreeMap<String, i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub strings: BTreeMap<String, String>,
}

/// Mutation verb for [`Command`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Insert,
    Remove,
}

/// One mutation request against the store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Command {
    pub action: Action,
    pub record: DataRecord,
}
