//! Binary encoding of persisted spawn point records.
//!
//! Records are written with bincode: each record carries its schema version,
//! placement and a length-prefixed list of creature references. Decoding
//! refuses records written by a newer schema.

use hive_frontier_core::{SpawnPointId, SpawnPointRecord, SPAWN_POINT_RECORD_VERSION};
use thiserror::Error;

/// Errors raised while encoding or decoding persisted records.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// bincode failed to encode or decode the payload.
    #[error("could not process spawn point records: {0}")]
    Codec(#[from] bincode::Error),
    /// A record was written by a schema this build does not understand.
    #[error("spawn point {} uses record version {version}, newest supported is {supported}", spawn_point.get())]
    UnsupportedVersion {
        /// Spawn point whose record was rejected.
        spawn_point: SpawnPointId,
        /// Version found in the record.
        version: u32,
        /// Newest version this build reads.
        supported: u32,
    },
}

/// Encodes records into a single binary blob.
pub fn encode_records(records: &[SpawnPointRecord]) -> Result<Vec<u8>, PersistenceError> {
    Ok(bincode::serialize(records)?)
}

/// Decodes a blob produced by [`encode_records`].
pub fn decode_records(bytes: &[u8]) -> Result<Vec<SpawnPointRecord>, PersistenceError> {
    let records: Vec<SpawnPointRecord> = bincode::deserialize(bytes)?;
    if let Some(record) = records
        .iter()
        .find(|record| record.version > SPAWN_POINT_RECORD_VERSION)
    {
        return Err(PersistenceError::UnsupportedVersion {
            spawn_point: record.id,
            version: record.version,
            supported: SPAWN_POINT_RECORD_VERSION,
        });
    }
    Ok(records)
}
