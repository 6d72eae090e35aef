//! MessagePack encoding for descriptor records and the cache file

use crate::error::Result;
use descache_api::{DescriptorDb, FileDescriptorRecord};

pub fn encode_record(record: &FileDescriptorRecord) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(record)?)
}

pub fn decode_record(bytes: &[u8]) -> Result<FileDescriptorRecord> {
    Ok(rmp_serde::from_slice(bytes)?)
}

pub fn encode_db(db: &DescriptorDb) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(db)?)
}

pub fn decode_db(bytes: &[u8]) -> Result<DescriptorDb> {
    Ok(rmp_serde::from_slice(bytes)?)
}
