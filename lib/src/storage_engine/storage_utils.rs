// lib/src/storage_engine/storage_utils.rs

use bincode::{
    config::{self, BigEndian, Configuration, Fixint},
    serde::{decode_from_slice, encode_to_vec},
};
use serde::{de::DeserializeOwned, Serialize};

use rx_models::DoctorName;

use crate::errors::Result;

/// Provides a standard bincode configuration.
fn bincode_config() -> Configuration<BigEndian, Fixint> {
    config::standard()
        .with_big_endian()
        .with_fixed_int_encoding()
}

/// Helper to serialize a stored record to bytes using bincode.
pub fn serialize_record<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    Ok(encode_to_vec(record, bincode_config())?)
}

/// Helper to deserialize bytes back into a stored record.
pub fn deserialize_record<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let (record, _) = decode_from_slice(bytes, bincode_config())?;
    Ok(record)
}

/// Key of the doctor-name index. The first name is length-prefixed so that
/// no two distinct pairs share a key.
pub fn doctor_name_key(name: &DoctorName) -> Vec<u8> {
    let first = name.first_name.as_bytes();
    let last = name.last_name.as_bytes();
    let mut key = Vec::with_capacity(4 + first.len() + last.len());
    key.extend_from_slice(&(first.len() as u32).to_be_bytes());
    key.extend_from_slice(first);
    key.extend_from_slice(last);
    key
}
