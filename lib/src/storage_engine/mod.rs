// lib/src/storage_engine/mod.rs

pub mod config;
pub mod sled_storage;
pub mod storage_engine;
pub mod storage_utils;

pub use config::DatabaseTarget;
pub use sled_storage::{open_sled_db, SledPrescriptionStorage};
pub use storage_engine::PrescriptionStorageEngine;

use std::sync::Arc;

use crate::errors::Result;

/// Opens the record store a connection target names.
pub fn open_storage(target: &DatabaseTarget) -> Result<Arc<dyn PrescriptionStorageEngine>> {
    let storage = SledPrescriptionStorage::open(target)?;
    Ok(Arc::new(storage) as Arc<dyn PrescriptionStorageEngine>)
}
