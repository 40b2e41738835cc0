// lib/src/lib.rs

//! Core of the prescription tracker: input sanitizing, the sled-backed record
//! store and the create/update/report policy the REST API runs on top of it.

pub mod errors;
pub mod prescriptions;
pub mod sanitization;
pub mod storage_engine;

pub use errors::{Result, RxError};
pub use prescriptions::{PrescriptionService, Report};
pub use storage_engine::{open_storage, DatabaseTarget, PrescriptionStorageEngine, SledPrescriptionStorage};
