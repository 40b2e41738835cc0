// lib/src/storage_engine/storage_engine.rs

use async_trait::async_trait;

use rx_models::{Doctor, DoctorId, DoctorName, Prescription, PrescriptionId};

use crate::errors::Result;

/// The document store behind the API: a doctor collection and a
/// prescription collection, with the schema and uniqueness rules enforced on
/// every write.
#[async_trait]
pub trait PrescriptionStorageEngine: Send + Sync + 'static {
    /// Returns the doctor with exactly this name, inserting one if none
    /// exists. Lookup and insert happen atomically.
    async fn find_or_create_doctor(&self, name: &DoctorName) -> Result<Doctor>;
    async fn get_doctor(&self, id: &DoctorId) -> Result<Option<Doctor>>;
    /// All doctors, oldest first.
    async fn list_doctors(&self) -> Result<Vec<Doctor>>;

    /// Inserts a new prescription. Fails with `AlreadyExists` when another
    /// prescription holds the same SSN.
    async fn insert_prescription(&self, prescription: &Prescription) -> Result<()>;
    /// Overwrites an existing prescription. Fails with `NotFound` when the id
    /// is absent and `AlreadyExists` when the new SSN belongs to another record.
    async fn replace_prescription(&self, prescription: &Prescription) -> Result<()>;
    async fn get_prescription(&self, id: &PrescriptionId) -> Result<Option<Prescription>>;
    async fn find_prescription_by_ssn(&self, ssn: &str) -> Result<Option<Prescription>>;
    /// All prescriptions, oldest first.
    async fn list_prescriptions(&self) -> Result<Vec<Prescription>>;
    /// Removes a prescription, returning it if it existed.
    async fn delete_prescription(&self, id: &PrescriptionId) -> Result<Option<Prescription>>;

    async fn flush(&self) -> Result<()>;
    fn get_type(&self) -> &'static str;
}
