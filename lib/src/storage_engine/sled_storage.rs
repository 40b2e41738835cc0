// lib/src/storage_engine/sled_storage.rs

use std::path::Path;

use async_trait::async_trait;
use log::{debug, info, warn};
use sled::transaction::{
    ConflictableTransactionError, TransactionError, TransactionResult, Transactional,
};
use sled::{Db, Tree};

use rx_models::{Doctor, DoctorId, DoctorName, Prescription, PrescriptionId};

use crate::errors::{Result, RxError};
use crate::storage_engine::config::DatabaseTarget;
use crate::storage_engine::storage_engine::PrescriptionStorageEngine;
use crate::storage_engine::storage_utils::{
    deserialize_record, doctor_name_key, serialize_record,
};

pub const DOCTORS_TREE: &str = "doctors";
pub const DOCTOR_NAMES_TREE: &str = "doctor_names";
pub const PRESCRIPTIONS_TREE: &str = "prescriptions";
pub const PRESCRIPTION_SSNS_TREE: &str = "prescription_ssns";

const DUPLICATE_SSN: &str = "A prescription with this SSN already exists";
const PRESCRIPTION_NOT_FOUND: &str = "Prescription not found";

/// Opens (or creates) the sled database a target points at.
pub fn open_sled_db(target: &DatabaseTarget) -> Result<Db> {
    let db = match target {
        DatabaseTarget::Path(path) => {
            info!("Opening sled database at {:?}", path);
            sled::open(path).map_err(|e| {
                RxError::DatabaseError(format!(
                    "Failed to open sled database at {}: {}",
                    path.display(),
                    e
                ))
            })?
        }
        DatabaseTarget::Temporary => {
            info!("Opening temporary sled database");
            sled::Config::new().temporary(true).open()?
        }
    };
    Ok(db)
}

/// Sled-backed implementation of [`PrescriptionStorageEngine`].
///
/// Records live in `doctors` and `prescriptions`, keyed by id. Two index
/// trees enforce the unique keys: `doctor_names` maps a name pair to its
/// doctor id, `prescription_ssns` maps an SSN to its prescription id. Every
/// write that touches a record and its index runs as one transaction.
pub struct SledPrescriptionStorage {
    db: Db,
    doctors: Tree,
    doctor_names: Tree,
    prescriptions: Tree,
    prescription_ssns: Tree,
}

impl SledPrescriptionStorage {
    pub fn new(db: Db) -> Result<Self> {
        let doctors = db.open_tree(DOCTORS_TREE)?;
        let doctor_names = db.open_tree(DOCTOR_NAMES_TREE)?;
        let prescriptions = db.open_tree(PRESCRIPTIONS_TREE)?;
        let prescription_ssns = db.open_tree(PRESCRIPTION_SSNS_TREE)?;
        Ok(Self {
            db,
            doctors,
            doctor_names,
            prescriptions,
            prescription_ssns,
        })
    }

    pub fn open(target: &DatabaseTarget) -> Result<Self> {
        Self::new(open_sled_db(target)?)
    }

    /// A throwaway store, used by tests and demos.
    pub fn temporary() -> Result<Self> {
        Self::open(&DatabaseTarget::Temporary)
    }

    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(&DatabaseTarget::Path(path.to_path_buf()))
    }

    fn scan<T: serde::de::DeserializeOwned>(tree: &Tree) -> Result<Vec<T>> {
        let mut records = Vec::with_capacity(tree.len());
        for item in tree.iter() {
            let (_key, value) = item?;
            records.push(deserialize_record(&value)?);
        }
        Ok(records)
    }
}

fn abort<T>(err: RxError) -> std::result::Result<T, ConflictableTransactionError<RxError>> {
    Err(ConflictableTransactionError::Abort(err))
}

fn finish<T>(result: TransactionResult<T, RxError>) -> Result<T> {
    result.map_err(|e| match e {
        TransactionError::Abort(err) => err,
        TransactionError::Storage(err) => RxError::from(err),
    })
}

#[async_trait]
impl PrescriptionStorageEngine for SledPrescriptionStorage {
    async fn find_or_create_doctor(&self, name: &DoctorName) -> Result<Doctor> {
        name.validate()?;
        let key = doctor_name_key(name);

        let doctor = finish((&self.doctors, &self.doctor_names).transaction(
            |(doctors, names)| {
                if let Some(id_bytes) = names.get(&key)? {
                    let id = match DoctorId::from_slice(&id_bytes) {
                        Ok(id) => id,
                        Err(e) => return abort(RxError::from(e)),
                    };
                    if let Some(bytes) = doctors.get(id.as_bytes())? {
                        return match deserialize_record::<Doctor>(&bytes) {
                            Ok(doctor) => Ok(doctor),
                            Err(e) => abort(e),
                        };
                    }
                    // index entry without a record; fall through and recreate
                }

                let doctor = Doctor::from_name(name.clone());
                let bytes = match serialize_record(&doctor) {
                    Ok(bytes) => bytes,
                    Err(e) => return abort(e),
                };
                doctors.insert(&doctor.id.as_bytes()[..], bytes)?;
                names.insert(key.as_slice(), &doctor.id.as_bytes()[..])?;
                Ok(doctor)
            },
        ))?;

        debug!("Resolved doctor {} to {}", name.display_name(), doctor.id);
        Ok(doctor)
    }

    async fn get_doctor(&self, id: &DoctorId) -> Result<Option<Doctor>> {
        match self.doctors.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(deserialize_record(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        let mut doctors: Vec<Doctor> = Self::scan(&self.doctors)?;
        doctors.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(doctors)
    }

    async fn insert_prescription(&self, prescription: &Prescription) -> Result<()> {
        prescription.validate()?;
        let bytes = serialize_record(prescription)?;
        let id = prescription.id;
        let ssn = prescription.patient_ssn.as_bytes();

        finish((&self.prescriptions, &self.prescription_ssns).transaction(
            |(prescriptions, ssns)| {
                if ssns.get(ssn)?.is_some() {
                    return abort(RxError::AlreadyExists(DUPLICATE_SSN.to_string()));
                }
                if prescriptions.get(id.as_bytes())?.is_some() {
                    return abort(RxError::AlreadyExists(format!(
                        "Prescription {} already exists",
                        id
                    )));
                }
                ssns.insert(ssn, &id.as_bytes()[..])?;
                prescriptions.insert(&id.as_bytes()[..], bytes.as_slice())?;
                Ok(())
            },
        ))?;

        info!("Inserted prescription {}", id);
        Ok(())
    }

    async fn replace_prescription(&self, prescription: &Prescription) -> Result<()> {
        prescription.validate()?;
        let bytes = serialize_record(prescription)?;
        let id = prescription.id;
        let new_ssn = prescription.patient_ssn.as_bytes();

        finish((&self.prescriptions, &self.prescription_ssns).transaction(
            |(prescriptions, ssns)| {
                let current: Prescription = match prescriptions.get(id.as_bytes())? {
                    Some(existing) => match deserialize_record(&existing) {
                        Ok(current) => current,
                        Err(e) => return abort(e),
                    },
                    None => return abort(RxError::NotFound(PRESCRIPTION_NOT_FOUND.to_string())),
                };

                if current.patient_ssn.as_bytes() != new_ssn {
                    if let Some(owner) = ssns.get(new_ssn)? {
                        if owner.as_ref() != &id.as_bytes()[..] {
                            return abort(RxError::AlreadyExists(DUPLICATE_SSN.to_string()));
                        }
                    }
                    ssns.remove(current.patient_ssn.as_bytes())?;
                    ssns.insert(new_ssn, &id.as_bytes()[..])?;
                }
                prescriptions.insert(&id.as_bytes()[..], bytes.as_slice())?;
                Ok(())
            },
        ))?;

        info!("Replaced prescription {}", id);
        Ok(())
    }

    async fn get_prescription(&self, id: &PrescriptionId) -> Result<Option<Prescription>> {
        match self.prescriptions.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(deserialize_record(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_prescription_by_ssn(&self, ssn: &str) -> Result<Option<Prescription>> {
        let Some(id_bytes) = self.prescription_ssns.get(ssn.as_bytes())? else {
            return Ok(None);
        };
        let id = PrescriptionId::from_slice(&id_bytes)?;
        let found = self.get_prescription(&id).await?;
        if found.is_none() {
            warn!("SSN index points at missing prescription {}", id);
        }
        Ok(found)
    }

    async fn list_prescriptions(&self) -> Result<Vec<Prescription>> {
        let mut prescriptions: Vec<Prescription> = Self::scan(&self.prescriptions)?;
        prescriptions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(prescriptions)
    }

    async fn delete_prescription(&self, id: &PrescriptionId) -> Result<Option<Prescription>> {
        let removed = finish((&self.prescriptions, &self.prescription_ssns).transaction(
            |(prescriptions, ssns)| {
                let Some(bytes) = prescriptions.remove(&id.as_bytes()[..])? else {
                    return Ok(None);
                };
                let prescription: Prescription = match deserialize_record(&bytes) {
                    Ok(prescription) => prescription,
                    Err(e) => return abort(e),
                };
                let ssn = prescription.patient_ssn.as_bytes();
                if let Some(owner) = ssns.get(ssn)? {
                    if owner.as_ref() == &id.as_bytes()[..] {
                        ssns.remove(ssn)?;
                    }
                }
                Ok(Some(prescription))
            },
        ))?;

        if removed.is_some() {
            info!("Deleted prescription {}", id);
        }
        Ok(removed)
    }

    async fn flush(&self) -> Result<()> {
        let bytes = self.db.flush_async().await?;
        debug!("Flushed {} bytes to sled", bytes);
        Ok(())
    }

    fn get_type(&self) -> &'static str {
        "Sled"
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};

    use super::*;
    use rx_models::PrescriptionDraft;

    fn draft(ssn: &str) -> PrescriptionDraft {
        PrescriptionDraft {
            first_name: "Eric".into(),
            last_name: "Foreman".into(),
            prescription_name: "Prednisone".into(),
            amount: "40".into(),
            patient_name: "John Roe".into(),
            patient_ssn: ssn.into(),
        }
    }

    async fn prescription(store: &SledPrescriptionStorage, ssn: &str) -> Result<Prescription> {
        let doctor = store
            .find_or_create_doctor(&DoctorName::new("Eric", "Foreman"))
            .await?;
        Ok(Prescription::new(&draft(ssn), 40.0, doctor.id))
    }

    #[tokio::test]
    async fn find_or_create_reuses_doctors_by_name() -> Result<()> {
        let store = SledPrescriptionStorage::temporary()?;
        let first = store
            .find_or_create_doctor(&DoctorName::new("Robert", "Chase"))
            .await?;
        let again = store
            .find_or_create_doctor(&DoctorName::new("Robert", "Chase"))
            .await?;
        let other = store
            .find_or_create_doctor(&DoctorName::new("Robert", "Chas"))
            .await?;

        assert_eq!(first.id, again.id);
        assert_ne!(first.id, other.id);
        assert_eq!(store.list_doctors().await?.len(), 2);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_find_or_create_yields_one_doctor() -> Result<()> {
        const CALLERS: usize = 32;
        let store = Arc::new(SledPrescriptionStorage::temporary()?);
        let barrier = Arc::new(Barrier::new(CALLERS));
        let runtime = tokio::runtime::Handle::current();

        let mut handles = Vec::new();
        for _ in 0..CALLERS {
            let store = store.clone();
            let barrier = barrier.clone();
            let runtime = runtime.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                barrier.wait();
                runtime.block_on(store.find_or_create_doctor(&DoctorName::new("Chris", "Taub")))
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.expect("creator thread panicked")?.id);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(store.list_doctors().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_invalid_doctor_names() -> Result<()> {
        let store = SledPrescriptionStorage::temporary()?;
        let err = store
            .find_or_create_doctor(&DoctorName::new("", "Kutner"))
            .await
            .unwrap_err();
        assert!(matches!(err, RxError::Validation(_)));
        assert!(store.list_doctors().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn ssn_is_unique_across_prescriptions() -> Result<()> {
        let store = SledPrescriptionStorage::temporary()?;
        let first = prescription(&store, "123-45-6789").await?;
        store.insert_prescription(&first).await?;

        let second = prescription(&store, "123-45-6789").await?;
        let err = store.insert_prescription(&second).await.unwrap_err();
        assert!(matches!(err, RxError::AlreadyExists(_)));
        assert_eq!(store.list_prescriptions().await?.len(), 1);

        let found = store.find_prescription_by_ssn("123-45-6789").await?;
        assert_eq!(found.map(|p| p.id), Some(first.id));
        Ok(())
    }

    #[tokio::test]
    async fn schema_is_checked_on_write() -> Result<()> {
        let store = SledPrescriptionStorage::temporary()?;
        let mut bad = prescription(&store, "123-45-6789").await?;
        bad.patient_ssn = "123456789".into();
        bad.patient_name.clear();
        let err = store.insert_prescription(&bad).await.unwrap_err();
        match err {
            RxError::Validation(errors) => assert_eq!(errors.0.len(), 2),
            other => panic!("unexpected error {:?}", other),
        }
        Ok(())
    }

    #[tokio::test]
    async fn replace_moves_the_ssn_index() -> Result<()> {
        let store = SledPrescriptionStorage::temporary()?;
        let mut a = prescription(&store, "111-11-1111").await?;
        let b = prescription(&store, "222-22-2222").await?;
        store.insert_prescription(&a).await?;
        store.insert_prescription(&b).await?;

        // same SSN as before is fine
        a.amount = 80.0;
        store.replace_prescription(&a).await?;

        // taking b's SSN is not
        a.patient_ssn = "222-22-2222".into();
        let err = store.replace_prescription(&a).await.unwrap_err();
        assert!(matches!(err, RxError::AlreadyExists(_)));

        a.patient_ssn = "333-33-3333".into();
        store.replace_prescription(&a).await?;
        assert!(store.find_prescription_by_ssn("111-11-1111").await?.is_none());
        assert_eq!(
            store.find_prescription_by_ssn("333-33-3333").await?.map(|p| p.amount),
            Some(80.0)
        );
        Ok(())
    }

    #[tokio::test]
    async fn replace_of_missing_record_is_not_found() -> Result<()> {
        let store = SledPrescriptionStorage::temporary()?;
        let ghost = prescription(&store, "444-44-4444").await?;
        let err = store.replace_prescription(&ghost).await.unwrap_err();
        assert!(matches!(err, RxError::NotFound(_)));
        Ok(())
    }

    #[tokio::test]
    async fn delete_frees_the_ssn() -> Result<()> {
        let store = SledPrescriptionStorage::temporary()?;
        let p = prescription(&store, "555-55-5555").await?;
        store.insert_prescription(&p).await?;

        assert_eq!(store.delete_prescription(&p.id).await?.map(|p| p.id), Some(p.id));
        assert!(store.delete_prescription(&p.id).await?.is_none());
        assert!(store.get_prescription(&p.id).await?.is_none());

        let reuse = prescription(&store, "555-55-5555").await?;
        store.insert_prescription(&reuse).await?;
        Ok(())
    }

    #[tokio::test]
    async fn records_persist_across_reopen() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let id = {
            let store = SledPrescriptionStorage::open_path(dir.path())?;
            let p = prescription(&store, "666-66-6666").await?;
            store.insert_prescription(&p).await?;
            store.flush().await?;
            p.id
        };
        let store = SledPrescriptionStorage::open_path(dir.path())?;
        assert!(store.get_prescription(&id).await?.is_some());
        assert_eq!(store.list_doctors().await?.len(), 1);
        Ok(())
    }
}
