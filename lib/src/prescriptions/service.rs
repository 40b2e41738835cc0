// lib/src/prescriptions/service.rs

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info};

use rx_models::{
    Doctor, DoctorId, DoctorView, Prescription, PrescriptionDraft, PrescriptionId,
    PrescriptionPayload, PrescriptionView, ReportFilters, ReportRequest, ReportStats, Scalar,
};

use crate::errors::{Result, RxError};
use crate::prescriptions::reports::{filter_options, summarize, ReportQuery};
use crate::sanitization::{is_ssn_format, sanitize, sanitize_scalar, SanitizeOptions};
use crate::storage_engine::PrescriptionStorageEngine;

pub const INVALID_SSN_FORMAT: &str = "Invalid SSN format. Please use XXX-XX-XXXX format.";
pub const DUPLICATE_SSN: &str = "A prescription with this SSN already exists";
pub const PRESCRIPTION_NOT_FOUND: &str = "Prescription not found";

const DOCTOR_NAME_MAX: usize = 50;
const FREE_TEXT_MAX: usize = 100;

/// Prescriptions matching a report query, plus their aggregate statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub prescriptions: Vec<PrescriptionView>,
    pub stats: ReportStats,
}

/// Request-level policy between the HTTP handlers and the record store:
/// sanitize, check, resolve the doctor, persist, then expand for display.
#[derive(Clone)]
pub struct PrescriptionService {
    storage: Arc<dyn PrescriptionStorageEngine>,
}

impl PrescriptionService {
    pub fn new(storage: Arc<dyn PrescriptionStorageEngine>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<dyn PrescriptionStorageEngine> {
        &self.storage
    }

    pub async fn create(&self, payload: &PrescriptionPayload) -> Result<PrescriptionView> {
        let draft = draft_from_payload(payload);
        ensure_ssn_format(&draft.patient_ssn)?;
        if self
            .storage
            .find_prescription_by_ssn(&draft.patient_ssn)
            .await?
            .is_some()
        {
            return Err(RxError::AlreadyExists(DUPLICATE_SSN.to_string()));
        }
        let amount = draft.validate()?;

        let doctor = self.storage.find_or_create_doctor(&draft.doctor_name()).await?;
        let prescription = Prescription::new(&draft, amount, doctor.id);
        self.storage.insert_prescription(&prescription).await?;

        info!(
            "Created prescription {} for doctor {}",
            prescription.id,
            doctor.display_name()
        );
        Ok(PrescriptionView::new(prescription, Some(&doctor)))
    }

    pub async fn update(&self, id: &str, payload: &PrescriptionPayload) -> Result<PrescriptionView> {
        let draft = draft_from_payload(payload);
        ensure_ssn_format(&draft.patient_ssn)?;

        let mut prescription = match parse_prescription_id(id) {
            Some(id) => self.storage.get_prescription(&id).await?,
            None => None,
        }
        .ok_or_else(|| RxError::NotFound(PRESCRIPTION_NOT_FOUND.to_string()))?;

        if prescription.patient_ssn != draft.patient_ssn {
            if let Some(holder) = self.storage.find_prescription_by_ssn(&draft.patient_ssn).await? {
                if holder.id != prescription.id {
                    return Err(RxError::AlreadyExists(DUPLICATE_SSN.to_string()));
                }
            }
        }
        let amount = draft.validate()?;

        let name = draft.doctor_name();
        let doctor = match self.storage.get_doctor(&prescription.doctor_id).await? {
            Some(current) if current.name() == name => current,
            _ => self.storage.find_or_create_doctor(&name).await?,
        };
        prescription.apply(&draft, amount, doctor.id);
        self.storage.replace_prescription(&prescription).await?;

        info!("Updated prescription {}", prescription.id);
        Ok(PrescriptionView::new(prescription, Some(&doctor)))
    }

    /// Deletes by id, returning the removed record.
    pub async fn delete(&self, id: &str) -> Result<Prescription> {
        let removed = match parse_prescription_id(id) {
            Some(id) => self.storage.delete_prescription(&id).await?,
            None => None,
        };
        removed.ok_or_else(|| RxError::NotFound(PRESCRIPTION_NOT_FOUND.to_string()))
    }

    pub async fn list(&self) -> Result<Vec<PrescriptionView>> {
        let doctors = self.doctor_index().await?;
        let prescriptions = self.storage.list_prescriptions().await?;
        Ok(expand(prescriptions, &doctors))
    }

    /// Every doctor with the prescriptions that reference it.
    pub async fn list_doctors(&self) -> Result<Vec<DoctorView>> {
        let doctors = self.storage.list_doctors().await?;
        let mut by_doctor: HashMap<DoctorId, Vec<Prescription>> = HashMap::new();
        for prescription in self.storage.list_prescriptions().await? {
            by_doctor
                .entry(prescription.doctor_id)
                .or_default()
                .push(prescription);
        }
        Ok(doctors
            .into_iter()
            .map(|doctor| DoctorView {
                prescriptions: by_doctor.remove(&doctor.id).unwrap_or_default(),
                doctor,
            })
            .collect())
    }

    pub async fn report(&self, request: &ReportRequest) -> Result<Report> {
        let query = ReportQuery::from_request(request)?;
        debug!("Running report query {:?}", query);

        let doctors = self.doctor_index().await?;
        let matching: Vec<Prescription> = self
            .storage
            .list_prescriptions()
            .await?
            .into_iter()
            .filter(|p| query.matches(p))
            .collect();
        let prescriptions = expand(matching, &doctors);
        let stats = summarize(&prescriptions);
        Ok(Report {
            prescriptions,
            stats,
        })
    }

    pub async fn report_filters(&self) -> Result<ReportFilters> {
        let doctors = self.storage.list_doctors().await?;
        let prescriptions = self.storage.list_prescriptions().await?;
        Ok(filter_options(&doctors, &prescriptions))
    }

    async fn doctor_index(&self) -> Result<HashMap<DoctorId, Doctor>> {
        Ok(self
            .storage
            .list_doctors()
            .await?
            .into_iter()
            .map(|doctor| (doctor.id, doctor))
            .collect())
    }
}

fn expand(prescriptions: Vec<Prescription>, doctors: &HashMap<DoctorId, Doctor>) -> Vec<PrescriptionView> {
    prescriptions
        .into_iter()
        .map(|p| {
            let doctor = doctors.get(&p.doctor_id);
            PrescriptionView::new(p, doctor)
        })
        .collect()
}

fn ensure_ssn_format(ssn: &str) -> Result<()> {
    if is_ssn_format(ssn) {
        Ok(())
    } else {
        Err(RxError::InvalidInput(INVALID_SSN_FORMAT.to_string()))
    }
}

/// Trims a path id and parses it. Anything unparsable names no record.
pub fn parse_prescription_id(raw: &str) -> Option<PrescriptionId> {
    let cleaned = sanitize(Some(raw), &SanitizeOptions::new());
    PrescriptionId::from_str(&cleaned.sanitized).ok()
}

/// Sanitizes every field of a create/update body.
pub fn draft_from_payload(payload: &PrescriptionPayload) -> PrescriptionDraft {
    let field = |value: &Option<Scalar>, options: SanitizeOptions| {
        sanitize_scalar(value.as_ref(), &options).sanitized
    };
    let doctor_name = SanitizeOptions::new().max_length(DOCTOR_NAME_MAX);
    let free_text = SanitizeOptions::new().max_length(FREE_TEXT_MAX);

    PrescriptionDraft {
        first_name: field(&payload.first_name, doctor_name),
        last_name: field(&payload.last_name, doctor_name),
        prescription_name: field(&payload.prescription_name, free_text),
        amount: field(&payload.amount, SanitizeOptions::new()),
        patient_name: field(&payload.patient_name, free_text),
        patient_ssn: field(&payload.patient_ssn, SanitizeOptions::new()),
    }
}
