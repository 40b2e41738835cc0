// models/src/medical/prescription.rs

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationErrors, ValidationResult};
use crate::identifiers::{DoctorId, PrescriptionId};
use crate::medical::doctor::{Doctor, DoctorName, DoctorRef};

static SSN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3}-\d{2}-\d{4}$").expect("static SSN pattern"));

/// True iff `ssn` has exactly the shape `DDD-DD-DDDD`.
pub fn is_ssn_format(ssn: &str) -> bool {
    SSN_PATTERN.is_match(ssn)
}

/// Sanitized prescription input, before the owning doctor is resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrescriptionDraft {
    pub first_name: String,
    pub last_name: String,
    pub prescription_name: String,
    pub amount: String,
    pub patient_name: String,
    pub patient_ssn: String,
}

impl PrescriptionDraft {
    pub fn doctor_name(&self) -> DoctorName {
        DoctorName::new(self.first_name.clone(), self.last_name.clone())
    }

    /// Parses the amount text. Empty means missing.
    pub fn amount(&self) -> Result<f64, ValidationError> {
        if self.amount.is_empty() {
            return Err(ValidationError::Required("amount"));
        }
        match self.amount.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(ValidationError::NotANumber("amount")),
        }
    }

    /// Checks the full schema and returns the parsed amount.
    pub fn validate(&self) -> ValidationResult<f64> {
        let mut errors = match self.doctor_name().validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        if self.prescription_name.is_empty() {
            errors.push(ValidationError::Required("prescription_name"));
        }
        let amount = self.amount();
        if let Err(error) = &amount {
            errors.push(error.clone());
        }
        if self.patient_name.is_empty() {
            errors.push(ValidationError::Required("patient_name"));
        }
        if let Err(error) = check_ssn(&self.patient_ssn) {
            errors.push(error);
        }
        errors.into_result()?;
        // amount is Ok here, every error path above was collected
        amount.map_err(ValidationErrors::from)
    }
}

fn check_ssn(ssn: &str) -> Result<(), ValidationError> {
    if ssn.is_empty() {
        Err(ValidationError::Required("patient_ssn"))
    } else if !is_ssn_format(ssn) {
        Err(ValidationError::InvalidSsn(ssn.to_string()))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    #[serde(rename = "_id")]
    pub id: PrescriptionId,
    pub prescription_name: String,
    pub order_time: DateTime<Utc>,
    pub amount: f64,
    pub patient_name: String,
    pub patient_ssn: String,
    pub doctor_id: DoctorId,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Prescription {
    /// Builds a new record from a validated draft. `order_time` defaults to now.
    pub fn new(draft: &PrescriptionDraft, amount: f64, doctor_id: DoctorId) -> Self {
        let now = Utc::now();
        Prescription {
            id: PrescriptionId::new(),
            prescription_name: draft.prescription_name.trim().to_string(),
            order_time: now,
            amount,
            patient_name: draft.patient_name.clone(),
            patient_ssn: draft.patient_ssn.clone(),
            doctor_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces every mutable field with the draft's values, keeping identity,
    /// order time and creation time.
    pub fn apply(&mut self, draft: &PrescriptionDraft, amount: f64, doctor_id: DoctorId) {
        self.prescription_name = draft.prescription_name.trim().to_string();
        self.amount = amount;
        self.patient_name = draft.patient_name.clone();
        self.patient_ssn = draft.patient_ssn.clone();
        self.doctor_id = doctor_id;
        self.updated_at = Utc::now();
    }

    /// The schema the store enforces on every write.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        if self.prescription_name.trim().is_empty() {
            errors.push(ValidationError::Required("prescription_name"));
        }
        if !self.amount.is_finite() {
            errors.push(ValidationError::NotANumber("amount"));
        }
        if self.patient_name.is_empty() {
            errors.push(ValidationError::Required("patient_name"));
        }
        if let Err(error) = check_ssn(&self.patient_ssn) {
            errors.push(error);
        }
        errors.into_result()
    }
}

/// A prescription with its doctor reference expanded for display. `doctor_id`
/// is `null` when the referenced doctor no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionView {
    #[serde(rename = "_id")]
    pub id: PrescriptionId,
    pub prescription_name: String,
    pub order_time: DateTime<Utc>,
    pub amount: f64,
    pub patient_name: String,
    pub patient_ssn: String,
    pub doctor_id: Option<DoctorRef>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl PrescriptionView {
    pub fn new(prescription: Prescription, doctor: Option<&Doctor>) -> Self {
        PrescriptionView {
            id: prescription.id,
            prescription_name: prescription.prescription_name,
            order_time: prescription.order_time,
            amount: prescription.amount,
            patient_name: prescription.patient_name,
            patient_ssn: prescription.patient_ssn,
            doctor_id: doctor.map(DoctorRef::from),
            created_at: prescription.created_at,
            updated_at: prescription.updated_at,
        }
    }

    /// "First Last" of the doctor, or "Unknown" when it is missing.
    pub fn doctor_display_name(&self) -> String {
        match &self.doctor_id {
            Some(doctor) => format!("{} {}", doctor.first_name, doctor.last_name),
            None => "Unknown".to_string(),
        }
    }
}
