// models/src/medical/doctor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{ValidationError, ValidationErrors, ValidationResult};
use crate::identifiers::DoctorId;
use crate::medical::prescription::Prescription;

/// The natural key doctors are looked up by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DoctorName {
    pub first_name: String,
    pub last_name: String,
}

impl DoctorName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = ValidationErrors::new();
        if self.first_name.is_empty() {
            errors.push(ValidationError::Required("first_name"));
        }
        if self.last_name.is_empty() {
            errors.push(ValidationError::Required("last_name"));
        }
        errors.into_result()
    }

    /// "First Last", the label used in reports.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(rename = "_id")]
    pub id: DoctorId,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Doctor {
    /// Creates a doctor record with a fresh id for the given name.
    pub fn from_name(name: DoctorName) -> Self {
        let now = Utc::now();
        Doctor {
            id: DoctorId::new(),
            first_name: name.first_name,
            last_name: name.last_name,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn name(&self) -> DoctorName {
        DoctorName::new(self.first_name.clone(), self.last_name.clone())
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The doctor reference of a prescription, expanded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRef {
    #[serde(rename = "_id")]
    pub id: DoctorId,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Doctor> for DoctorRef {
    fn from(doctor: &Doctor) -> Self {
        DoctorRef {
            id: doctor.id,
            first_name: doctor.first_name.clone(),
            last_name: doctor.last_name.clone(),
        }
    }
}

/// A doctor together with every prescription that references it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorView {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub prescriptions: Vec<Prescription>,
}
