// models/src/payloads.rs

//! JSON bodies of the `/api` endpoints.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifiers::DoctorId;
use crate::medical::PrescriptionView;

/// Any scalar JSON value a form field may arrive as. Clients send amounts as
/// numbers or as strings, so every field is accepted in either form and read
/// back as text before sanitizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl Scalar {
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Number(number) => write!(f, "{}", number),
            Scalar::Flag(flag) => write!(f, "{}", flag),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Scalar::Number)
            .unwrap_or_else(|| Scalar::Text(value.to_string()))
    }
}

/// Body of `POST /prescriptions` and `PUT /prescriptions/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_ssn: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription_name: Option<Scalar>,
}

/// Body of `POST /reports`. Every filter is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(rename = "startDate", default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Scalar>,
    #[serde(rename = "endDate", default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Scalar>,
    #[serde(rename = "doctorId", default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription_name: Option<Scalar>,
}

/// The `{success, data, message}` envelope every endpoint answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// A successful answer that only carries a message.
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total_prescriptions: usize,
    pub total_amount: f64,
    /// Rounded to two decimals; zero for an empty report.
    pub average_amount: f64,
    pub prescriptions_by_doctor: BTreeMap<String, usize>,
    pub prescriptions_by_name: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub success: bool,
    pub data: Vec<PrescriptionView>,
    pub stats: ReportStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorFilterOption {
    #[serde(rename = "_id")]
    pub id: DoctorId,
    pub first_name: String,
    pub last_name: String,
    #[serde(rename = "prescriptionCount")]
    pub prescription_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportFilters {
    #[serde(rename = "prescriptionNames")]
    pub prescription_names: Vec<String>,
    pub doctors: Vec<DoctorFilterOption>,
}
