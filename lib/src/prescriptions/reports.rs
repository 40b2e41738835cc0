// lib/src/prescriptions/reports.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use rx_models::{
    Doctor, DoctorFilterOption, DoctorId, Prescription, PrescriptionView, ReportFilters,
    ReportRequest, ReportStats, Scalar,
};

use crate::errors::{Result, RxError};
use crate::sanitization::{sanitize_scalar, SanitizeOptions};

/// Which end of a calendar day a report bound snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayBound {
    Start,
    End,
}

/// A parsed report filter. Every criterion is optional; an empty query
/// matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportQuery {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub doctor_id: Option<DoctorId>,
    /// Sanitized, lowercased needle for the prescription name.
    pub name_contains: Option<String>,
}

impl ReportQuery {
    pub fn from_request(request: &ReportRequest) -> Result<Self> {
        let start = text_field(request.start_date.as_ref())
            .map(|text| parse_day_bound(&text, DayBound::Start))
            .transpose()?;
        let end = text_field(request.end_date.as_ref())
            .map(|text| parse_day_bound(&text, DayBound::End))
            .transpose()?;
        let doctor_id = text_field(request.doctor_id.as_ref())
            .map(|text| {
                DoctorId::from_str(&text)
                    .map_err(|_| RxError::InvalidInput(format!("Invalid doctor id: {}", text)))
            })
            .transpose()?;
        let name_contains = request
            .prescription_name
            .as_ref()
            .map(|name| {
                sanitize_scalar(Some(name), &SanitizeOptions::new().max_length(100))
                    .sanitized
                    .to_lowercase()
            })
            .filter(|name| !name.is_empty());

        Ok(ReportQuery {
            start,
            end,
            doctor_id,
            name_contains,
        })
    }

    pub fn matches(&self, prescription: &Prescription) -> bool {
        if let Some(start) = self.start {
            if prescription.order_time < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if prescription.order_time > end {
                return false;
            }
        }
        if let Some(doctor_id) = self.doctor_id {
            if prescription.doctor_id != doctor_id {
                return false;
            }
        }
        match &self.name_contains {
            Some(needle) => prescription.prescription_name.to_lowercase().contains(needle),
            None => true,
        }
    }
}

/// Trimmed text of an optional scalar, `None` when absent or blank.
fn text_field(value: Option<&Scalar>) -> Option<String> {
    let text = value?.as_text();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reads `YYYY-MM-DD` or an RFC 3339 timestamp and snaps it to the first or
/// last millisecond of that calendar day in local time.
fn parse_day_bound(text: &str, bound: DayBound) -> Result<DateTime<Utc>> {
    let day = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|instant| instant.with_timezone(&Local).date_naive())
        })
        .ok_or_else(|| RxError::InvalidInput(format!("Invalid date: {}", text)))?;

    let time = match bound {
        DayBound::Start => NaiveTime::from_hms_milli_opt(0, 0, 0, 0),
        DayBound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999),
    }
    .ok_or_else(|| RxError::InternalError("day bound time out of range".into()))?;
    let naive = NaiveDateTime::new(day, time);
    let local = Local.from_local_datetime(&naive);
    let resolved = match bound {
        DayBound::Start => local.earliest(),
        DayBound::End => local.latest(),
    };
    resolved
        .map(|instant| instant.with_timezone(&Utc))
        .ok_or_else(|| RxError::InvalidInput(format!("Date {} does not exist in local time", text)))
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn summarize(prescriptions: &[PrescriptionView]) -> ReportStats {
    let total_prescriptions = prescriptions.len();
    let total_amount: f64 = prescriptions.iter().map(|p| p.amount).sum();
    let average_amount = if total_prescriptions == 0 {
        0.0
    } else {
        round2(total_amount / total_prescriptions as f64)
    };

    let mut prescriptions_by_doctor = BTreeMap::new();
    let mut prescriptions_by_name = BTreeMap::new();
    for prescription in prescriptions {
        *prescriptions_by_doctor
            .entry(prescription.doctor_display_name())
            .or_insert(0) += 1;
        *prescriptions_by_name
            .entry(prescription.prescription_name.clone())
            .or_insert(0) += 1;
    }

    ReportStats {
        total_prescriptions,
        total_amount,
        average_amount,
        prescriptions_by_doctor,
        prescriptions_by_name,
    }
}

/// Distinct prescription names and every doctor with the number of
/// prescriptions referencing them.
pub fn filter_options(doctors: &[Doctor], prescriptions: &[Prescription]) -> ReportFilters {
    let prescription_names: BTreeSet<&str> = prescriptions
        .iter()
        .map(|p| p.prescription_name.as_str())
        .collect();

    let mut counts: HashMap<DoctorId, usize> = HashMap::new();
    for prescription in prescriptions {
        *counts.entry(prescription.doctor_id).or_insert(0) += 1;
    }

    let mut options: Vec<DoctorFilterOption> = doctors
        .iter()
        .map(|doctor| DoctorFilterOption {
            id: doctor.id,
            first_name: doctor.first_name.clone(),
            last_name: doctor.last_name.clone(),
            prescription_count: counts.get(&doctor.id).copied().unwrap_or(0),
        })
        .collect();
    options.sort_by(|a, b| {
        a.last_name
            .cmp(&b.last_name)
            .then_with(|| a.first_name.cmp(&b.first_name))
    });

    ReportFilters {
        prescription_names: prescription_names.into_iter().map(String::from).collect(),
        doctors: options,
    }
}
