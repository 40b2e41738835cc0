// lib/src/prescriptions/mod.rs

pub mod reports;
pub mod service;

pub use reports::{filter_options, round2, summarize, ReportQuery};
pub use service::{
    draft_from_payload, parse_prescription_id, PrescriptionService, Report, DUPLICATE_SSN,
    INVALID_SSN_FORMAT, PRESCRIPTION_NOT_FOUND,
};
