// models/src/lib.rs

//! Shared record types for the prescription tracker: the two stored entities,
//! their identifiers and schema checks, and the JSON shapes exchanged between
//! the REST API and its clients.

pub mod errors;
pub mod identifiers;
pub mod medical;
pub mod payloads;

pub use errors::{ValidationError, ValidationErrors, ValidationResult};
pub use identifiers::{DoctorId, PrescriptionId};
pub use medical::{
    is_ssn_format, Doctor, DoctorName, DoctorRef, DoctorView, Prescription, PrescriptionDraft,
    PrescriptionView,
};
pub use payloads::{
    ApiResponse, DoctorFilterOption, PrescriptionPayload, ReportFilters, ReportRequest,
    ReportResponse, ReportStats, Scalar,
};
