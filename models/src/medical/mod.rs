// models/src/medical/mod.rs

pub mod doctor;
pub mod prescription;

pub use doctor::{Doctor, DoctorName, DoctorRef, DoctorView};
pub use prescription::{is_ssn_format, Prescription, PrescriptionDraft, PrescriptionView};
