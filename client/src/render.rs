// client/src/render.rs

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::Local;

use rx_models::{DoctorFilterOption, DoctorView, PrescriptionView, ReportFilters, ReportResponse};

/// Left-aligned plain-text table; column widths follow the widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers.to_vec()));
    out.push('\n');
    let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&line(rules.iter().map(String::as_str).collect()));
    for row in rows {
        out.push('\n');
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}

pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

pub fn prescriptions_table(prescriptions: &[PrescriptionView]) -> String {
    if prescriptions.is_empty() {
        return "No prescriptions found.".to_string();
    }
    let rows: Vec<Vec<String>> = prescriptions
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                p.prescription_name.clone(),
                format_amount(p.amount),
                p.patient_name.clone(),
                p.patient_ssn.clone(),
                p.doctor_display_name(),
                p.order_time.with_timezone(&Local).format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();
    render_table(
        &["ID", "Prescription", "Amount", "Patient", "SSN", "Doctor", "Date"],
        &rows,
    )
}

pub fn doctors_table(doctors: &[DoctorView]) -> String {
    if doctors.is_empty() {
        return "No doctors found.".to_string();
    }
    let rows: Vec<Vec<String>> = doctors
        .iter()
        .map(|d| {
            vec![
                d.doctor.id.to_string(),
                d.doctor.display_name(),
                d.prescriptions.len().to_string(),
            ]
        })
        .collect();
    render_table(&["ID", "Doctor", "Prescriptions"], &rows)
}

/// "First Last (N prescriptions)", as shown in the doctor filter.
pub fn doctor_option_label(option: &DoctorFilterOption) -> String {
    format!(
        "{} {} ({} prescriptions)",
        option.first_name, option.last_name, option.prescription_count
    )
}

pub fn filters(filters: &ReportFilters) -> String {
    let mut out = String::from("Prescriptions:");
    if filters.prescription_names.is_empty() {
        out.push_str("\n  (none)");
    }
    for name in &filters.prescription_names {
        let _ = write!(out, "\n  - {}", name);
    }
    out.push_str("\nDoctors:");
    if filters.doctors.is_empty() {
        out.push_str("\n  (none)");
    }
    for doctor in &filters.doctors {
        let _ = write!(out, "\n  {}  {}", doctor.id, doctor_option_label(doctor));
    }
    out
}

fn counts_block(title: &str, counts: &BTreeMap<String, usize>) -> String {
    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|(label, count)| vec![label.clone(), count.to_string()])
        .collect();
    format!("{}\n{}", title, render_table(&["", "Count"], &rows))
}

pub fn report(report: &ReportResponse) -> String {
    let stats = &report.stats;
    let mut out = String::new();
    let _ = writeln!(out, "Total prescriptions: {}", stats.total_prescriptions);
    let _ = writeln!(out, "Total amount:        {}", format_amount(stats.total_amount));
    let _ = writeln!(out, "Average amount:      {}", format_amount(stats.average_amount));
    if stats.total_prescriptions > 0 {
        let _ = writeln!(out, "\n{}", counts_block("By doctor", &stats.prescriptions_by_doctor));
        let _ = writeln!(out, "\n{}", counts_block("By prescription", &stats.prescriptions_by_name));
    }
    out.push('\n');
    out.push_str(&prescriptions_table(&report.data));
    out
}
