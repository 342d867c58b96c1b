//! Dashboard controllers and their shared display plumbing.
//!
//! Each dashboard is a plain state struct the shell renders: async
//! operations mutate the state, accessors and text renderers read it.
//! Every remote data slice is a `Loadable` with its own loading flag
//! and error channel, so one failed fetch never hides another slice's
//! data.

pub mod doctor;
pub mod patient;

pub use doctor::DoctorDashboard;
pub use patient::PatientDashboard;

use crate::api::ApiError;
use crate::models::VitalRecord;

/// One independently fetched slice of remote state.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    /// Holds the user-facing message for inline display.
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => {
                tracing::warn!(error = %e, "Fetch failed");
                Loadable::Failed(e.user_message())
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Loadable::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// A one-shot user-facing notification, the moral equivalent of the
/// blocking alert box. The shell takes and displays it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    Success(String),
    Error(String),
}

impl Alert {
    pub fn text(&self) -> &str {
        match self {
            Alert::Success(text) | Alert::Error(text) => text,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Alert::Error(_))
    }
}

/// Column headers shared by every vital-sign table.
pub(crate) const VITAL_HEADERS: [&str; 10] = [
    "Name",
    "Age",
    "Height",
    "Weight",
    "Systolic BP",
    "Diastolic BP",
    "Blood Sugar",
    "Symptoms",
    "Diet",
    "Timestamp",
];

/// Format one record as table cells, units attached, N/A for gaps.
pub(crate) fn vital_row(record: &VitalRecord) -> Vec<String> {
    fn text(value: &Option<String>) -> String {
        value.clone().unwrap_or_else(|| "N/A".to_string())
    }
    fn unit(value: Option<i64>, suffix: &str) -> String {
        match value {
            Some(v) => format!("{v} {suffix}"),
            None => "N/A".to_string(),
        }
    }

    vec![
        text(&record.name),
        record
            .age
            .map(|a| a.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        unit(record.height, "cm"),
        unit(record.weight, "kg"),
        unit(record.systolic, "mmHg"),
        unit(record.diastolic, "mmHg"),
        unit(record.bloodsugar, "mg/dL"),
        text(&record.symptoms),
        text(&record.diet),
        record.timestamp_display(),
    ]
}

/// Render a text table. An empty row set renders the empty message as
/// a single row spanning all columns.
pub(crate) fn render_table(headers: &[&str], rows: &[Vec<String>], empty_message: &str) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{h:<width$}", width = *w))
        .collect();
    out.push_str(&header_line.join(" | "));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');

    if rows.is_empty() {
        out.push_str(empty_message);
        out.push('\n');
        return out;
    }

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<width$}", width = *w))
            .collect();
        out.push_str(line.join(" | ").trim_end());
        out.push('\n');
    }
    out
}
