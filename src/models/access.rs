use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::VitalRecord;

/// An access request as seen from the doctor's side.
///
/// There is no request identifier anywhere in the workflow; the
/// (doctor, patient) address pair is the natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorAccessRequest {
    pub doctor_address: String,
    pub patient_address: String,
    /// Whether the patient has already granted access. The backend
    /// annotates each request row with a status element.
    pub has_access: bool,
}

/// A not-yet-resolved access request, as listed for the patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub doctor_address: String,
    pub patient_address: Option<String>,
}

/// A resolved (granted then revoked) access request, kept for audit
/// display. Wire timestamps are unix seconds; zero means absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRequest {
    pub doctor_address: String,
    pub granted_at: Option<NaiveDateTime>,
    pub revoked_at: Option<NaiveDateTime>,
}

impl ResolvedRequest {
    pub fn granted_display(&self) -> String {
        display_timestamp(self.granted_at)
    }

    pub fn revoked_display(&self) -> String {
        display_timestamp(self.revoked_at)
    }
}

/// Convert wire unix seconds to a timestamp; zero means absent.
pub fn timestamp_from_unix(secs: i64) -> Option<NaiveDateTime> {
    if secs == 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

fn display_timestamp(ts: Option<NaiveDateTime>) -> String {
    match ts {
        Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "N/A".to_string(),
    }
}

/// A patient's data as fetched by a doctor with an active grant:
/// the current snapshot plus the immutable history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientHistory {
    pub current: Option<VitalRecord>,
    pub history: Vec<VitalRecord>,
}

impl PatientHistory {
    /// True when neither a snapshot nor any history rows came back.
    pub fn is_empty(&self) -> bool {
        self.current.as_ref().map_or(true, |c| c.is_empty()) && self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_zero_is_absent() {
        assert!(timestamp_from_unix(0).is_none());
        assert!(timestamp_from_unix(1_700_000_000).is_some());
    }

    #[test]
    fn resolved_request_displays() {
        let req = ResolvedRequest {
            doctor_address: "0xD0C".into(),
            granted_at: timestamp_from_unix(1_700_000_000),
            revoked_at: None,
        };
        assert!(req.granted_display().starts_with("2023-"));
        assert_eq!(req.revoked_display(), "N/A");
    }

    #[test]
    fn patient_history_empty_checks_both_sides() {
        assert!(PatientHistory::default().is_empty());

        let with_history = PatientHistory {
            current: None,
            history: vec![VitalRecord {
                age: Some(30),
                ..Default::default()
            }],
        };
        assert!(!with_history.is_empty());

        let empty_snapshot_only = PatientHistory {
            current: Some(VitalRecord::default()),
            history: vec![],
        };
        assert!(empty_snapshot_only.is_empty());
    }
}
