use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One vital-sign record, as submitted by a patient.
///
/// Append-only from the client's perspective: records are created and
/// listed, never edited or deleted. Every field is optional because
/// the backend's default (never-written) record comes back all-zero,
/// and the display layer substitutes "N/A" per field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalRecord {
    pub name: Option<String>,
    pub age: Option<i64>,
    /// Height in cm.
    pub height: Option<i64>,
    /// Weight in kg.
    pub weight: Option<i64>,
    /// Systolic blood pressure in mmHg.
    pub systolic: Option<i64>,
    /// Diastolic blood pressure in mmHg.
    pub diastolic: Option<i64>,
    /// Blood sugar in mg/dL.
    pub bloodsugar: Option<i64>,
    pub symptoms: Option<String>,
    pub diet: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
}

impl VitalRecord {
    /// Whether this is the backend's default/unset record.
    ///
    /// The storage layer returns an all-zero row for a patient who has
    /// never submitted data; those rows are filtered out of merged
    /// history instead of rendering as zeros.
    pub fn is_empty(&self) -> bool {
        let no_timestamp = match self.timestamp {
            None => true,
            Some(ts) => ts.and_utc().timestamp() == 0,
        };
        no_timestamp
            && self.age.unwrap_or(0) == 0
            && self.height.unwrap_or(0) == 0
            && self.weight.unwrap_or(0) == 0
            && self.systolic.unwrap_or(0) == 0
            && self.diastolic.unwrap_or(0) == 0
            && self.bloodsugar.unwrap_or(0) == 0
    }

    /// Timestamp formatted for table display.
    pub fn timestamp_display(&self) -> String {
        match self.timestamp {
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => "N/A".to_string(),
        }
    }
}
