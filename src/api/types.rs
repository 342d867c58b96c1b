//! Wire payloads and row decoding.
//!
//! The backend leans on positional tuples for request and history
//! rows. Everything positional is decoded here, once, into the named
//! structs from `models`; component code never indexes into a row.
//!
//! Row shapes, as served:
//! - doctor request: `[[doctor, patient, ...], [[status-string]]]`
//! - pending request (patient view): `[doctor, patient, ...]`
//! - previous request: index 0 = doctor, 3 = granted (unix s),
//!   4 = revoked (unix s)
//! - history row: `[name, age, height, weight, systolic, diastolic,
//!   blood_sugar, symptoms, diet, iso-timestamp]`

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiError;
use crate::models::access::timestamp_from_unix;
use crate::models::{DoctorAccessRequest, PatientHistory, PendingRequest, ResolvedRequest, VitalRecord};

/// Status string the backend attaches to a doctor's request row when
/// the patient has granted access.
const HAS_ACCESS_MARKER: &str = "Has Access!";

// ═══════════════════════════════════════════════════════════
// Request / response payloads
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Token pair issued by the login endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Refresh exchange result. Some backends rotate the refresh token.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub user_type: u8,
    pub address: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct UserTypeResponse {
    #[serde(default)]
    pub user_type: Option<i64>,
}

/// A new vital-sign record, numerics already parsed to integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRecord {
    pub age: i64,
    pub height: i64,
    pub weight: i64,
    pub systolic: i64,
    pub diastolic: i64,
    pub bloodsugar: i64,
    pub symptoms: String,
    pub diet: String,
}

#[derive(Debug, Serialize)]
pub struct RequestAccessBody<'a> {
    pub patient_address: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ApproveAccessBody<'a> {
    pub doctor_address: &'a str,
    pub time_granted: i64,
}

#[derive(Debug, Serialize)]
pub struct RevokeAccessBody<'a> {
    pub doctor_address: &'a str,
    pub time_revoked: i64,
}

// ═══════════════════════════════════════════════════════════
// Named record objects (patient's own endpoints)
// ═══════════════════════════════════════════════════════════

/// Record object with named fields, as served by `/api/patient-data/`
/// and `/api/patient-data-history/`.
#[derive(Debug, Deserialize)]
pub struct WireVitalRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub age: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub weight: Option<i64>,
    #[serde(default)]
    pub systolic: Option<i64>,
    #[serde(default)]
    pub diastolic: Option<i64>,
    #[serde(default)]
    pub bloodsugar: Option<i64>,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl WireVitalRecord {
    pub fn into_record(self) -> VitalRecord {
        VitalRecord {
            name: none_if_empty(self.name),
            age: self.age,
            height: self.height,
            weight: self.weight,
            systolic: self.systolic,
            diastolic: self.diastolic,
            bloodsugar: self.bloodsugar,
            symptoms: none_if_empty(self.symptoms),
            diet: none_if_empty(self.diet),
            timestamp: self.timestamp.as_deref().and_then(parse_timestamp),
        }
    }
}

/// Parse the backend's ISO-8601 timestamps, with or without a zone
/// suffix or fractional seconds.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}

fn none_if_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

// ═══════════════════════════════════════════════════════════
// Positional row decoding
// ═══════════════════════════════════════════════════════════

fn decode_error(what: &str, row: &Value) -> ApiError {
    ApiError::Decode(format!("{what} in row {row}"))
}

fn element<'a>(row: &'a [Value], index: usize, what: &str, raw: &Value) -> Result<&'a Value, ApiError> {
    row.get(index).ok_or_else(|| decode_error(what, raw))
}

fn string_at(row: &[Value], index: usize, what: &str, raw: &Value) -> Result<String, ApiError> {
    element(row, index, what, raw)?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| decode_error(what, raw))
}

fn int_at(row: &[Value], index: usize, what: &str, raw: &Value) -> Result<i64, ApiError> {
    element(row, index, what, raw)?
        .as_i64()
        .ok_or_else(|| decode_error(what, raw))
}

/// Decode one `/api/doctor-requests/` row: a request tuple wrapped in
/// an outer tuple with a status element.
pub fn decode_doctor_request_row(raw: &Value) -> Result<DoctorAccessRequest, ApiError> {
    let outer = raw
        .as_array()
        .ok_or_else(|| decode_error("expected outer array", raw))?;
    let request = element(outer, 0, "missing request tuple", raw)?
        .as_array()
        .ok_or_else(|| decode_error("expected request tuple", raw))?;

    let doctor_address = string_at(request, 0, "missing doctor address", raw)?;
    let patient_address = string_at(request, 1, "missing patient address", raw)?;

    // Status element: [["Has Access!"]] or [["No Access!"]]. Missing or
    // unexpected shapes read as no access.
    let has_access = outer
        .get(1)
        .and_then(|status| status.get(0))
        .and_then(|inner| inner.get(0))
        .and_then(Value::as_str)
        .map(|s| s == HAS_ACCESS_MARKER)
        .unwrap_or(false);

    Ok(DoctorAccessRequest {
        doctor_address,
        patient_address,
        has_access,
    })
}

/// Decode one `/api/access-requests/` row (patient's pending list).
pub fn decode_pending_row(raw: &Value) -> Result<PendingRequest, ApiError> {
    let row = raw
        .as_array()
        .ok_or_else(|| decode_error("expected array row", raw))?;
    let doctor_address = string_at(row, 0, "missing doctor address", raw)?;
    let patient_address = row.get(1).and_then(Value::as_str).map(str::to_string);

    Ok(PendingRequest {
        doctor_address,
        patient_address,
    })
}

/// Decode one `/api/previous-requests/` row.
pub fn decode_resolved_row(raw: &Value) -> Result<ResolvedRequest, ApiError> {
    let row = raw
        .as_array()
        .ok_or_else(|| decode_error("expected array row", raw))?;
    let doctor_address = string_at(row, 0, "missing doctor address", raw)?;
    let granted = int_at(row, 3, "missing granted-at", raw)?;
    let revoked = int_at(row, 4, "missing revoked-at", raw)?;

    Ok(ResolvedRequest {
        doctor_address,
        granted_at: timestamp_from_unix(granted),
        revoked_at: timestamp_from_unix(revoked),
    })
}

/// Decode one fixed-position history row (10 fields, timestamp last).
pub fn decode_history_row(raw: &Value) -> Result<VitalRecord, ApiError> {
    let row = raw
        .as_array()
        .ok_or_else(|| decode_error("expected array row", raw))?;
    if row.len() < 10 {
        return Err(decode_error("short history row", raw));
    }

    let timestamp = string_at(row, 9, "missing timestamp", raw)?;

    Ok(VitalRecord {
        name: none_if_empty(Some(string_at(row, 0, "missing name", raw)?)),
        age: Some(int_at(row, 1, "missing age", raw)?),
        height: Some(int_at(row, 2, "missing height", raw)?),
        weight: Some(int_at(row, 3, "missing weight", raw)?),
        systolic: Some(int_at(row, 4, "missing systolic", raw)?),
        diastolic: Some(int_at(row, 5, "missing diastolic", raw)?),
        bloodsugar: Some(int_at(row, 6, "missing blood sugar", raw)?),
        symptoms: none_if_empty(Some(string_at(row, 7, "missing symptoms", raw)?)),
        diet: none_if_empty(Some(string_at(row, 8, "missing diet", raw)?)),
        timestamp: parse_timestamp(&timestamp),
    })
}

/// Decode the `/api/doctor-patient-data/{address}/` payload.
pub fn decode_patient_history(raw: &Value) -> Result<PatientHistory, ApiError> {
    let current = match raw.get("current_data") {
        Some(Value::Null) | None => None,
        Some(row) if row.as_array().map_or(false, |a| a.is_empty()) => None,
        Some(row) => Some(decode_history_row(row)?),
    };

    let history = match raw.get("history") {
        Some(Value::Array(rows)) => rows
            .iter()
            .map(decode_history_row)
            .collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    Ok(PatientHistory { current, history })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn doctor_request_row_decodes_nested_shape() {
        let raw = json!([["0xD0C", "0xPAT", 0, 0, 0], [["Has Access!"]]]);
        let decoded = decode_doctor_request_row(&raw).unwrap();
        assert_eq!(decoded.doctor_address, "0xD0C");
        assert_eq!(decoded.patient_address, "0xPAT");
        assert!(decoded.has_access);
    }

    #[test]
    fn doctor_request_row_without_access() {
        let raw = json!([["0xD0C", "0xPAT"], [["No Access!"]]]);
        let decoded = decode_doctor_request_row(&raw).unwrap();
        assert!(!decoded.has_access);
    }

    #[test]
    fn doctor_request_row_missing_status_reads_no_access() {
        let raw = json!([["0xD0C", "0xPAT"]]);
        let decoded = decode_doctor_request_row(&raw).unwrap();
        assert!(!decoded.has_access);
    }

    #[test]
    fn doctor_request_row_rejects_flat_shape() {
        let raw = json!(["0xD0C", "0xPAT"]);
        assert!(decode_doctor_request_row(&raw).is_err());
    }

    #[test]
    fn pending_row_takes_doctor_from_index_zero() {
        let raw = json!(["0xABC", "0xPAT", 0, 0, 0]);
        let decoded = decode_pending_row(&raw).unwrap();
        assert_eq!(decoded.doctor_address, "0xABC");
        assert_eq!(decoded.patient_address.as_deref(), Some("0xPAT"));
    }

    #[test]
    fn resolved_row_converts_unix_seconds() {
        let raw = json!(["0xABC", "0xPAT", true, 1_700_000_000, 0]);
        let decoded = decode_resolved_row(&raw).unwrap();
        assert_eq!(decoded.doctor_address, "0xABC");
        assert!(decoded.granted_at.is_some());
        assert!(decoded.revoked_at.is_none(), "zero means never revoked");
    }

    #[test]
    fn history_row_decodes_all_ten_positions() {
        let raw = json!([
            "Jane", 45, 170, 70, 120, 80, 95, "cough", "low-carb",
            "2024-01-15T10:30:00"
        ]);
        let record = decode_history_row(&raw).unwrap();
        assert_eq!(record.name.as_deref(), Some("Jane"));
        assert_eq!(record.age, Some(45));
        assert_eq!(record.height, Some(170));
        assert_eq!(record.weight, Some(70));
        assert_eq!(record.systolic, Some(120));
        assert_eq!(record.diastolic, Some(80));
        assert_eq!(record.bloodsugar, Some(95));
        assert_eq!(record.symptoms.as_deref(), Some("cough"));
        assert_eq!(record.diet.as_deref(), Some("low-carb"));
        assert!(record.timestamp.is_some());
    }

    #[test]
    fn history_row_rejects_short_rows() {
        let raw = json!(["Jane", 45, 170]);
        assert!(decode_history_row(&raw).is_err());
    }

    #[test]
    fn patient_history_payload_decodes_both_parts() {
        let raw = json!({
            "current_data": ["Jane", 45, 170, 70, 120, 80, 95, "", "", "2024-01-15T10:30:00"],
            "history": [
                ["Jane", 44, 170, 71, 118, 79, 90, "none", "balanced", "2023-06-01T08:00:00"]
            ]
        });
        let decoded = decode_patient_history(&raw).unwrap();
        assert!(decoded.current.is_some());
        assert_eq!(decoded.history.len(), 1);
        assert_eq!(decoded.history[0].age, Some(44));
    }

    #[test]
    fn patient_history_tolerates_missing_parts() {
        let decoded = decode_patient_history(&json!({})).unwrap();
        assert!(decoded.current.is_none());
        assert!(decoded.history.is_empty());
        assert!(decoded.is_empty());
    }

    #[test]
    fn wire_record_normalizes_empty_strings() {
        let wire: WireVitalRecord = serde_json::from_value(json!({
            "name": "",
            "age": 45,
            "timestamp": "2024-01-15T10:30:00"
        }))
        .unwrap();
        let record = wire.into_record();
        assert!(record.name.is_none());
        assert_eq!(record.age, Some(45));
        assert!(record.timestamp.is_some());
    }

    #[test]
    fn timestamps_parse_with_and_without_zone() {
        assert!(parse_timestamp("2024-01-15T10:30:00").is_some());
        assert!(parse_timestamp("2024-01-15T10:30:00.123456").is_some());
        assert!(parse_timestamp("2024-01-15T10:30:00Z").is_some());
        assert!(parse_timestamp("2024-01-15T10:30:00+02:00").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }
}
