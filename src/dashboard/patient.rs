//! Patient dashboard: record entry, history, and grant management.

use chrono::Utc;

use super::{render_table, vital_row, Alert, Loadable, VITAL_HEADERS};
use crate::api::types::NewRecord;
use crate::api::{ApiClient, ApiError, Transport};
use crate::models::{PendingRequest, ResolvedRequest, VitalRecord};

/// Errors surfaced by the add-record form before anything is sent.
#[derive(Debug, thiserror::Error)]
pub enum RecordFormError {
    #[error("A request is already in flight")]
    InFlight,
    #[error("{0} must be a whole number")]
    InvalidNumber(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl RecordFormError {
    pub fn user_message(&self) -> String {
        match self {
            RecordFormError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Add-record form state. Fields hold raw text, as typed; the numeric
/// ones are parsed to integers at submit time.
#[derive(Debug, Default)]
pub struct RecordForm {
    pub age: String,
    pub height: String,
    pub weight: String,
    pub systolic: String,
    pub diastolic: String,
    pub bloodsugar: String,
    pub symptoms: String,
    pub diet: String,
    loading: bool,
}

impl RecordForm {
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn parse(&self) -> Result<NewRecord, RecordFormError> {
        fn int(raw: &str, field: &'static str) -> Result<i64, RecordFormError> {
            raw.trim()
                .parse()
                .map_err(|_| RecordFormError::InvalidNumber(field))
        }

        Ok(NewRecord {
            age: int(&self.age, "Age")?,
            height: int(&self.height, "Height")?,
            weight: int(&self.weight, "Weight")?,
            systolic: int(&self.systolic, "Systolic blood pressure")?,
            diastolic: int(&self.diastolic, "Diastolic blood pressure")?,
            bloodsugar: int(&self.bloodsugar, "Blood sugar")?,
            symptoms: self.symptoms.clone(),
            diet: self.diet.clone(),
        })
    }
}

/// Patient dashboard state.
///
/// Four remote slices, fetched concurrently and independently on
/// mount; each keeps its own loading flag and error channel so a
/// failure in one never blocks the others.
#[derive(Debug)]
pub struct PatientDashboard {
    pub form: RecordForm,
    snapshot: Loadable<VitalRecord>,
    pending: Loadable<Vec<PendingRequest>>,
    previous: Loadable<Vec<ResolvedRequest>>,
    history: Loadable<Vec<VitalRecord>>,
    alert: Option<Alert>,
}

impl PatientDashboard {
    pub fn new() -> Self {
        Self {
            form: RecordForm::default(),
            snapshot: Loadable::Loading,
            pending: Loadable::Loading,
            previous: Loadable::Loading,
            history: Loadable::Loading,
            alert: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn snapshot(&self) -> &Loadable<VitalRecord> {
        &self.snapshot
    }

    pub fn pending(&self) -> &Loadable<Vec<PendingRequest>> {
        &self.pending
    }

    pub fn previous(&self) -> &Loadable<Vec<ResolvedRequest>> {
        &self.previous
    }

    pub fn history(&self) -> &Loadable<Vec<VitalRecord>> {
        &self.history
    }

    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    // ── Operations ───────────────────────────────────────────

    /// Mount: run all four fetches concurrently. No ordering between
    /// them is guaranteed or needed; each lands in its own slice.
    pub async fn load<T: Transport>(&mut self, client: &ApiClient<T>) {
        let (snapshot, pending, previous, history) = tokio::join!(
            client.patient_data(),
            client.access_requests(),
            client.previous_requests(),
            client.patient_data_history(),
        );
        self.snapshot = Loadable::from_result(snapshot);
        self.pending = Loadable::from_result(pending);
        self.previous = Loadable::from_result(previous);
        self.history = Loadable::from_result(history);
    }

    /// Submit a new vital-sign record.
    ///
    /// Numerics are parsed to integers first; a parse failure never
    /// reaches the network. On success the snapshot and history are
    /// re-fetched in the same operation so the new record shows up
    /// without a reload. The form keeps its values on failure.
    pub async fn submit_record<T: Transport>(&mut self, client: &ApiClient<T>) {
        if self.form.loading {
            return;
        }
        let record = match self.form.parse() {
            Ok(record) => record,
            Err(e) => {
                self.alert = Some(Alert::Error(e.user_message()));
                return;
            }
        };

        self.form.loading = true;
        match client.add_patient_data(&record).await {
            Ok(()) => {
                self.alert = Some(Alert::Success("Patient data added successfully".to_string()));
                // Submit-then-refresh as one transaction: the list the
                // user sees next already contains the new record.
                let (snapshot, history) =
                    tokio::join!(client.patient_data(), client.patient_data_history());
                self.snapshot = Loadable::from_result(snapshot);
                self.history = Loadable::from_result(history);
            }
            Err(e) => {
                self.alert = Some(Alert::Error(e.user_message()));
            }
        }
        self.form.loading = false;
    }

    /// Approve a pending request. The doctor is dropped from the local
    /// pending list only after the backend confirms; a failure leaves
    /// the list untouched.
    pub async fn approve_access<T: Transport>(&mut self, client: &ApiClient<T>, doctor_address: &str) {
        let time_granted = Utc::now().timestamp();
        match client.approve_access(doctor_address, time_granted).await {
            Ok(()) => {
                self.alert = Some(Alert::Success("Access granted successfully".to_string()));
                self.remove_pending(doctor_address);
            }
            Err(e) => {
                self.alert = Some(Alert::Error(e.user_message()));
            }
        }
    }

    /// Revoke a request. Same confirm-then-remove contract as approve.
    pub async fn revoke_access<T: Transport>(&mut self, client: &ApiClient<T>, doctor_address: &str) {
        let time_revoked = Utc::now().timestamp();
        match client.revoke_access(doctor_address, time_revoked).await {
            Ok(()) => {
                self.alert = Some(Alert::Success("Access revoked successfully".to_string()));
                self.remove_pending(doctor_address);
            }
            Err(e) => {
                self.alert = Some(Alert::Error(e.user_message()));
            }
        }
    }

    fn remove_pending(&mut self, doctor_address: &str) {
        if let Loadable::Ready(pending) = &mut self.pending {
            pending.retain(|request| request.doctor_address != doctor_address);
        }
    }

    // ── Derived state & rendering ────────────────────────────

    /// The display history: current snapshot merged with the history
    /// list, empty entries dropped, newest first.
    pub fn merged_history(&self) -> Vec<VitalRecord> {
        let mut merged: Vec<VitalRecord> = Vec::new();
        if let Some(snapshot) = self.snapshot.value() {
            merged.push(snapshot.clone());
        }
        if let Some(history) = self.history.value() {
            merged.extend(history.iter().cloned());
        }
        merged.retain(|record| !record.is_empty());
        merged.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        merged
    }

    pub fn render_history(&self) -> String {
        if self.snapshot.is_loading() || self.history.is_loading() {
            return "Loading...".to_string();
        }
        let rows: Vec<Vec<String>> = self.merged_history().iter().map(vital_row).collect();
        render_table(&VITAL_HEADERS, &rows, "No data available.")
    }

    pub fn render_pending(&self) -> String {
        match &self.pending {
            Loadable::Loading => "Loading...".to_string(),
            Loadable::Failed(message) => format!("Error: {message}"),
            Loadable::Ready(pending) => {
                let rows: Vec<Vec<String>> = pending
                    .iter()
                    .map(|request| {
                        vec![
                            request.doctor_address.clone(),
                            "Approve / Revoke".to_string(),
                        ]
                    })
                    .collect();
                render_table(
                    &["Doctor Address", "Actions"],
                    &rows,
                    "No current access requests.",
                )
            }
        }
    }

    pub fn render_previous(&self) -> String {
        match &self.previous {
            Loadable::Loading => "Loading...".to_string(),
            Loadable::Failed(message) => format!("Error: {message}"),
            Loadable::Ready(previous) => {
                let rows: Vec<Vec<String>> = previous
                    .iter()
                    .map(|request| {
                        vec![
                            request.doctor_address.clone(),
                            request.granted_display(),
                            request.revoked_display(),
                        ]
                    })
                    .collect();
                render_table(
                    &["Doctor Address", "Time Granted", "Time Revoked"],
                    &rows,
                    "No previous access requests.",
                )
            }
        }
    }
}

impl Default for PatientDashboard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Method, MockTransport};
    use crate::session::{SessionStore, TokenPair};
    use serde_json::{json, Value};

    fn client_with(mock: MockTransport) -> (tempfile::TempDir, ApiClient<MockTransport>) {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::at_path(dir.path().join("session.json"));
        store
            .store(&TokenPair {
                access: "a".into(),
                refresh: "r".into(),
            })
            .unwrap();
        (dir, ApiClient::new(mock, store))
    }

    fn snapshot_body(timestamp: &str) -> Value {
        json!({
            "name": "Jane",
            "age": 45,
            "height": 170,
            "weight": 70,
            "systolic": 120,
            "diastolic": 80,
            "bloodsugar": 95,
            "symptoms": "cough",
            "diet": "low-carb",
            "timestamp": timestamp
        })
    }

    fn mock_all_four() -> MockTransport {
        MockTransport::new()
            .respond(
                Method::Get,
                "/api/patient-data/",
                200,
                snapshot_body("2024-02-01T00:00:00"),
            )
            .respond(
                Method::Get,
                "/api/access-requests/",
                200,
                json!([["0xABC", "0xPAT", 0, 0, 0]]),
            )
            .respond(
                Method::Get,
                "/api/previous-requests/",
                200,
                json!([["0xOLD", "0xPAT", true, 1_700_000_000, 1_700_100_000]]),
            )
            .respond(
                Method::Get,
                "/api/patient-data-history/",
                200,
                json!([
                    {"name": "Jane", "age": 44, "timestamp": "2024-03-01T00:00:00"},
                    {"name": "Jane", "age": 43, "timestamp": "2024-01-01T00:00:00"}
                ]),
            )
    }

    #[tokio::test]
    async fn mount_populates_all_four_slices() {
        let (_dir, client) = client_with(mock_all_four());
        let mut dashboard = PatientDashboard::new();

        dashboard.load(&client).await;

        assert_eq!(dashboard.snapshot().value().unwrap().age, Some(45));
        assert_eq!(dashboard.pending().value().unwrap().len(), 1);
        assert_eq!(dashboard.previous().value().unwrap().len(), 1);
        assert_eq!(dashboard.history().value().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn one_failed_fetch_never_blocks_the_others() {
        let mock = MockTransport::new()
            .respond(
                Method::Get,
                "/api/patient-data/",
                200,
                snapshot_body("2024-02-01T00:00:00"),
            )
            .respond(Method::Get, "/api/access-requests/", 200, json!([]))
            .respond(
                Method::Get,
                "/api/previous-requests/",
                500,
                json!({"error": "chain unavailable"}),
            )
            .respond(Method::Get, "/api/patient-data-history/", 200, json!([]));
        let (_dir, client) = client_with(mock);
        let mut dashboard = PatientDashboard::new();

        dashboard.load(&client).await;

        assert!(dashboard.snapshot().value().is_some());
        assert!(dashboard.pending().value().is_some());
        assert!(dashboard.history().value().is_some());
        assert_eq!(dashboard.previous().error(), Some("chain unavailable"));
        assert!(dashboard.render_previous().contains("chain unavailable"));
    }

    #[tokio::test]
    async fn merged_history_sorts_snapshot_into_place() {
        // History T1 (newest), snapshot T0 (middle), history T2 (oldest).
        let mock = MockTransport::new()
            .respond(
                Method::Get,
                "/api/patient-data/",
                200,
                snapshot_body("2024-02-01T00:00:00"),
            )
            .respond(Method::Get, "/api/access-requests/", 200, json!([]))
            .respond(Method::Get, "/api/previous-requests/", 200, json!([]))
            .respond(
                Method::Get,
                "/api/patient-data-history/",
                200,
                json!([
                    {"name": "Jane", "age": 46, "timestamp": "2024-03-01T00:00:00"},
                    {"name": "Jane", "age": 43, "timestamp": "2024-01-01T00:00:00"}
                ]),
            );
        let (_dir, client) = client_with(mock);
        let mut dashboard = PatientDashboard::new();

        dashboard.load(&client).await;

        let merged = dashboard.merged_history();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].age, Some(46), "T1 first");
        assert_eq!(merged[1].age, Some(45), "snapshot T0 in the middle");
        assert_eq!(merged[2].age, Some(43), "T2 last");
    }

    #[tokio::test]
    async fn merged_history_drops_empty_records() {
        let mock = MockTransport::new()
            .respond(
                Method::Get,
                "/api/patient-data/",
                200,
                // Never-written snapshot: the backend default row.
                json!({"name": "", "age": 0, "height": 0, "weight": 0, "systolic": 0,
                       "diastolic": 0, "bloodsugar": 0, "symptoms": "", "diet": "",
                       "timestamp": "1970-01-01T00:00:00"}),
            )
            .respond(Method::Get, "/api/access-requests/", 200, json!([]))
            .respond(Method::Get, "/api/previous-requests/", 200, json!([]))
            .respond(
                Method::Get,
                "/api/patient-data-history/",
                200,
                json!([{"name": "Jane", "age": 45, "timestamp": "2024-01-01T00:00:00"}]),
            );
        let (_dir, client) = client_with(mock);
        let mut dashboard = PatientDashboard::new();

        dashboard.load(&client).await;

        let merged = dashboard.merged_history();
        assert_eq!(merged.len(), 1, "empty snapshot filtered out");
        assert_eq!(merged[0].age, Some(45));
    }

    #[tokio::test]
    async fn submit_posts_integers_exactly_once_and_refreshes() {
        let (_dir, client) = client_with(
            mock_all_four()
                .respond(Method::Post, "/api/add-patient-data/", 200, Value::Null)
                .respond(
                    Method::Get,
                    "/api/patient-data/",
                    200,
                    snapshot_body("2024-04-01T00:00:00"),
                )
                .respond(
                    Method::Get,
                    "/api/patient-data-history/",
                    200,
                    json!([
                        {"name": "Jane", "age": 45, "timestamp": "2024-04-01T00:00:00"},
                        {"name": "Jane", "age": 44, "timestamp": "2024-03-01T00:00:00"}
                    ]),
                ),
        );
        let mut dashboard = PatientDashboard::new();
        dashboard.load(&client).await;

        dashboard.form.age = "45".into();
        dashboard.form.height = "170".into();
        dashboard.form.weight = "70".into();
        dashboard.form.systolic = "120".into();
        dashboard.form.diastolic = "80".into();
        dashboard.form.bloodsugar = "95".into();
        dashboard.form.symptoms = "cough".into();
        dashboard.form.diet = "low-carb".into();

        dashboard.submit_record(&client).await;

        let posts = client
            .transport()
            .requests_to(Method::Post, "/api/add-patient-data/");
        assert_eq!(posts.len(), 1, "exactly one POST");
        let body = posts[0].body.as_ref().unwrap();
        assert_eq!(body["age"], 45);
        assert_eq!(body["height"], 170);
        assert_eq!(body["weight"], 70);
        assert_eq!(body["systolic"], 120);
        assert_eq!(body["diastolic"], 80);
        assert_eq!(body["bloodsugar"], 95);
        assert_eq!(body["symptoms"], "cough");
        assert_eq!(body["diet"], "low-carb");

        assert!(matches!(dashboard.take_alert(), Some(Alert::Success(_))));
        // Snapshot + history were re-fetched in the same transaction.
        let snapshot_fetches = client.transport().requests_to(Method::Get, "/api/patient-data/");
        assert_eq!(snapshot_fetches.len(), 2);
        assert_eq!(
            dashboard.snapshot().value().unwrap().timestamp_display(),
            "2024-04-01 00:00:00"
        );
    }

    #[tokio::test]
    async fn submit_with_bad_number_never_reaches_network() {
        let (_dir, client) = client_with(MockTransport::new());
        let mut dashboard = PatientDashboard::new();
        dashboard.form.age = "forty-five".into();
        dashboard.form.height = "170".into();

        dashboard.submit_record(&client).await;

        assert!(client.transport().requests().is_empty());
        match dashboard.take_alert() {
            Some(Alert::Error(message)) => assert!(message.contains("Age")),
            other => panic!("Expected error alert, got: {other:?}"),
        }
        assert_eq!(dashboard.form.age, "forty-five", "fields keep their values");
    }

    #[tokio::test]
    async fn submit_failure_keeps_form_values() {
        let (_dir, client) = client_with(mock_all_four().respond(
            Method::Post,
            "/api/add-patient-data/",
            400,
            json!({"detail": "height out of range"}),
        ));
        let mut dashboard = PatientDashboard::new();
        dashboard.load(&client).await;
        dashboard.form.age = "45".into();
        dashboard.form.height = "9999".into();
        dashboard.form.weight = "70".into();
        dashboard.form.systolic = "120".into();
        dashboard.form.diastolic = "80".into();
        dashboard.form.bloodsugar = "95".into();

        dashboard.submit_record(&client).await;

        assert_eq!(dashboard.form.height, "9999");
        match dashboard.take_alert() {
            Some(Alert::Error(message)) => assert_eq!(message, "height out of range"),
            other => panic!("Expected error alert, got: {other:?}"),
        }
        assert!(!dashboard.form.is_loading());
    }

    #[tokio::test]
    async fn approve_removes_doctor_once_confirmed() {
        let (_dir, client) = client_with(
            mock_all_four().respond(Method::Post, "/api/approve-access/", 200, Value::Null),
        );
        let mut dashboard = PatientDashboard::new();
        dashboard.load(&client).await;
        assert_eq!(dashboard.pending().value().unwrap().len(), 1);

        dashboard.approve_access(&client, "0xABC").await;

        let pending = dashboard.pending().value().unwrap();
        assert!(
            pending.iter().all(|r| r.doctor_address != "0xABC"),
            "approved doctor gone from the local pending list"
        );
        assert!(matches!(dashboard.take_alert(), Some(Alert::Success(_))));

        let posts = client
            .transport()
            .requests_to(Method::Post, "/api/approve-access/");
        let body = posts[0].body.as_ref().unwrap();
        assert_eq!(body["doctor_address"], "0xABC");
        assert!(body["time_granted"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn failed_approve_leaves_pending_list_untouched() {
        let (_dir, client) = client_with(mock_all_four().respond(
            Method::Post,
            "/api/approve-access/",
            500,
            json!({"error": "chain unavailable"}),
        ));
        let mut dashboard = PatientDashboard::new();
        dashboard.load(&client).await;

        dashboard.approve_access(&client, "0xABC").await;

        assert_eq!(
            dashboard.pending().value().unwrap().len(),
            1,
            "no removal without backend confirmation"
        );
        assert!(matches!(dashboard.take_alert(), Some(Alert::Error(_))));
    }

    #[tokio::test]
    async fn revoke_posts_revocation_time_and_removes() {
        let (_dir, client) = client_with(
            mock_all_four().respond(Method::Post, "/api/revoke-access/", 200, Value::Null),
        );
        let mut dashboard = PatientDashboard::new();
        dashboard.load(&client).await;

        dashboard.revoke_access(&client, "0xABC").await;

        assert!(dashboard.pending().value().unwrap().is_empty());
        let posts = client
            .transport()
            .requests_to(Method::Post, "/api/revoke-access/");
        assert!(posts[0].body.as_ref().unwrap()["time_revoked"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn renders_pending_and_previous_tables() {
        let (_dir, client) = client_with(mock_all_four());
        let mut dashboard = PatientDashboard::new();
        dashboard.load(&client).await;

        let pending = dashboard.render_pending();
        assert!(pending.contains("0xABC"));

        let previous = dashboard.render_previous();
        assert!(previous.contains("0xOLD"));
        assert!(previous.contains("2023-"), "grant time rendered");

        let history = dashboard.render_history();
        assert!(history.contains("170 cm"));
    }

    #[tokio::test]
    async fn empty_pending_list_renders_placeholder() {
        let mock = MockTransport::new()
            .respond(Method::Get, "/api/patient-data/", 200, json!({}))
            .respond(Method::Get, "/api/access-requests/", 200, json!([]))
            .respond(Method::Get, "/api/previous-requests/", 200, json!([]))
            .respond(Method::Get, "/api/patient-data-history/", 200, json!([]));
        let (_dir, client) = client_with(mock);
        let mut dashboard = PatientDashboard::new();
        dashboard.load(&client).await;

        assert!(dashboard.render_pending().contains("No current access requests."));
        assert!(dashboard.render_previous().contains("No previous access requests."));
        assert!(dashboard.render_history().contains("No data available."));
    }
}
