//! Doctor dashboard: access-request submission and patient history.

use super::{render_table, vital_row, Alert, Loadable, VITAL_HEADERS};
use crate::api::{ApiClient, Transport};
use crate::models::{DoctorAccessRequest, PatientHistory};

/// The history modal, keyed by the patient it was opened for.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryModal {
    pub patient_address: String,
    pub data: Loadable<PatientHistory>,
}

/// Doctor dashboard state.
///
/// The request list is re-fetched through one shared function from
/// both the mount path and the submit path, so a successful submission
/// always lands in the rendered list.
#[derive(Debug)]
pub struct DoctorDashboard {
    /// The request-access form's single input field.
    pub patient_address: String,
    requests: Loadable<Vec<DoctorAccessRequest>>,
    submitting: bool,
    modal: Option<HistoryModal>,
    alert: Option<Alert>,
}

impl DoctorDashboard {
    pub fn new() -> Self {
        Self {
            patient_address: String::new(),
            requests: Loadable::Loading,
            submitting: false,
            modal: None,
            alert: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────

    pub fn requests(&self) -> &Loadable<Vec<DoctorAccessRequest>> {
        &self.requests
    }

    pub fn modal(&self) -> Option<&HistoryModal> {
        self.modal.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Take the pending alert, if any. The shell displays it.
    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    // ── Operations ───────────────────────────────────────────

    /// Mount: fetch the outstanding request list.
    pub async fn load<T: Transport>(&mut self, client: &ApiClient<T>) {
        self.refresh_requests(client).await;
    }

    /// Shared refetch for the request list.
    pub async fn refresh_requests<T: Transport>(&mut self, client: &ApiClient<T>) {
        self.requests = Loadable::Loading;
        self.requests = Loadable::from_result(client.doctor_requests().await);
    }

    /// Submit an access request for the entered patient address.
    ///
    /// Success clears the input and re-fetches the list; failure
    /// leaves the input intact so the user can correct and resend.
    pub async fn submit_request<T: Transport>(&mut self, client: &ApiClient<T>) {
        if self.submitting {
            return;
        }
        self.submitting = true;

        match client.request_access(&self.patient_address).await {
            Ok(()) => {
                self.alert = Some(Alert::Success(
                    "Access request submitted successfully".to_string(),
                ));
                self.patient_address.clear();
                self.refresh_requests(client).await;
            }
            Err(e) => {
                self.alert = Some(Alert::Error(e.user_message()));
            }
        }

        self.submitting = false;
    }

    /// Open the history modal for a patient and fetch their data.
    ///
    /// The fetched response replaces the modal state wholesale: a
    /// second view-history call overwrites the first completely, never
    /// leaving a half-updated mix of two patients.
    pub async fn view_history<T: Transport>(&mut self, client: &ApiClient<T>, patient_address: &str) {
        self.modal = Some(HistoryModal {
            patient_address: patient_address.to_string(),
            data: Loadable::Loading,
        });

        let data = Loadable::from_result(client.doctor_patient_data(patient_address).await);
        self.modal = Some(HistoryModal {
            patient_address: patient_address.to_string(),
            data,
        });
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    // ── Rendering ────────────────────────────────────────────

    /// The outstanding-requests table.
    pub fn render_requests(&self) -> String {
        let headers = ["Patient Address", "Access", "Action"];
        match &self.requests {
            Loadable::Loading => "Loading...".to_string(),
            Loadable::Failed(message) => format!("Error: {message}"),
            Loadable::Ready(requests) => {
                let rows: Vec<Vec<String>> = requests
                    .iter()
                    .map(|request| {
                        vec![
                            request.patient_address.clone(),
                            if request.has_access {
                                "granted".to_string()
                            } else {
                                "pending".to_string()
                            },
                            "View History".to_string(),
                        ]
                    })
                    .collect();
                render_table(&headers, &rows, "No requests.")
            }
        }
    }

    /// The modal's history table.
    pub fn render_history(&self) -> String {
        let Some(modal) = &self.modal else {
            return String::new();
        };
        match &modal.data {
            Loadable::Loading => "Loading...".to_string(),
            Loadable::Failed(message) => format!("Error: {message}"),
            Loadable::Ready(data) => {
                if data.is_empty() {
                    return render_table(&VITAL_HEADERS, &[], "No data available.");
                }
                let rows: Vec<Vec<String>> = data.history.iter().map(vital_row).collect();
                render_table(&VITAL_HEADERS, &rows, "No data available.")
            }
        }
    }
}

impl Default for DoctorDashboard {
    fn default() -> Self {
        Self::new()
    }
}
