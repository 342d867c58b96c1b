//! Typed backend client.
//!
//! One method per backend endpoint, returning decoded `models` types.
//! Authenticated calls read the access token from the session store at
//! call time; a 401 triggers a single refresh exchange (persisted back
//! to the store) and one retry. Nothing else is retried.

use serde_json::Value;

use super::error::ApiError;
use super::transport::{ApiRequest, HttpTransport, Transport};
use super::types::{
    decode_doctor_request_row, decode_patient_history, decode_pending_row, decode_resolved_row,
    ApproveAccessBody, LoginRequest, NewRecord, RefreshRequest, RefreshResponse, RegisterRequest,
    RequestAccessBody, RevokeAccessBody, TokenResponse, UserTypeResponse, WireVitalRecord,
};
use crate::models::{
    DoctorAccessRequest, PatientHistory, PendingRequest, RegisteredUser, ResolvedRequest, Role,
    VitalRecord,
};
use crate::session::{SessionStore, TokenPair};

pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    session: SessionStore,
}

impl ApiClient<HttpTransport> {
    /// Client against the configured backend and the default session
    /// file.
    pub fn from_config() -> Self {
        Self::new(HttpTransport::from_config(), SessionStore::open_default())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, session: SessionStore) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Send paths ───────────────────────────────────────────

    /// Unauthenticated request (login, register, refresh).
    async fn send_public(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let response = self.transport.execute(request).await?;
        Self::interpret(response.status, response.body)
    }

    /// Authenticated request with the single refresh-and-retry.
    async fn send_authed(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let pair = self.session.tokens().ok_or(ApiError::NoSession)?;

        let first = self
            .transport
            .execute(request.clone().with_bearer(&pair.access))
            .await?;
        if first.status != 401 {
            return Self::interpret(first.status, first.body);
        }

        // Access token rejected: exchange the refresh token once and
        // replay the original request with the new access token.
        let access = self.refresh_access(&pair).await?;
        let second = self.transport.execute(request.with_bearer(&access)).await?;
        Self::interpret(second.status, second.body)
    }

    /// Exchange the refresh token for a new access token and persist it.
    async fn refresh_access(&self, pair: &TokenPair) -> Result<String, ApiError> {
        let body = serde_json::to_value(RefreshRequest {
            refresh: &pair.refresh,
        })
        .map_err(|e| ApiError::Decode(e.to_string()))?;

        let response = self
            .transport
            .execute(ApiRequest::post("/refresh", body))
            .await?;
        if !response.is_success() {
            let detail = Self::detail_from(&response.body);
            tracing::warn!(status = response.status, "Token refresh rejected");
            return Err(ApiError::Auth { detail });
        }

        let refreshed: RefreshResponse = serde_json::from_value(response.body)
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        let result = match &refreshed.refresh {
            // Rotated refresh token: persist the whole pair.
            Some(rotated) => self.session.store(&TokenPair {
                access: refreshed.access.clone(),
                refresh: rotated.clone(),
            }),
            None => self.session.set_access(&refreshed.access),
        };
        if let Err(e) = result {
            // The retry still works with the in-memory token.
            tracing::warn!(error = %e, "Could not persist refreshed token");
        }

        Ok(refreshed.access)
    }

    /// Map a response to its body or the status-appropriate error,
    /// carrying the backend's `detail`/`error` payload along.
    fn interpret(status: u16, body: Value) -> Result<Value, ApiError> {
        if (200..300).contains(&status) {
            return Ok(body);
        }
        Err(ApiError::from_status(status, Self::detail_from(&body)))
    }

    fn detail_from(body: &Value) -> String {
        body.get("detail")
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    // ── Auth endpoints ───────────────────────────────────────

    /// POST /login. Returns the issued pair; persisting it is the auth
    /// flow's job, not this client's.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let body = serde_json::to_value(LoginRequest { username, password })
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let response = self.send_public(ApiRequest::post("/login", body)).await?;
        let tokens: TokenResponse =
            serde_json::from_value(response).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(TokenPair {
            access: tokens.access,
            refresh: tokens.refresh,
        })
    }

    /// POST /register.
    pub async fn register(&self, request: &RegisterRequest<'_>) -> Result<RegisteredUser, ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::Decode(e.to_string()))?;
        let response = self.send_public(ApiRequest::post("/register", body)).await?;
        serde_json::from_value(response).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// GET /api/user-type/. Unknown wire values come back as `None`.
    pub async fn user_type(&self) -> Result<Option<Role>, ApiError> {
        let response = self.send_authed(ApiRequest::get("/api/user-type/")).await?;
        let parsed: UserTypeResponse =
            serde_json::from_value(response).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(parsed
            .user_type
            .and_then(|v| u8::try_from(v).ok())
            .and_then(Role::from_u8))
    }

    // ── Doctor endpoints ─────────────────────────────────────

    /// GET /api/doctor-requests/.
    pub async fn doctor_requests(&self) -> Result<Vec<DoctorAccessRequest>, ApiError> {
        let response = self
            .send_authed(ApiRequest::get("/api/doctor-requests/"))
            .await?;
        let rows = response
            .as_array()
            .ok_or_else(|| ApiError::Decode("expected request list".into()))?;
        rows.iter().map(decode_doctor_request_row).collect()
    }

    /// POST /api/request-access/.
    pub async fn request_access(&self, patient_address: &str) -> Result<(), ApiError> {
        let body = serde_json::to_value(RequestAccessBody { patient_address })
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send_authed(ApiRequest::post("/api/request-access/", body))
            .await?;
        Ok(())
    }

    /// GET /api/doctor-patient-data/{patient_address}/.
    pub async fn doctor_patient_data(
        &self,
        patient_address: &str,
    ) -> Result<PatientHistory, ApiError> {
        let path = format!("/api/doctor-patient-data/{patient_address}/");
        let response = self.send_authed(ApiRequest::get(path)).await?;
        decode_patient_history(&response)
    }

    // ── Patient endpoints ────────────────────────────────────

    /// GET /api/patient-data/, the current snapshot.
    pub async fn patient_data(&self) -> Result<VitalRecord, ApiError> {
        let response = self.send_authed(ApiRequest::get("/api/patient-data/")).await?;
        let wire: WireVitalRecord =
            serde_json::from_value(response).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(wire.into_record())
    }

    /// GET /api/patient-data-history/.
    pub async fn patient_data_history(&self) -> Result<Vec<VitalRecord>, ApiError> {
        let response = self
            .send_authed(ApiRequest::get("/api/patient-data-history/"))
            .await?;
        let wire: Vec<WireVitalRecord> =
            serde_json::from_value(response).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(wire.into_iter().map(WireVitalRecord::into_record).collect())
    }

    /// GET /api/access-requests/, the patient's pending list.
    pub async fn access_requests(&self) -> Result<Vec<PendingRequest>, ApiError> {
        let response = self
            .send_authed(ApiRequest::get("/api/access-requests/"))
            .await?;
        let rows = response
            .as_array()
            .ok_or_else(|| ApiError::Decode("expected request list".into()))?;
        rows.iter().map(decode_pending_row).collect()
    }

    /// GET /api/previous-requests/, resolved grants kept for audit display.
    pub async fn previous_requests(&self) -> Result<Vec<ResolvedRequest>, ApiError> {
        let response = self
            .send_authed(ApiRequest::get("/api/previous-requests/"))
            .await?;
        let rows = response
            .as_array()
            .ok_or_else(|| ApiError::Decode("expected request list".into()))?;
        rows.iter().map(decode_resolved_row).collect()
    }

    /// POST /api/add-patient-data/.
    pub async fn add_patient_data(&self, record: &NewRecord) -> Result<(), ApiError> {
        let body = serde_json::to_value(record).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send_authed(ApiRequest::post("/api/add-patient-data/", body))
            .await?;
        Ok(())
    }

    /// POST /api/approve-access/.
    pub async fn approve_access(
        &self,
        doctor_address: &str,
        time_granted: i64,
    ) -> Result<(), ApiError> {
        let body = serde_json::to_value(ApproveAccessBody {
            doctor_address,
            time_granted,
        })
        .map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send_authed(ApiRequest::post("/api/approve-access/", body))
            .await?;
        Ok(())
    }

    /// POST /api/revoke-access/.
    pub async fn revoke_access(
        &self,
        doctor_address: &str,
        time_revoked: i64,
    ) -> Result<(), ApiError> {
        let body = serde_json::to_value(RevokeAccessBody {
            doctor_address,
            time_revoked,
        })
        .map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send_authed(ApiRequest::post("/api/revoke-access/", body))
            .await?;
        Ok(())
    }
}
