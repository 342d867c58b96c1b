//! Session resolution and the login/register forms.
//!
//! The resolver is one-shot: it runs when the app comes up and is not
//! reactive to token changes later in the session. Forms hold their
//! field values across failures (an error never clears what the user
//! typed) and refuse resubmission while a request is in flight.

use crate::api::types::RegisterRequest;
use crate::api::{ApiClient, ApiError, Transport};
use crate::models::{RegisteredUser, Role};
use crate::routing::{post_login_route, Route};
use crate::session::SessionError;

/// Errors surfaced by the auth forms.
#[derive(Debug, thiserror::Error)]
pub enum AuthFormError {
    #[error("A request is already in flight")]
    InFlight,
    #[error("Select a user type before registering")]
    RoleNotSelected,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Could not persist session: {0}")]
    Session(#[from] SessionError),
}

impl AuthFormError {
    /// Alert text for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AuthFormError::Api(e) => e.user_message(),
            AuthFormError::Session(_) => "An error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

/// Resolve the current user's role, once, at startup.
///
/// No persisted token → unauthenticated immediately, without touching
/// the network. Otherwise ask the backend; any failure (network, auth)
/// also resolves unauthenticated.
pub async fn resolve_session<T: Transport>(client: &ApiClient<T>) -> Option<Role> {
    if !client.session().is_authenticated() {
        return None;
    }
    match client.user_type().await {
        Ok(role) => role,
        Err(e) => {
            tracing::warn!(error = %e, "Role lookup failed; treating session as unauthenticated");
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Login
// ═══════════════════════════════════════════════════════════

/// Login form state.
#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    loading: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a submission is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Submit the credentials.
    ///
    /// On success the issued token pair is persisted, the role is
    /// looked up, and the matching dashboard route is returned (an
    /// unusable role lands back on login). On failure the entered
    /// values stay put.
    pub async fn submit<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
    ) -> Result<Route, AuthFormError> {
        if self.loading {
            return Err(AuthFormError::InFlight);
        }
        self.loading = true;
        let result = self.submit_inner(client).await;
        self.loading = false;
        result
    }

    async fn submit_inner<T: Transport>(
        &self,
        client: &ApiClient<T>,
    ) -> Result<Route, AuthFormError> {
        let pair = client.login(&self.username, &self.password).await?;
        client.session().store(&pair)?;

        let role = client.user_type().await?;
        Ok(post_login_route(role))
    }
}

// ═══════════════════════════════════════════════════════════
// Register
// ═══════════════════════════════════════════════════════════

/// Registration form state. `user_type` must be picked before submit.
#[derive(Debug, Default)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub user_type: Option<Role>,
    pub address: String,
    loading: bool,
}

impl RegisterForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Submit the profile. Success navigates to login; the created
    /// profile is returned for confirmation display.
    pub async fn submit<T: Transport>(
        &mut self,
        client: &ApiClient<T>,
    ) -> Result<(Route, RegisteredUser), AuthFormError> {
        if self.loading {
            return Err(AuthFormError::InFlight);
        }
        let role = self.user_type.ok_or(AuthFormError::RoleNotSelected)?;

        self.loading = true;
        let result = client
            .register(&RegisterRequest {
                username: &self.username,
                password: &self.password,
                first_name: &self.first_name,
                last_name: &self.last_name,
                email: &self.email,
                user_type: role.as_u8(),
                address: &self.address,
            })
            .await;
        self.loading = false;

        let user = result?;
        Ok((Route::Login, user))
    }
}
