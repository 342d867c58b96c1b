//! Route table and guard.
//!
//! Mirrors the application's navigation contract: public auth routes,
//! a role-based root redirect, one dashboard per role, and a catch-all
//! not-found. The guard maps (requested route, session status) to a
//! render/redirect decision; the shell owns actually switching views.

use crate::models::Role;
use crate::session::SessionStore;

/// Navigable routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Logout,
    Register,
    /// Role-based redirect target ("/").
    Home,
    DoctorDashboard,
    PatientDashboard,
    NotFound,
}

impl Route {
    /// Parse a path; anything unknown is the catch-all.
    pub fn parse(path: &str) -> Route {
        match path.trim_end_matches('/') {
            "" => Route::Home,
            "/login" => Route::Login,
            "/logout" => Route::Logout,
            "/register" => Route::Register,
            "/doctor-dashboard" => Route::DoctorDashboard,
            "/patient-dashboard" => Route::PatientDashboard,
            _ => Route::NotFound,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Logout => "/logout",
            Route::Register => "/register",
            Route::Home => "/",
            Route::DoctorDashboard => "/doctor-dashboard",
            Route::PatientDashboard => "/patient-dashboard",
            Route::NotFound => "*",
        }
    }

    fn is_protected(self) -> bool {
        matches!(
            self,
            Route::Home | Route::DoctorDashboard | Route::PatientDashboard
        )
    }
}

/// Where the one-shot session resolver currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Role lookup still in flight; render a placeholder.
    Resolving,
    /// Resolution done; `None` means unauthenticated.
    Resolved(Option<Role>),
}

/// Views the shell can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Register,
    DoctorDashboard,
    PatientDashboard,
    NotFound,
}

/// Guard decision for one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Resolver still loading; show the placeholder.
    Placeholder,
    Redirect(Route),
    Render(View),
}

/// Dashboard route for a resolved role; everything else lands on login.
pub fn post_login_route(role: Option<Role>) -> Route {
    match role {
        Some(Role::Doctor) => Route::DoctorDashboard,
        Some(Role::Patient) => Route::PatientDashboard,
        None => Route::Login,
    }
}

/// Resolve one navigation.
///
/// Side effects mirror the route contract: `/logout` clears all
/// persisted session state, and `/register` clears it before the form
/// renders (registering while logged in starts a fresh session). A
/// failed clear is logged and the navigation proceeds; no single
/// failure is fatal.
pub fn resolve(route: Route, status: SessionStatus, store: &SessionStore) -> Resolution {
    if route.is_protected() {
        match status {
            SessionStatus::Resolving => return Resolution::Placeholder,
            SessionStatus::Resolved(None) => return Resolution::Redirect(Route::Login),
            SessionStatus::Resolved(Some(role)) => {
                return match route {
                    Route::Home => Resolution::Redirect(post_login_route(Some(role))),
                    Route::DoctorDashboard => Resolution::Render(View::DoctorDashboard),
                    Route::PatientDashboard => Resolution::Render(View::PatientDashboard),
                    _ => unreachable!("only protected routes reach here"),
                };
            }
        }
    }

    match route {
        Route::Login => Resolution::Render(View::Login),
        Route::Logout => {
            if let Err(e) = store.clear() {
                tracing::warn!(error = %e, "Could not clear session on logout");
            }
            Resolution::Redirect(Route::Login)
        }
        Route::Register => {
            if let Err(e) = store.clear() {
                tracing::warn!(error = %e, "Could not clear session before registration");
            }
            Resolution::Render(View::Register)
        }
        Route::NotFound => Resolution::Render(View::NotFound),
        _ => unreachable!("protected routes handled above"),
    }
}
