//! Vitalink: client core for a doctor/patient vital-signs service.
//!
//! The shell (CLI here, any UI elsewhere) renders state owned by the
//! controllers in `auth`, `routing`, and `dashboard`; all backend
//! access goes through the typed client in `api`; the persisted token
//! pair lives behind `session`.

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod routing;
pub mod session;
