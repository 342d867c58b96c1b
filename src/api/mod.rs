//! Backend API access: transport seam, typed client, wire decoding.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, MockTransport, Transport};
pub use types::NewRecord;
