pub mod access;
pub mod user;
pub mod vital;

pub use access::{DoctorAccessRequest, PatientHistory, PendingRequest, ResolvedRequest};
pub use user::{RegisteredUser, Role};
pub use vital::VitalRecord;
