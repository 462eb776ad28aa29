pub mod checker;
pub mod status;

pub use checker::{resolve_status, CheckError, StatusChecker};
pub use status::ServiceStatus;
