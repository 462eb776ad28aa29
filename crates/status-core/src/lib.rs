pub mod config;
pub mod manager;
pub mod refresh;
pub mod service;

pub use manager::{RefreshOutcome, ServiceManager};
pub use refresh::{RefreshHandle, Refresher};
pub use service::{Service, ServiceSnapshot, ServiceState};
