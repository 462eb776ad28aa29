use async_trait::async_trait;

use status_platform::{CheckError, ServiceStatus, StatusChecker};

/// Placeholder reachability check.
///
/// No packet is sent: a non-empty host is reported online. Swapping in a real
/// probe only means replacing this type behind the [`StatusChecker`] trait.
pub struct PingChecker {
    host: String,
}

impl PingChecker {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl StatusChecker for PingChecker {
    async fn check_status(&self) -> Result<ServiceStatus, CheckError> {
        if self.host.is_empty() {
            return Err(CheckError::EmptyHost);
        }
        Ok(ServiceStatus::Online)
    }

    fn describe(&self) -> String {
        format!("ping {}", self.host)
    }
}
