use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::status::ServiceStatus;

/// Why a probe could not report a service as online.
///
/// Every variant collapses to [`ServiceStatus::Offline`]; the status model does
/// not distinguish "confirmed down" from "could not be determined".
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("unexpected HTTP status code: {code}")]
    UnexpectedStatusCode { code: u16 },
    #[error("host address is empty")]
    EmptyHost,
    #[error("process name must not be empty")]
    EmptyProcessName,
    #[error("process '{process}' is not running: {reason}")]
    ProcessNotRunning { process: String, reason: String },
    #[error("checking '{target}' timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },
    #[error("failed to launch probe for '{process}': {source}")]
    Spawn {
        process: String,
        #[source]
        source: std::io::Error,
    },
}

impl CheckError {
    /// Status recorded for a service whose check failed with this error
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus::Offline
    }
}

/// Capability to determine the current status of one service.
///
/// Implementations bound their own running time and never leave shared state
/// half-updated. A failed probe is reported as an `Err`, which callers record
/// as [`ServiceStatus::Offline`].
#[async_trait]
pub trait StatusChecker: Send + Sync {
    async fn check_status(&self) -> Result<ServiceStatus, CheckError>;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;
}

/// Folds a check result into the status that gets recorded.
pub fn resolve_status(result: &Result<ServiceStatus, CheckError>) -> ServiceStatus {
    match result {
        Ok(status) => *status,
        Err(e) => e.status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_resolve_to_offline() {
        let errors = [
            CheckError::UnexpectedStatusCode { code: 404 },
            CheckError::EmptyHost,
            CheckError::EmptyProcessName,
            CheckError::Timeout {
                target: "apollo".to_string(),
                timeout: Duration::from_secs(5),
            },
        ];
        for e in errors {
            assert_eq!(resolve_status(&Err(e)), ServiceStatus::Offline);
        }
        assert_eq!(resolve_status(&Ok(ServiceStatus::Online)), ServiceStatus::Online);
    }

    #[test]
    fn test_error_messages() {
        let e = CheckError::UnexpectedStatusCode { code: 503 };
        assert_eq!(e.to_string(), "unexpected HTTP status code: 503");

        let e = CheckError::ProcessNotRunning {
            process: "docker".to_string(),
            reason: "exit status: 1".to_string(),
        };
        assert_eq!(e.to_string(), "process 'docker' is not running: exit status: 1");
    }
}
