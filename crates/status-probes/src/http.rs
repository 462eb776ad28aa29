use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use status_platform::{CheckError, ServiceStatus, StatusChecker};

/// Default request timeout used when a config entry does not set one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reports a service online when a GET to its URL answers with a 2xx code.
pub struct HttpChecker {
    url: String,
    /// `None` leaves the request unbounded (transport default)
    timeout: Option<Duration>,
}

impl HttpChecker {
    /// A zero `timeout` disables the request timeout entirely.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout: (!timeout.is_zero()).then_some(timeout),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn transport_error(&self, source: reqwest::Error) -> CheckError {
        CheckError::Transport {
            url: self.url.clone(),
            source: Box::new(source),
        }
    }

    fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        // One connection per probe: nothing is kept idle between checks.
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}

#[async_trait]
impl StatusChecker for HttpChecker {
    async fn check_status(&self) -> Result<ServiceStatus, CheckError> {
        let client = self.build_client().map_err(|e| self.transport_error(e))?;

        let resp = client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        debug!("GET {} -> {}", self.url, status);

        if status.is_success() {
            Ok(ServiceStatus::Online)
        } else {
            Err(CheckError::UnexpectedStatusCode {
                code: status.as_u16(),
            })
        }
    }

    fn describe(&self) -> String {
        format!("GET {}", self.url)
    }
}
