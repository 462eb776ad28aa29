use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;

use status_platform::{ServiceStatus, StatusChecker};

/// Result of the most recently completed check of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceState {
    pub status: ServiceStatus,
    /// `None` until the first check attempt finishes
    pub last_checked: Option<DateTime<Utc>>,
}

/// A named service shown on the dashboard.
///
/// Identity fields are fixed at construction. Status and check time sit behind
/// one lock and are only written together, by the manager.
pub struct Service {
    name: String,
    description: String,
    url: String,
    state: RwLock<ServiceState>,
    checker: Option<Box<dyn StatusChecker>>,
}

/// Point-in-time copy of a service, as rendered and served as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSnapshot {
    pub name: String,
    pub description: String,
    pub url: String,
    pub status: ServiceStatus,
    pub last_checked: Option<DateTime<Utc>>,
}

impl Service {
    /// New service with no checker, starting optimistically online
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url: url.into(),
            state: RwLock::new(ServiceState {
                status: ServiceStatus::Online,
                last_checked: None,
            }),
            checker: None,
        }
    }

    pub fn with_checker(self, checker: impl StatusChecker + 'static) -> Self {
        self.with_boxed_checker(Box::new(checker))
    }

    pub fn with_boxed_checker(mut self, checker: Box<dyn StatusChecker>) -> Self {
        self.checker = Some(checker);
        self
    }

    /// Overrides the status shown before the first check
    pub fn with_initial_status(self, status: ServiceStatus) -> Self {
        self.state_mut().status = status;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn checker(&self) -> Option<&dyn StatusChecker> {
        self.checker.as_deref()
    }

    pub fn state(&self) -> ServiceState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> ServiceStatus {
        self.state().status
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        self.state().last_checked
    }

    pub fn snapshot(&self) -> ServiceSnapshot {
        let state = self.state();
        ServiceSnapshot {
            name: self.name.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
            status: state.status,
            last_checked: state.last_checked,
        }
    }

    /// Records a finished check. The stored time never moves backwards, even
    /// if the wall clock does.
    pub(crate) fn apply_check(&self, status: ServiceStatus, checked_at: DateTime<Utc>) {
        let mut state = self.state_mut();
        let checked_at = match state.last_checked {
            Some(prev) if prev > checked_at => prev,
            _ => checked_at,
        };
        *state = ServiceState {
            status,
            last_checked: Some(checked_at),
        };
    }

    fn state_mut(&self) -> std::sync::RwLockWriteGuard<'_, ServiceState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("state", &self.state())
            .field("checker", &self.checker.as_ref().map(|c| c.describe()))
            .finish()
    }
}
