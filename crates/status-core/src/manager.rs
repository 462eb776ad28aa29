use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tracing::{debug, info, warn};

use status_platform::{resolve_status, ServiceStatus};

use crate::service::{Service, ServiceSnapshot};

/// What a call to [`ServiceManager::update_all_status`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A pass ran over every registered service
    Completed { checked: usize, offline: usize },
    /// Another pass was already running; nothing was done
    Skipped,
}

/// Owns the registered services and coordinates status refreshes.
///
/// At most one refresh pass runs at a time. A refresh requested while one is
/// active is dropped, not queued.
pub struct ServiceManager {
    services: RwLock<Vec<Arc<Service>>>,
    refreshing: AtomicBool,
}

/// Clears the refresh flag when the pass ends, including on panic or when the
/// pass future is dropped mid-way.
struct RefreshGuard<'a>(&'a AtomicBool);

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ServiceManager {
    pub fn new() -> Self {
        Self {
            services: RwLock::new(Vec::new()),
            refreshing: AtomicBool::new(false),
        }
    }

    /// Appends a service; registration order is display and refresh order.
    pub fn add_service(&self, service: Service) -> Arc<Service> {
        let service = Arc::new(service);
        self.services
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&service));
        service
    }

    /// Copy of the service sequence. Entries are shared, so later status
    /// updates show through without fetching again.
    pub fn get_services(&self) -> Vec<Arc<Service>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn snapshot(&self) -> Vec<ServiceSnapshot> {
        self.get_services().iter().map(|s| s.snapshot()).collect()
    }

    pub fn len(&self) -> usize {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Runs the service's checker and records the outcome.
    ///
    /// Failures are logged and recorded as offline, never returned. Returns
    /// `None` without touching the service when no checker is bound.
    pub async fn update_status(&self, service: &Service) -> Option<ServiceStatus> {
        let checker = service.checker()?;

        let result = checker.check_status().await;
        let status = resolve_status(&result);
        service.apply_check(status, Utc::now());

        if let Err(e) = result {
            warn!("check of service {} failed: {}", service.name(), e);
        } else {
            debug!("service {} is {}", service.name(), status);
        }
        Some(status)
    }

    /// Refreshes every service in registration order, unless a pass is
    /// already running.
    pub async fn update_all_status(&self) -> RefreshOutcome {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("refresh already in progress, skipping");
            return RefreshOutcome::Skipped;
        }
        let _guard = RefreshGuard(&self.refreshing);

        let mut checked = 0;
        let mut offline = 0;
        for service in self.get_services() {
            if let Some(status) = self.update_status(&service).await {
                checked += 1;
                if status == ServiceStatus::Offline {
                    offline += 1;
                }
            }
        }

        info!("refreshed {} services ({} offline)", checked, offline);
        RefreshOutcome::Completed { checked, offline }
    }
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}
