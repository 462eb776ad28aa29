//! Background refresh worker. Request handlers call [`RefreshHandle::trigger`]
//! and respond without waiting for the pass to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::manager::{RefreshOutcome, ServiceManager};

/// Handle to request a refresh pass from the worker
#[derive(Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Requests a pass without waiting for it. Returns `false` when the
    /// request was dropped because one is already pending or the worker is
    /// gone.
    pub fn trigger(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => {
                debug!("refresh already pending, request dropped");
                false
            }
            Err(TrySendError::Closed(())) => {
                warn!("refresh worker stopped, request dropped");
                false
            }
        }
    }
}

pub struct Refresher;

impl Refresher {
    /// Starts the worker. It runs a pass per trigger and, when `interval` is
    /// set, on every tick. It exits once every handle has been dropped.
    pub fn spawn(
        manager: Arc<ServiceManager>,
        interval: Option<Duration>,
    ) -> (RefreshHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel::<()>(1);
        let task = tokio::spawn(refresh_loop(manager, rx, interval));
        (RefreshHandle { tx }, task)
    }
}

async fn refresh_loop(
    manager: Arc<ServiceManager>,
    mut rx: mpsc::Receiver<()>,
    interval: Option<Duration>,
) {
    let mut ticker = interval.map(|period| {
        let mut t = time::interval(period);
        t.set_missed_tick_behavior(MissedTickBehavior::Delay);
        t
    });
    if let Some(t) = ticker.as_mut() {
        t.tick().await; // consume the immediate first tick
    }

    loop {
        tokio::select! {
            req = rx.recv() => {
                if req.is_none() {
                    info!("all refresh handles dropped, stopping refresher");
                    break;
                }
                run_pass(&manager, "requested").await;
            }
            _ = next_tick(&mut ticker) => {
                run_pass(&manager, "scheduled").await;
            }
        }

        // Requests that arrived while the pass ran are dropped, not queued.
        while rx.try_recv().is_ok() {}
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(t) => {
            t.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn run_pass(manager: &ServiceManager, reason: &str) {
    match manager.update_all_status().await {
        RefreshOutcome::Completed { checked, offline } => {
            debug!("{} refresh done: {} checked, {} offline", reason, checked, offline);
        }
        RefreshOutcome::Skipped => {
            debug!("{} refresh skipped, another pass is running", reason);
        }
    }
}
