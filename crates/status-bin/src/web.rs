use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::warn;

use status_core::{RefreshHandle, ServiceManager, ServiceSnapshot};

use crate::page;

#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<ServiceManager>,
    pub refresher: RefreshHandle,
    pub title: Arc<str>,
}

/// Body of `GET /api/status`
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub services: Vec<ServiceSnapshot>,
    pub last_updated: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(api_status))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Renders the cached snapshot; never waits on a check.
async fn index(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    page::render(&state.title, &state.manager.snapshot())
        .map(Html)
        .map_err(|e| {
            warn!("failed to render dashboard page: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

/// Kicks off a background refresh and answers with the current snapshot.
async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
    state.refresher.trigger();
    Json(StatusResponse {
        services: state.manager.snapshot(),
        last_updated: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use status_core::{Refresher, Service};
    use status_probes::PingChecker;

    async fn start_server() -> (String, Arc<ServiceManager>) {
        let manager = Arc::new(ServiceManager::new());
        manager.add_service(
            Service::new("Gateway", "edge router", "https://gw.example.com")
                .with_checker(PingChecker::new("")),
        );
        manager.add_service(Service::new("Notes", "<static>", ""));

        let (refresher, _task) = Refresher::spawn(Arc::clone(&manager), None);
        let state = AppState {
            manager: Arc::clone(&manager),
            refresher,
            title: Arc::from("Test Status"),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, state, std::future::pending::<()>()));

        (format!("http://{}", addr), manager)
    }

    #[tokio::test]
    async fn test_api_status_returns_snapshot_and_triggers_refresh() {
        let (base, manager) = start_server().await;

        let body: serde_json::Value = reqwest::get(format!("{}/api/status", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        let services = body["services"].as_array().unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0]["name"], "Gateway");
        assert_eq!(services[1]["name"], "Notes");
        assert_eq!(body["last_updated"].as_str().unwrap().len(), 19);

        // The refresh runs in the background; the empty host turns it offline.
        let gateway = manager.get_services()[0].clone();
        tokio::time::timeout(Duration::from_secs(5), async {
            while gateway.last_checked().is_none() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("refresh was not triggered");
        assert!(!gateway.status().is_online());

        let body: serde_json::Value = reqwest::get(format!("{}/api/status", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["services"][0]["status"], 1);
        assert_eq!(body["services"][1]["status"], 0);
    }

    #[tokio::test]
    async fn test_index_renders_without_refreshing() {
        let (base, manager) = start_server().await;

        let resp = reqwest::get(format!("{}/", base)).await.unwrap();
        assert!(resp.status().is_success());
        let html = resp.text().await.unwrap();

        assert!(html.contains("<title>Test Status</title>"));
        assert!(html.contains("Gateway"));
        assert!(html.contains("&lt;static&gt;"));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(manager.get_services()[0].last_checked().is_none());
    }
}
