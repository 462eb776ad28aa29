//! Server-rendered dashboard page. The embedded script polls `/api/status`,
//! which also keeps background refreshes coming while the page is open.

use askama::Template;
use chrono::{DateTime, Utc};

use status_core::ServiceSnapshot;

const POLL_INTERVAL_MS: u32 = 30_000;

/// `templates/index.html`, HTML-escaped on every interpolation
#[derive(Template, Debug)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub title: &'a str,
    pub services: Vec<ServiceRow<'a>>,
    pub poll_interval_ms: u32,
}

/// One list item, with the status word and check time already formatted
#[derive(Debug)]
pub struct ServiceRow<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub url: &'a str,
    pub status: &'static str,
    pub checked: String,
}

impl<'a> IndexTemplate<'a> {
    pub fn new(title: &'a str, services: &'a [ServiceSnapshot]) -> Self {
        let services = services
            .iter()
            .map(|svc| ServiceRow {
                name: &svc.name,
                description: &svc.description,
                url: &svc.url,
                status: svc.status.as_str(),
                checked: svc
                    .last_checked
                    .map(format_checked)
                    .unwrap_or_else(|| "never".to_string()),
            })
            .collect();

        Self {
            title,
            services,
            poll_interval_ms: POLL_INTERVAL_MS,
        }
    }
}

/// Matches `formatChecked` in the page script so polling doesn't change
/// how the time reads.
fn format_checked(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

pub fn render(title: &str, services: &[ServiceSnapshot]) -> askama::Result<String> {
    IndexTemplate::new(title, services).render()
}
