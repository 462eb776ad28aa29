use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use status_platform::StatusChecker;
use status_probes::{HttpChecker, PingChecker};

use crate::manager::ServiceManager;
use crate::service::Service;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Page title shown on the dashboard
    #[serde(default = "default_title")]
    pub title: String,

    /// Seconds between background refresh passes (0 disables them)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Services in display order
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Link shown on the dashboard; may be empty
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub check: CheckConfig,
}

/// How a service's status is determined
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckConfig {
    Http {
        url: String,
        #[serde(default = "default_http_timeout")]
        timeout_secs: u64,
    },
    Ping {
        host: String,
    },
    Command {
        process_name: String,
        #[serde(default = "default_command_timeout")]
        timeout_secs: u64,
    },
    /// Status is never updated automatically
    #[default]
    None,
}

fn default_title() -> String {
    "Service Status".to_string()
}
fn default_refresh_interval() -> u64 {
    60
}
fn default_http_timeout() -> u64 {
    10
}
fn default_command_timeout() -> u64 {
    5
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            refresh_interval_secs: default_refresh_interval(),
            services: Vec::new(),
        }
    }
}

impl DashboardConfig {
    /// Default config file path for this platform
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("io", "status-dashboard", "dashboard") {
            dirs.config_dir().join("config.json")
        } else {
            PathBuf::from("dashboard-config.json")
        }
    }

    /// Load config from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Self =
            serde_json::from_str(&data).with_context(|| "failed to parse config JSON")?;
        Ok(config)
    }

    /// Save config to a file path
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config dir {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(())
    }

    /// `None` when periodic refresh is disabled
    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }

    /// Registers every configured service, in file order, into a new manager.
    pub fn build_manager(&self) -> ServiceManager {
        let manager = ServiceManager::new();
        for svc in &self.services {
            manager.add_service(svc.build());
        }
        manager
    }
}

impl ServiceConfig {
    pub fn build(&self) -> Service {
        let service = Service::new(&self.name, &self.description, &self.url);
        match self.check.build_checker() {
            Some(checker) => service.with_boxed_checker(checker),
            None => service,
        }
    }
}

impl CheckConfig {
    pub fn build_checker(&self) -> Option<Box<dyn StatusChecker>> {
        match self {
            CheckConfig::Http { url, timeout_secs } => Some(Box::new(HttpChecker::new(
                url.clone(),
                Duration::from_secs(*timeout_secs),
            ))),
            CheckConfig::Ping { host } => Some(Box::new(PingChecker::new(host.clone()))),
            #[cfg(unix)]
            CheckConfig::Command {
                process_name,
                timeout_secs,
            } => Some(Box::new(status_probes::CommandChecker::new(
                process_name.clone(),
                Duration::from_secs(*timeout_secs),
            ))),
            #[cfg(not(unix))]
            CheckConfig::Command { process_name, .. } => {
                tracing::warn!(
                    "process checks are unsupported on this platform, '{}' will not be checked",
                    process_name
                );
                None
            }
            CheckConfig::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "title": "JJApps Status",
        "services": [
            {
                "name": "JJApps Center",
                "description": "service hub",
                "url": "https://service.example.com",
                "check": { "kind": "command", "process_name": "apollo" }
            },
            {
                "name": "Black Hole",
                "check": { "kind": "http", "url": "https://pkg.example.com", "timeout_secs": 3 }
            },
            {
                "name": "Gateway",
                "check": { "kind": "ping", "host": "10.0.0.1" }
            },
            { "name": "Notes" }
        ]
    }"#;

    #[test]
    fn test_parse_applies_defaults() {
        let config: DashboardConfig = serde_json::from_str(SAMPLE).unwrap();

        assert_eq!(config.title, "JJApps Status");
        assert_eq!(config.refresh_interval_secs, 60);
        assert_eq!(config.services.len(), 4);
        assert_eq!(
            config.services[0].check,
            CheckConfig::Command {
                process_name: "apollo".to_string(),
                timeout_secs: 5,
            }
        );
        assert_eq!(
            config.services[1].check,
            CheckConfig::Http {
                url: "https://pkg.example.com".to_string(),
                timeout_secs: 3,
            }
        );
        assert_eq!(config.services[3].check, CheckConfig::None);
        assert_eq!(config.services[3].url, "");
    }

    #[test]
    fn test_build_manager_keeps_order_and_bindings() {
        let config: DashboardConfig = serde_json::from_str(SAMPLE).unwrap();
        let manager = config.build_manager();
        let services = manager.get_services();

        let names: Vec<&str> = services.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["JJApps Center", "Black Hole", "Gateway", "Notes"]);

        assert_eq!(
            services[1].checker().map(|c| c.describe()).as_deref(),
            Some("GET https://pkg.example.com")
        );
        assert_eq!(
            services[2].checker().map(|c| c.describe()).as_deref(),
            Some("ping 10.0.0.1")
        );
        assert!(services[3].checker().is_none());
    }

    #[test]
    fn test_refresh_interval_zero_disables() {
        let mut config = DashboardConfig::default();
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(60)));
        config.refresh_interval_secs = 0;
        assert_eq!(config.refresh_interval(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = DashboardConfig::default();
        config.services.push(ServiceConfig {
            name: "Docker".to_string(),
            description: "container runtime".to_string(),
            url: String::new(),
            check: CheckConfig::Command {
                process_name: "dockerd".to_string(),
                timeout_secs: 5,
            },
        });
        config.save(&path).unwrap();

        let loaded = DashboardConfig::load(&path).unwrap();
        assert_eq!(loaded.services.len(), 1);
        assert_eq!(loaded.services[0].check, config.services[0].check);
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let err = DashboardConfig::load(Path::new("/nonexistent/status/config.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read config"));
    }
}
