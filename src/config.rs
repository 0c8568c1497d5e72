/// Dashboard configuration
///
/// Defaults cover a local setup. A JSON file may override any subset of the
/// fields, and a few environment variables override the file:
///
/// | Variable              | Field          |
/// |-----------------------|----------------|
/// | `HOST`                | `host`         |
/// | `PORT`                | `port`         |
/// | `DASHBOARD_API_BASE`  | `api_base`     |
/// | `DASHBOARD_DATA_DIR`  | `data_dir`     |
/// | `DASHBOARD_PAGE_SIZE` | `page_size`    |

use crate::aggregate::DEFAULT_FALLBACK_LABEL;
use crate::chart::DEFAULT_MAX_ENTRIES;
use crate::engine::DEFAULT_PAGE_SIZE;
use crate::error::{Error, Result};
use crate::resource::DEFAULT_API_BASE;
use crate::sections::DEFAULT_STORAGE_KEY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub fallback_label: String,
    pub max_chart_entries: usize,
    pub api_base: String,
    pub storage_key: String,
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            page_size: DEFAULT_PAGE_SIZE,
            page_size_options: vec![5, 10, 25, 50, 100],
            fallback_label: DEFAULT_FALLBACK_LABEL.to_string(),
            max_chart_entries: DEFAULT_MAX_ENTRIES,
            api_base: DEFAULT_API_BASE.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("data"),
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("{} must be a number, got '{}'", name, raw)))
}

impl DashboardConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: DashboardConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with process environment overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies overrides from `lookup` (variable name to value).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_var("PORT", &port)?;
        }
        if let Some(base) = lookup("DASHBOARD_API_BASE") {
            self.api_base = base;
        }
        if let Some(dir) = lookup("DASHBOARD_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup("DASHBOARD_PAGE_SIZE") {
            self.page_size = parse_var("DASHBOARD_PAGE_SIZE", &size)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::InvalidConfig("page_size must be at least 1".to_string()));
        }
        if self.page_size_options.iter().any(|&n| n == 0) {
            return Err(Error::InvalidConfig("page_size_options must not contain 0".to_string()));
        }
        if self.api_base.trim().is_empty() {
            return Err(Error::InvalidConfig("api_base must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    /// Location of the JSON dump served for a resource.
    pub fn dataset_path(&self, resource: crate::resource::Resource) -> PathBuf {
        self.data_dir.join(format!("{}.json", resource.path()))
    }
}
