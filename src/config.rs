use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::storage::ensure_parent_dir;

pub const DEFAULT_CONFIG_PATH: &str = "config/client.json";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_WS_URL: &str = "ws://localhost:8001";
pub const DEFAULT_SESSION_DB: &str = "data/session.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub ws_base_url: String,
    pub session_db_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            ws_base_url: DEFAULT_WS_URL.to_string(),
            session_db_path: DEFAULT_SESSION_DB.to_string(),
        }
    }
}

impl AppConfig {
    /// Values given on the command line (or through the matching env vars)
    /// win over the file.
    pub fn with_overrides(
        mut self,
        api_base_url: Option<String>,
        ws_base_url: Option<String>,
        session_db_path: Option<String>,
    ) -> Self {
        if let Some(url) = api_base_url {
            self.api_base_url = url;
        }
        if let Some(url) = ws_base_url {
            self.ws_base_url = url;
        }
        if let Some(path) = session_db_path {
            self.session_db_path = path;
        }
        self
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::info!(
                "Config file {} not found; writing defaults",
                path.display()
            );
            let config = AppConfig::default();
            if let Err(err) = save_config(path, &config) {
                log::warn!("Unable to create {}: {err}", path.display());
            }
            config
        }
        Err(err) => {
            log::warn!(
                "Failed to read config file {} ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &AppConfig) -> std::io::Result<()> {
    ensure_parent_dir(&path)?;
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}
