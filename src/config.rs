use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ForwardError;

pub const DEFAULT_CONFIG_PATH: &str = "/usr/lib/zabbix/alertscripts/google_chat.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ZabbixConfig {
    /// Base URL of the Zabbix frontend, used for event deep links.
    pub host: String,
    /// JSON file holding the trigger -> thread mapping.
    pub datafile: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CardImages {
    pub problem: String,
    pub resolved: String,
    pub acknowledged: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub zabbix: ZabbixConfig,
    #[serde(default)]
    pub chat: HashMap<String, String>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub images: CardImages,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ForwardError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ForwardError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ForwardError> {
        toml::from_str(contents).map_err(|e| ForwardError::Config(e.to_string()))
    }

    /// Resolves a webhook name from the `[chat]` table.
    pub fn webhook_url(&self, name: &str) -> Result<&str, ForwardError> {
        self.chat
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ForwardError::Config(format!("unknown webhook '{}'", name)))
    }

    pub fn zabbix_base_url(&self) -> &str {
        self.zabbix.host.trim_end_matches('/')
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

impl Default for CardImages {
    fn default() -> Self {
        Self {
            problem: "https://png.pngtree.com/svg/20161208/status_warning_336325.png".to_string(),
            resolved: "https://image.flaticon.com/icons/png/128/291/291201.png".to_string(),
            acknowledged: "https://static1.squarespace.com/static/549db876e4b05ce481ee4649/t/54a47a31e4b0375c08400709/1472574912591/form-3.png".to_string(),
        }
    }
}
