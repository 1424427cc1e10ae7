use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use revbot_monitor::response_templates::ResponseTemplates;
use revbot_runtime::MonitorRuntimeConfig;

fn default_base_url() -> String {
    "http://localhost".to_string()
}

fn default_model_id() -> String {
    "gpt-5-mini".to_string()
}

fn default_interval() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
/// On-disk monitor configuration (`config.json`).
pub struct MonitorFileConfig {
    pub project_id: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default)]
    pub additional_note: String,
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
    #[serde(default)]
    pub require_like_project: bool,
    #[serde(default)]
    pub require_tip_credit: bool,
    #[serde(default)]
    pub minimum_tip_amount: i64,
    pub auto_response_prefix: String,
    pub auto_response_create_revision: String,
    pub auto_response_require_likes: String,
    pub auto_response_require_tip: String,
    #[serde(default = "default_interval")]
    pub interval: u64,
}

/// Load and validate the monitor configuration file.
pub fn load_monitor_config(path: &Path) -> Result<MonitorFileConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: MonitorFileConfig = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    if config.project_id.trim().is_empty() {
        bail!("project_id must not be empty in {}", path.display());
    }
    Ok(config)
}

impl MonitorFileConfig {
    /// Convert the file configuration into the runtime configuration,
    /// assembling response templates and applying CLI overrides.
    pub fn into_runtime_config(
        self,
        poll_interval_override: Option<u64>,
        poll_once: bool,
        request_timeout_ms: u64,
    ) -> Result<MonitorRuntimeConfig> {
        let templates = ResponseTemplates::assemble(
            &self.auto_response_prefix,
            &self.auto_response_create_revision,
            &self.auto_response_require_likes,
            &self.auto_response_require_tip,
            self.minimum_tip_amount,
        )?;
        Ok(MonitorRuntimeConfig {
            project_id: self.project_id,
            base_url: self.base_url,
            model_id: self.model_id,
            additional_note: self.additional_note,
            initial_cookies: self.cookies.into_iter().collect(),
            require_like_project: self.require_like_project,
            require_tip_credit: self.require_tip_credit,
            minimum_tip_amount: self.minimum_tip_amount,
            templates,
            poll_interval: Duration::from_secs(poll_interval_override.unwrap_or(self.interval)),
            poll_once,
            request_timeout_ms,
        })
    }
}
