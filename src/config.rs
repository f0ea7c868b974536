use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable that overrides [`Config::host`].
pub const HOST_ENV: &str = "LUNAI_HOST";

/// Largest accepted `purgeMarginSecs` (one day).
pub const MAX_PURGE_MARGIN_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub name: String,
    #[serde(default)]
    pub current_project_id: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_purge_margin_secs")]
    pub purge_margin_secs: u64,
    #[serde(default = "default_root_marker")]
    pub root_marker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_host() -> String {
    "http://localhost:8000".to_string()
}
fn default_purge_margin_secs() -> u64 {
    10
}
fn default_root_marker() -> String {
    "docstore".to_string()
}

impl Config {
    /// Minimal config for a customer name, every other field defaulted.
    pub fn for_customer(name: &str) -> Self {
        Self {
            name: name.to_string(),
            current_project_id: String::new(),
            host: default_host(),
            purge_margin_secs: default_purge_margin_secs(),
            root_marker: default_root_marker(),
            timeout_secs: None,
        }
    }

    /// The project selected by `create-project`, or an error telling the user
    /// how to select one.
    pub fn current_project_id(&self) -> Result<&str> {
        if self.current_project_id.is_empty() {
            bail!(
                "there is no project id in the config file. first create a project with `lunai create-project --help`"
            );
        }
        Ok(&self.current_project_id)
    }

    /// `purgeMarginSecs` as a signed duration, range-checked.
    pub fn purge_margin(&self) -> Result<chrono::Duration> {
        if self.purge_margin_secs == 0 || self.purge_margin_secs > MAX_PURGE_MARGIN_SECS {
            bail!(
                "config.purgeMarginSecs must be between 1 and {}, got {}",
                MAX_PURGE_MARGIN_SECS,
                self.purge_margin_secs
            );
        }
        let secs = i64::try_from(self.purge_margin_secs)
            .context("config.purgeMarginSecs does not fit a signed duration")?;
        chrono::Duration::try_seconds(secs)
            .with_context(|| format!("config.purgeMarginSecs out of range: {}", secs))
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    if let Ok(host) = std::env::var(HOST_ENV) {
        if !host.is_empty() {
            config.host = host;
        }
    }

    validate(&config)?;
    Ok(config)
}

/// Rewrite the config file with the current values.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content + "\n")
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(())
}

fn validate(config: &Config) -> Result<()> {
    if config.name.trim().is_empty() {
        bail!("config.name must not be empty");
    }

    let url = reqwest::Url::parse(&config.host)
        .with_context(|| format!("config.host is not a valid URL: '{}'", config.host))?;
    match url.scheme() {
        "http" | "https" => {}
        other => bail!(
            "config.host must use http or https, got '{}'",
            other
        ),
    }

    if config.root_marker.is_empty() {
        bail!("config.rootMarker must not be empty");
    }

    if config.timeout_secs == Some(0) {
        bail!("config.timeoutSecs must be > 0");
    }

    config.purge_margin()?;

    Ok(())
}
