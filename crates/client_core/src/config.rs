use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use reqwest::Client;
use thiserror::Error;
use url::Url;

pub const CONFIG_FILE: &str = "profile.toml";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub server_url: String,
    pub session_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".into(),
            session_path: PathBuf::from("./data/session.json"),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

impl ClientSettings {
    pub fn server_url(&self) -> Result<Url, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidServerUrl {
            url: self.server_url.clone(),
            reason,
        };
        let url = Url::parse(self.server_url.trim()).map_err(|err| invalid(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        Ok(url)
    }

    pub fn http_client(&self) -> Result<Client, ConfigError> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()?)
    }
}

/// Defaults, then `profile.toml` in the working directory, then environment.
pub fn load_settings() -> ClientSettings {
    let file_cfg = fs::read_to_string(CONFIG_FILE)
        .ok()
        .and_then(|raw| toml::from_str::<HashMap<String, toml::Value>>(&raw).ok())
        .unwrap_or_default();
    let env: HashMap<String, String> = std::env::vars().collect();
    resolve_settings(&file_cfg, &env)
}

fn resolve_settings(
    file_cfg: &HashMap<String, toml::Value>,
    env: &HashMap<String, String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(v) = file_cfg.get("server_url").and_then(toml::Value::as_str) {
        settings.server_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("session_path").and_then(toml::Value::as_str) {
        settings.session_path = PathBuf::from(v);
    }
    if let Some(v) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.request_timeout_secs = v;
    }

    if let Some(v) = env.get("PROFILE_SERVER_URL") {
        settings.server_url = v.clone();
    }
    if let Some(v) = env.get("APP__SERVER_URL") {
        settings.server_url = v.clone();
    }

    if let Some(v) = env.get("PROFILE_SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }
    if let Some(v) = env.get("APP__SESSION_PATH") {
        settings.session_path = PathBuf::from(v);
    }

    if let Some(parsed) = env
        .get("APP__REQUEST_TIMEOUT_SECS")
        .and_then(|v| v.parse::<u64>().ok())
    {
        settings.request_timeout_secs = parsed;
    }

    settings
}
