use std::{collections::HashMap, fs, path::PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub seed_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3000".into(),
            seed_path: None,
        }
    }
}

pub fn load_settings() -> Settings {
    let file_cfg = fs::read_to_string("server.toml")
        .ok()
        .and_then(|raw| toml::from_str::<HashMap<String, String>>(&raw).ok())
        .unwrap_or_default();
    let env: HashMap<String, String> = std::env::vars().collect();
    resolve_settings(&file_cfg, &env)
}

fn resolve_settings(
    file_cfg: &HashMap<String, String>,
    env: &HashMap<String, String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("seed_path") {
        settings.seed_path = Some(PathBuf::from(v));
    }

    if let Some(v) = env.get("SERVER_BIND") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = env.get("APP__BIND_ADDR") {
        settings.server_bind = v.clone();
    }

    if let Some(v) = env.get("SEED_PATH") {
        settings.seed_path = Some(PathBuf::from(v));
    }
    if let Some(v) = env.get("APP__SEED_PATH") {
        settings.seed_path = Some(PathBuf::from(v));
    }

    // An empty value switches seeding off.
    if settings
        .seed_path
        .as_ref()
        .is_some_and(|path| path.as_os_str().is_empty())
    {
        settings.seed_path = None;
    }

    settings
}
