use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use shared::protocol::DEFAULT_PORT;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    /// Relay every message back to its sender as well as the other clients.
    pub echo_to_sender: bool,
    pub static_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: format!("0.0.0.0:{DEFAULT_PORT}"),
            echo_to_sender: false,
            static_dir: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    echo_to_sender: Option<bool>,
    static_dir: Option<String>,
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new("server.toml"), |key| std::env::var(key).ok())
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.server_bind = v;
                }
                if let Some(v) = file_cfg.echo_to_sender {
                    settings.echo_to_sender = v;
                }
                if let Some(v) = file_cfg.static_dir {
                    settings.static_dir = non_empty_path(&v);
                }
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring malformed server config file");
            }
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__ECHO_TO_SENDER") {
        match parse_flag(&v) {
            Some(flag) => settings.echo_to_sender = flag,
            None => warn!(value = %v, "ignoring unrecognised APP__ECHO_TO_SENDER value"),
        }
    }

    if let Some(v) = env("APP__STATIC_DIR") {
        settings.static_dir = non_empty_path(&v);
    }

    settings
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn non_empty_path(raw: &str) -> Option<PathBuf> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| PathBuf::from(raw))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
