//! Host configuration for the router itself — log level and REPL
//! behavior. Application business configuration is out of scope; this
//! covers only what the core and its demo host need.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub log_level: String,
    pub repl: ReplConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    pub history_path: Option<PathBuf>,
    pub max_history_entries: usize,
    pub prompt: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
            repl: ReplConfig::default(),
        }
    }
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            history_path: dirs::data_dir().map(|d| d.join("routeforge").join("history.txt")),
            max_history_entries: 1000,
            prompt: "routeforge> ".into(),
        }
    }
}

impl RouterConfig {
    /// Loads from `path` if given, else `$XDG_CONFIG_HOME/routeforge/config.toml`
    /// (or its platform equivalent). Falls back to `Default` on any error —
    /// a missing or malformed config file is never fatal.
    pub fn load(path: Option<&Path>) -> Self {
        let config_path = path.map(PathBuf::from).unwrap_or_else(|| {
            dirs::config_dir()
                .map(|d| d.join("routeforge").join("config.toml"))
                .unwrap_or_else(|| PathBuf::from("routeforge.toml"))
        });

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!(path = %config_path.display(), "loaded router config");
                    config
                }
                Err(err) => {
                    tracing::warn!(path = %config_path.display(), %err, "failed to parse router config, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!(path = %config_path.display(), %err, "failed to read router config, using defaults");
                Self::default()
            }
        }
    }
}
