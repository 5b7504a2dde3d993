use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

pub const GEMINI_API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const YOUTUBE_API_KEY_VAR: &str = "YT_API_KEY";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub gemini_model: String,
    pub gemini_endpoint: String,
    pub primary_lang: String,
    pub fallback_lang: String,
    pub max_transcript_chars: usize,
    pub words_per_minute: u32,
    pub upstream_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            gemini_model: "gemini-2.0-flash".to_string(),
            gemini_endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            primary_lang: "en".to_string(),
            fallback_lang: "hi".to_string(),
            max_transcript_chars: 4000,
            words_per_minute: 200,
            upstream_timeout_secs: None,
        }
    }
}

impl Config {
    /// Load config from the given path, or ~/.config/ytbrief/config.toml if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .wrap_err_with(|| format!("reading config {}", path.display()))?;
            let config: Config =
                toml::from_str(&content).wrap_err_with(|| format!("parsing config {}", path.display()))?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn upstream_timeout(&self) -> Option<Duration> {
        self.upstream_timeout_secs.map(Duration::from_secs)
    }
}

/// API keys are read from the environment only, never from the config file
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub gemini: Option<String>,
    pub youtube: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        Self {
            gemini: non_empty_var(GEMINI_API_KEY_VAR),
            youtube: non_empty_var(YOUTUBE_API_KEY_VAR),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytbrief")
        .join("config.toml")
}
