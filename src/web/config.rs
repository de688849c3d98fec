use std::fs;

use serde::{Deserialize, Serialize};

use crate::log_warn;

pub const DEFAULT_MODEL_ID: &str = "google/medgemma-4b-it";
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8090";
pub const DEFAULT_PORT: u16 = 7860;

const CONFIG_PATH: &str = "assets/config.json";

/// Web app configuration, loaded once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistConfig {
    /// Hub id of the multimodal model the provider backend should load.
    pub model_id: String,
    /// Base URL of the provider inference backend.
    pub backend_url: String,
    /// Port the web UI binds to.
    pub port: u16,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl AssistConfig {
    /// Load configuration from assets/config.json, falling back to defaults
    /// when the file is missing or unparseable.
    pub fn load() -> Self {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<AssistConfig>(&content) {
                Ok(config) => config,
                Err(e) => {
                    log_warn!("Failed to parse {}: {}, using defaults", path, e);
                    AssistConfig::default()
                }
            },
            // Config file doesn't exist, use defaults
            Err(_) => AssistConfig::default(),
        }
    }
}
