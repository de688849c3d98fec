use std::fs;

use serde::{Deserialize, Serialize};

use crate::log_warn;

pub const DEFAULT_INPUT_FILE: &str = "house2.fbx";
pub const DEFAULT_OUTPUT_FILE: &str = "converted_house2.glb";
pub const DEFAULT_TOOL_BIN: &str = "blender";
pub const DEFAULT_DRIVER_SCRIPT: &str = "assets/convert_job.py";

const CONFIG_PATH: &str = "assets/convert.json";

/// Converter configuration. There are no CLI flags; the job is fixed at
/// startup from this file (or the compiled defaults).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    pub input_file: String,
    pub output_file: String,
    /// External content tool binary driven in background mode.
    pub tool_bin: String,
    /// Driver script handed to the tool together with the job file.
    pub driver_script: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input_file: DEFAULT_INPUT_FILE.to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            tool_bin: DEFAULT_TOOL_BIN.to_string(),
            driver_script: DEFAULT_DRIVER_SCRIPT.to_string(),
        }
    }
}

impl ConvertConfig {
    pub fn load() -> Self {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from(path: &str) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<ConvertConfig>(&content) {
                Ok(config) => config,
                Err(e) => {
                    log_warn!("Failed to parse {}: {}, using defaults", path, e);
                    ConvertConfig::default()
                }
            },
            Err(_) => ConvertConfig::default(),
        }
    }
}
