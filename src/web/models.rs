// Shared request/response types for the web server

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::config::AssistConfig;
use super::engine::{SharedEngineState, VisionBackend};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Base64-encoded png/jpeg upload; None when the user submitted no image.
    pub image_base64: Option<String>,
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    pub loaded: bool,
    pub model_id: Option<String>,
    pub precision: Option<String>,
    pub last_used: Option<String>,
}

/// Process-wide application state shared across request handlers.
pub struct AppState {
    pub backend: Arc<dyn VisionBackend>,
    pub engine: SharedEngineState,
    pub config: AssistConfig,
}

pub type SharedAppState = Arc<AppState>;
