//! Inference backend seam.
//!
//! The model itself is an external collaborator: given an image and a prompt
//! it produces generated text. `HttpVisionBackend` talks to a provider server
//! over JSON; the mock in `engine_mock` stands in for tests and E2E runs.

use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use thiserror::Error;

use super::config::AssistConfig;
use super::models::ModelStatus;
use super::precision::LoadPolicy;
use crate::log_info;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("backend request failed: {0}")]
    Transport(String),
    #[error("backend returned error: {0}")]
    Backend(String),
    #[error("invalid image payload: {0}")]
    InvalidImage(String),
}

/// One (image, prompt) generation request. Created per submission, consumed
/// immediately, not retained.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub image: Vec<u8>,
    pub prompt: String,
    pub max_new_tokens: u32,
}

/// The opaque multimodal inference collaborator.
pub trait VisionBackend: Send + Sync {
    /// Instruct the backend to load the configured model with the given
    /// policy. Failure is fatal to the caller; no lower-precision retry is
    /// attempted here.
    fn load(&self, policy: &LoadPolicy) -> Result<(), EngineError>;

    /// Single-turn generation: greedy decoding, echoed prompt stripped by the
    /// provider, decoded text returned.
    fn generate(&self, req: &GenerateRequest) -> Result<String, EngineError>;
}

/// Per-process engine state behind a mutex, mirroring the single loaded model.
pub struct EngineState {
    pub policy: LoadPolicy,
    pub model_id: String,
    pub loaded: bool,
    pub last_used: SystemTime,
}

pub type SharedEngineState = Arc<Mutex<EngineState>>;

impl EngineState {
    pub fn new(policy: LoadPolicy, model_id: String) -> SharedEngineState {
        Arc::new(Mutex::new(EngineState {
            policy,
            model_id,
            loaded: false,
            last_used: SystemTime::now(),
        }))
    }
}

pub fn get_model_status(engine: &SharedEngineState) -> ModelStatus {
    // Handle poisoned mutex by recovering from panic
    let state = match engine.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };

    ModelStatus {
        loaded: state.loaded,
        model_id: Some(state.model_id.clone()),
        precision: Some(state.policy.mode.as_str().to_string()),
        last_used: state
            .last_used
            .duration_since(std::time::UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs().to_string()),
    }
}

pub fn mark_loaded(engine: &SharedEngineState) {
    let mut state = match engine.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    state.loaded = true;
    state.last_used = SystemTime::now();
}

pub fn touch(engine: &SharedEngineState) {
    let mut state = match engine.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    state.last_used = SystemTime::now();
}

/// Provider backend over HTTP. The hub credential is read from the HF_TOKEN
/// environment variable and forwarded as a bearer token; the provider decides
/// whether it is required.
pub struct HttpVisionBackend {
    base_url: String,
    model_id: String,
    token: Option<String>,
}

impl HttpVisionBackend {
    pub fn from_config(config: &AssistConfig) -> Self {
        let token = std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty());
        if token.is_none() {
            log_info!("HF_TOKEN not set, contacting backend without credentials");
        }
        Self {
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            token,
        }
    }

    fn post_json(&self, path: &str, body: &serde_json::Value) -> Result<String, EngineError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = ureq::post(&url).set("content-type", "application/json");
        if let Some(ref token) = self.token {
            request = request.set("authorization", &format!("Bearer {token}"));
        }

        match request.send_string(&body.to_string()) {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| EngineError::Transport(format!("failed to read response: {e}"))),
            Err(ureq::Error::Status(code, resp)) => {
                let detail = resp.into_string().unwrap_or_default();
                Err(EngineError::Backend(format!("HTTP {code}: {detail}")))
            }
            Err(e) => Err(EngineError::Transport(e.to_string())),
        }
    }
}

impl VisionBackend for HttpVisionBackend {
    fn load(&self, policy: &LoadPolicy) -> Result<(), EngineError> {
        let mut body = serde_json::json!({
            "model_id": self.model_id,
            "precision": policy.mode.as_str(),
            "device_map": policy.placement.as_str(),
        });
        if let Some(dtype) = policy.mode.compute_dtype() {
            body["compute_dtype"] = serde_json::Value::String(dtype.to_string());
        }

        log_info!("Loading {} via {}", self.model_id, self.base_url);
        self.post_json("/api/model/load", &body)?;
        log_info!("Model loaded ({})", policy.describe());
        Ok(())
    }

    fn generate(&self, req: &GenerateRequest) -> Result<String, EngineError> {
        let body = serde_json::json!({
            "model_id": self.model_id,
            "prompt": req.prompt,
            "image_base64": BASE64.encode(&req.image),
            "max_new_tokens": req.max_new_tokens,
            "do_sample": false,
            "strip_prompt": true,
        });

        let raw = self.post_json("/api/generate", &body)?;
        let parsed: serde_json::Value = serde_json::from_str(&raw)
            .map_err(|e| EngineError::Backend(format!("unparseable response: {e}")))?;

        match parsed.get("text").and_then(|t| t.as_str()) {
            Some(text) => Ok(text.to_string()),
            None => Err(EngineError::Backend(format!(
                "response missing text field: {raw}"
            ))),
        }
    }
}
