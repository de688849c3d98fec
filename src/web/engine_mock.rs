// Mock inference backend for unit tests and E2E runs without a provider
// server (enable with --features mock).

use std::sync::Mutex;

use super::engine::{EngineError, GenerateRequest, VisionBackend};
use super::precision::LoadPolicy;

pub struct MockVisionBackend {
    pub reply: String,
    pub fail_generate: Option<String>,
    calls: Mutex<Vec<GenerateRequest>>,
    loads: Mutex<Vec<LoadPolicy>>,
}

impl Default for MockVisionBackend {
    fn default() -> Self {
        Self {
            reply: "The image shows no acute abnormality. (mock backend)".to_string(),
            fail_generate: None,
            calls: Mutex::new(Vec::new()),
            loads: Mutex::new(Vec::new()),
        }
    }
}

impl MockVisionBackend {
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_generate: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn generate_calls(&self) -> Vec<GenerateRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn load_calls(&self) -> Vec<LoadPolicy> {
        self.loads.lock().unwrap().clone()
    }
}

impl VisionBackend for MockVisionBackend {
    fn load(&self, policy: &LoadPolicy) -> Result<(), EngineError> {
        self.loads.lock().unwrap().push(*policy);
        Ok(())
    }

    fn generate(&self, req: &GenerateRequest) -> Result<String, EngineError> {
        self.calls.lock().unwrap().push(req.clone());
        match &self.fail_generate {
            Some(message) => Err(EngineError::Backend(message.clone())),
            None => Ok(self.reply.clone()),
        }
    }
}
