//! Inference adapter: shapes one (image, question) submission into a backend
//! generation request and returns the decoded text.

use super::engine::{EngineError, GenerateRequest, VisionBackend};
use crate::log_info;

/// Returned without touching the backend when no image was uploaded.
pub const NO_IMAGE_WARNING: &str =
    "Please upload a medical image (X-ray, CT scan, skin lesion, etc) to analyze.";

/// Substituted when the question is blank or whitespace-only.
pub const DEFAULT_PROMPT: &str = "Describe this medical image in detail.";

/// Fixed output budget, greedy decoding.
pub const MAX_NEW_TOKENS: u32 = 250;

/// Analyze one case. Backend failures propagate to the caller; no partial or
/// substituted output.
pub fn analyze(
    backend: &dyn VisionBackend,
    image: Option<&[u8]>,
    question: &str,
) -> Result<String, EngineError> {
    let image = match image {
        Some(bytes) => bytes,
        None => return Ok(NO_IMAGE_WARNING.to_string()),
    };

    // Uploads arrive as raw bytes; reject anything the backend could not decode
    image::load_from_memory(image)
        .map_err(|e| EngineError::InvalidImage(e.to_string()))?;

    let question = question.trim();
    let prompt = if question.is_empty() {
        DEFAULT_PROMPT
    } else {
        question
    };

    log_info!("Processing: {}", prompt);

    backend.generate(&GenerateRequest {
        image: image.to_vec(),
        prompt: prompt.to_string(),
        max_new_tokens: MAX_NEW_TOKENS,
    })
}
