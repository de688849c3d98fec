/// Analyze route handler.
///
/// POST /api/analyze  { image_base64, question }
/// Runs one blocking inference call per request; no queueing or admission
/// control in front of the backend.

use std::convert::Infallible;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hyper::{Body, Request, Response, StatusCode};
use tokio::task::spawn_blocking;
use uuid::Uuid;

use crate::web::engine::{touch, EngineError};
use crate::web::inference::analyze;
use crate::web::models::{AnalyzeRequest, AnalyzeResponse, SharedAppState};
use crate::web::request_parsing::parse_json_body;
use crate::web::response_helpers::{json_error, json_response};
use crate::{log_error, log_info};

pub async fn handle(
    req: Request<Body>,
    state: SharedAppState,
) -> Result<Response<Body>, Infallible> {
    // Id assigned before any parsing so rejected requests are correlatable too
    let request_id = Uuid::new_v4();
    log_info!("[{}] analyze request received", request_id);

    let request: AnalyzeRequest = match parse_json_body(req).await {
        Ok(r) => r,
        Err(resp) => {
            log_error!("[{}] request body rejected", request_id);
            return Ok(resp);
        }
    };

    let image = match request.image_base64 {
        Some(encoded) => match BASE64.decode(encoded.as_bytes()) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log_error!("[{}] invalid base64 image: {}", request_id, e);
                return Ok(json_error(
                    StatusCode::BAD_REQUEST,
                    &format!("Invalid base64 image: {e}"),
                ))
            }
        },
        None => None,
    };

    let backend = state.backend.clone();
    let question = request.question;
    let result =
        spawn_blocking(move || analyze(backend.as_ref(), image.as_deref(), &question)).await;

    touch(&state.engine);

    match result {
        Ok(Ok(answer)) => {
            log_info!("[{}] analyze request complete", request_id);
            Ok(json_response(StatusCode::OK, &AnalyzeResponse { answer }))
        }
        Ok(Err(EngineError::InvalidImage(e))) => {
            log_error!("[{}] invalid image: {}", request_id, e);
            Ok(json_error(
                StatusCode::BAD_REQUEST,
                &format!("Invalid image: {e}"),
            ))
        }
        Ok(Err(e)) => {
            log_error!("[{}] inference failed: {}", request_id, e);
            Ok(json_error(StatusCode::BAD_GATEWAY, &e.to_string()))
        }
        Err(e) => {
            log_error!("[{}] inference task panicked: {}", request_id, e);
            Ok(json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Inference task failed",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::web::config::AssistConfig;
    use crate::web::engine::EngineState;
    use crate::web::engine_mock::MockVisionBackend;
    use crate::web::inference::NO_IMAGE_WARNING;
    use crate::web::models::AppState;
    use crate::web::precision::{DevicePlacement, LoadPolicy, PrecisionMode};

    fn test_state(backend: MockVisionBackend) -> SharedAppState {
        let policy = LoadPolicy {
            mode: PrecisionMode::Float16,
            placement: DevicePlacement::AutoAccelerator,
        };
        Arc::new(AppState {
            backend: Arc::new(backend),
            engine: EngineState::new(policy, "test/model".to_string()),
            config: AssistConfig::default(),
        })
    }

    fn post(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .body(Body::from(body))
            .unwrap()
    }

    fn tiny_png_base64() -> String {
        let mut buf = Vec::new();
        let img = image::RgbImage::new(1, 1);
        image::DynamicImage::ImageRgb8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut buf),
                image::ImageFormat::Png,
            )
            .unwrap();
        BASE64.encode(buf)
    }

    async fn body_json(resp: Response<Body>) -> serde_json::Value {
        let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_analyze_returns_backend_answer() {
        let state = test_state(MockVisionBackend::with_reply("No acute findings."));
        let body = format!(
            r#"{{"image_base64":"{}","question":"Findings?"}}"#,
            tiny_png_base64()
        );

        let resp = handle(post(body), state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["answer"], "No acute findings.");
    }

    #[tokio::test]
    async fn test_missing_image_returns_warning() {
        let state = test_state(MockVisionBackend::default());
        let resp = handle(post(r#"{"question":"Findings?"}"#.to_string()), state)
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["answer"], NO_IMAGE_WARNING);
    }

    #[tokio::test]
    async fn test_invalid_base64_is_rejected() {
        let state = test_state(MockVisionBackend::default());
        let resp = handle(
            post(r#"{"image_base64":"%%% not base64 %%%"}"#.to_string()),
            state,
        )
        .await
        .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let state = test_state(MockVisionBackend::default());
        let resp = handle(post("not json".to_string()), state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_backend_failure_maps_to_bad_gateway() {
        let state = test_state(MockVisionBackend::failing("provider unavailable"));
        let body = format!(r#"{{"image_base64":"{}"}}"#, tiny_png_base64());

        let resp = handle(post(body), state).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
