// Request parsing utilities for HTTP requests

use hyper::{Body, Request, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::response_helpers::json_error;
use crate::log_error;

/// Parse request body as JSON.
/// Returns the deserialized value or a ready-to-send error response.
pub async fn parse_json_body<T: DeserializeOwned>(
    req: Request<Body>,
) -> Result<T, Response<Body>> {
    let body_bytes = match hyper::body::to_bytes(req.into_body()).await {
        Ok(bytes) => bytes,
        Err(e) => {
            log_error!("Failed to read request body: {}", e);
            return Err(json_error(
                StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ));
        }
    };

    match serde_json::from_slice(&body_bytes) {
        Ok(value) => Ok(value),
        Err(e) => {
            log_error!("JSON parsing error: {}", e);
            Err(json_error(StatusCode::BAD_REQUEST, "Invalid JSON format"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::models::AnalyzeRequest;

    fn post(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_full_analyze_request_parses() {
        let req = post(r#"{"image_base64":"aGVsbG8=","question":"Findings?"}"#);
        let parsed: AnalyzeRequest = parse_json_body(req).await.unwrap();
        assert_eq!(parsed.image_base64.as_deref(), Some("aGVsbG8="));
        assert_eq!(parsed.question, "Findings?");
    }

    #[tokio::test]
    async fn test_omitted_question_defaults_to_empty() {
        let req = post(r#"{"image_base64":"aGVsbG8="}"#);
        let parsed: AnalyzeRequest = parse_json_body(req).await.unwrap();
        assert_eq!(parsed.question, "");
    }

    #[tokio::test]
    async fn test_omitted_image_parses_as_none() {
        let req = post(r#"{"question":"What is this?"}"#);
        let parsed: AnalyzeRequest = parse_json_body(req).await.unwrap();
        assert!(parsed.image_base64.is_none());
    }

    #[tokio::test]
    async fn test_invalid_json_yields_bad_request() {
        let req = post("not json at all");
        let err = parse_json_body::<AnalyzeRequest>(req).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
