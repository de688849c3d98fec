// Static file serving route handlers

use std::convert::Infallible;

use hyper::{Body, Response, StatusCode};
use tokio::fs;

use crate::web::response_helpers::html_response;

pub async fn handle_index() -> Result<Response<Body>, Infallible> {
    // Serve the single-page form UI
    match fs::read_to_string("assets/index.html").await {
        Ok(content) => Ok(html_response(StatusCode::OK, content)),
        Err(_) => {
            // Fallback HTML if the asset isn't found
            let html = r#"<!DOCTYPE html>
<html>
<head><title>Diagnostic Assistant</title></head>
<body>
<h1>Diagnostic Assistant</h1>
<p>Web server is running, but assets/index.html was not found.</p>
<p>API endpoints:</p>
<ul>
<li>GET /health - Health check</li>
<li>GET /api/status - Model status</li>
<li>POST /api/analyze - Analyze an image</li>
</ul>
</body>
</html>"#;
            Ok(html_response(StatusCode::OK, html.to_string()))
        }
    }
}
