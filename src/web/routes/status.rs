// Model status route handler
//
// GET /api/status — loaded flag, model id, precision mode, last-used timestamp

use std::convert::Infallible;

use hyper::{Body, Response, StatusCode};

use crate::web::engine::get_model_status;
use crate::web::models::SharedAppState;
use crate::web::response_helpers::json_response;

pub async fn handle(state: SharedAppState) -> Result<Response<Body>, Infallible> {
    let status = get_model_status(&state.engine);
    Ok(json_response(StatusCode::OK, &status))
}
