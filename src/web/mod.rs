// Web server modules for the diagnostic assistant demo

pub mod config;
pub mod engine;
#[cfg(any(test, feature = "mock"))]
pub mod engine_mock;
pub mod inference;
pub mod models;
pub mod precision;
pub mod request_parsing;
pub mod response_helpers;
pub mod routes;
