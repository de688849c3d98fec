// Diagnostic assistant web demo: adaptive-precision model loading plus a
// single-page form UI over one analyze endpoint.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};

use med_assist::web::config::AssistConfig;
use med_assist::web::engine::{mark_loaded, EngineState, VisionBackend};
use med_assist::web::models::{AppState, SharedAppState};
use med_assist::web::precision::{detect_total_vram_gb, select_load_policy};
use med_assist::web::response_helpers::{cors_preflight, json_error};
use med_assist::web::routes;
use med_assist::{log_error, log_info};

#[cfg(not(feature = "mock"))]
use med_assist::web::engine::HttpVisionBackend;
#[cfg(feature = "mock")]
use med_assist::web::engine_mock::MockVisionBackend;

async fn route(
    req: Request<Body>,
    state: SharedAppState,
) -> Result<Response<Body>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/") => routes::static_files::handle_index().await,
        (&Method::GET, "/health") => routes::health::handle().await,
        (&Method::GET, "/api/status") => routes::status::handle(state).await,
        (&Method::POST, "/api/analyze") => routes::analyze::handle(req, state).await,
        (&Method::OPTIONS, _) => Ok(cors_preflight()),
        _ => Ok(json_error(StatusCode::NOT_FOUND, "Not found")),
    }
}

#[tokio::main]
async fn main() {
    let config = AssistConfig::load();
    println!("Starting diagnostic assistant demo for {}", config.model_id);

    // Derived once per process; immutable afterwards
    let policy = select_load_policy(detect_total_vram_gb());
    println!("Loading in {}", policy.describe());

    #[cfg(not(feature = "mock"))]
    let backend: Arc<dyn VisionBackend> = Arc::new(HttpVisionBackend::from_config(&config));
    #[cfg(feature = "mock")]
    let backend: Arc<dyn VisionBackend> = Arc::new(MockVisionBackend::default());

    println!("Loading {}... (this may take a while)", config.model_id);
    if let Err(e) = backend.load(&policy) {
        // Fatal: no automatic fallback to a lower-precision mode
        println!("ERROR loading model: {e}");
        log_error!("Model load failed: {}", e);
        std::process::exit(1);
    }

    let engine = EngineState::new(policy, config.model_id.clone());
    mark_loaded(&engine);
    println!("Model loaded!");

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state: SharedAppState = Arc::new(AppState {
        backend,
        engine,
        config,
    });

    let make_svc = make_service_fn(move |_conn| {
        let state = state.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| route(req, state.clone())))
        }
    });

    println!("Launching application on http://{addr}");
    log_info!("Web server listening on {}", addr);

    if let Err(e) = Server::bind(&addr).serve(make_svc).await {
        println!("Server error: {e}");
        log_error!("Server error: {}", e);
        std::process::exit(1);
    }
}
