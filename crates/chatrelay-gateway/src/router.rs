//! Axum router wiring.
//!
//! - `/ws`        : WebSocket upgrade
//! - `/upload`    : multipart attachment upload
//! - `/uploads/*` : stored attachments
//! - `/healthz`   : liveness
//! - fallback     : web client directory, when configured

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{app_state::AppState, ops, transport, upload};

pub fn build_router(state: AppState) -> Router {
    let cfg = state.cfg();
    let body_limit = cfg
        .uploads
        .max_file_bytes
        .saturating_add(upload::FORM_OVERHEAD_BYTES);

    let upload_route: Router<AppState> = Router::new()
        .route("/upload", post(upload::upload))
        .layer(DefaultBodyLimit::max(body_limit));

    let mut app: Router<AppState> = Router::new()
        .route("/ws", get(transport::ws::ws_upgrade))
        .route("/healthz", get(ops::healthz))
        .merge(upload_route)
        .nest_service(upload::UPLOAD_ROUTE, ServeDir::new(state.store().dir()));

    if let Some(dir) = &cfg.static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}
