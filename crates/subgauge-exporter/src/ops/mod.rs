//! Operational HTTP endpoints.
//!
//! - `/`        : landing page linking to the metrics path
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 before the first snapshot and while draining)
//! - metrics path (default `/metrics`) : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::app_state::AppState;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let path = &state.cfg().exporter.metrics_path;
    Html(format!(
        "<html>\n<head><title>XUI Exporter</title></head>\n<body>\n<h1>XUI Exporter</h1>\n<p><a href=\"{path}\">Metrics</a></p>\n</body>\n</html>"
    ))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else if !state.is_ready() {
        (StatusCode::SERVICE_UNAVAILABLE, "no snapshot yet")
    } else {
        (StatusCode::OK, "ready")
    }
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.render_metrics();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}
