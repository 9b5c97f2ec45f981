use axum::http::header;
use axum::{Json, response::IntoResponse};
use fhub_derive::api_model;
use std::sync::LazyLock;
use std::time::Instant;

static STARTED: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Liveness probe body.
#[api_model(response)]
struct Health {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
}

/// Always `200` while the process serves requests.
pub(super) async fn health_handler() -> impl IntoResponse {
    let body = Health {
        status: "up",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: STARTED.elapsed().as_secs(),
    };
    ([(header::CACHE_CONTROL, "no-store")], Json(body))
}
