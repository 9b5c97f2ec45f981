use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use fhub::domain::security::Role;
use fhub::features::settings::AppSettings;
use fhub::features::settings::server::client_ip;
use fhub::kernel::server::{ACTOR_ROLE_HEADER, ApiError, ApiState};
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Routes that stay reachable while maintenance mode is on.
const MAINTENANCE_EXEMPT: &[&str] = &["/health", "/settings"];

/// Full application router: system routes plus every feature slice.
#[allow(unreachable_pub)]
pub fn init(state: ApiState) -> Router {
    Router::new()
        .merge(fhub::server::router::system_router())
        .merge(fhub::server::router())
        .layer(middleware::from_fn_with_state(state.clone(), maintenance_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn is_admin(request: &Request) -> bool {
    request
        .headers()
        .get(ACTOR_ROLE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<Role>().ok())
        == Some(Role::Admin)
}

async fn maintenance_gate(
    State(state): State<ApiState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    let exempt = MAINTENANCE_EXEMPT.iter().any(|prefix| path.starts_with(prefix));
    if exempt || is_admin(&request) {
        return next.run(request).await;
    }

    let Some(settings) = state.get_slice::<AppSettings>() else {
        return next.run(request).await;
    };
    let ip = client_ip(request.headers()).map(ToOwned::to_owned);
    match settings.check_maintenance(ip.as_deref()).await {
        Ok(Some(notice)) => {
            debug!(path, "Request refused during maintenance");
            (StatusCode::SERVICE_UNAVAILABLE, Json(notice)).into_response()
        },
        Ok(None) => next.run(request).await,
        Err(err) => ApiError::from(err).into_response(),
    }
}
