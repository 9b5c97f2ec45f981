//! HTTP routes of the shipments slice.

use crate::{AdvanceShipment, CreateShipment, Shipments};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use fhub_kernel::domain::models::Shipment;
use fhub_kernel::security::Actor;
use fhub_kernel::server::{ApiError, ApiState, Payload};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/shipments", get(list).post(create))
        .route("/shipments/{id}", get(shipment))
        .route("/shipments/{id}/advance", post(advance))
        .route("/shipments/{id}/cancel", post(cancel))
}

async fn list(
    State(state): State<ApiState>,
    actor: Actor,
) -> Result<Json<Vec<Shipment>>, ApiError> {
    Ok(Json(state.try_get_slice::<Shipments>()?.list(&actor).await?))
}

async fn create(
    State(state): State<ApiState>,
    actor: Actor,
    Payload(req): Payload<CreateShipment>,
) -> Result<(StatusCode, Json<Shipment>), ApiError> {
    let shipment = state.try_get_slice::<Shipments>()?.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

async fn shipment(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Shipment>, ApiError> {
    Ok(Json(state.try_get_slice::<Shipments>()?.get(&actor, &id).await?))
}

async fn advance(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
    Payload(req): Payload<AdvanceShipment>,
) -> Result<Json<Shipment>, ApiError> {
    Ok(Json(state.try_get_slice::<Shipments>()?.advance(&actor, &id, req).await?))
}

async fn cancel(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Shipment>, ApiError> {
    Ok(Json(state.try_get_slice::<Shipments>()?.cancel(&actor, &id).await?))
}
