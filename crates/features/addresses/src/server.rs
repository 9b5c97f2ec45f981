//! HTTP routes of the addresses slice.

use crate::{AddressInput, Addresses};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use fhub_kernel::domain::models::Address;
use fhub_kernel::security::Actor;
use fhub_kernel::server::{ApiError, ApiState, Payload};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/addresses", get(list).post(create))
        .route("/addresses/warehouses", get(warehouses))
        .route("/addresses/offices", get(offices))
        .route("/addresses/{id}", put(update).patch(update).delete(delete))
}

async fn list(
    State(state): State<ApiState>,
    actor: Actor,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(state.try_get_slice::<Addresses>()?.list(&actor).await?))
}

async fn warehouses(
    State(state): State<ApiState>,
    actor: Actor,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(state.try_get_slice::<Addresses>()?.warehouses(&actor).await?))
}

async fn offices(
    State(state): State<ApiState>,
    actor: Actor,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(state.try_get_slice::<Addresses>()?.offices(&actor).await?))
}

async fn create(
    State(state): State<ApiState>,
    actor: Actor,
    Payload(input): Payload<AddressInput>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    let address = state.try_get_slice::<Addresses>()?.create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

async fn update(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
    Payload(input): Payload<AddressInput>,
) -> Result<Json<Address>, ApiError> {
    Ok(Json(state.try_get_slice::<Addresses>()?.update(&actor, &id, input).await?))
}

async fn delete(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.try_get_slice::<Addresses>()?.delete(&actor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
