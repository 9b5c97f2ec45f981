//! HTTP routes of the accounts slice.

use crate::{Accounts, RegisterUser};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use fhub_kernel::domain::models::{User, WarehouseAddress};
use fhub_kernel::security::Actor;
use fhub_kernel::server::{ApiError, ApiState, Payload};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/accounts", post(register))
        .route("/accounts/{id}", get(account))
        .route("/accounts/{id}/warehouse-address", get(warehouse_address))
}

async fn register(
    State(state): State<ApiState>,
    actor: Option<Actor>,
    Payload(req): Payload<RegisterUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let accounts = state.try_get_slice::<Accounts>()?;
    let user = accounts.register(actor.as_ref(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn account(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.try_get_slice::<Accounts>()?.get(&actor, &id).await?))
}

async fn warehouse_address(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<WarehouseAddress>, ApiError> {
    Ok(Json(state.try_get_slice::<Accounts>()?.warehouse_address(&actor, &id).await?))
}
