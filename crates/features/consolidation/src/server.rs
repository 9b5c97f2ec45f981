//! HTTP routes of the consolidation slice.

use crate::{AddPackage, Consolidations, CreateConsolidation};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use fhub_kernel::domain::models::Consolidation;
use fhub_kernel::security::Actor;
use fhub_kernel::server::{ApiError, ApiState, Payload};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/consolidations", get(list).post(create))
        .route("/consolidations/{id}", get(consolidation).delete(dissolve))
        .route("/consolidations/{id}/packages", post(add_package))
        .route("/consolidations/{id}/packages/{package_id}", delete(remove_package))
}

async fn list(
    State(state): State<ApiState>,
    actor: Actor,
) -> Result<Json<Vec<Consolidation>>, ApiError> {
    Ok(Json(state.try_get_slice::<Consolidations>()?.list(&actor).await?))
}

async fn create(
    State(state): State<ApiState>,
    actor: Actor,
    Payload(req): Payload<CreateConsolidation>,
) -> Result<(StatusCode, Json<Consolidation>), ApiError> {
    let consolidation = state.try_get_slice::<Consolidations>()?.create(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(consolidation)))
}

async fn consolidation(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Consolidation>, ApiError> {
    Ok(Json(state.try_get_slice::<Consolidations>()?.get(&actor, &id).await?))
}

async fn dissolve(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Consolidation>, ApiError> {
    Ok(Json(state.try_get_slice::<Consolidations>()?.delete(&actor, &id).await?))
}

async fn add_package(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
    Payload(req): Payload<AddPackage>,
) -> Result<Json<Consolidation>, ApiError> {
    Ok(Json(state.try_get_slice::<Consolidations>()?.add_package(&actor, &id, req).await?))
}

async fn remove_package(
    State(state): State<ApiState>,
    actor: Actor,
    Path((id, package_id)): Path<(String, String)>,
) -> Result<Json<Consolidation>, ApiError> {
    let slice = state.try_get_slice::<Consolidations>()?;
    Ok(Json(slice.remove_package(&actor, &id, &package_id).await?))
}
