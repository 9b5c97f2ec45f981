//! HTTP routes of the packages slice, plus the public tracking lookup.

use crate::{
    DeliverPackage, PackageDetails, Packages, ProcessPackage, PublicTracking, RegisterPackage,
    StatusUpdate,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use fhub_kernel::domain::models::{AuditTrail, Package, PackageDelivery};
use fhub_kernel::security::Actor;
use fhub_kernel::server::{ApiError, ApiState, Payload};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/packages", get(list))
        .route("/packages/announce", post(announce))
        .route("/packages/register", post(register))
        .route("/packages/announced", get(announced))
        .route("/packages/{id}", get(package))
        .route("/packages/{id}/history", get(history))
        .route("/packages/{id}/process", post(process))
        .route("/packages/{id}/status", patch(update_status))
        .route("/packages/{id}/deliver", post(deliver))
        .route("/track/{code}", get(track))
}

async fn list(State(state): State<ApiState>, actor: Actor) -> Result<Json<Vec<Package>>, ApiError> {
    Ok(Json(state.try_get_slice::<Packages>()?.list(&actor).await?))
}

async fn announce(
    State(state): State<ApiState>,
    actor: Actor,
    Payload(details): Payload<PackageDetails>,
) -> Result<(StatusCode, Json<Package>), ApiError> {
    let package = state.try_get_slice::<Packages>()?.announce(&actor, details).await?;
    Ok((StatusCode::CREATED, Json(package)))
}

async fn register(
    State(state): State<ApiState>,
    actor: Actor,
    Payload(req): Payload<RegisterPackage>,
) -> Result<(StatusCode, Json<Package>), ApiError> {
    let package = state.try_get_slice::<Packages>()?.register(&actor, req).await?;
    Ok((StatusCode::CREATED, Json(package)))
}

async fn announced(
    State(state): State<ApiState>,
    actor: Actor,
) -> Result<Json<Vec<Package>>, ApiError> {
    Ok(Json(state.try_get_slice::<Packages>()?.announced(&actor).await?))
}

async fn package(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Package>, ApiError> {
    Ok(Json(state.try_get_slice::<Packages>()?.get(&actor, &id).await?))
}

async fn history(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<AuditTrail>, ApiError> {
    Ok(Json(state.try_get_slice::<Packages>()?.history(&actor, &id).await?))
}

async fn process(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
    Payload(input): Payload<ProcessPackage>,
) -> Result<Json<Package>, ApiError> {
    Ok(Json(state.try_get_slice::<Packages>()?.process(&actor, &id, input).await?))
}

async fn update_status(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
    Payload(update): Payload<StatusUpdate>,
) -> Result<Json<Package>, ApiError> {
    Ok(Json(state.try_get_slice::<Packages>()?.update_status(&actor, &id, update).await?))
}

async fn deliver(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
    Payload(input): Payload<DeliverPackage>,
) -> Result<(StatusCode, Json<PackageDelivery>), ApiError> {
    let delivery = state.try_get_slice::<Packages>()?.deliver(&actor, &id, input).await?;
    Ok((StatusCode::CREATED, Json(delivery)))
}

async fn track(
    State(state): State<ApiState>,
    Path(code): Path<String>,
) -> Result<Json<PublicTracking>, ApiError> {
    Ok(Json(state.try_get_slice::<Packages>()?.track(&code).await?))
}
