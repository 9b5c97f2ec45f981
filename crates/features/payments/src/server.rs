//! HTTP routes of the payment ledger.

use crate::{ConfirmPayment, FailPayment, NewPayment, Payments};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use fhub_kernel::domain::models::Payment;
use fhub_kernel::security::Actor;
use fhub_kernel::server::{ApiError, ApiState, Payload};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/shipments/{id}/payments", post(create))
        .route("/payments", get(list))
        .route("/payments/{id}", get(payment))
        .route("/payments/{id}/confirm", post(confirm))
        .route("/payments/{id}/fail", post(fail))
        .route("/payments/{id}/refund", post(refund))
}

async fn create(
    State(state): State<ApiState>,
    actor: Actor,
    Path(shipment_id): Path<String>,
    Payload(req): Payload<NewPayment>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let slice = state.try_get_slice::<Payments>()?;
    let payment = slice.create_payment(&actor, &shipment_id, req).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn list(State(state): State<ApiState>, actor: Actor) -> Result<Json<Vec<Payment>>, ApiError> {
    Ok(Json(state.try_get_slice::<Payments>()?.list(&actor).await?))
}

async fn payment(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(state.try_get_slice::<Payments>()?.get(&actor, &id).await?))
}

async fn confirm(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
    Payload(req): Payload<ConfirmPayment>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(state.try_get_slice::<Payments>()?.confirm(&actor, &id, req).await?))
}

async fn fail(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
    Payload(req): Payload<FailPayment>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(state.try_get_slice::<Payments>()?.fail(&actor, &id, req).await?))
}

async fn refund(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(state.try_get_slice::<Payments>()?.refund(&actor, &id).await?))
}
