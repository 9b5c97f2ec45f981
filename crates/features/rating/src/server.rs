//! HTTP routes of the rating slice.

use crate::{Quote, RateInput, Rating};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use fhub_derive::api_model;
use fhub_kernel::domain::models::{ShippingMode, ShippingRate};
use fhub_kernel::security::Actor;
use fhub_kernel::server::{ApiError, ApiState, Payload};
use rust_decimal::Decimal;

#[api_model(request)]
pub struct QuoteRequest {
    pub weight: Decimal,
    #[serde(default, alias = "shippingType")]
    pub mode: ShippingMode,
}

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/rates", get(list).post(create))
        .route("/rates/{id}", put(update).delete(deactivate))
        .route("/rates/quote", post(quote))
}

async fn list(
    State(state): State<ApiState>,
    actor: Actor,
) -> Result<Json<Vec<ShippingRate>>, ApiError> {
    Ok(Json(state.try_get_slice::<Rating>()?.list_rates(&actor).await?))
}

async fn create(
    State(state): State<ApiState>,
    actor: Actor,
    Payload(input): Payload<RateInput>,
) -> Result<(StatusCode, Json<ShippingRate>), ApiError> {
    let rate = state.try_get_slice::<Rating>()?.create_rate(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

async fn update(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
    Payload(input): Payload<RateInput>,
) -> Result<Json<ShippingRate>, ApiError> {
    Ok(Json(state.try_get_slice::<Rating>()?.update_rate(&actor, &id, input).await?))
}

async fn deactivate(
    State(state): State<ApiState>,
    actor: Actor,
    Path(id): Path<String>,
) -> Result<Json<ShippingRate>, ApiError> {
    Ok(Json(state.try_get_slice::<Rating>()?.deactivate_rate(&actor, &id).await?))
}

async fn quote(
    State(state): State<ApiState>,
    actor: Actor,
    Payload(req): Payload<QuoteRequest>,
) -> Result<Json<Quote>, ApiError> {
    Ok(Json(state.try_get_slice::<Rating>()?.quote(&actor, req.mode, req.weight).await?))
}
