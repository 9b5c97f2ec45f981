//! HTTP routes of the settings slice.

use crate::{AppSettings, MaintenanceNotice, MaintenanceUpdate, TemplateUpdate};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use fhub_derive::api_model;
use fhub_kernel::domain::models::{
    Maintenance, NotificationTemplate, PublicSettings, RatesSummary, Settings,
};
use fhub_kernel::security::Actor;
use fhub_kernel::server::{ApiError, ApiState, Payload};

#[api_model(request)]
pub struct SaveSettingsRequest {
    pub settings: Settings,
    #[serde(default = "activate_by_default")]
    pub activate: bool,
}

const fn activate_by_default() -> bool {
    true
}

#[api_model(response)]
pub struct MaintenanceStatus {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<MaintenanceNotice>,
}

pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/settings", get(active).put(save))
        .route("/settings/public", get(public))
        .route("/settings/rates", get(rates))
        .route("/settings/maintenance", get(maintenance).put(set_maintenance))
        .route("/settings/templates", get(templates).put(upsert_template))
}

/// First hop of the forwarding chain, as reported by the reverse proxy.
pub fn client_ip(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
}

async fn public(State(state): State<ApiState>) -> Result<Json<PublicSettings>, ApiError> {
    Ok(Json(state.try_get_slice::<AppSettings>()?.public().await?))
}

async fn rates(State(state): State<ApiState>) -> Result<Json<RatesSummary>, ApiError> {
    Ok(Json(state.try_get_slice::<AppSettings>()?.rates_summary().await?))
}

async fn active(State(state): State<ApiState>, actor: Actor) -> Result<Json<Settings>, ApiError> {
    Ok(Json(state.try_get_slice::<AppSettings>()?.active(&actor).await?))
}

async fn save(
    State(state): State<ApiState>,
    actor: Actor,
    Payload(req): Payload<SaveSettingsRequest>,
) -> Result<Json<Settings>, ApiError> {
    let settings = state.try_get_slice::<AppSettings>()?;
    Ok(Json(settings.save(&actor, req.settings, req.activate).await?))
}

async fn maintenance(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<MaintenanceStatus>, ApiError> {
    let settings = state.try_get_slice::<AppSettings>()?;
    let notice = settings.check_maintenance(client_ip(&headers)).await?;
    Ok(Json(MaintenanceStatus { enabled: notice.is_some(), notice }))
}

async fn set_maintenance(
    State(state): State<ApiState>,
    actor: Actor,
    Payload(update): Payload<MaintenanceUpdate>,
) -> Result<Json<Maintenance>, ApiError> {
    Ok(Json(state.try_get_slice::<AppSettings>()?.set_maintenance(&actor, update).await?))
}

async fn templates(
    State(state): State<ApiState>,
    actor: Actor,
) -> Result<Json<Vec<NotificationTemplate>>, ApiError> {
    Ok(Json(state.try_get_slice::<AppSettings>()?.templates(&actor).await?))
}

async fn upsert_template(
    State(state): State<ApiState>,
    actor: Actor,
    Payload(update): Payload<TemplateUpdate>,
) -> Result<Json<NotificationTemplate>, ApiError> {
    Ok(Json(state.try_get_slice::<AppSettings>()?.upsert_template(&actor, update).await?))
}
