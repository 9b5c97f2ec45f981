#![cfg(feature = "server")]

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use fhub_domain::config::ApiConfig;
use fhub_domain::registry::{FeatureSlice, InitializedSlice};
use fhub_kernel::server::{ApiState, system_router};
use fhub_store::Store;
use std::any::Any;
use tower::ServiceExt;

#[derive(Debug)]
struct Quotes;

impl FeatureSlice for Quotes {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[tokio::test]
async fn state_requires_store_and_resolves_slices() {
    assert!(ApiState::builder().config(ApiConfig::default()).build().is_err());

    let state = ApiState::builder()
        .config(ApiConfig::default())
        .store(Store::in_memory().await.unwrap())
        .register_slice(InitializedSlice::new(Quotes))
        .build()
        .unwrap();

    assert!(state.try_get_slice::<Quotes>().is_ok());
    assert_eq!(state.slice_names().count(), 1);
}

#[tokio::test]
async fn health_route_reports_up() {
    let app = system_router::<()>();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "up");
}
