use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use fhub_server::{Server, app};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn router() -> Router {
    let server = Server::builder().build().await.unwrap();
    app(server.state().clone())
}

fn request(
    method: &str,
    uri: &str,
    role: Option<(&str, &str)>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((id, role)) = role {
        builder = builder.header("x-actor-id", id).header("x-actor-role", role);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body =
        if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
}

#[tokio::test]
async fn health_answers() {
    let app = router().await;
    let (status, _) = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn announcing_requires_an_identity() {
    let app = router().await;
    let body = json!({ "description": "Shoes", "weight": "1.2" });
    let (status, _) = send(&app, request("POST", "/packages/announce", None, Some(body))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn client_announces_and_tracks_a_parcel() {
    let app = router().await;
    let lucie = json!({ "email": "lucie@example.com", "firstName": "Lucie", "lastName": "Pierre" });
    let (status, user) = send(&app, request("POST", "/accounts", None, Some(lucie))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = user["id"].as_str().unwrap().to_owned();

    let body = json!({ "sender": "Amazon", "description": "Phone case", "weight": "0.4" });
    let (status, package) =
        send(&app, request("POST", "/packages/announce", Some((&id, "client")), Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(package["status"], "announced");

    let code = package["trackingNumber"].as_str().unwrap().to_lowercase();
    let track = request("GET", &format!("/track/{code}"), None, None);
    let (status, tracking) = send(&app, track).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tracking["status"], "announced");

    let missing = request("GET", "/packages/package:missing", Some((&id, "client")), None);
    let (status, error) = send(&app, missing).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["kind"], "notFound");
}

#[tokio::test]
async fn maintenance_blocks_everyone_but_admins() {
    let app = router().await;
    let switch =
        json!({ "enabled": true, "message": "Inventory count", "allowedIps": ["10.0.0.7"] });
    let root = Some(("user:root", "admin"));
    let (status, _) =
        send(&app, request("PUT", "/settings/maintenance", root, Some(switch))).await;
    assert_eq!(status, StatusCode::OK);

    let client = Some(("user:c1", "client"));
    let (status, notice) = send(&app, request("GET", "/packages", client, None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(notice["message"], "Inventory count");

    let mut allowed = request("GET", "/packages", client, None);
    allowed.headers_mut().insert("x-forwarded-for", "10.0.0.7, 172.16.0.1".parse().unwrap());
    let (status, _) = send(&app, allowed).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, request("GET", "/packages", root, None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, request("GET", "/settings/maintenance", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], true);
}

#[tokio::test]
async fn admins_publish_the_default_warehouse() {
    let app = router().await;
    let warehouse = json!({
        "kind": "warehouse",
        "name": "ForwardHub Miami",
        "country": "US",
        "city": "Doral",
        "addressLine1": "8400 NW 25th St",
        "state": "FL",
        "postalCode": "33122",
        "phone": "+13055550100",
        "email": "mia@forwardhub.test",
        "isDefaultWarehouse": true
    });

    let client = Some(("user:c1", "client"));
    let attempt = request("POST", "/addresses", client, Some(warehouse.clone()));
    let (status, _) = send(&app, attempt).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = Some(("user:root", "admin"));
    let (status, created) =
        send(&app, request("POST", "/addresses", admin, Some(warehouse))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["isDefaultWarehouse"], true);

    let (status, listed) =
        send(&app, request("GET", "/addresses/warehouses", client, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["name"], "ForwardHub Miami");
}
