//! REST surface tests driven through `tower::ServiceExt::oneshot`.

#![allow(clippy::panic)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use foodie_relay::app_state::AppState;
use foodie_relay::build_app;
use foodie_relay::service::{AdmittedConnection, RelayHub};

fn app() -> (RelayHub, Router) {
    let hub = RelayHub::new(8, 10);
    let router = build_app(AppState::new(hub.clone()));
    (hub, router)
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = tokio_test::assert_ok!(app.oneshot(request).await);
    let status = response.status();
    let bytes = tokio_test::assert_ok!(to_bytes(response.into_body(), usize::MAX).await);
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    tokio_test::assert_ok!(Request::get(uri).body(Body::empty()))
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    tokio_test::assert_ok!(
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
    )
}

async fn connect(hub: &RelayHub, frames: &[Value]) -> AdmittedConnection {
    let Ok(conn) = hub.lifecycle().admit().await else {
        panic!("admission should succeed");
    };
    for frame in frames {
        hub.router().route_frame(conn.id, &frame.to_string()).await;
    }
    conn
}

#[tokio::test]
async fn health_reports_live_connections() {
    let (hub, app) = app();
    let _conn = connect(&hub, &[]).await;

    let (status, body) = call(app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["connections"], 1);
}

#[tokio::test]
async fn emit_to_offline_user_is_accepted_and_dropped() {
    let (_hub, app) = app();

    let (status, body) = call(
        app,
        post_json(
            "/api/v1/emit/users/nobody",
            &json!({"event": "order_status", "data": {"status": "accepted"}}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["target"], "user:nobody");
    assert_eq!(body["report"]["targeted"], 0);
    assert_eq!(body["report"]["delivered"], 0);
}

#[tokio::test]
async fn emit_to_joined_user_is_delivered() {
    let (hub, app) = app();
    let mut conn = connect(&hub, &[json!({"event": "join", "data": "driver-9"})]).await;

    let (status, body) = call(
        app,
        post_json(
            "/api/v1/emit/users/driver-9",
            &json!({"event": "new_order", "data": {"orderId": 31}}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["report"]["delivered"], 1);
    let Some(event) = conn.outbound.recv().await else {
        panic!("expected delivery");
    };
    assert_eq!(event.event, "new_order");
    assert_eq!(event.data, json!({"orderId": 31}));
}

#[tokio::test]
async fn emit_to_order_fans_out_to_trackers() {
    let (hub, app) = app();
    let track = json!({"event": "track_order", "data": {"orderId": "31"}});
    let mut first = connect(&hub, std::slice::from_ref(&track)).await;
    let mut second = connect(&hub, std::slice::from_ref(&track)).await;

    let (status, body) = call(
        app,
        post_json(
            "/api/v1/emit/orders/31",
            &json!({"event": "order_status", "data": "picked_up"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["target"], "order:31");
    assert_eq!(body["report"]["delivered"], 2);
    assert!(first.outbound.recv().await.is_some());
    assert!(second.outbound.recv().await.is_some());
}

#[tokio::test]
async fn blank_event_name_is_rejected() {
    let (_hub, app) = app();

    let (status, body) = call(
        app,
        post_json("/api/v1/emit/orders/31", &json!({"event": "  "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 1001);
}

#[tokio::test]
async fn presence_endpoints_reflect_relay_state() {
    let (hub, app) = app();
    let _conn = connect(
        &hub,
        &[
            json!({"event": "join", "data": {"userIdentity": "customer-1"}}),
            json!({"event": "track_order", "data": 5}),
        ],
    )
    .await;

    let (status, body) = call(app.clone(), get("/api/v1/presence/users/customer-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["online"], true);

    let (_, body) = call(app.clone(), get("/api/v1/presence/users/customer-2")).await;
    assert_eq!(body["online"], false);

    let (_, body) = call(app.clone(), get("/api/v1/presence/orders/5")).await;
    assert_eq!(body["subscribers"], 1);

    let (_, body) = call(app, get("/api/v1/presence/stats")).await;
    assert_eq!(
        body,
        json!({"connections": 1, "registered_users": 1, "rooms": 2})
    );
}

#[cfg(feature = "swagger-ui")]
#[tokio::test]
async fn openapi_document_is_served() {
    let (_hub, app) = app();

    let (status, body) = call(app, get("/api-docs/openapi.json")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/emit/users/{user_id}"].is_object());
    assert!(body["paths"]["/api/v1/presence/stats"].is_object());
}
