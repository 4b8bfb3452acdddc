//! End-to-end relay tests over real WebSocket connections.

#![allow(clippy::panic)]

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use foodie_relay::app_state::AppState;
use foodie_relay::build_app;
use foodie_relay::domain::{TopicId, UserId};
use foodie_relay::service::RelayHub;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_server(max_connections: usize) -> (SocketAddr, RelayHub) {
    let hub = RelayHub::new(32, max_connections);
    let app = build_app(AppState::new(hub.clone()));
    let listener = tokio_test::assert_ok!(TcpListener::bind("127.0.0.1:0").await);
    let addr = tokio_test::assert_ok!(listener.local_addr());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, hub)
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) =
        tokio_test::assert_ok!(tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await);
    client
}

async fn send(client: &mut Client, frame: Value) {
    tokio_test::assert_ok!(client.send(Message::text(frame.to_string())).await);
}

async fn next_event(client: &mut Client) -> Value {
    loop {
        match tokio::time::timeout(Duration::from_secs(5), client.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                return tokio_test::assert_ok!(serde_json::from_str(text.as_str()));
            }
            Ok(Some(Ok(_))) => {}
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

async fn expect_silence(client: &mut Client) {
    let received = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(received.is_err(), "expected no frame, got {received:?}");
}

async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

async fn order_subscribers(http: &reqwest::Client, addr: SocketAddr, order: &str) -> u64 {
    let response = tokio_test::assert_ok!(
        http.get(format!("http://{addr}/api/v1/presence/orders/{order}"))
            .send()
            .await
    );
    let body: Value = tokio_test::assert_ok!(response.json().await);
    body["subscribers"].as_u64().unwrap_or_default()
}

fn user(raw: &str) -> UserId {
    let Ok(id) = UserId::parse(raw) else {
        panic!("valid user id");
    };
    id
}

#[tokio::test]
async fn driver_location_and_order_status_reach_tracking_customer() {
    let (addr, _hub) = spawn_server(100).await;
    let http = &reqwest::Client::new();

    let mut customer = connect(addr).await;
    let mut driver = connect(addr).await;
    send(&mut customer, json!({"event": "join", "data": {"userIdentity": "customer-1"}})).await;
    send(&mut customer, json!({"event": "track_order", "data": {"orderId": "7"}})).await;
    wait_until(move || async move { order_subscribers(http, addr, "7").await == 1 }).await;

    send(
        &mut driver,
        json!({
            "event": "driver_location",
            "data": {"orderId": "7", "latitude": 6.5244, "longitude": 3.3792, "rotation": 270}
        }),
    )
    .await;

    let update = next_event(&mut customer).await;
    assert_eq!(update["event"], "driver_location_update");
    assert_eq!(update["data"]["latitude"], 6.5244);
    assert_eq!(update["data"]["longitude"], 3.3792);
    assert_eq!(update["data"]["rotation"], 270.0);
    assert!(update["data"]["timestamp"].is_string());

    let response = tokio_test::assert_ok!(
        http.post(format!("http://{addr}/api/v1/emit/orders/7"))
            .json(&json!({"event": "order_status", "data": {"status": "picked_up"}}))
            .send()
            .await
    );
    assert_eq!(response.status().as_u16(), 202);

    let status = next_event(&mut customer).await;
    assert_eq!(status, json!({"event": "order_status", "data": {"status": "picked_up"}}));
    expect_silence(&mut driver).await;
}

#[tokio::test]
async fn chat_follows_reconnected_user() {
    let (addr, hub) = spawn_server(100).await;
    let hub = &hub;
    let private_room = &TopicId::user(&user("u1"));

    let mut old_session = connect(addr).await;
    let mut new_session = connect(addr).await;
    let mut sender = connect(addr).await;

    send(&mut old_session, json!({"event": "join", "data": "u1"})).await;
    wait_until(move || async move { hub.state().rooms().member_count(private_room).await == 1 })
        .await;
    send(&mut new_session, json!({"event": "join", "data": "u1"})).await;
    wait_until(move || async move { hub.state().rooms().member_count(private_room).await == 2 })
        .await;

    tokio_test::assert_ok!(old_session.close(None).await);
    wait_until(move || async move { hub.stats().await.connections == 2 }).await;
    assert!(hub.is_online(&user("u1")).await);

    send(
        &mut sender,
        json!({"event": "send_message", "data": {"receiverId": "u1", "message": {"text": "gate 3"}}}),
    )
    .await;
    let delivered = next_event(&mut new_session).await;
    assert_eq!(delivered, json!({"event": "new_message", "data": {"text": "gate 3"}}));

    send(
        &mut sender,
        json!({"event": "send_message", "data": {"receiverId": "ghost", "message": "anyone?"}}),
    )
    .await;
    send(&mut sender, json!({"event": "bogus", "data": 1})).await;
    expect_silence(&mut new_session).await;
    expect_silence(&mut sender).await;
}

#[tokio::test]
async fn departed_subscriber_is_skipped() {
    let (addr, hub) = spawn_server(100).await;
    let http = &reqwest::Client::new();

    let mut leaving = connect(addr).await;
    let mut staying = connect(addr).await;
    let mut driver = connect(addr).await;
    send(&mut leaving, json!({"event": "track_order", "data": 7})).await;
    send(&mut staying, json!({"event": "track_order", "data": 7})).await;
    wait_until(move || async move { order_subscribers(http, addr, "7").await == 2 }).await;

    tokio_test::assert_ok!(leaving.close(None).await);
    wait_until(move || async move { order_subscribers(http, addr, "7").await == 1 }).await;

    send(
        &mut driver,
        json!({
            "event": "driver_location",
            "data": {"orderId": 7, "latitude": 1.0, "longitude": 2.0, "rotation": 0}
        }),
    )
    .await;

    let update = next_event(&mut staying).await;
    assert_eq!(update["event"], "driver_location_update");
    assert_eq!(hub.stats().await.connections, 2);
}

#[tokio::test]
async fn upgrade_refused_when_full() {
    let (addr, hub) = spawn_server(1).await;
    let hub = &hub;

    let _first = connect(addr).await;
    wait_until(move || async move { hub.stats().await.connections == 1 }).await;

    match tokio_tungstenite::connect_async(format!("ws://{addr}/ws")).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status().as_u16(), 503);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("second connection should be refused"),
    }
}

#[tokio::test]
async fn shutdown_closes_open_sockets() {
    let (addr, hub) = spawn_server(100).await;
    let hub = &hub;

    let mut client = connect(addr).await;
    wait_until(move || async move { hub.stats().await.connections == 1 }).await;

    assert_eq!(hub.shutdown().await, 1);

    match tokio::time::timeout(Duration::from_secs(5), client.next()).await {
        Ok(Some(Ok(Message::Close(_))) | None | Some(Err(_))) => {}
        other => panic!("expected the socket to close, got {other:?}"),
    }
}

#[tokio::test]
async fn sockets_close_once_server_stops() {
    let hub = RelayHub::new(32, 100);
    let listener = tokio_test::assert_ok!(TcpListener::bind("127.0.0.1:0").await);
    let addr = tokio_test::assert_ok!(listener.local_addr());
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(foodie_relay::serve(listener, hub.clone(), async move {
        let _ = stop_rx.await;
    }));

    let mut client = connect(addr).await;
    let live = &hub;
    wait_until(move || async move { live.stats().await.connections == 1 }).await;

    let _ = stop_tx.send(());
    let served = tokio_test::assert_ok!(server.await);
    tokio_test::assert_ok!(served);
    assert_eq!(hub.stats().await.connections, 0);

    match tokio::time::timeout(Duration::from_secs(5), client.next()).await {
        Ok(Some(Ok(Message::Close(_))) | None | Some(Err(_))) => {}
        other => panic!("expected the socket to close, got {other:?}"),
    }
    assert!(
        tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
            .await
            .is_err()
    );
}
