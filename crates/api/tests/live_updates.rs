//! Tests that HTTP vote submissions reach live subscribers.

mod common;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use common::{create_floorplan, get, post_json_as};
use heatvote_api::state::AppState;
use heatvote_events::HubMessage;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

#[tokio::test]
async fn accepted_vote_is_pushed_to_floorplan_subscribers_only() {
    let (app, state) = common::build_test_app_with(common::test_config());
    let office = create_floorplan(&app, "Office").await;
    let annex = create_floorplan(&app, "Annex").await;

    let mut office_sub = state.hub.subscribe(office).await;
    let mut annex_sub = state.hub.subscribe(annex).await;

    let response = post_json_as(
        &app,
        &format!("/api/v1/floorplans/{office}/votes"),
        "visitor-a",
        json!({ "x": 12, "y": 34, "value": 1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    match office_sub.try_recv() {
        Some(HubMessage::Vote(v)) => {
            assert_eq!(v.floorplan_id, office);
            assert_eq!((v.vote.x, v.vote.y, v.vote.value), (12, 34, 1));
        }
        other => panic!("expected a vote, got {other:?}"),
    }
    assert!(annex_sub.try_recv().is_none());
}

#[tokio::test]
async fn rejected_vote_is_not_pushed() {
    let (app, state) = common::build_test_app_with(common::test_config());
    let fp = create_floorplan(&app, "Office").await;
    let mut sub = state.hub.subscribe(fp).await;

    let uri = format!("/api/v1/floorplans/{fp}/votes");
    post_json_as(&app, &uri, "visitor-a", json!({ "x": 1, "y": 1, "value": 1 })).await;
    let limited = post_json_as(&app, &uri, "visitor-a", json!({ "x": 1, "y": 1, "value": 1 })).await;
    assert_eq!(limited.status(), StatusCode::TOO_MANY_REQUESTS);

    assert!(matches!(sub.try_recv(), Some(HubMessage::Vote(_))));
    assert!(sub.try_recv().is_none());
}

#[tokio::test]
async fn websocket_route_requires_upgrade() {
    let app = common::build_test_app();
    let fp = create_floorplan(&app, "Office").await;

    let response = get(&app, &format!("/api/v1/floorplans/{fp}/ws")).await;
    assert!(response.status().is_client_error());
}

// ---------------------------------------------------------------------------
// Over a bound listener
// ---------------------------------------------------------------------------

async fn wait_for_subscribers(state: &AppState, fp: i64, expected: usize) {
    timeout(Duration::from_secs(5), async {
        while state.hub.subscriber_count(fp).await != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("subscriber count never reached {expected}"));
}

/// Perform the client side of the opening handshake and consume the
/// response head byte by byte so no frame data is swallowed.
async fn open_socket(addr: SocketAddr, fp: i64) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "GET /api/v1/floorplans/{fp}/ws HTTP/1.1\r\n\
         Host: {addr}\r\n\
         Connection: Upgrade\r\n\
         Upgrade: websocket\r\n\
         Sec-WebSocket-Version: 13\r\n\
         Sec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\r\n"
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut head = Vec::new();
    while !head.ends_with(b"\r\n\r\n") {
        head.push(stream.read_u8().await.unwrap());
    }
    let head = String::from_utf8(head).unwrap();
    assert!(head.starts_with("HTTP/1.1 101"), "handshake failed: {head}");
    stream
}

/// Read one unmasked server frame, returning its opcode and payload.
async fn read_frame(stream: &mut TcpStream) -> (u8, Vec<u8>) {
    let first = stream.read_u8().await.unwrap();
    let len = match stream.read_u8().await.unwrap() & 0x7f {
        126 => usize::from(stream.read_u16().await.unwrap()),
        127 => stream.read_u64().await.unwrap() as usize,
        n => usize::from(n),
    };
    let mut payload = vec![0; len];
    stream.read_exact(&mut payload).await.unwrap();
    (first & 0x0f, payload)
}

#[tokio::test]
async fn websocket_client_receives_votes_and_is_dropped_on_disconnect() {
    let (app, state) = common::build_test_app_with(common::test_config());
    let fp = create_floorplan(&app, "Office").await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_app = app.clone();
    let server = tokio::spawn(async move { axum::serve(listener, server_app).await });

    let mut socket = open_socket(addr, fp).await;
    wait_for_subscribers(&state, fp, 1).await;

    let response = post_json_as(
        &app,
        &format!("/api/v1/floorplans/{fp}/votes"),
        "visitor-ws",
        json!({ "x": 7, "y": 9, "value": -1 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let (opcode, payload) = timeout(Duration::from_secs(5), read_frame(&mut socket))
        .await
        .unwrap();
    assert_eq!(opcode, 0x1, "expected a text frame");
    let event: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(event["floorplan_id"], fp);
    assert_eq!(event["x"], 7);
    assert_eq!(event["y"], 9);
    assert_eq!(event["value"], -1);
    assert!(event.get("visitor_id").is_none());

    drop(socket);
    wait_for_subscribers(&state, fp, 0).await;

    server.abort();
}
