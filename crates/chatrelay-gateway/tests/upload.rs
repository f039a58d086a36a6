//! Upload endpoint tests (router-level, no socket).

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use axum::body::Body;
use axum::extract::ws::Message;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use chatrelay_core::protocol::{ChatPayload, ServerEvent};
use chatrelay_core::{ConnectionId, MessageEnvelope};
use chatrelay_gateway::app_state::AppState;
use chatrelay_gateway::config::GatewayConfig;
use chatrelay_gateway::realtime::{Connection, HubEvent};
use chatrelay_gateway::router::build_router;

const BOUNDARY: &str = "chatrelay-test-boundary";

struct Harness {
    app: AppState,
    dir: tempfile::TempDir,
}

fn harness(max_file_bytes: usize) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = GatewayConfig::default();
    cfg.uploads.dir = dir.path().to_str().unwrap().to_string();
    cfg.uploads.max_file_bytes = max_file_bytes;
    let app = AppState::new(cfg).unwrap();
    Harness { app, dir }
}

async fn connect(app: &AppState, conn_id: &str) -> mpsc::Receiver<Message> {
    let (tx, mut rx) = mpsc::channel(64);
    app.hub()
        .send(HubEvent::Connect {
            id: ConnectionId::from(conn_id),
            conn: Connection::new(tx),
        })
        .await
        .unwrap();
    assert_eq!(next_event(&mut rx).await, ServerEvent::YourId(ConnectionId::from(conn_id)));
    rx
}

async fn next_event(rx: &mut mpsc::Receiver<Message>) -> ServerEvent {
    let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for delivery")
        .expect("queue closed");
    match msg {
        Message::Text(s) => serde_json::from_str(&s).unwrap(),
        other => panic!("unexpected frame {other:?}"),
    }
}

async fn next_chat(rx: &mut mpsc::Receiver<Message>) -> MessageEnvelope {
    match next_event(rx).await {
        ServerEvent::ChatMessage(env) => env,
        other => panic!("expected chat message, got {other:?}"),
    }
}

fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

async fn call(app: &AppState, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = build_router(app.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn call_json(app: &AppState, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = call(app, req).await;
    (status, serde_json::from_slice(&body).unwrap())
}

/// Push a plain message through the hub; anything queued before it is
/// delivered first, so receiving it proves nothing else was routed.
async fn assert_nothing_routed(app: &AppState, from: &str, rx: &mut mpsc::Receiver<Message>) {
    app.hub()
        .send(HubEvent::Chat {
            id: ConnectionId::from(from),
            payload: ChatPayload::PlainText("sentinel".into()),
        })
        .await
        .unwrap();
    assert_eq!(next_chat(rx).await.message(), "sentinel");
}

#[tokio::test]
async fn upload_success_broadcasts_file_envelope() {
    let h = harness(20 * 1024 * 1024);
    let mut a = connect(&h.app, "A").await;
    let mut b = connect(&h.app, "B").await;

    let body = multipart_body(
        &[("senderId", "A"), ("recipientId", ""), ("username", "Ann")],
        Some(("a b.png", b"PNGDATA")),
    );
    let (status, json) = call_json(&h.app, upload_request(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    let url = json["fileUrl"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"), "url={url}");
    assert!(url.ends_with("-a_b.png"), "url={url}");

    let stored_name = url.trim_start_matches("/uploads/");
    let on_disk = std::fs::read(h.dir.path().join(stored_name)).unwrap();
    assert_eq!(on_disk, b"PNGDATA");

    for rx in [&mut a, &mut b] {
        let env = next_chat(rx).await;
        assert_eq!(env.msg_type(), "file");
        assert_eq!(env.message(), url);
        assert_eq!(env.username(), "Ann");
        assert_eq!(env.sender_id(), Some(&ConnectionId::from("A")));
        assert!(env.recipient_id().is_none());
    }
}

#[tokio::test]
async fn private_voice_upload_reaches_pair_only() {
    let h = harness(1024);
    let mut a = connect(&h.app, "A").await;
    let mut b = connect(&h.app, "B").await;
    let mut c = connect(&h.app, "C").await;

    let body = multipart_body(
        &[("senderId", "A"), ("recipientId", "B"), ("type", "voice")],
        Some(("clip.webm", b"OGG")),
    );
    let (status, json) = call_json(&h.app, upload_request(body)).await;
    assert_eq!(status, StatusCode::OK);
    let url = json["fileUrl"].as_str().unwrap().to_string();

    for rx in [&mut b, &mut a] {
        let env = next_chat(rx).await;
        assert_eq!(env.msg_type(), "voice");
        assert_eq!(env.message(), url);
        assert_eq!(env.username(), "Anonymous");
        assert_eq!(env.recipient_id(), Some(&ConnectionId::from("B")));
    }

    // C only ever sees the sentinel.
    assert_nothing_routed(&h.app, "C", &mut c).await;
}

#[tokio::test]
async fn upload_without_sender_is_still_broadcast() {
    let h = harness(1024);
    let mut a = connect(&h.app, "A").await;

    let (status, json) = call_json(
        &h.app,
        upload_request(multipart_body(&[], Some(("notes.txt", b"hello")))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let env = next_chat(&mut a).await;
    assert_eq!(env.message(), json["fileUrl"].as_str().unwrap());
    assert!(env.sender_id().is_none());
    assert_eq!(env.username(), "Anonymous");
}

#[tokio::test]
async fn missing_file_is_a_client_error() {
    let h = harness(1024);
    let mut a = connect(&h.app, "A").await;

    let (status, json) =
        call_json(&h.app, upload_request(multipart_body(&[("senderId", "A")], None))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No file uploaded.");

    assert_nothing_routed(&h.app, "A", &mut a).await;
    assert_eq!(std::fs::read_dir(h.dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn non_multipart_request_has_no_file() {
    let h = harness(1024);
    let req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, json) = call_json(&h.app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No file uploaded.");
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let h = harness(16);
    let mut a = connect(&h.app, "A").await;

    let big = vec![b'x'; 17];
    let (status, json) = call_json(
        &h.app,
        upload_request(multipart_body(&[("senderId", "A")], Some(("big.bin", &big)))),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["error"], "File too large.");

    assert_nothing_routed(&h.app, "A", &mut a).await;
    assert_eq!(std::fs::read_dir(h.dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn store_failure_is_a_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("store");
    let mut cfg = GatewayConfig::default();
    cfg.uploads.dir = store_dir.to_str().unwrap().to_string();
    let app = AppState::new(cfg).unwrap();
    let mut a = connect(&app, "A").await;

    // A regular file where the directory should be makes every write fail.
    std::fs::remove_dir(&store_dir).unwrap();
    std::fs::write(&store_dir, b"not a directory").unwrap();

    let (status, json) = call_json(
        &app,
        upload_request(multipart_body(&[("senderId", "A")], Some(("a.png", b"PNG")))),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json, serde_json::json!({ "error": "Upload failed." }));

    assert_nothing_routed(&app, "A", &mut a).await;
}

#[tokio::test]
async fn stored_file_is_served() {
    let h = harness(1024);
    let (_, json) = call_json(
        &h.app,
        upload_request(multipart_body(&[], Some(("hello.txt", b"hi there")))),
    )
    .await;
    let url = json["fileUrl"].as_str().unwrap();

    let req = Request::builder().uri(url).body(Body::empty()).unwrap();
    let (status, body) = call(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"hi there");
}

#[tokio::test]
async fn healthz_is_ok() {
    let h = harness(1024);
    let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let (status, body) = call(&h.app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}
