// tests/server_endpoints.rs

//! End-to-end tests for the MediaShare API surface
//!
//! Each test boots the real router on an ephemeral port and speaks raw
//! HTTP/1.1 to it, so routing, status codes, and JSON bodies are seen
//! exactly as a deploy-time probe sees them.

use std::net::SocketAddr;

use mediashare::config::ServiceConfig;
use mediashare::server::{build_router, AppState};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn test_config() -> ServiceConfig {
    ServiceConfig {
        version: "2.5.0".to_string(),
        environment: "integration".to_string(),
        cloud_provider: "none".to_string(),
    }
}

async fn start_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(AppState::new(test_config()));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn get(addr: SocketAddr, path: &str) -> (u16, Value) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nhost: {addr}\r\nconnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();

    let status: u16 = text
        .split_whitespace()
        .nth(1)
        .expect("status line")
        .parse()
        .expect("numeric status");
    let body = text.split("\r\n\r\n").nth(1).unwrap_or("");
    let json = serde_json::from_str(body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_root_welcomes_and_links_endpoints() {
    let addr = start_server().await;
    let (status, body) = get(addr, "/").await;

    assert_eq!(status, 200);
    assert_eq!(body["message"], "Welcome to MediaShare API");
    assert_eq!(body["version"], "2.5.0");
    assert_eq!(body["health"], "/health");
    assert_eq!(body["metadata"], "/metadata");
    assert_eq!(body["ready"], "/ready");
}

#[tokio::test]
async fn test_health_returns_the_full_report() {
    let addr = start_server().await;
    let (status, body) = get(addr, "/health").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["environment"], "integration");
    assert_eq!(body["cloud_provider"], "none");
    assert_eq!(body["version"], "2.5.0");
    assert!(body["hostname"].is_string());
    assert!(body["uptime_seconds"].is_number());
    assert!(body["uptime_seconds"].as_f64().unwrap() >= 0.0);

    let timestamp = body["timestamp"].as_str().expect("timestamp string");
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_uptime_grows_between_requests() {
    let addr = start_server().await;

    let (_, first) = get(addr, "/health").await;
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    let (_, second) = get(addr, "/health").await;

    let a = first["uptime_seconds"].as_f64().unwrap();
    let b = second["uptime_seconds"].as_f64().unwrap();
    assert!(b >= a, "uptime should never go backwards ({a} then {b})");
}

#[tokio::test]
async fn test_metadata_is_the_static_view() {
    let addr = start_server().await;
    let (status, body) = get(addr, "/metadata").await;

    assert_eq!(status, 200);
    assert_eq!(body["environment"], "integration");
    assert_eq!(body["cloud_provider"], "none");
    assert_eq!(body["version"], "2.5.0");
    assert!(body["hostname"].is_string());
    // Nothing time-dependent belongs here.
    assert!(body.get("uptime_seconds").is_none());
    assert!(body.get("timestamp").is_none());
}

#[tokio::test]
async fn test_ready_answers_immediately() {
    let addr = start_server().await;
    let (status, body) = get(addr, "/ready").await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_responses_carry_json_content_type() {
    let addr = start_server().await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET /health HTTP/1.1\r\nhost: {addr}\r\nconnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let text = String::from_utf8(raw).unwrap();
    let headers = text.split("\r\n\r\n").next().unwrap().to_lowercase();
    assert!(
        headers.contains("content-type: application/json"),
        "missing JSON content type in: {headers}"
    );
}

#[tokio::test]
async fn test_unknown_route_is_a_json_404() {
    let addr = start_server().await;
    let (status, body) = get(addr, "/api/files").await;

    assert_eq!(status, 404);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["path"], "/api/files");
}
