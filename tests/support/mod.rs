//! Helpers for end-to-end tests against a local stub endpoint.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use photoflow_core::{HttpClientConfig, HttpProcessingClient, SubmittedItem};

/// Bind `router` on an ephemeral local port
pub async fn serve(router: Router) -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(addr)
}

pub fn client_for(addr: SocketAddr) -> Result<HttpProcessingClient> {
    Ok(HttpProcessingClient::new(HttpClientConfig {
        endpoint: format!("http://{addr}/api/process-image"),
        timeout: Duration::from_secs(5),
        user_agent: "photoflow-e2e".to_string(),
    })?)
}

pub fn item(file_name: &str, content: &[u8]) -> SubmittedItem {
    SubmittedItem::builder()
        .file_name(file_name)
        .content_type("image/jpeg")
        .content(content.to_vec())
        .build()
}

/// Stub processor.
///
/// - names starting with `broken` get a 500
/// - names starting with `garbled` get a non-JSON body
/// - names starting with `slow` are answered after 300ms
/// - everything else is answered inside a `response` envelope
pub fn stub_router() -> Router {
    Router::new().route("/api/process-image", post(stub_handler))
}

async fn stub_handler(Json(request): Json<Value>) -> Response {
    let file_name = request["fileName"].as_str().unwrap_or_default().to_string();

    if file_name.starts_with("broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "rekognition unavailable").into_response();
    }
    if file_name.starts_with("garbled") {
        return (StatusCode::OK, "<html>oops</html>").into_response();
    }
    if file_name.starts_with("slow") {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    Json(json!({
        "statusCode": 200,
        "response": {
            "process_id": format!("proc-{file_name}"),
            "file_name": file_name,
            "enhanced_url": format!("https://cdn.example.test/enhanced/{file_name}"),
            "labels": ["Mountain", "Snow"],
            "labels_details": [
                {"Name": "Mountain", "Confidence": 98.0, "Categories": []},
                {"Name": "Snow", "Confidence": 90.0, "Categories": []}
            ],
            "description": "Snowy ridge under a clear sky",
            "created_at": "2025-05-04T12:00:00",
            "processing_summary": {"totalLabels": 2, "hasErrors": false, "enhancementApplied": true}
        }
    }))
    .into_response()
}
