//! A local destination to try the proxy against.
//!
//! ```text
//! cargo run --example mock_backend
//! cargo run -- --bind 127.0.0.1:8080
//! curl 'http://127.0.0.1:8080/proxy/127.0.0.1:8081/echo?x=1&__proxy_scheme=http'
//! curl 'http://127.0.0.1:8080/odata/127.0.0.1:8081/V4/People?__proxy_scheme=http'
//! ```

use std::net::SocketAddr;

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, Uri},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let headers: serde_json::Map<String, Value> = headers
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v.to_str().unwrap_or("<binary>"))))
        .collect();
    Json(json!({
        "method": method.as_str(),
        "uri": uri.to_string(),
        "headers": headers,
        "body": String::from_utf8_lossy(&body),
    }))
}

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/status", get(|| async { "Backend is healthy" }))
        .fallback(echo);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8081));
    println!("Mock destination listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
