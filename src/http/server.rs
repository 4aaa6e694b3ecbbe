//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Compile the allowlist and build the forwarder
//! - Create the Axum Router with the proxy, OData and health routes
//! - Wire up middleware (request ID, tracing, panic recovery)
//! - Serve until the shutdown signal fires

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::allowlist::AllowList;
use crate::config::ProxyConfig;
use crate::health::health_check;
use crate::http::handlers::{odata_handler, proxy_handler, route_prefix};
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::proxy::{Forwarder, ProxyResponse, ProxyVariant};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Forwarder,
    pub max_body_size: usize,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let allowlist = Arc::new(AllowList::compile(config.allowlist.patterns.iter().cloned()));
        if allowlist.is_open() {
            tracing::warn!(
                patterns = ?config.allowlist.patterns,
                "Allowlist contains a bare '*': every destination host is reachable. \
                 Replace it with explicit domains in production."
            );
        }
        tracing::info!(patterns = allowlist.patterns().len(), "Allowlist compiled");

        let forwarder = Forwarder::new(allowlist, &config.upstream)?;
        let state = AppState {
            forwarder,
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let proxy: MethodRouter<AppState> = get(proxy_handler)
            .post(proxy_handler)
            .put(proxy_handler)
            .delete(proxy_handler)
            .patch(proxy_handler);
        let odata: MethodRouter<AppState> = get(odata_handler).post(odata_handler);

        let mut router = Router::new().route("/health", get(health_check));
        for (variant, methods) in [(ProxyVariant::Generic, proxy), (ProxyVariant::OData, odata)] {
            let prefix = route_prefix(variant);
            // `{*endpoint}` does not match an empty segment; the bare prefixes
            // are routed too so they can answer 400.
            router = router
                .route(prefix, methods.clone())
                .route(&format!("{}/", prefix), methods.clone())
                .route(&format!("{}/{{*endpoint}}", prefix), methods);
        }

        router
            .fallback(not_found)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            request_id = %request_id(request.headers()),
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(CatchPanicLayer::custom(handle_panic)),
            )
    }

    /// The fully layered router, for serving or for in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout_secs = self.config.upstream.timeout_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

async fn not_found() -> ProxyResponse {
    ProxyResponse::error(StatusCode::NOT_FOUND, "Not found")
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    tracing::error!(error = %detail, "Request handler panicked");
    ProxyResponse::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        &format!("Internal server error: {}", detail),
    )
    .into_response()
}
