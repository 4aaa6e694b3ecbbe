//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, graceful shutdown)
//!     → request.rs (request ID)
//!     → handlers.rs (capture endpoint, query, headers, body)
//!     → proxy::Forwarder (resolve, allowlist, rewrite, forward)
//!     → ProxyResponse → client
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::{request_id, MakeRequestUuidV4, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
