//! Allowlisted HTTP Forwarding Proxy Library

pub mod allowlist;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use allowlist::AllowList;
pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{Forwarder, ProxyError, ProxyResponse, ProxyVariant};
