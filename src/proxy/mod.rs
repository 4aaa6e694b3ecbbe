//! Forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! ProxyRequest (endpoint, method, headers, query, body)
//!     → target.rs (scheme inference, __proxy_scheme override)
//!     → allowlist (Approved | Rejected → 403)
//!     → rewrite.rs (query merge, header filtering, OData headers, body)
//!     → forwarder.rs (outbound call with timeout)
//!     → response.rs (status/body relay, header filtering)
//!     → ProxyResponse
//! ```
//!
//! # State Machine
//! ```text
//! Received → Resolving → AllowlistCheck → Rewriting → Forwarding
//!     → Completed | TransportFailed (502) | InternalFailed (500)
//! ```
//! Resolving may end in 400, AllowlistCheck in 403. Every path ends in
//! exactly one response and no state is revisited.

pub mod error;
pub mod forwarder;
pub mod request;
pub mod response;
pub mod rewrite;
pub mod target;

pub use error::ProxyError;
pub use forwarder::Forwarder;
pub use request::{ProxyRequest, ProxyVariant};
pub use response::ProxyResponse;
pub use target::{resolve, Scheme, TargetUrl, SCHEME_OVERRIDE_PARAM};
