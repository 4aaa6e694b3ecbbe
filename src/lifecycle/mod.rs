//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     broadcast → server stops accepting → in-flight requests finish → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup in main: config, logging, allowlist, listener
//! - One broadcast channel fans shutdown out to every subscriber

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
