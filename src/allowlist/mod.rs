//! Destination allowlist subsystem.
//!
//! # Data Flow
//! ```text
//! Allowlist Compilation (at startup):
//!     config.allowlist.patterns
//!     → pattern.rs (split each glob into literal pieces)
//!     → list.rs (freeze as immutable AllowList)
//!
//! Per request:
//!     Candidate URL
//!     → list.rs (extract host, strip port)
//!     → pattern.rs (anchored, case-insensitive match)
//!     → Approved | Rejected
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once, immutable at runtime
//! - No regex in hot path
//! - Deterministic: result depends only on host and pattern list

pub mod list;
pub mod pattern;

pub use list::{extract_host, AllowList};
pub use pattern::AllowPattern;
