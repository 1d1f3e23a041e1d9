//! Linear API client and types.
//!
//! This module provides the interface for communicating with Linear's
//! GraphQL API: transport, rate limiting, retry and error classification.

mod client;
mod context;
mod diagnostics;
mod error;
mod ratelimit;
mod retry;
mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::LinearClient;
pub use context::{CancelHandle, RequestContext};
pub use diagnostics::{DiagnosticSink, FileSink, NoopSink};
pub use error::{ApiError, ErrorKind};
