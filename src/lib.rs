//! Sandbox Client - a streaming request client for the AI sandbox backend
//!
//! The library sends JSON and server-sent-event requests to the backend with
//! bounded retries, decodes event streams incrementally, and wraps every
//! endpoint in a typed API. The `sandbox-client` binary is a thin CLI over it.

pub mod adapters;
pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod request;
pub mod retry;
pub mod sse;
pub mod stream;
pub mod traits;
