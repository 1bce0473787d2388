//! Trait abstractions for dependency injection and testability.
//!
//! - [`HttpClient`] - single-shot HTTP transport used by the streaming client

pub mod http;

pub use http::{ByteStream, Headers, HttpClient, HttpError, HttpRequest, Method, Response};
