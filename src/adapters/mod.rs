//! Concrete implementations of trait abstractions.
//!
//! - [`ReqwestHttpClient`] - production HTTP transport using reqwest
//! - [`mock::MockHttpClient`] - scripted transport for tests

pub mod mock;
pub mod reqwest_http;

pub use mock::{MockHttpClient, MockResponse};
pub use reqwest_http::ReqwestHttpClient;
