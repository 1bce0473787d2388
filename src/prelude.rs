//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```ignore
//! use sandbox_client::prelude::*;
//! ```
//!
//! This will import:
//! - Client types (StreamingClient, ClientConfig, RequestDescriptor, RetryPolicy)
//! - API types (SandboxApi, ApiOutcome, StreamSummary)
//! - Stream handling (StreamHandler and its stock implementations)
//! - Error types (ClientError, ClientResult, StreamError)

// Client types
pub use crate::client::StreamingClient;
pub use crate::config::{ClientConfig, RequestClass, Timeouts};
pub use crate::request::RequestDescriptor;
pub use crate::retry::RetryPolicy;

// API types
pub use crate::api::{ApiOutcome, SandboxApi, StreamSummary};

// Stream handling
pub use crate::sse::BackendEvent;
pub use crate::stream::{
    CallbackHandler, ChannelHandler, CollectingHandler, StreamHandler, StreamState, StreamUpdate,
};

// Error types
pub use crate::error::{ClientError, ClientResult, StreamError};
