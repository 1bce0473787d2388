//! Error handling for the sandbox client.
//!
//! - **Error Categories**: High-level classification for handling decisions
//! - **Stream Errors**: Terminal failures while reading an SSE body
//! - **Unified Error Type**: `ClientError` consolidates all failures
//! - **Result Type Alias**: `ClientResult<T>` for consistent return types
//!
//! Transport-level failures are modelled by [`crate::traits::HttpError`],
//! which is what an [`crate::traits::HttpClient`] implementation returns.
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, DNS, read failures | Yes |
//! | Server | Backend errors (5xx) | Yes |
//! | Client | Rejected requests (4xx) | No |
//! | Stream | Event stream problems | No |
//! | Configuration | Bad environment values | No |
//! | Cancelled | Caller cancelled | No |

mod category;
mod client_error;
mod result;
mod stream;

pub use category::ErrorCategory;
pub use client_error::ClientError;
pub use result::ClientResult;
pub use stream::StreamError;
