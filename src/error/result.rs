//! Result type alias for client operations.

use super::client_error::ClientError;

/// Type alias for Results using ClientError.
pub type ClientResult<T> = Result<T, ClientError>;
