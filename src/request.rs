//! Request descriptors.
//!
//! A [`RequestDescriptor`] says what to ask the backend for: method, path
//! suffix, optional JSON body and header overrides. It knows nothing about
//! where the backend lives; [`RequestDescriptor::into_http_request`] joins it
//! with a base URL at send time.

use serde::Serialize;
use serde_json::Value;

use crate::config::RequestClass;
use crate::error::{ClientError, ClientResult};
use crate::traits::{Headers, HttpRequest, Method};

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";
pub const JSON_MIME: &str = "application/json";
pub const EVENT_STREAM_MIME: &str = "text/event-stream";

/// Immutable description of one backend call.
///
/// ```ignore
/// let descriptor = RequestDescriptor::post("/api/generate-ai-code-stream")
///     .with_body(json!({"prompt": "a todo app"}))
///     .streaming();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    body: Option<Value>,
    headers: Headers,
    streaming: bool,
    class: RequestClass,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Headers::new(),
            streaming: false,
            class: RequestClass::Default,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach any serializable value as the JSON body.
    pub fn with_json<T: Serialize>(self, body: &T) -> ClientResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|err| ClientError::InvalidRequest(format!("body is not JSON: {}", err)))?;
        Ok(self.with_body(value))
    }

    /// Add a header. Overrides win over the defaults the client adds.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Mark the request as expecting an SSE body. Implies the streaming
    /// timeout class.
    pub fn streaming(mut self) -> Self {
        self.streaming = true;
        self.class = RequestClass::Streaming;
        self
    }

    pub fn with_class(mut self, class: RequestClass) -> Self {
        self.class = class;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn class(&self) -> RequestClass {
        self.class
    }

    /// Join the path onto `base_url` and check the result is an absolute
    /// http(s) URL.
    pub fn resolve(&self, base_url: &str) -> ClientResult<String> {
        if !self.path.starts_with('/') {
            return Err(ClientError::InvalidRequest(format!(
                "path must start with '/': {:?}",
                self.path
            )));
        }

        let full = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        match url::Url::parse(&full) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(full),
            Ok(parsed) => Err(ClientError::InvalidRequest(format!(
                "unsupported scheme '{}' in {}",
                parsed.scheme(),
                full
            ))),
            Err(e) => Err(ClientError::InvalidRequest(format!("{}: {}", full, e))),
        }
    }

    /// Build the transport-level request. Default headers are added first so
    /// descriptor overrides replace them.
    pub fn into_http_request(&self, base_url: &str) -> ClientResult<HttpRequest> {
        let url = self.resolve(base_url)?;
        let mut request = HttpRequest::new(self.method, url);

        if let Some(body) = &self.body {
            request
                .headers
                .insert(CONTENT_TYPE.to_string(), JSON_MIME.to_string());
            request.body = Some(serde_json::to_string(body)?);
        }
        let accept = if self.streaming {
            EVENT_STREAM_MIME
        } else {
            JSON_MIME
        };
        request.headers.insert(ACCEPT.to_string(), accept.to_string());

        for (name, value) in &self.headers {
            // Case-insensitive override of a default
            request
                .headers
                .retain(|existing, _| !existing.eq_ignore_ascii_case(name));
            request.headers.insert(name.clone(), value.clone());
        }

        Ok(request)
    }
}
