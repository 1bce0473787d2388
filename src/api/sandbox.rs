//! Typed wrappers over the sandbox backend endpoints.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use crate::adapters::ReqwestHttpClient;
use crate::api::{paths, ApiOutcome, StreamSummary};
use crate::client::StreamingClient;
use crate::config::RequestClass;
use crate::error::{ClientError, ClientResult, StreamError};
use crate::models::{
    AnalyzeEditIntentRequest, ApplyCodeRequest, CommandOutput, ConversationUpdate,
    CreateSandboxResponse, DetectPackagesRequest, EditIntent, GenerateCodeRequest,
    GenericResponse, HealthResponse, InstallPackagesRequest, KillSandboxResponse,
    PackageInstallReport, ProjectZip, ReportViteErrorRequest, RunCommandRequest, SandboxFiles,
    SandboxStatus, ScrapeUrlRequest, Screenshot, ViteErrors,
};
use crate::request::RequestDescriptor;
use crate::stream::{StreamHandler, StreamState};
use crate::traits::{HttpClient, Response};

/// Longest error body echoed back in a message.
const ERROR_BODY_LIMIT: usize = 500;

/// Sandbox backend API.
///
/// JSON endpoints return typed payloads, mapping non-2xx statuses to
/// [`ClientError::Status`] and `{"success": false, "error": ..}` bodies to
/// [`ClientError::Backend`]. Streaming endpoints report events to a
/// [`StreamHandler`] and return an [`ApiOutcome`].
pub struct SandboxApi<C: HttpClient = ReqwestHttpClient> {
    client: StreamingClient<C>,
}

impl<C: HttpClient> Clone for SandboxApi<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

impl<C: HttpClient> std::fmt::Debug for SandboxApi<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SandboxApi")
            .field("client", &self.client)
            .finish()
    }
}

impl SandboxApi<ReqwestHttpClient> {
    pub fn from_env() -> ClientResult<Self> {
        Ok(Self::new(StreamingClient::from_env()?))
    }
}

impl<C: HttpClient> SandboxApi<C> {
    pub fn new(client: StreamingClient<C>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &StreamingClient<C> {
        &self.client
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.call(RequestDescriptor::get(paths::HEALTH)).await
    }

    pub async fn create_sandbox(&self) -> ClientResult<CreateSandboxResponse> {
        self.call(
            RequestDescriptor::post(paths::CREATE_SANDBOX)
                .with_body(json!({}))
                .with_class(RequestClass::Sandbox),
        )
        .await
    }

    pub async fn sandbox_status(&self) -> ClientResult<SandboxStatus> {
        self.call(RequestDescriptor::get(paths::SANDBOX_STATUS)).await
    }

    pub async fn kill_sandbox(&self) -> ClientResult<KillSandboxResponse> {
        self.call(
            RequestDescriptor::post(paths::KILL_SANDBOX)
                .with_body(json!({}))
                .with_class(RequestClass::Sandbox),
        )
        .await
    }

    pub async fn restart_vite(&self) -> ClientResult<GenericResponse> {
        self.call(
            RequestDescriptor::post(paths::RESTART_VITE)
                .with_body(json!({}))
                .with_class(RequestClass::Sandbox),
        )
        .await
    }

    pub async fn sandbox_files(&self) -> ClientResult<SandboxFiles> {
        self.call(RequestDescriptor::get(paths::SANDBOX_FILES)).await
    }

    /// Run a shell command in the sandbox. A non-zero exit code is returned
    /// as a normal [`CommandOutput`].
    pub async fn run_command(&self, request: &RunCommandRequest) -> ClientResult<CommandOutput> {
        self.call(RequestDescriptor::post(paths::RUN_COMMAND).with_json(request)?)
            .await
    }

    pub async fn sandbox_logs(&self) -> ClientResult<GenericResponse> {
        self.call(RequestDescriptor::get(paths::SANDBOX_LOGS)).await
    }

    pub async fn conversation_state(&self) -> ClientResult<GenericResponse> {
        self.call(RequestDescriptor::get(paths::CONVERSATION_STATE))
            .await
    }

    pub async fn reset_conversation(&self) -> ClientResult<GenericResponse> {
        self.call(RequestDescriptor::delete(paths::CONVERSATION_STATE))
            .await
    }

    pub async fn scrape_url(&self, url: &str) -> ClientResult<GenericResponse> {
        let body = ScrapeUrlRequest {
            url: url.to_string(),
        };
        self.call(RequestDescriptor::post(paths::SCRAPE_URL).with_json(&body)?)
            .await
    }

    pub async fn check_vite_errors(&self) -> ClientResult<ViteErrors> {
        self.call(RequestDescriptor::get(paths::CHECK_VITE_ERRORS))
            .await
    }

    pub async fn clear_vite_errors_cache(&self) -> ClientResult<GenericResponse> {
        self.call(RequestDescriptor::post(paths::CLEAR_VITE_ERRORS_CACHE).with_body(json!({})))
            .await
    }

    /// Scan the dev server log for unresolved imports and similar errors.
    pub async fn monitor_vite_logs(&self) -> ClientResult<ViteErrors> {
        self.call(RequestDescriptor::get(paths::MONITOR_VITE_LOGS))
            .await
    }

    pub async fn report_vite_error(
        &self,
        request: &ReportViteErrorRequest,
    ) -> ClientResult<GenericResponse> {
        self.call(RequestDescriptor::post(paths::REPORT_VITE_ERROR).with_json(request)?)
            .await
    }

    /// Install whatever packages the given sources import but the sandbox lacks.
    pub async fn detect_and_install_packages(
        &self,
        request: &DetectPackagesRequest,
    ) -> ClientResult<PackageInstallReport> {
        self.call(
            RequestDescriptor::post(paths::DETECT_AND_INSTALL_PACKAGES)
                .with_json(request)?
                .with_class(RequestClass::Sandbox),
        )
        .await
    }

    /// Archive the sandbox project as a base64 data URL.
    pub async fn create_zip(&self) -> ClientResult<ProjectZip> {
        self.call(
            RequestDescriptor::post(paths::CREATE_ZIP)
                .with_body(json!({}))
                .with_class(RequestClass::Sandbox),
        )
        .await
    }

    pub async fn scrape_screenshot(&self, url: &str) -> ClientResult<Screenshot> {
        let body = ScrapeUrlRequest {
            url: url.to_string(),
        };
        self.call(RequestDescriptor::post(paths::SCRAPE_SCREENSHOT).with_json(&body)?)
            .await
    }

    pub async fn analyze_edit_intent(
        &self,
        request: &AnalyzeEditIntentRequest,
    ) -> ClientResult<EditIntent> {
        self.call(RequestDescriptor::post(paths::ANALYZE_EDIT_INTENT).with_json(request)?)
            .await
    }

    pub async fn update_conversation(
        &self,
        update: &ConversationUpdate,
    ) -> ClientResult<GenericResponse> {
        self.call(RequestDescriptor::post(paths::CONVERSATION_STATE).with_json(update)?)
            .await
    }

    pub async fn generate_code_stream<H>(
        &self,
        request: &GenerateCodeRequest,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> ApiOutcome<StreamSummary>
    where
        H: StreamHandler + ?Sized,
    {
        self.stream_json(paths::GENERATE_CODE, request, handler, cancel)
            .await
    }

    pub async fn apply_code_stream<H>(
        &self,
        request: &ApplyCodeRequest,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> ApiOutcome<StreamSummary>
    where
        H: StreamHandler + ?Sized,
    {
        self.stream_json(paths::APPLY_CODE, request, handler, cancel)
            .await
    }

    pub async fn install_packages_stream<H>(
        &self,
        request: &InstallPackagesRequest,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> ApiOutcome<StreamSummary>
    where
        H: StreamHandler + ?Sized,
    {
        self.stream_json(paths::INSTALL_PACKAGES, request, handler, cancel)
            .await
    }

    async fn stream_json<B, H>(
        &self,
        path: &str,
        body: &B,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> ApiOutcome<StreamSummary>
    where
        B: Serialize,
        H: StreamHandler + ?Sized,
    {
        match RequestDescriptor::post(path).with_json(body) {
            Ok(descriptor) => self.stream_request(descriptor, handler, cancel).await,
            Err(err) => request_failed(handler, err),
        }
    }

    /// Send a streaming request and consume its body.
    ///
    /// The handler sees exactly one `on_error` for any failure (bad request,
    /// transport, non-2xx status, missing body, mid-stream failure) and
    /// `on_complete` only when the body ended cleanly. Cancellation reports
    /// neither.
    pub async fn stream_request<H>(
        &self,
        descriptor: RequestDescriptor,
        handler: &mut H,
        cancel: &CancellationToken,
    ) -> ApiOutcome<StreamSummary>
    where
        H: StreamHandler + ?Sized,
    {
        let descriptor = descriptor.streaming();

        let response = match self.client.send_with_cancel(&descriptor, cancel).await {
            Ok(response) => response,
            Err(ClientError::Cancelled) => {
                return ApiOutcome::failed(ClientError::Cancelled.user_message())
                    .with_data(StreamSummary::not_started());
            }
            Err(ClientError::Http { error, attempts }) => {
                handler.on_error(StreamError::Transport(error.clone()));
                let err = ClientError::Http { error, attempts };
                return ApiOutcome::failed(err.user_message())
                    .with_data(StreamSummary::not_started());
            }
            Err(err) => return request_failed(handler, err),
        };

        if !response.is_success() {
            let status = response.status;
            let message = error_message(status, response).await;
            tracing::warn!(
                "{} {} rejected with HTTP {}: {}",
                descriptor.method(),
                descriptor.path(),
                status,
                message
            );
            let err = StreamError::Rejected { status, message };
            handler.on_error(err.clone());
            return ApiOutcome::failed(err.user_message()).with_data(StreamSummary::not_started());
        }

        let mut consumer = self.client.stream_consumer();
        let state = consumer.run(response, handler, cancel).await;
        let summary = StreamSummary {
            state,
            events: consumer.events_decoded(),
            malformed_lines: consumer.malformed_lines(),
        };

        match state {
            StreamState::Ended => {
                handler.on_complete();
                ApiOutcome::ok(summary)
            }
            StreamState::Cancelled => {
                ApiOutcome::failed(ClientError::Cancelled.user_message()).with_data(summary)
            }
            _ => {
                let message = consumer
                    .last_error()
                    .map(StreamError::user_message)
                    .unwrap_or_else(|| "The stream ended unexpectedly.".to_string());
                ApiOutcome::failed(message).with_data(summary)
            }
        }
    }

    /// Send a JSON request and decode the answer.
    async fn call<T: DeserializeOwned>(&self, descriptor: RequestDescriptor) -> ClientResult<T> {
        let response = self.client.send(&descriptor).await?;
        let status = response.status;

        if !response.is_success() {
            let message = error_message(status, response).await;
            tracing::debug!(
                "{} {} failed with HTTP {}: {}",
                descriptor.method(),
                descriptor.path(),
                status,
                message
            );
            return Err(ClientError::Status { status, message });
        }

        let body = response.bytes().await?;
        let value: Value = if body.is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_slice(&body)?
        };

        if let Some(message) = backend_failure(&value) {
            return Err(ClientError::Backend { message });
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// Report a failure that happened before anything was streamed.
fn request_failed<H>(handler: &mut H, err: ClientError) -> ApiOutcome<StreamSummary>
where
    H: StreamHandler + ?Sized,
{
    tracing::warn!("Stream request failed: {}", err);
    let message = err.user_message();
    handler.on_error(StreamError::Request(message.clone()));
    ApiOutcome::failed(message).with_data(StreamSummary::not_started())
}

/// Detect the backend's in-band failure shape: `success: false` plus an
/// `error` (or, lacking a command exit code, a `message`).
fn backend_failure(value: &Value) -> Option<String> {
    let success = value.get("success").and_then(Value::as_bool);
    if success.is_none() {
        // `{"error": "...", "status": 400}` carried on a 2xx
        let status = value.get("status").and_then(Value::as_u64).unwrap_or(0);
        return match value.get("error").and_then(Value::as_str) {
            Some(error) if status >= 400 => Some(error.to_string()),
            _ => None,
        };
    }
    if success != Some(false) {
        return None;
    }
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        return Some(error.to_string());
    }
    if value.get("returncode").is_some() {
        return None;
    }
    Some(
        value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("The backend reported a failure")
            .to_string(),
    )
}

/// Best-effort message from an error response body.
async fn error_message(status: u16, response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    if let Ok(value) = serde_json::from_str::<Value>(&text) {
        for key in ["error", "message", "detail"] {
            if let Some(message) = value.get(key).and_then(Value::as_str) {
                return message.to_string();
            }
        }
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status)
    } else {
        trimmed.chars().take(ERROR_BODY_LIMIT).collect()
    }
}
