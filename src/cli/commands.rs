//! Command execution for the sandbox CLI.
//!
//! JSON commands print one [`ApiOutcome`] line. Streaming commands print one
//! line per backend event as it arrives; the final outcome goes to the log.

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::api::{ApiOutcome, SandboxApi, StreamSummary};
use crate::cli::CliCommand;
use crate::error::{ClientError, ClientResult, StreamError};
use crate::models::{ApplyCodeRequest, GenerateCodeRequest, InstallPackagesRequest, RunCommandRequest};
use crate::stream::StreamHandler;
use crate::traits::{HttpClient, HttpError};

/// Prints each event as a JSON line.
pub struct JsonLinesHandler<'a, W: Write + Send> {
    out: &'a mut W,
    events: u64,
    write_failed: bool,
}

impl<'a, W: Write + Send> JsonLinesHandler<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        Self {
            out,
            events: 0,
            write_failed: false,
        }
    }

    pub fn events(&self) -> u64 {
        self.events
    }
}

impl<W: Write + Send> StreamHandler for JsonLinesHandler<'_, W> {
    fn on_progress(&mut self, event: Value) {
        self.events += 1;
        if writeln!(self.out, "{}", event).and_then(|_| self.out.flush()).is_err()
            && !self.write_failed
        {
            self.write_failed = true;
            tracing::warn!("Failed to write event to output");
        }
    }

    fn on_error(&mut self, error: StreamError) {
        eprintln!("error [{}]: {}", error.error_code(), error.user_message());
    }

    fn on_complete(&mut self) {
        tracing::debug!("Stream complete after {} events", self.events);
    }
}

/// Run one backend command, writing its output to `out`.
///
/// Returns whether the command succeeded. Each request is bounded by the
/// advisory timeout for its class.
pub async fn execute<C, W>(
    api: &SandboxApi<C>,
    command: CliCommand,
    out: &mut W,
    cancel: &CancellationToken,
) -> Result<bool>
where
    C: HttpClient,
    W: Write + Send,
{
    let limit = api.client().config().timeout_for(command.request_class());

    match command {
        CliCommand::Health => emit(out, bounded(limit, api.health()).await),
        CliCommand::Create => emit(out, bounded(limit, api.create_sandbox()).await),
        CliCommand::Status => emit(out, bounded(limit, api.sandbox_status()).await),
        CliCommand::Kill => emit(out, bounded(limit, api.kill_sandbox()).await),
        CliCommand::Files => emit(out, bounded(limit, api.sandbox_files()).await),
        CliCommand::Run { command, cwd } => {
            let mut request = RunCommandRequest::new(command);
            if let Some(cwd) = cwd {
                request = request.with_cwd(cwd);
            }
            let result = bounded(limit, api.run_command(&request)).await;
            let exited_cleanly = matches!(&result, Ok(output) if output.success);
            Ok(emit(out, result)? && exited_cleanly)
        }
        CliCommand::Generate {
            prompt,
            model,
            edit,
        } => {
            let mut request = GenerateCodeRequest::new(prompt.join(" "));
            if let Some(model) = model {
                request = request.with_model(model);
            }
            if edit {
                request = request.as_edit();
            }
            let mut handler = JsonLinesHandler::new(out);
            let outcome = bounded_stream(
                limit,
                api.generate_code_stream(&request, &mut handler, cancel),
            )
            .await;
            Ok(report(outcome))
        }
        CliCommand::Apply {
            file,
            sandbox_id,
            edit,
        } => {
            let response = tokio::fs::read_to_string(&file)
                .await
                .wrap_err_with(|| format!("Failed to read {}", file.display()))?;
            let mut request = ApplyCodeRequest::new(response);
            if let Some(id) = sandbox_id {
                request = request.with_sandbox(id);
            }
            if edit {
                request = request.as_edit();
            }
            let mut handler = JsonLinesHandler::new(out);
            let outcome =
                bounded_stream(limit, api.apply_code_stream(&request, &mut handler, cancel)).await;
            Ok(report(outcome))
        }
        CliCommand::Install { packages } => {
            let request = InstallPackagesRequest {
                packages,
                sandbox_id: None,
            };
            let mut handler = JsonLinesHandler::new(out);
            let outcome = bounded_stream(
                limit,
                api.install_packages_stream(&request, &mut handler, cancel),
            )
            .await;
            Ok(report(outcome))
        }
    }
}

async fn bounded<T, F>(limit: Duration, request: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Http {
            error: HttpError::Timeout(format!("no answer within {:?}", limit)),
            attempts: 1,
        }),
    }
}

async fn bounded_stream<F>(limit: Duration, request: F) -> ApiOutcome<StreamSummary>
where
    F: Future<Output = ApiOutcome<StreamSummary>>,
{
    match tokio::time::timeout(limit, request).await {
        Ok(outcome) => outcome,
        Err(_) => {
            eprintln!("error: stream did not finish within {:?}", limit);
            ApiOutcome::failed(format!("Stream did not finish within {:?}", limit))
        }
    }
}

fn emit<T, W>(out: &mut W, result: ClientResult<T>) -> Result<bool>
where
    T: Serialize,
    W: Write,
{
    let outcome = ApiOutcome::from(result);
    let line = serde_json::to_string(&outcome).wrap_err("Failed to encode output")?;
    writeln!(out, "{}", line).wrap_err("Failed to write output")?;
    Ok(outcome.success)
}

fn report(outcome: ApiOutcome<StreamSummary>) -> bool {
    match (&outcome.data, &outcome.message) {
        (Some(summary), _) if outcome.success => tracing::info!(
            "Stream finished: {} events, {} malformed lines",
            summary.events,
            summary.malformed_lines
        ),
        (_, Some(message)) => tracing::warn!("Stream failed: {}", message),
        _ => tracing::warn!("Stream failed"),
    }
    outcome.success
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use crate::client::StreamingClient;
    use crate::config::ClientConfig;
    use crate::retry::RetryPolicy;
    use bytes::Bytes;
    use serde_json::json;

    const BASE: &str = "http://cli.test";

    fn api() -> SandboxApi<MockHttpClient> {
        let config = ClientConfig::default()
            .with_base_url(BASE)
            .with_retry(RetryPolicy::no_retry());
        SandboxApi::new(StreamingClient::with_transport(config, MockHttpClient::new()))
    }

    fn lines(out: &[u8]) -> Vec<Value> {
        String::from_utf8_lossy(out)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_health_prints_outcome() {
        let api = api();
        api.client().transport().set_response(
            &format!("{}/health", BASE),
            MockResponse::json(200, json!({"status": "healthy", "modules_loaded": []})),
        );

        let mut out = Vec::new();
        let ok = execute(&api, CliCommand::Health, &mut out, &CancellationToken::new())
            .await
            .unwrap();

        assert!(ok);
        let printed = lines(&out);
        assert_eq!(printed.len(), 1);
        assert_eq!(printed[0]["success"], true);
        assert_eq!(printed[0]["data"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_failed_command_exit_is_failure() {
        let api = api();
        api.client().transport().set_response(
            &format!("{}/api/run-command", BASE),
            MockResponse::json(
                200,
                json!({"success": false, "stdout": "", "stderr": "boom", "returncode": 1}),
            ),
        );

        let mut out = Vec::new();
        let ok = execute(
            &api,
            CliCommand::Run {
                command: "false".to_string(),
                cwd: None,
            },
            &mut out,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(!ok);
        assert_eq!(lines(&out)[0]["data"]["returncode"], 1);
    }

    #[tokio::test]
    async fn test_generate_prints_events() {
        let api = api();
        api.client().transport().set_response(
            &format!("{}/api/generate-ai-code-stream", BASE),
            MockResponse::Chunks(
                200,
                vec![
                    Bytes::from("data: {\"type\":\"status\",\"message\":\"Thinking\"}\n\n"),
                    Bytes::from("data: {\"type\":\"complete\"}\n\n"),
                ],
            ),
        );

        let mut out = Vec::new();
        let ok = execute(
            &api,
            CliCommand::Generate {
                prompt: vec!["a".to_string(), "todo".to_string(), "app".to_string()],
                model: None,
                edit: false,
            },
            &mut out,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(ok);
        let printed = lines(&out);
        assert_eq!(printed.len(), 2);
        assert_eq!(printed[0]["type"], "status");
        assert_eq!(printed[1]["type"], "complete");

        let sent: Value =
            serde_json::from_str(api.client().transport().get_requests()[0].body.as_deref().unwrap())
                .unwrap();
        assert_eq!(sent["prompt"], "a todo app");
    }

    #[tokio::test]
    async fn test_apply_missing_file_is_an_error() {
        let api = api();
        let mut out = Vec::new();
        let result = execute(
            &api,
            CliCommand::Apply {
                file: "/definitely/not/here.txt".into(),
                sandbox_id: None,
                edit: false,
            },
            &mut out,
            &CancellationToken::new(),
        )
        .await;
        assert!(result.is_err());
        assert!(api.client().transport().get_requests().is_empty());
    }
}
