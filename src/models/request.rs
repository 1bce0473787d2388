//! Request bodies sent to the backend, and the command result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Working directory the backend uses when none is given.
pub const DEFAULT_SANDBOX_CWD: &str = "/home/user/app";

/// Body of `POST /api/run-command`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCommandRequest {
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
}

impl RunCommandRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            cwd: None,
        }
    }

    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

/// Result of a command run inside the sandbox. A non-zero exit code is a
/// normal result here, not a client error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandOutput {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub returncode: i32,
}

/// Body of `POST /api/generate-ai-code-stream`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default)]
    pub is_edit: bool,
}

impl GenerateCodeRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            context: None,
            is_edit: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    pub fn as_edit(mut self) -> Self {
        self.is_edit = true;
        self
    }
}

/// Body of `POST /api/apply-ai-code-stream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCodeRequest {
    /// Raw generated response containing file blocks
    pub response: String,
    #[serde(default)]
    pub is_edit: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_id: Option<String>,
}

impl ApplyCodeRequest {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            is_edit: false,
            packages: Vec::new(),
            sandbox_id: None,
        }
    }

    pub fn with_packages(mut self, packages: Vec<String>) -> Self {
        self.packages = packages;
        self
    }

    pub fn with_sandbox(mut self, sandbox_id: impl Into<String>) -> Self {
        self.sandbox_id = Some(sandbox_id.into());
        self
    }

    pub fn as_edit(mut self) -> Self {
        self.is_edit = true;
        self
    }
}

/// Body of `POST /api/install-packages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallPackagesRequest {
    pub packages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_id: Option<String>,
}

/// Body of `POST /api/scrape-url-enhanced`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeUrlRequest {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_run_command_omits_missing_cwd() {
        let body = serde_json::to_value(RunCommandRequest::new("ls -la")).unwrap();
        assert_eq!(body, json!({"command": "ls -la"}));

        let body =
            serde_json::to_value(RunCommandRequest::new("ls").with_cwd(DEFAULT_SANDBOX_CWD)).unwrap();
        assert_eq!(body, json!({"command": "ls", "cwd": "/home/user/app"}));
    }

    #[test]
    fn test_command_output_nonzero_exit() {
        let output: CommandOutput = serde_json::from_value(json!({
            "success": false,
            "stdout": "",
            "stderr": "ls: cannot access 'x'",
            "returncode": 2
        }))
        .unwrap();
        assert!(!output.success);
        assert_eq!(output.returncode, 2);
    }

    #[test]
    fn test_generate_request_wire_names() {
        let body = serde_json::to_value(
            GenerateCodeRequest::new("a landing page")
                .with_model("openai/gpt-4o-mini")
                .as_edit(),
        )
        .unwrap();
        assert_eq!(
            body,
            json!({"prompt": "a landing page", "model": "openai/gpt-4o-mini", "isEdit": true})
        );
    }

    #[test]
    fn test_apply_request_wire_names() {
        let body = serde_json::to_value(
            ApplyCodeRequest::new("<file path=\"src/App.jsx\">...</file>")
                .with_packages(vec!["react-icons".to_string()])
                .with_sandbox("sbx-1"),
        )
        .unwrap();
        assert_eq!(body["sandboxId"], "sbx-1");
        assert_eq!(body["isEdit"], false);
        assert_eq!(body["packages"], json!(["react-icons"]));
    }

    #[test]
    fn test_install_request_wire_names() {
        let body = serde_json::to_value(InstallPackagesRequest {
            packages: vec!["zod".to_string()],
            sandbox_id: Some("sbx-9".to_string()),
        })
        .unwrap();
        assert_eq!(body, json!({"packages": ["zod"], "sandboxId": "sbx-9"}));
    }
}
