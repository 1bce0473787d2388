//! Dev-server diagnostics, package detection, export and edit analysis.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `GET /api/check-vite-errors` and `GET /api/monitor-vite-logs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViteErrors {
    #[serde(default)]
    pub has_errors: bool,
    /// Error records as reported; their shape depends on the detector
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /api/report-vite-error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportViteErrorRequest {
    /// Raw error text from the browser or dev server
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl ReportViteErrorRequest {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Body of `POST /api/detect-and-install-packages`: file path to source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetectPackagesRequest {
    pub files: BTreeMap<String, String>,
}

impl DetectPackagesRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }
}

/// Result of `POST /api/detect-and-install-packages`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInstallReport {
    #[serde(default)]
    pub packages_installed: Vec<String>,
    #[serde(default)]
    pub packages_failed: Vec<String>,
    #[serde(default)]
    pub packages_already_installed: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub logs: Option<String>,
}

/// `POST /api/create-zip`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectZip {
    /// `data:application/zip;base64,...`
    pub data_url: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/scrape-screenshot`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Screenshot {
    /// Image URL or data URL
    pub screenshot: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Body of `POST /api/analyze-edit-intent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeEditIntentRequest {
    pub prompt: String,
    /// File manifest as returned by `GET /api/get-sandbox-files`
    pub manifest: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl AnalyzeEditIntentRequest {
    pub fn new(prompt: impl Into<String>, manifest: Value) -> Self {
        Self {
            prompt: prompt.into(),
            manifest,
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Result of `POST /api/analyze-edit-intent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditIntent {
    pub edit_context: Value,
    #[serde(default)]
    pub file_analysis: Option<Value>,
    #[serde(default)]
    pub strategy: Option<Value>,
}

impl EditIntent {
    /// Files the backend plans to edit, if it listed any.
    pub fn primary_files(&self) -> Vec<&str> {
        self.edit_context
            .get("primaryFiles")
            .and_then(Value::as_array)
            .map(|files| files.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Action for `POST /api/conversation-state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversationAction {
    /// Start a fresh conversation
    Reset,
    /// Trim old messages and edits
    ClearOld,
    /// Merge `data` into the current conversation
    Update,
}

/// Body of `POST /api/conversation-state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationUpdate {
    pub action: ConversationAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ConversationUpdate {
    pub fn new(action: ConversationAction) -> Self {
        Self { action, data: None }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}
