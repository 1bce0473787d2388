//! Sandbox lifecycle payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub modules_loaded: Vec<String>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Identifies a backend-managed sandbox. The id is opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxHandle {
    pub sandbox_id: String,
    /// Preview URL of the dev server running inside the sandbox
    #[serde(default)]
    pub url: Option<String>,
}

/// `POST /api/create-ai-sandbox`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSandboxResponse {
    #[serde(flatten)]
    pub sandbox: SandboxHandle,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub vite_running: bool,
    #[serde(default)]
    pub tailwind_configured: bool,
}

/// Details reported for an active sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxData {
    #[serde(default)]
    pub sandbox_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub files_tracked: Vec<String>,
    #[serde(default)]
    pub last_health_check: Option<String>,
}

/// `GET /api/sandbox-status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxStatus {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub healthy: bool,
    #[serde(default)]
    pub sandbox_data: Option<SandboxData>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/kill-sandbox`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillSandboxResponse {
    #[serde(default)]
    pub sandbox_killed: bool,
    #[serde(default)]
    pub files_cleared: bool,
    #[serde(default)]
    pub state_cleared: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// `GET /api/get-sandbox-files`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SandboxFiles {
    /// Path to file content
    #[serde(default)]
    pub files: BTreeMap<String, Value>,
    #[serde(default)]
    pub structure: String,
    #[serde(default)]
    pub file_count: usize,
    #[serde(default)]
    pub manifest: Option<Value>,
}

/// Free-form backend answer for endpoints without a fixed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}
