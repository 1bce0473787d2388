//! Sandbox backend API
//!
//! - `sandbox` - [`SandboxApi`], one method per backend endpoint
//! - `outcome` - [`ApiOutcome`] and [`StreamSummary`] result types
//! - [`paths`] - endpoint path suffixes

mod outcome;
mod sandbox;

pub use outcome::{ApiOutcome, StreamSummary};
pub use sandbox::SandboxApi;

/// Endpoint paths, appended to the configured base URL.
pub mod paths {
    pub const HEALTH: &str = "/health";
    pub const CREATE_SANDBOX: &str = "/api/create-ai-sandbox";
    pub const SANDBOX_STATUS: &str = "/api/sandbox-status";
    pub const KILL_SANDBOX: &str = "/api/kill-sandbox";
    pub const RESTART_VITE: &str = "/api/restart-vite";
    pub const SANDBOX_FILES: &str = "/api/get-sandbox-files";
    pub const RUN_COMMAND: &str = "/api/run-command";
    pub const SANDBOX_LOGS: &str = "/api/sandbox-logs";
    pub const CONVERSATION_STATE: &str = "/api/conversation-state";
    pub const SCRAPE_URL: &str = "/api/scrape-url-enhanced";
    pub const SCRAPE_SCREENSHOT: &str = "/api/scrape-screenshot";
    pub const CHECK_VITE_ERRORS: &str = "/api/check-vite-errors";
    pub const CLEAR_VITE_ERRORS_CACHE: &str = "/api/clear-vite-errors-cache";
    pub const MONITOR_VITE_LOGS: &str = "/api/monitor-vite-logs";
    pub const REPORT_VITE_ERROR: &str = "/api/report-vite-error";
    pub const DETECT_AND_INSTALL_PACKAGES: &str = "/api/detect-and-install-packages";
    pub const CREATE_ZIP: &str = "/api/create-zip";
    pub const ANALYZE_EDIT_INTENT: &str = "/api/analyze-edit-intent";
    pub const GENERATE_CODE: &str = "/api/generate-ai-code-stream";
    pub const APPLY_CODE: &str = "/api/apply-ai-code-stream";
    pub const INSTALL_PACKAGES: &str = "/api/install-packages";
}
