//! Backend payloads.
//!
//! Wire names follow the backend (mostly camelCase); Rust field names are
//! snake_case. Unknown fields are ignored so backend additions never break
//! decoding.

mod project;
mod request;
mod sandbox;

pub use project::{
    AnalyzeEditIntentRequest, ConversationAction, ConversationUpdate, DetectPackagesRequest,
    EditIntent, PackageInstallReport, ProjectZip, ReportViteErrorRequest, Screenshot, ViteErrors,
};
pub use request::{
    ApplyCodeRequest, CommandOutput, GenerateCodeRequest, InstallPackagesRequest,
    RunCommandRequest, ScrapeUrlRequest, DEFAULT_SANDBOX_CWD,
};
pub use sandbox::{
    CreateSandboxResponse, GenericResponse, HealthResponse, KillSandboxResponse, SandboxData,
    SandboxFiles, SandboxHandle, SandboxStatus,
};
