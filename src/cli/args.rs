//! Command-line argument parsing for the sandbox CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::RequestClass;

const ENV_HELP: &str = "\
Environment:
  SANDBOX_API_URL   Backend base URL (default http://localhost:8000)
  RUST_LOG          Log filter (default sandbox_client=info)";

/// Streaming client for the AI sandbox backend
#[derive(Parser, Debug)]
#[command(name = "sandbox-client", version, about, after_help = ENV_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Backend command to execute.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Check backend health
    Health,
    /// Create a sandbox
    Create,
    /// Show sandbox status
    Status,
    /// Kill the active sandbox
    Kill,
    /// List sandbox files
    Files,
    /// Run a shell command in the sandbox
    Run {
        /// Working directory inside the sandbox
        #[arg(long)]
        cwd: Option<String>,
        /// Command line, passed to the sandbox shell verbatim (quote it)
        command: String,
    },
    /// Stream code generation for a prompt
    Generate {
        /// Model identifier
        #[arg(long)]
        model: Option<String>,
        /// Edit the existing project instead of generating a new one
        #[arg(long)]
        edit: bool,
        /// Prompt words, joined with single spaces
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// Stream application of a generated response read from a file
    Apply {
        /// Target sandbox
        #[arg(long = "sandbox")]
        sandbox_id: Option<String>,
        #[arg(long)]
        edit: bool,
        file: PathBuf,
    },
    /// Stream package installation
    Install {
        #[arg(required = true)]
        packages: Vec<String>,
    },
}

impl CliCommand {
    /// Advisory timeout class for the request this command makes.
    pub fn request_class(&self) -> RequestClass {
        match self {
            CliCommand::Create | CliCommand::Kill => RequestClass::Sandbox,
            CliCommand::Generate { .. } | CliCommand::Apply { .. } | CliCommand::Install { .. } => {
                RequestClass::Streaming
            }
            _ => RequestClass::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<CliCommand, clap::Error> {
        Cli::try_parse_from(std::iter::once("sandbox-client").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse(&["health"]).unwrap(), CliCommand::Health);
        assert_eq!(parse(&["create"]).unwrap(), CliCommand::Create);
        assert_eq!(parse(&["status"]).unwrap(), CliCommand::Status);
        assert_eq!(parse(&["kill"]).unwrap(), CliCommand::Kill);
        assert_eq!(parse(&["files"]).unwrap(), CliCommand::Files);
    }

    #[test]
    fn test_run_keeps_command_verbatim() {
        assert_eq!(
            parse(&["run", "--cwd", "/app", "echo 'a  b' | wc -c"]).unwrap(),
            CliCommand::Run {
                command: "echo 'a  b' | wc -c".to_string(),
                cwd: Some("/app".to_string()),
            }
        );
    }

    #[test]
    fn test_run_rejects_split_command() {
        let err = parse(&["run", "npm", "install"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_generate_options_and_prompt() {
        assert_eq!(
            parse(&["generate", "--model", "openai/gpt-4.1", "--edit", "add", "a", "navbar"])
                .unwrap(),
            CliCommand::Generate {
                prompt: vec!["add".to_string(), "a".to_string(), "navbar".to_string()],
                model: Some("openai/gpt-4.1".to_string()),
                edit: true,
            }
        );
    }

    #[test]
    fn test_generate_requires_prompt() {
        let err = parse(&["generate", "--edit"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_apply_with_sandbox() {
        assert_eq!(
            parse(&["apply", "--sandbox", "sbx_1", "response.txt"]).unwrap(),
            CliCommand::Apply {
                file: PathBuf::from("response.txt"),
                sandbox_id: Some("sbx_1".to_string()),
                edit: false,
            }
        );
    }

    #[test]
    fn test_install_requires_packages() {
        assert_eq!(
            parse(&["install", "zod", "clsx"]).unwrap(),
            CliCommand::Install {
                packages: vec!["zod".to_string(), "clsx".to_string()]
            }
        );
        assert!(parse(&["install"]).is_err());
    }

    #[test]
    fn test_unknown_command_and_missing_command() {
        assert_eq!(
            parse(&["frobnicate"]).unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
        assert!(parse(&[]).is_err());
    }

    #[test]
    fn test_version_flag() {
        assert_eq!(parse(&["--version"]).unwrap_err().kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_request_classes() {
        assert_eq!(CliCommand::Create.request_class(), RequestClass::Sandbox);
        assert_eq!(CliCommand::Kill.request_class(), RequestClass::Sandbox);
        assert_eq!(
            CliCommand::Install {
                packages: vec!["zod".to_string()]
            }
            .request_class(),
            RequestClass::Streaming
        );
        assert_eq!(CliCommand::Files.request_class(), RequestClass::Default);
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
