//! CLI module for the noema agent
//!
//! `serve` runs the HTTP boundary, `invoke` runs the executor in-process on
//! a request file, and `remote` posts a request file to a running agent.

pub mod commands;
pub mod output;

pub use commands::{NoemaCli, NoemaCommands};
pub use output::OutputFormat;

use crate::config::AgentConfig;
use crate::error::AgentError;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Invocation succeeded
    Success = 0,
    /// Invocation ran and returned `status=error`
    ExecutionError = 1,
    /// Invalid arguments or configuration
    InvalidInput = 2,
    /// Request failed schema validation
    Rejected = 3,
    /// Request file not found or unreadable
    FileError = 4,
    /// Remote agent unreachable or misbehaving
    RemoteError = 5,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    pub fn from_error(err: &AgentError) -> Self {
        match err {
            AgentError::InvalidInput(_) | AgentError::ConfigError(_) => ExitCode::InvalidInput,
            AgentError::FileError(_) | AgentError::ParseError(_) => ExitCode::FileError,
            AgentError::ClientError(_) => ExitCode::RemoteError,
            AgentError::InternalError(_) => ExitCode::InternalError,
        }
    }
}

/// Run the parsed command against the resolved configuration
pub async fn run(cli: NoemaCli, config: AgentConfig) -> Result<ExitCode, AgentError> {
    match cli.command {
        NoemaCommands::Serve { .. } => {
            crate::handler::serve(config).await?;
            Ok(ExitCode::Success)
        }
        NoemaCommands::Invoke {
            file,
            output,
            events,
        } => commands::execute_invoke(&file, output, events),
        NoemaCommands::Remote {
            url,
            file,
            output,
            timeout_ms,
        } => commands::execute_remote(&url, &file, output, timeout_ms).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_conversion() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::ExecutionError), 1);
        assert_eq!(i32::from(ExitCode::Rejected), 3);
    }

    #[test]
    fn test_exit_code_from_error() {
        assert_eq!(
            ExitCode::from_error(&AgentError::FileError("missing".into())),
            ExitCode::FileError
        );
        assert_eq!(
            ExitCode::from_error(&AgentError::config_error("bad port")),
            ExitCode::InvalidInput
        );
        assert_eq!(
            ExitCode::from_error(&AgentError::InternalError("boom".into())),
            ExitCode::InternalError
        );
    }
}
