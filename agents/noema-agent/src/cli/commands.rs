//! CLI command definitions for the noema agent

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::output::{self, OutputFormat};
use super::ExitCode;
use crate::client::NoemaClient;
use crate::config::AgentConfig;
use crate::contracts::{ExecutionStatus, InvocationResponse};
use crate::engine::InvocationExecutor;
use crate::error::{AgentError, Result};
use crate::telemetry::{FanoutEmitter, MemoryEmitter, TracingEmitter};
use crate::validation::validate_request;

/// Noema agent
///
/// Stateless invocation boundary: validates requests, executes registered
/// tasks, and returns a traced response.
#[derive(Parser, Debug)]
#[command(name = "noema-agent")]
#[command(about = "Noema agent - stateless invocation boundary", long_about = None)]
#[command(version)]
pub struct NoemaCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// TOML configuration file, overlaid by environment variables
    #[arg(long, global = true, env = "NOEMA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: NoemaCommands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum NoemaCommands {
    /// Run the HTTP boundary
    Serve {
        /// Address to bind (overrides NOEMA_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Execute a request file in-process
    ///
    /// The file holds one InvocationRequest as JSON or YAML. Use `-` for stdin.
    Invoke {
        /// Request file (`.json`, `.yaml`, `.yml` or `-`)
        #[arg(short, long)]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        output: OutputFormat,

        /// Also print the lifecycle events the invocation emitted
        #[arg(long)]
        events: bool,
    },

    /// Post a request file to a running agent
    Remote {
        /// Base URL of the agent
        #[arg(long, default_value = "http://localhost:8000")]
        url: String,

        /// Request file (`.json`, `.yaml`, `.yml` or `-`)
        #[arg(short, long)]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "json")]
        output: OutputFormat,

        /// Request timeout in milliseconds
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
    },
}

impl NoemaCli {
    /// Resolve configuration: file, then environment, then flags
    pub fn resolve_config(&self) -> Result<AgentConfig> {
        let mut config = AgentConfig::load(self.config.as_deref())?;
        if let NoemaCommands::Serve { host, port } = &self.command {
            if let Some(host) = host {
                config.host = host.clone();
            }
            if let Some(port) = port {
                config.port = *port;
            }
        }
        Ok(config)
    }
}

/// Execute the invoke command
pub fn execute_invoke(file: &Path, format: OutputFormat, show_events: bool) -> Result<ExitCode> {
    let body = read_request_file(file)?;

    let request = match validate_request(&body) {
        Ok(request) => request,
        Err(rejection) => {
            output::render_rejection(&rejection.violations, format)?;
            return Ok(ExitCode::Rejected);
        }
    };

    let recorder = Arc::new(MemoryEmitter::new());
    let emitter = FanoutEmitter::new()
        .with(Arc::new(TracingEmitter))
        .with(recorder.clone());
    let executor = InvocationExecutor::with_emitter(Arc::new(emitter));

    let response = executor.execute(&request);
    let events = if show_events {
        Some(recorder.events())
    } else {
        None
    };

    output::render_response(&response, events.as_deref(), format)?;
    Ok(exit_code_for(&response))
}

/// Execute the remote command
pub async fn execute_remote(
    url: &str,
    file: &Path,
    format: OutputFormat,
    timeout_ms: u64,
) -> Result<ExitCode> {
    let body = read_request_file(file)?;
    let client = NoemaClient::with_timeout(url, std::time::Duration::from_millis(timeout_ms))?;

    match client.invoke_raw(&body).await {
        Ok(response) => {
            output::render_response(&response, None, format)?;
            Ok(exit_code_for(&response))
        }
        Err(err) => match err.violations() {
            Some(violations) => {
                output::render_rejection(&violations, format)?;
                Ok(ExitCode::Rejected)
            }
            None => Err(err.into()),
        },
    }
}

fn exit_code_for(response: &InvocationResponse) -> ExitCode {
    match response.status {
        ExecutionStatus::Success => ExitCode::Success,
        ExecutionStatus::Error => ExitCode::ExecutionError,
    }
}

/// Read a request body from a file or stdin
fn read_request_file(path: &Path) -> Result<Value> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return parse_request(&content, None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        AgentError::FileError(format!(
            "Failed to read request file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());
    parse_request(&content, extension.as_deref())
}

fn parse_request(content: &str, extension: Option<&str>) -> Result<Value> {
    match extension {
        Some("json") => Ok(serde_json::from_str(content)?),
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(content)?),
        Some(other) => Err(AgentError::invalid_input(format!(
            "Unsupported file format: {}. Supported formats: json, yaml, yml",
            other
        ))),
        // stdin: JSON first, YAML as fallback
        None => match serde_json::from_str(content) {
            Ok(value) => Ok(value),
            Err(_) => Ok(serde_yaml::from_str(content)?),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        NoemaCli::command().debug_assert();
    }

    #[test]
    fn test_parse_request_json() {
        let value = parse_request(r#"{"task_type": "echo"}"#, Some("json")).unwrap();
        assert_eq!(value["task_type"], "echo");
    }

    #[test]
    fn test_parse_request_yaml() {
        let value = parse_request("task_type: echo\npayload:\n  a: 1\n", Some("yml")).unwrap();
        assert_eq!(value["payload"]["a"], 1);
    }

    #[test]
    fn test_parse_request_unsupported() {
        let result = parse_request("", Some("xml"));
        assert!(matches!(result, Err(AgentError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_request_stdin_fallback() {
        let value = parse_request("session_id: s1", None).unwrap();
        assert_eq!(value["session_id"], "s1");
    }

    #[test]
    fn test_serve_flags_override_config() {
        let cli = NoemaCli::parse_from([
            "noema-agent",
            "serve",
            "--host",
            "127.0.0.1",
            "--port",
            "9001",
        ]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9001);
    }

    #[test]
    fn test_invoke_file_exit_codes() {
        let dir = tempfile::tempdir().unwrap();

        let ok = dir.path().join("ok.json");
        std::fs::write(
            &ok,
            r#"{"session_id":"s1","request_id":"r1","task_type":"echo","payload":{"x":1}}"#,
        )
        .unwrap();
        assert_eq!(
            execute_invoke(&ok, OutputFormat::Json, false).unwrap(),
            ExitCode::Success
        );

        let unsupported = dir.path().join("unsupported.yaml");
        std::fs::write(
            &unsupported,
            "session_id: s1\nrequest_id: r1\ntask_type: translate\n",
        )
        .unwrap();
        assert_eq!(
            execute_invoke(&unsupported, OutputFormat::Text, true).unwrap(),
            ExitCode::ExecutionError
        );

        let rejected = dir.path().join("rejected.json");
        std::fs::write(&rejected, r#"{"session_id":"s1","trace_id":"t"}"#).unwrap();
        assert_eq!(
            execute_invoke(&rejected, OutputFormat::Json, false).unwrap(),
            ExitCode::Rejected
        );
    }

    #[test]
    fn test_invoke_missing_file() {
        let missing = Path::new("/nonexistent/request.json");
        let result = execute_invoke(missing, OutputFormat::Json, false);
        assert!(matches!(result, Err(AgentError::FileError(_))));
    }
}
