//! Noema agent CLI
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP boundary
//! noema-agent serve --port 8000
//!
//! # Execute a request file in-process
//! noema-agent invoke --file request.json --output text --events
//!
//! # Post a request file to a running agent
//! noema-agent remote --url http://localhost:8000 --file request.yaml
//! ```
//!
//! # Exit Codes
//!
//! - 0: Invocation succeeded
//! - 1: Invocation returned `status=error`
//! - 2: Invalid arguments or configuration
//! - 3: Request failed schema validation
//! - 4: Request file not found or unreadable
//! - 5: Remote agent error
//! - 10: Internal error

use anyhow::Context;
use clap::Parser;
use noema_agent::telemetry::logging::init_logging;
use noema_agent::{run_cli, NoemaCli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = NoemaCli::parse();
    let config = cli
        .resolve_config()
        .context("Failed to load configuration")?;

    init_logging(config.log_format, cli.verbose);

    let exit_code = run_cli(cli, config).await;
    std::process::exit(exit_code.into());
}
