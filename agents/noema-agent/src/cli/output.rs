//! Output formatting for the noema agent CLI
//!
//! JSON for machine processing, colored text for people.

use clap::ValueEnum;
use colored::Colorize;
use serde_json::json;
use std::io::{self, Write};

use crate::contracts::{InvocationEvent, InvocationResponse};
use crate::error::Result;
use crate::validation::FieldViolation;

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// Human-readable summary with colors
    Text,
}

/// Print an invocation response, optionally with the events it emitted
pub fn render_response(
    response: &InvocationResponse,
    events: Option<&[InvocationEvent]>,
    format: OutputFormat,
) -> Result<()> {
    let mut stdout = io::stdout();
    write_response(&mut stdout, response, events, format)?;
    stdout.flush().ok();
    Ok(())
}

/// Print the violations of a rejected request
pub fn render_rejection(violations: &[FieldViolation], format: OutputFormat) -> Result<()> {
    let mut stdout = io::stdout();
    write_rejection(&mut stdout, violations, format)?;
    stdout.flush().ok();
    Ok(())
}

pub fn write_response<W: Write>(
    out: &mut W,
    response: &InvocationResponse,
    events: Option<&[InvocationEvent]>,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = match events {
                Some(events) => json!({ "response": response, "events": events }),
                None => serde_json::to_value(response)?,
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        OutputFormat::Text => {
            let status = if response.is_success() {
                response.status.as_str().green().bold()
            } else {
                response.status.as_str().red().bold()
            };
            writeln!(out, "{} {}", "status:".cyan(), status)?;
            writeln!(out, "{} {}", "trace_id:".cyan(), response.trace_id)?;
            writeln!(out, "{} {}", "request_id:".cyan(), response.request_id)?;
            writeln!(
                out,
                "{} {}",
                "execution_time:".cyan(),
                format!("{} ms", response.execution_time_ms).dimmed()
            )?;

            if let Some(error) = &response.error {
                let recoverable = if error.recoverable { "recoverable" } else { "not recoverable" };
                writeln!(
                    out,
                    "{} [{}] {} ({})",
                    "error:".red(),
                    error.code,
                    error.message,
                    recoverable
                )?;
            } else {
                writeln!(
                    out,
                    "{} {}",
                    "result:".cyan(),
                    serde_json::to_string(&response.result)?
                )?;
            }

            if !response.evidence.is_empty() {
                writeln!(out, "{}", "evidence:".cyan())?;
                for item in &response.evidence {
                    let source =
                        format!("{}:{} @ {}", item.source_type, item.source_id, item.location);
                    match item.score {
                        Some(score) => {
                            writeln!(out, "  - {} ({:.2}): {}", source, score, item.snippet)?
                        }
                        None => writeln!(out, "  - {}: {}", source, item.snippet)?,
                    }
                }
            }

            if let Some(events) = events {
                writeln!(out, "{}", "events:".cyan())?;
                for event in events {
                    let name = if event.is_error() {
                        event.event_name.as_str().red()
                    } else {
                        event.event_name.as_str().normal()
                    };
                    writeln!(out, "  {} {}", event.timestamp.dimmed(), name)?;
                }
            }
        }
    }
    Ok(())
}

pub fn write_rejection<W: Write>(
    out: &mut W,
    violations: &[FieldViolation],
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = json!({ "detail": violations });
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
        }
        OutputFormat::Text => {
            writeln!(out, "{}", "request rejected".red().bold())?;
            for violation in violations {
                let field = if violation.field.is_empty() {
                    "<body>"
                } else {
                    violation.field.as_str()
                };
                writeln!(
                    out,
                    "  {} {}: {}",
                    "x".red(),
                    field.yellow(),
                    violation.message
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{ErrorDetail, Payload};
    use crate::validation::ViolationCode;
    use noema_trace::InvocationContext;

    fn render(response: &InvocationResponse, format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_response(&mut buf, response, None, format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Json);
    }

    #[test]
    fn test_json_response_round_trips() {
        let ctx = InvocationContext::new("s1", "r1", "echo");
        let response = InvocationResponse::success(&ctx, Payload::new(), vec![], 3);

        let text = render(&response, OutputFormat::Json);
        let parsed: InvocationResponse = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.trace_id, response.trace_id);
    }

    #[test]
    fn test_text_error_response() {
        let ctx = InvocationContext::new("s1", "r1", "translate");
        let response = InvocationResponse::failure(&ctx, ErrorDetail::unsupported_task(&ctx), 0);

        let text = render(&response, OutputFormat::Text);
        assert!(text.contains("E-EXEC-001"));
        assert!(text.contains("Unsupported task type: translate"));
        assert!(text.contains(ctx.trace_id.as_str()));
    }

    #[test]
    fn test_rejection_json() {
        let violations = vec![FieldViolation {
            field: "task_type".to_string(),
            code: ViolationCode::RequiredFieldMissing,
            message: "task_type is required".to_string(),
        }];
        let mut buf = Vec::new();
        write_rejection(&mut buf, &violations, OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["detail"][0]["code"], "REQUIRED_FIELD_MISSING");
    }
}
