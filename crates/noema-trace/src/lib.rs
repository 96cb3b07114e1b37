//! Correlation and timing primitives for the noema invocation boundary.
//!
//! Every invocation accepted by the boundary gets exactly one server-side
//! trace identifier, an ISO-8601 timestamp and a monotonic execution timer.
//! These types are shared by the agent and anything that needs to correlate
//! its logs.
//!
//! # Usage
//!
//! 1. Call [`new_trace_id`] once when an invocation is accepted.
//! 2. Build an [`InvocationContext`] from it and the caller's identifiers.
//! 3. Wrap the execution step in a [`Stopwatch`] and read `elapsed_ms()`.
//!
//! ```
//! use noema_trace::{InvocationContext, Stopwatch};
//!
//! let ctx = InvocationContext::new("session-1", "request-1", "echo");
//! let watch = Stopwatch::start();
//! // ... run the task ...
//! let elapsed = watch.elapsed_ms();
//! assert_eq!(ctx.trace_id.as_str().len(), 36);
//! assert!(elapsed < 60_000);
//! ```

pub mod clock;
pub mod context;
pub mod trace;

pub use clock::{elapsed_ms, now_iso8601, Stopwatch};
pub use context::InvocationContext;
pub use trace::{new_trace_id, TraceId};
