//! MCPortal Event Trace
//!
//! Append-only traces of timestamped events. Each trace is a JSON Lines
//! file named `<trace_id>.jsonl`; every event is flushed to it as soon as
//! it is recorded. The store reader rebuilds listings and per-trace
//! details from those files.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod event;
pub mod store;
pub mod tracer;

pub use error::{TraceError, TraceResult};
pub use event::{TraceEvent, count_event_types};
pub use store::{TRACE_FILE_EXTENSION, TraceDetails, TraceListing, TraceLookup, TraceStore};
pub use tracer::{TraceSummary, Tracer};
