//! MCPortal Core Types
//!
//! Identifiers, wall-clock timestamps, configuration, and the shared error
//! type. This crate performs no tool dispatch and writes no traces.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod id;
pub mod time;

// Re-exports
pub use config::{PortalConfig, ServerSettings, TracingSettings, default_storage_path};
pub use error::{CoreError, CoreResult};
pub use id::TraceId;
pub use time::Timestamp;
