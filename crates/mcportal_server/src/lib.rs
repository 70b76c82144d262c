//! MCPortal Bridge Server
//!
//! Owns one tool registry and an optional trace. Every request is recorded
//! on arrival, dispatched, and recorded again with its response. The HTTP
//! listener in [`http`] is a thin shell over [`BridgeServer::handle_request`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod error;
pub mod http;
pub mod request;

pub use bridge::BridgeServer;
pub use error::{ServerError, ServerResult};
pub use request::{ErrorBody, InvokeRequest, InvokeResponse};
