//! Trace events.

use indexmap::IndexMap;
use mcportal_core::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn unknown_event_type() -> String {
    "unknown".to_string()
}

/// One recorded event. Immutable once appended to a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Wall-clock time of recording
    pub timestamp: Timestamp,
    /// Seconds since the trace started
    #[serde(default)]
    pub elapsed_seconds: f64,
    /// Free-form tag, e.g. `request_received`
    #[serde(default = "unknown_event_type")]
    pub event_type: String,
    /// Arbitrary payload
    #[serde(default)]
    pub data: Value,
}

impl TraceEvent {
    /// Create a new event
    #[must_use]
    pub fn new(
        timestamp: Timestamp,
        elapsed_seconds: f64,
        event_type: impl Into<String>,
        data: Value,
    ) -> Self {
        Self {
            timestamp,
            elapsed_seconds,
            event_type: event_type.into(),
            data,
        }
    }

    /// Encode as one JSON line, without the trailing newline
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be serialized
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decode from one JSON line
    ///
    /// # Errors
    ///
    /// Returns error if the line is not a valid event
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// Count events per type, in first-seen order
#[must_use]
pub fn count_event_types<'a, I>(events: I) -> IndexMap<String, usize>
where
    I: IntoIterator<Item = &'a TraceEvent>,
{
    let mut counts = IndexMap::new();
    for event in events {
        *counts.entry(event.event_type.clone()).or_insert(0) += 1;
    }
    counts
}
