//! Trace store reader.
//!
//! Read-side view over a storage directory of trace files. Used by
//! reporting code; it never writes.

use crate::error::{TraceError, TraceResult};
use crate::event::{TraceEvent, count_event_types};
use indexmap::IndexMap;
use mcportal_core::default_storage_path;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Extension of trace files
pub const TRACE_FILE_EXTENSION: &str = "jsonl";

/// Listing entry for one stored trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceListing {
    /// Trace identifier (file stem)
    pub trace_id: String,
    /// Timestamp of the first event; empty if unreadable
    pub start_time: String,
    /// Number of non-empty lines
    pub event_count: usize,
}

/// Full reconstruction of one stored trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDetails {
    /// Trace identifier
    pub trace_id: String,
    /// Timestamp of the first event; empty when there are no events
    pub start_time: String,
    /// Timestamp of the last event; empty with fewer than two events
    pub end_time: String,
    /// Seconds between first and last event; `None` with fewer than two
    pub duration: Option<f64>,
    /// Number of parsed events
    pub event_count: usize,
    /// Events per type
    pub event_types: IndexMap<String, usize>,
    /// Parsed events in file order
    pub events: Vec<TraceEvent>,
}

/// Outcome of a detail lookup. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraceLookup {
    /// Trace found and parsed
    Found(Box<TraceDetails>),
    /// Trace missing or unreadable
    Failed {
        /// Human-readable reason
        error: String,
    },
}

impl TraceLookup {
    /// The details, if found
    #[must_use]
    pub fn details(&self) -> Option<&TraceDetails> {
        match self {
            Self::Found(details) => Some(details),
            Self::Failed { .. } => None,
        }
    }

    /// The error message, if the lookup failed
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Found(_) => None,
            Self::Failed { error } => Some(error),
        }
    }
}

/// Reader over a directory of trace files
#[derive(Debug, Clone)]
pub struct TraceStore {
    root: PathBuf,
}

impl TraceStore {
    /// Create a reader over `root`. The directory need not exist.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a reader over the default storage directory
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if no home directory exists
    pub fn open_default() -> TraceResult<Self> {
        default_storage_path()
            .map(Self::new)
            .map_err(|err| TraceError::StorageUnavailable {
                path: PathBuf::new(),
                reason: err.to_string(),
            })
    }

    /// Storage directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds `trace_id`, if the id is a plain file stem
    #[must_use]
    pub fn trace_path(&self, trace_id: &str) -> Option<PathBuf> {
        let plain = !trace_id.is_empty()
            && !trace_id.contains(['/', '\\'])
            && trace_id != "."
            && trace_id != "..";
        plain.then(|| self.root.join(format!("{}.{}", trace_id, TRACE_FILE_EXTENSION)))
    }

    /// List stored traces, newest first
    ///
    /// Only the first line of each file is parsed. Traces whose start time
    /// cannot be read sort last. A missing directory lists as empty.
    ///
    /// # Errors
    ///
    /// Returns `Read` if the directory exists but cannot be listed
    pub fn list_traces(&self) -> TraceResult<Vec<TraceListing>> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(self.read_error(&self.root, &err)),
        };

        let mut traces = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    warn!(path = %self.root.display(), error = %err, "Skipping directory entry");
                    continue;
                }
            };
            if path.extension().and_then(|ext| ext.to_str()) != Some(TRACE_FILE_EXTENSION)
                || !path.is_file()
            {
                continue;
            }
            let Some(trace_id) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match scan_listing(&path, trace_id) {
                Ok(listing) => traces.push(listing),
                Err(err) => warn!(path = %path.display(), error = %err, "Skipping trace file"),
            }
        }

        traces.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(traces)
    }

    /// Reconstruct one trace. Never fails; problems come back as
    /// [`TraceLookup::Failed`].
    #[must_use]
    pub fn trace_details(&self, trace_id: &str) -> TraceLookup {
        let not_found = || TraceLookup::Failed {
            error: format!("Trace {} not found", trace_id),
        };
        let Some(path) = self.trace_path(trace_id) else {
            return not_found();
        };
        if !path.is_file() {
            return not_found();
        }
        match read_events(&path) {
            Ok(events) => TraceLookup::Found(Box::new(build_details(trace_id, events))),
            Err(err) => TraceLookup::Failed {
                error: format!("Trace {} could not be read: {}", trace_id, err),
            },
        }
    }

    fn read_error(&self, path: &Path, err: &std::io::Error) -> TraceError {
        TraceError::Read {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }
}

/// First-line probe; payloads are never deserialized
#[derive(Deserialize)]
struct TimestampProbe {
    #[serde(default)]
    timestamp: Option<String>,
}

fn scan_listing(path: &Path, trace_id: &str) -> std::io::Result<TraceListing> {
    let reader = BufReader::new(File::open(path)?);
    let mut start_time = String::new();
    let mut event_count = 0;
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        if index == 0 {
            start_time = serde_json::from_slice::<TimestampProbe>(line.trim_ascii())
                .ok()
                .and_then(|probe| probe.timestamp)
                .unwrap_or_default();
        }
        if !line.trim_ascii().is_empty() {
            event_count += 1;
        }
    }
    Ok(TraceListing {
        trace_id: trace_id.to_string(),
        start_time,
        event_count,
    })
}

fn read_events(path: &Path) -> std::io::Result<Vec<TraceEvent>> {
    let reader = BufReader::new(File::open(path)?);
    let mut events = Vec::new();
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let line = match std::str::from_utf8(&line) {
            Ok(line) => line.trim(),
            Err(err) => {
                warn!(path = %path.display(), line = index + 1, error = %err, "Skipping unparseable event");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        match TraceEvent::from_line(line) {
            Ok(event) => events.push(event),
            Err(err) => {
                warn!(path = %path.display(), line = index + 1, error = %err, "Skipping unparseable event");
            }
        }
    }
    Ok(events)
}

fn build_details(trace_id: &str, events: Vec<TraceEvent>) -> TraceDetails {
    let event_types = count_event_types(&events);
    let start_time = events.first().map(|e| e.timestamp.to_iso()).unwrap_or_default();
    let (end_time, duration) = match (events.first(), events.last()) {
        (Some(first), Some(last)) if events.len() >= 2 => (
            last.timestamp.to_iso(),
            Some(last.timestamp.seconds_since(&first.timestamp)),
        ),
        _ => (String::new(), None),
    };
    TraceDetails {
        trace_id: trace_id.to_string(),
        start_time,
        end_time,
        duration,
        event_count: events.len(),
        event_types,
        events,
    }
}
