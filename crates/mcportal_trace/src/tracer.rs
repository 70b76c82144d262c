//! Event trace writer.

use crate::error::{TraceError, TraceResult};
use crate::event::{TraceEvent, count_event_types};
use crate::store::TRACE_FILE_EXTENSION;
use indexmap::IndexMap;
use mcportal_core::{Timestamp, TraceId, default_storage_path};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{info, warn};

/// Aggregate view of a live trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSummary {
    /// Trace identifier
    pub trace_id: TraceId,
    /// When the trace was created
    pub start_time: Timestamp,
    /// Number of recorded events
    pub event_count: usize,
    /// Events per type
    pub event_types: IndexMap<String, usize>,
    /// Seconds from start to the moment the summary was taken
    pub duration: f64,
}

#[derive(Debug, Default)]
struct TraceState {
    events: Vec<TraceEvent>,
    last_timestamp: Option<Timestamp>,
}

/// Append-only trace for one session
///
/// Recording takes `&self`; events are appended and written under one lock,
/// so concurrent writers never interleave lines in the trace file.
#[derive(Debug)]
pub struct Tracer {
    trace_id: TraceId,
    start_time: Timestamp,
    started: Instant,
    storage_path: PathBuf,
    trace_file: PathBuf,
    state: Mutex<TraceState>,
}

impl Tracer {
    /// Create a tracer under the default storage directory
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the directory cannot be created
    pub fn new() -> TraceResult<Self> {
        Self::open(None)
    }

    /// Create a tracer under `storage_path`
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the directory cannot be created
    pub fn with_storage(storage_path: impl Into<PathBuf>) -> TraceResult<Self> {
        Self::open(Some(storage_path.into()))
    }

    /// Create a tracer under `storage_path`, or the default if `None`
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the directory cannot be resolved or
    /// created
    pub fn open(storage_path: Option<PathBuf>) -> TraceResult<Self> {
        let storage_path = match storage_path {
            Some(path) => path,
            None => default_storage_path().map_err(|err| TraceError::StorageUnavailable {
                path: PathBuf::new(),
                reason: err.to_string(),
            })?,
        };
        std::fs::create_dir_all(&storage_path).map_err(|err| {
            TraceError::StorageUnavailable {
                path: storage_path.clone(),
                reason: err.to_string(),
            }
        })?;

        let trace_id = TraceId::new();
        let trace_file = storage_path.join(format!("{}.{}", trace_id, TRACE_FILE_EXTENSION));
        info!(trace_id = %trace_id, path = %storage_path.display(), "Tracer initialized");

        Ok(Self {
            trace_id,
            start_time: Timestamp::now(),
            started: Instant::now(),
            storage_path,
            trace_file,
            state: Mutex::new(TraceState::default()),
        })
    }

    /// Trace identifier
    #[must_use]
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// When the trace was created
    #[must_use]
    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    /// Directory holding the trace file
    #[must_use]
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Path of this trace's JSON Lines file
    #[must_use]
    pub fn trace_file(&self) -> &Path {
        &self.trace_file
    }

    /// Record an event and flush it to the trace file
    ///
    /// The event is appended in memory before the write is attempted, so it
    /// shows up in [`timeline`](Self::timeline) and [`summary`](Self::summary)
    /// even when persisting fails.
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the line could not be written
    pub fn record_event(&self, event_type: impl Into<String>, data: Value) -> TraceResult<()> {
        let mut state = self.lock();

        // Wall clocks can step backwards; keep timestamps non-decreasing.
        let now = Timestamp::now();
        let timestamp = match state.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        let elapsed = self.started.elapsed().as_secs_f64();

        let event = TraceEvent::new(timestamp, elapsed, event_type, data);
        let line = event.to_line();
        state.last_timestamp = Some(timestamp);
        state.events.push(event);

        let result = line
            .map_err(TraceError::from)
            .and_then(|line| self.append_line(&line));
        if let Err(err) = &result {
            warn!(trace_id = %self.trace_id, error = %err, "Event kept in memory only");
        }
        result
    }

    /// All events ordered by timestamp; ties keep recording order
    #[must_use]
    pub fn timeline(&self) -> Vec<TraceEvent> {
        let mut events = self.lock().events.clone();
        events.sort_by_key(|event| event.timestamp);
        events
    }

    /// Summary measured against the current time
    #[must_use]
    pub fn summary(&self) -> TraceSummary {
        let state = self.lock();
        TraceSummary {
            trace_id: self.trace_id,
            start_time: self.start_time,
            event_count: state.events.len(),
            event_types: count_event_types(&state.events),
            duration: self.started.elapsed().as_secs_f64(),
        }
    }

    /// Number of recorded events
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    /// Whether no events have been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }

    fn append_line(&self, line: &str) -> TraceResult<()> {
        let persistence = |err: std::io::Error| TraceError::Persistence {
            path: self.trace_file.clone(),
            reason: err.to_string(),
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.trace_file)
            .map_err(persistence)?;
        writeln!(file, "{}", line).map_err(persistence)
    }

    fn lock(&self) -> MutexGuard<'_, TraceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
