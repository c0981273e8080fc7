//! # Trace Session Manager
//!
//! Owns the single open trace stream and serializes records into it as they
//! arrive. The output is a Chrome Trace Event JSON document, written
//! incrementally so the file can be inspected while the host is still running:
//!
//! ```text
//! {
//!   "otherData": {},
//!   "traceEvents": [
//!     {
//!       "cat": "function",
//!       "dur": 5012,
//!       "name": "step (controller_node)",
//!       "ph": "X",
//!       "pid": 0,
//!       "tid": 3,
//!       "ts": 1700000000123456
//!     },
//!     ...
//!   ]
//! }
//! ```
//!
//! ## Locking
//!
//! Session state (stream, labels, record counter) lives behind one mutex.
//! Beginning, ending and writing all take it, so a record can never land
//! between the footer and the stream being closed, and two records can never
//! interleave.
//!
//! ## Name sanitization
//!
//! Double quotes in the written `name` field (record name and process label)
//! are rewritten to single quotes before encoding, so `"quoted"` is recorded
//! as `'quoted'`. Everything else is escaped by `serde_json`. The session keeps
//! the label as given; only the written name is rewritten.

use log::{info, trace};
use serde::Serialize;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::config::SessionConfig;
use crate::domain::{Duration, InstrumentError, Result, Tid, Timestamp};
use crate::timer::InstrumentationTimer;

/// Output file used when the host does not pick one
pub const DEFAULT_OUTPUT_FILE: &str = "profiler.json";

const HEADER: &str = "{\n  \"otherData\": {},\n  \"traceEvents\": [\n";
const FOOTER: &str = "\n  ]\n}\n";
const RECORD_SEPARATOR: &str = ",\n";
const RECORD_INDENT: &str = "    ";

/// One completed measurement, produced by a timer when it stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResult {
    pub name: Cow<'static, str>,
    pub start: Timestamp,
    pub end: Timestamp,
    pub thread_id: Tid,
}

impl ProfileResult {
    /// `end - start`, exactly as captured
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Chrome trace "complete event". Field order is the on-disk order.
#[derive(Debug, Serialize)]
struct CompleteEvent {
    cat: &'static str,
    dur: i64,
    name: String,
    ph: &'static str,
    pid: u32,
    tid: u64,
    ts: i64,
}

/// What a closed session leaves behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub name: String,
    pub process_label: String,
    /// `None` when the session wrote to a caller-supplied stream
    pub path: Option<PathBuf>,
    pub record_count: u64,
}

/// Open session state, only ever touched with the session lock held
struct ActiveSession {
    name: String,
    process_label: String,
    path: Option<PathBuf>,
    out: Box<dyn Write + Send>,
    profile_count: u64,
}

impl ActiveSession {
    fn write_record(&mut self, result: &ProfileResult) -> Result<()> {
        let event = CompleteEvent {
            cat: "function",
            dur: result.duration().as_micros(),
            name: format!(
                "{} ({})",
                sanitize_name(&result.name),
                sanitize_name(&self.process_label)
            ),
            ph: "X",
            pid: 0,
            tid: result.thread_id.0,
            ts: result.start.as_micros(),
        };

        let body = serde_json::to_string_pretty(&event)?;
        let mut chunk = String::with_capacity(body.len() + 64);
        if self.profile_count > 0 {
            chunk.push_str(RECORD_SEPARATOR);
        }
        for (i, line) in body.lines().enumerate() {
            if i > 0 {
                chunk.push('\n');
            }
            chunk.push_str(RECORD_INDENT);
            chunk.push_str(line);
        }

        self.out.write_all(chunk.as_bytes())?;
        self.out.flush()?;
        self.profile_count += 1;

        trace!(
            "Recorded \"{}\" on {} ({}) in session \"{}\"",
            event.name,
            result.thread_id,
            result.duration(),
            self.name
        );
        Ok(())
    }

    fn close(mut self) -> Result<SessionSummary> {
        self.out.write_all(FOOTER.as_bytes())?;
        self.out.flush()?;
        Ok(SessionSummary {
            name: self.name,
            process_label: self.process_label,
            path: self.path,
            record_count: self.profile_count,
        })
    }
}

/// Replace every `"` with `'`
#[must_use]
pub fn sanitize_name(name: &str) -> Cow<'_, str> {
    if name.contains('"') {
        Cow::Owned(name.replace('"', "'"))
    } else {
        Cow::Borrowed(name)
    }
}

/// Trace session manager
///
/// Holds at most one open session at a time. Construct one at the top of the
/// host and hand out references to whatever creates timers, or use
/// [`Instrumentor::global`] where threading a reference through is impractical.
#[derive(Default)]
pub struct Instrumentor {
    session: Mutex<Option<ActiveSession>>,
}

impl Instrumentor {
    /// Create a manager with no open session
    #[must_use]
    pub const fn new() -> Self {
        Self { session: Mutex::new(None) }
    }

    /// Process-wide instance, built on first use and never torn down.
    ///
    /// The `profile_*` macros record here.
    pub fn global() -> &'static Instrumentor {
        static GLOBAL: OnceLock<Instrumentor> = OnceLock::new();
        GLOBAL.get_or_init(Instrumentor::new)
    }

    // Poisoning is ignored: a panic mid-write can at worst truncate one record.
    fn state(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a session writing to `path`, truncating whatever was there.
    ///
    /// [`Instrumentor::begin_session_default`] writes to [`DEFAULT_OUTPUT_FILE`]
    /// instead.
    ///
    /// # Errors
    /// `SessionAlreadyOpen` if a session is open (its file is left alone),
    /// `StreamOpen` if the file cannot be created, `Io` if the header write fails.
    pub fn begin_session(
        &self,
        name: impl Into<String>,
        process_label: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        self.begin_at(name.into(), process_label.into(), path.as_ref(), false)
    }

    /// Open a session writing to [`DEFAULT_OUTPUT_FILE`] in the working directory.
    ///
    /// # Errors
    /// As [`Instrumentor::begin_session`].
    pub fn begin_session_default(
        &self,
        name: impl Into<String>,
        process_label: impl Into<String>,
    ) -> Result<()> {
        self.begin_session(name, process_label, DEFAULT_OUTPUT_FILE)
    }

    /// Open a session writing to an arbitrary stream.
    ///
    /// # Errors
    /// `SessionAlreadyOpen` if a session is open, `Io` if the header write fails.
    pub fn begin_session_with_writer(
        &self,
        name: impl Into<String>,
        process_label: impl Into<String>,
        writer: Box<dyn Write + Send>,
    ) -> Result<()> {
        let mut state = self.state();
        ensure_closed(&state)?;
        open(&mut state, name.into(), process_label.into(), None, writer)
    }

    /// Open a session at the path a [`SessionConfig`] resolves to.
    ///
    /// # Errors
    /// As [`Instrumentor::begin_session`]; a directory that cannot be created
    /// is reported as `StreamOpen`.
    pub fn begin_session_with_config(&self, config: &SessionConfig) -> Result<()> {
        self.begin_at(
            config.name.clone(),
            config.process_label.clone(),
            &config.output_path(),
            config.create_missing_dirs,
        )
    }

    // Nothing touches the filesystem until the open-session check has passed.
    fn begin_at(
        &self,
        name: String,
        process_label: String,
        path: &Path,
        create_missing_dirs: bool,
    ) -> Result<()> {
        let mut state = self.state();
        ensure_closed(&state)?;

        let stream_open = |source| InstrumentError::StreamOpen { path: path.to_path_buf(), source };
        if create_missing_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(stream_open)?;
            }
        }
        let file = File::create(path).map_err(stream_open)?;

        open(
            &mut state,
            name,
            process_label,
            Some(path.to_path_buf()),
            Box::new(BufWriter::new(file)),
        )
    }

    /// Write the footer, close the stream and forget the session.
    ///
    /// The session is closed even when the footer write fails.
    ///
    /// # Errors
    /// `NoActiveSession` if nothing is open, `Io` if the footer write fails.
    pub fn end_session(&self) -> Result<SessionSummary> {
        let mut state = self.state();
        let session = state.take().ok_or(InstrumentError::NoActiveSession)?;
        let summary = session.close()?;
        drop(state);
        info!(
            "Trace session \"{}\" closed with {} records{}",
            summary.name,
            summary.record_count,
            summary
                .path
                .as_ref()
                .map(|p| format!(" -> {}", p.display()))
                .unwrap_or_default()
        );
        Ok(summary)
    }

    /// Append one record to the open session and flush it.
    ///
    /// # Errors
    /// `WriteAfterClose` if no session is open (the record is dropped),
    /// `Io`/`Json` if encoding or writing fails.
    pub fn write_profile(&self, result: &ProfileResult) -> Result<()> {
        let mut state = self.state();
        match state.as_mut() {
            Some(session) => session.write_record(result),
            None => Err(InstrumentError::WriteAfterClose { record: result.name.to_string() }),
        }
    }

    /// Run `f` under a timer named `name`.
    ///
    /// The record is submitted when `f` returns and also when it unwinds.
    /// Submission failures are logged, never returned.
    pub fn scope<R>(&self, name: impl Into<Cow<'static, str>>, f: impl FnOnce() -> R) -> R {
        let _timer = InstrumentationTimer::new(self, name);
        f()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state().is_some()
    }

    /// Name of the open session, if any
    #[must_use]
    pub fn session_name(&self) -> Option<String> {
        self.state().as_ref().map(|s| s.name.clone())
    }

    /// Records written so far in the open session (0 when none is open)
    #[must_use]
    pub fn profile_count(&self) -> u64 {
        self.state().as_ref().map_or(0, |s| s.profile_count)
    }
}

fn ensure_closed(state: &Option<ActiveSession>) -> Result<()> {
    match state {
        Some(active) => Err(InstrumentError::SessionAlreadyOpen { active: active.name.clone() }),
        None => Ok(()),
    }
}

fn open(
    state: &mut Option<ActiveSession>,
    name: String,
    process_label: String,
    path: Option<PathBuf>,
    mut out: Box<dyn Write + Send>,
) -> Result<()> {
    out.write_all(HEADER.as_bytes())?;
    out.flush()?;

    info!(
        "Trace session \"{name}\" opened for {process_label}{}",
        path.as_ref().map(|p| format!(" -> {}", p.display())).unwrap_or_default()
    );

    *state = Some(ActiveSession {
        name,
        process_label,
        path,
        out,
        profile_count: 0,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// In-memory sink that stays readable after the session drops its writer
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn record(name: &'static str, start: i64, end: i64) -> ProfileResult {
        ProfileResult {
            name: Cow::Borrowed(name),
            start: Timestamp(start),
            end: Timestamp(end),
            thread_id: Tid(7),
        }
    }

    #[test]
    fn test_empty_session_is_valid_json() {
        let buffer = SharedBuffer::default();
        let instrumentor = Instrumentor::new();
        instrumentor.begin_session_with_writer("Sim", "node", Box::new(buffer.clone())).unwrap();
        let summary = instrumentor.end_session().unwrap();

        assert_eq!(summary.record_count, 0);
        assert_eq!(summary.path, None);
        assert_eq!(buffer.contents(), format!("{HEADER}{FOOTER}"));

        let parsed: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert!(parsed["otherData"].as_object().unwrap().is_empty());
        assert!(parsed["traceEvents"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_record_layout() {
        let buffer = SharedBuffer::default();
        let instrumentor = Instrumentor::new();
        instrumentor.begin_session_with_writer("Sim", "node", Box::new(buffer.clone())).unwrap();
        instrumentor.write_profile(&record("step", 100, 350)).unwrap();
        instrumentor.end_session().unwrap();

        let expected = "{\n  \"otherData\": {},\n  \"traceEvents\": [\n    {\n      \
                        \"cat\": \"function\",\n      \"dur\": 250,\n      \
                        \"name\": \"step (node)\",\n      \"ph\": \"X\",\n      \
                        \"pid\": 0,\n      \"tid\": 7,\n      \"ts\": 100\n    }\n  ]\n}\n";
        assert_eq!(buffer.contents(), expected);
    }

    #[test]
    fn test_separator_only_between_records() {
        let buffer = SharedBuffer::default();
        let instrumentor = Instrumentor::new();
        instrumentor.begin_session_with_writer("Sim", "node", Box::new(buffer.clone())).unwrap();
        instrumentor.write_profile(&record("a", 0, 1)).unwrap();
        instrumentor.write_profile(&record("b", 1, 2)).unwrap();
        instrumentor.write_profile(&record("c", 2, 3)).unwrap();
        assert_eq!(instrumentor.profile_count(), 3);
        instrumentor.end_session().unwrap();

        let text = buffer.contents();
        assert_eq!(text.matches("    },\n    {").count(), 2);
        assert!(text.starts_with(&format!("{HEADER}{RECORD_INDENT}{{")));

        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        let names: Vec<_> = parsed["traceEvents"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["a (node)", "b (node)", "c (node)"]);
    }

    #[test]
    fn test_quotes_become_apostrophes() {
        let buffer = SharedBuffer::default();
        let instrumentor = Instrumentor::new();
        instrumentor
            .begin_session_with_writer("Sim", "say \"hi\"", Box::new(buffer.clone()))
            .unwrap();
        instrumentor.write_profile(&record("\"quoted\"", 0, 1)).unwrap();
        let summary = instrumentor.end_session().unwrap();
        assert_eq!(summary.process_label, "say \"hi\"");

        let parsed: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(parsed["traceEvents"][0]["name"], "'quoted' (say 'hi')");
    }

    #[test]
    fn test_backslashes_stay_valid_json() {
        let buffer = SharedBuffer::default();
        let instrumentor = Instrumentor::new();
        instrumentor.begin_session_with_writer("Sim", "node", Box::new(buffer.clone())).unwrap();
        instrumentor.write_profile(&record("C:\\sim\tstep", 0, 1)).unwrap();
        instrumentor.end_session().unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(parsed["traceEvents"][0]["name"], "C:\\sim\tstep (node)");
    }

    #[test]
    fn test_negative_duration_written_verbatim() {
        let buffer = SharedBuffer::default();
        let instrumentor = Instrumentor::new();
        instrumentor.begin_session_with_writer("Sim", "node", Box::new(buffer.clone())).unwrap();
        instrumentor.write_profile(&record("skew", 500, 480)).unwrap();
        instrumentor.end_session().unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(parsed["traceEvents"][0]["dur"], -20);
        assert_eq!(parsed["traceEvents"][0]["ts"], 500);
    }

    #[test]
    fn test_second_begin_rejected() {
        let first = SharedBuffer::default();
        let second = SharedBuffer::default();
        let instrumentor = Instrumentor::new();
        instrumentor.begin_session_with_writer("first", "node", Box::new(first.clone())).unwrap();

        let err = instrumentor
            .begin_session_with_writer("second", "node", Box::new(second.clone()))
            .unwrap_err();
        assert!(matches!(err, InstrumentError::SessionAlreadyOpen { ref active } if active == "first"));
        assert_eq!(instrumentor.session_name().as_deref(), Some("first"));
        assert!(second.contents().is_empty());
    }

    #[test]
    fn test_write_and_end_without_session() {
        let instrumentor = Instrumentor::new();
        assert!(!instrumentor.is_active());
        assert_eq!(instrumentor.profile_count(), 0);

        let err = instrumentor.write_profile(&record("late", 0, 1)).unwrap_err();
        assert!(matches!(err, InstrumentError::WriteAfterClose { ref record } if record == "late"));
        assert!(matches!(instrumentor.end_session(), Err(InstrumentError::NoActiveSession)));
    }

    #[test]
    fn test_global_is_one_instance() {
        assert!(std::ptr::eq(Instrumentor::global(), Instrumentor::global()));
    }

    #[test]
    fn test_sanitize_name() {
        assert!(matches!(sanitize_name("plain"), Cow::Borrowed("plain")));
        assert_eq!(sanitize_name("a \"b\" c"), "a 'b' c");
    }
}
