// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Debug transcript [`Writer`] implementation.

use std::{
    fmt::Display,
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread,
    time::{Duration, SystemTime},
};

use derive_more::Display as DisplayDerive;
use itertools::Itertools as _;
use once_cell::sync::Lazy;

use crate::{
    event::{Keyword, KeywordKind, Run, Suite, Test},
    writer::out::WriteStrExt as _,
    Error, Event, Level, Result, Threshold, Writer,
};

/// Width of a separator line.
const SEPARATOR_WIDTH: usize = 78;

/// Lock guarding byte-level access to a transcript destination.
///
/// [`Transcript`]s targeting the same destination must share this lock, so
/// their lines never interleave mid-write. It's scoped to the destination
/// resource and injected at construction, with [`process_write_lock()`] as
/// the default.
pub type WriteLock = Arc<Mutex<()>>;

/// Process-wide default [`WriteLock`].
static PROCESS_WRITE_LOCK: Lazy<WriteLock> = Lazy::new(WriteLock::default);

/// Returns the process-wide default [`WriteLock`], shared by all the
/// [`Transcript`]s constructed without an explicitly injected lock.
#[must_use]
pub fn process_write_lock() -> WriteLock {
    Arc::clone(&PROCESS_WRITE_LOCK)
}

/// Kind of an entity delimited by separator lines in a transcript.
#[derive(Clone, Copy, Debug, DisplayDerive, Eq, PartialEq)]
enum Entity {
    /// Top-level or nested grouping of tests.
    #[display("SUITE")]
    Suite,

    /// Single executable test case within a suite.
    #[display("TEST")]
    Test,

    /// Executable step invoked within a test or another keyword.
    #[display("KEYWORD")]
    Keyword,
}

impl Entity {
    /// Character the separator lines of this [`Entity`] are built of.
    const fn separator(self) -> char {
        match self {
            Self::Suite => '=',
            Self::Test => '-',
            Self::Keyword => '~',
        }
    }
}

/// [`Writer`] recording the nested lifecycle of a test run as an indented,
/// separator-delimited plain text transcript.
///
/// # Output format
///
/// The transcript is a stable, grep-able diagnostic contract:
/// - Separator lines are 78 repetitions of `=` (suite), `-`
///   (test) or `~` (keyword). Suite and test start/end lines are bracketed by
///   separators of their kind; a keyword burst gets a single leading
///   separator. A separator immediately following another separator is
///   dropped.
/// - `START`/`END` lines are indented with one dash per nesting level and
///   carry the entity kind, name, keyword arguments (start only) and elapsed
///   time (end only).
/// - Every non-separator line is prefixed with the timestamp, severity
///   [`Level`] and the name of the writing thread.
///
/// # Concurrency
///
/// All operations take `&self` and may be invoked concurrently: the writer is
/// the synchronization boundary. The per-instance state lock keeps every
/// operation's lines contiguous, while the injected [`WriteLock`] keeps even
/// separately constructed writers targeting the same destination from
/// interleaving bytes.
///
/// # Nesting contract
///
/// The execution engine guarantees start/end pairing per entity. Unbalanced
/// sequences are a caller contract violation: the writer clamps its indent at
/// zero, but performs no other defensive handling.
#[derive(Debug)]
pub struct Transcript<Out: io::Write = File> {
    /// Destination of this [`Transcript`], or [`None`] for an inert writer.
    sink: Option<Sink<Out>>,
}

/// Live destination of a [`Transcript`].
#[derive(Debug)]
struct Sink<Out: io::Write> {
    /// Mutable [`State`], guarded by the instance-wide lock.
    state: Mutex<State<Out>>,

    /// [`WriteLock`] shared between writers targeting the same destination.
    write_lock: WriteLock,

    /// Minimum-severity filter applied to logged messages.
    threshold: Threshold,

    /// Destination path, reported once the outermost suite ends.
    path: Option<PathBuf>,
}

/// Mutable state of a [`Transcript`].
#[derive(Debug)]
struct State<Out> {
    /// Output to write the transcript into, [`None`] once closed.
    out: Option<Out>,

    /// Depth of nested start/end blocks.
    indent: usize,

    /// Depth of nested keyword calls: only the outermost keyword of a burst
    /// emits a separator.
    keyword_level: usize,

    /// Whether the previously written line was a separator.
    last_was_separator: bool,
}

impl<Out> State<Out> {
    /// Creates a new [`State`] over the given output.
    fn new(out: Out) -> Self {
        Self {
            out: Some(out),
            indent: 0,
            keyword_level: 0,
            last_was_separator: false,
        }
    }
}

impl<Out: io::Write> State<Out> {
    /// Flushes and releases the output, exactly once.
    fn close(&mut self) -> Result<()> {
        if let Some(mut out) = self.out.take() {
            out.flush().map_err(Error::Io)?;
        }
        Ok(())
    }
}

impl Transcript {
    /// Creates a new [`Transcript`] writing to the given `path`, coordinated
    /// through the [`process_write_lock()`].
    ///
    /// Without a `path` (or with an empty one) the returned writer is inert.
    /// Failure to open the `path` is reported through [`tracing`] and yields
    /// an inert writer too: a test run must proceed undisturbed by transcript
    /// failures.
    #[must_use]
    pub fn create(path: Option<impl AsRef<Path>>) -> Self {
        Self::with_lock(path, process_write_lock())
    }

    /// Same as [`Transcript::create()`], with an explicitly injected
    /// [`WriteLock`] scoped to the destination resource.
    #[must_use]
    pub fn with_lock(path: Option<impl AsRef<Path>>, lock: WriteLock) -> Self {
        let Some(path) = path.filter(|p| !p.as_ref().as_os_str().is_empty())
        else {
            tracing::info!("no debug transcript requested");
            return Self { sink: None };
        };

        match Self::open(path.as_ref(), lock) {
            Ok(transcript) => {
                tracing::info!(
                    path = %path.as_ref().display(),
                    "writing debug transcript",
                );
                transcript
            }
            Err(e) => {
                tracing::error!("{e}");
                Self { sink: None }
            }
        }
    }

    /// Opens the given `path` for writing and creates a live [`Transcript`]
    /// over it.
    ///
    /// # Errors
    ///
    /// [`Error::Open`] if the `path` cannot be opened for writing.
    pub fn open(path: impl AsRef<Path>, lock: WriteLock) -> Result<Self> {
        let path = path.as_ref();
        let out = File::create(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            sink: Some(Sink {
                state: Mutex::new(State::new(out)),
                write_lock: lock,
                threshold: Threshold::default(),
                path: Some(path.to_path_buf()),
            }),
        })
    }
}

impl<Out: io::Write> Transcript<Out> {
    /// Creates a [`Transcript`] writing into the given `out`, with its own
    /// [`WriteLock`] and the default [`Threshold`].
    #[must_use]
    pub fn from_writer(out: Out) -> Self {
        Self::raw(out, Threshold::default(), WriteLock::default())
    }

    /// Creates a raw [`Transcript`] out of the given parts.
    #[must_use]
    pub fn raw(out: Out, threshold: Threshold, lock: WriteLock) -> Self {
        Self {
            sink: Some(Sink {
                state: Mutex::new(State::new(out)),
                write_lock: lock,
                threshold,
                path: None,
            }),
        }
    }

    /// Replaces the [`Threshold`] filtering logged messages.
    #[must_use]
    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        if let Some(sink) = &mut self.sink {
            sink.threshold = threshold;
        }
        self
    }

    /// Indicates whether this [`Transcript`] is inert (has no destination).
    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.sink.is_none()
    }

    /// Consumes this [`Transcript`] returning the underlying output, if it
    /// hasn't been closed yet.
    #[must_use]
    pub fn into_inner(self) -> Option<Out> {
        self.sink.and_then(|sink| {
            sink.state
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner)
                .out
        })
    }

    /// Records a suite having started.
    ///
    /// # Errors
    ///
    /// On an I/O failure, or if this [`Transcript`] is closed already.
    pub fn start_suite(&self, name: impl AsRef<str>) -> Result<()> {
        self.suite_started(name.as_ref(), SystemTime::now())
    }

    /// Records a suite having finished, with the time it has been running
    /// for.
    ///
    /// Once the outermost suite finishes, the destination path is reported
    /// through [`tracing`] and this [`Transcript`] closes itself.
    ///
    /// # Errors
    ///
    /// On an I/O failure, or if this [`Transcript`] is closed already.
    pub fn end_suite(
        &self,
        name: impl AsRef<str>,
        elapsed: Duration,
    ) -> Result<()> {
        self.suite_finished(name.as_ref(), elapsed, SystemTime::now())
    }

    /// Records a test having started.
    ///
    /// # Errors
    ///
    /// On an I/O failure, or if this [`Transcript`] is closed already.
    pub fn start_test(&self, name: impl AsRef<str>) -> Result<()> {
        self.test_started(name.as_ref(), SystemTime::now())
    }

    /// Records a test having finished, with the time it has been running for.
    ///
    /// # Errors
    ///
    /// On an I/O failure, or if this [`Transcript`] is closed already.
    pub fn end_test(
        &self,
        name: impl AsRef<str>,
        elapsed: Duration,
    ) -> Result<()> {
        self.test_finished(name.as_ref(), elapsed, SystemTime::now())
    }

    /// Records a keyword having started with the given arguments.
    ///
    /// # Errors
    ///
    /// On an I/O failure, or if this [`Transcript`] is closed already.
    pub fn start_keyword(
        &self,
        kind: KeywordKind,
        name: impl AsRef<str>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<()> {
        let args = args.into_iter().map(Into::into).collect::<Vec<_>>();
        self.keyword_started(kind, name.as_ref(), &args, SystemTime::now())
    }

    /// Records a keyword having finished, with the time it has been running
    /// for.
    ///
    /// # Errors
    ///
    /// On an I/O failure, or if this [`Transcript`] is closed already.
    pub fn end_keyword(
        &self,
        kind: KeywordKind,
        name: impl AsRef<str>,
        elapsed: Duration,
    ) -> Result<()> {
        self.keyword_finished(kind, name.as_ref(), elapsed, SystemTime::now())
    }

    /// Records a standalone log message, if its [`Level`] passes the
    /// configured [`Threshold`].
    ///
    /// # Errors
    ///
    /// On an I/O failure, or if this [`Transcript`] is closed already.
    pub fn log_message(
        &self,
        level: Level,
        text: impl AsRef<str>,
    ) -> Result<()> {
        self.message(level, text.as_ref(), SystemTime::now())
    }

    /// Same as [`Transcript::log_message()`], with an explicit occurrence
    /// time.
    ///
    /// # Errors
    ///
    /// On an I/O failure, or if this [`Transcript`] is closed already.
    pub fn log_message_at(
        &self,
        level: Level,
        text: impl AsRef<str>,
        at: SystemTime,
    ) -> Result<()> {
        self.message(level, text.as_ref(), at)
    }

    /// Flushes and releases the destination.
    ///
    /// Closing an already closed (or inert) [`Transcript`] is a no-op.
    ///
    /// # Errors
    ///
    /// If the final flush fails.
    pub fn close(&self) -> Result<()> {
        let Some(sink) = &self.sink else { return Ok(()) };
        sink.lock_state().close()
    }

    /// Records a suite start at the given time.
    fn suite_started(&self, name: &str, at: SystemTime) -> Result<()> {
        let Some(sink) = &self.sink else { return Ok(()) };
        let mut state = sink.lock_state();
        sink.separator(&mut state, Entity::Suite)?;
        sink.start(&mut state, Entity::Suite, name, None, at)?;
        sink.separator(&mut state, Entity::Suite)
    }

    /// Records a suite end at the given time, auto-closing once the outermost
    /// suite has finished.
    fn suite_finished(
        &self,
        name: &str,
        elapsed: Duration,
        at: SystemTime,
    ) -> Result<()> {
        let Some(sink) = &self.sink else { return Ok(()) };
        let mut state = sink.lock_state();
        sink.separator(&mut state, Entity::Suite)?;
        sink.end(&mut state, Entity::Suite, name, elapsed, at)?;
        sink.separator(&mut state, Entity::Suite)?;
        if state.indent == 0 {
            if let Some(path) = &sink.path {
                tracing::info!(
                    path = %path.display(),
                    "debug transcript finished",
                );
            }
            state.close()?;
        }
        Ok(())
    }

    /// Records a test start at the given time.
    fn test_started(&self, name: &str, at: SystemTime) -> Result<()> {
        let Some(sink) = &self.sink else { return Ok(()) };
        let mut state = sink.lock_state();
        sink.separator(&mut state, Entity::Test)?;
        sink.start(&mut state, Entity::Test, name, None, at)?;
        sink.separator(&mut state, Entity::Test)
    }

    /// Records a test end at the given time.
    fn test_finished(
        &self,
        name: &str,
        elapsed: Duration,
        at: SystemTime,
    ) -> Result<()> {
        let Some(sink) = &self.sink else { return Ok(()) };
        let mut state = sink.lock_state();
        sink.separator(&mut state, Entity::Test)?;
        sink.end(&mut state, Entity::Test, name, elapsed, at)?;
        sink.separator(&mut state, Entity::Test)
    }

    /// Records a keyword start at the given time.
    ///
    /// Only the outermost keyword of a burst emits a separator.
    fn keyword_started(
        &self,
        kind: KeywordKind,
        name: &str,
        args: &[String],
        at: SystemTime,
    ) -> Result<()> {
        let Some(sink) = &self.sink else { return Ok(()) };
        let mut state = sink.lock_state();
        if state.keyword_level == 0 {
            sink.separator(&mut state, Entity::Keyword)?;
        }
        sink.start(&mut state, kind, name, Some(args), at)?;
        state.keyword_level += 1;
        Ok(())
    }

    /// Records a keyword end at the given time. No separator is emitted.
    fn keyword_finished(
        &self,
        kind: KeywordKind,
        name: &str,
        elapsed: Duration,
        at: SystemTime,
    ) -> Result<()> {
        let Some(sink) = &self.sink else { return Ok(()) };
        let mut state = sink.lock_state();
        sink.end(&mut state, kind, name, elapsed, at)?;
        state.keyword_level = state.keyword_level.saturating_sub(1);
        Ok(())
    }

    /// Records a log message at the given time, applying the [`Threshold`].
    fn message(&self, level: Level, text: &str, at: SystemTime) -> Result<()> {
        let Some(sink) = &self.sink else { return Ok(()) };
        if !sink.threshold.is_logged(level) {
            return Ok(());
        }
        let mut state = sink.lock_state();
        sink.write_line(&mut state, text, level, at)
    }
}

impl<Out: io::Write> Writer for Transcript<Out> {
    fn handle_event(&self, event: Event<Run>) -> Result<()> {
        let Event { at, value } = event;
        match value {
            Run::Suite(name, Suite::Started) => self.suite_started(&name, at),
            Run::Suite(name, Suite::Finished { elapsed }) => {
                self.suite_finished(&name, elapsed, at)
            }
            Run::Test(name, Test::Started) => self.test_started(&name, at),
            Run::Test(name, Test::Finished { elapsed }) => {
                self.test_finished(&name, elapsed, at)
            }
            Run::Keyword(kind, name, Keyword::Started { args }) => {
                self.keyword_started(kind, &name, &args, at)
            }
            Run::Keyword(kind, name, Keyword::Finished { elapsed }) => {
                self.keyword_finished(kind, &name, elapsed, at)
            }
            Run::Message(msg) => self.message(msg.level, &msg.text, at),
        }
    }
}

impl<Out: io::Write> Sink<Out> {
    /// Locks the [`State`], recovering from a poisoned lock.
    fn lock_state(&self) -> MutexGuard<'_, State<Out>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Writes a separator line of the given [`Entity`] kind, unless the
    /// previously written line was a separator of any kind already.
    fn separator(
        &self,
        state: &mut State<Out>,
        entity: Entity,
    ) -> Result<()> {
        if state.last_was_separator {
            return Ok(());
        }
        let line = entity.separator().to_string().repeat(SEPARATOR_WIDTH);
        self.write_raw(state, &line, true)
    }

    /// Writes a `START` line, incrementing the indent.
    fn start(
        &self,
        state: &mut State<Out>,
        kind: impl Display,
        name: &str,
        args: Option<&[String]>,
        at: SystemTime,
    ) -> Result<()> {
        let args = args
            .map(|args| format!(" {}", args.iter().join(" ")))
            .unwrap_or_default();
        let line = format!(
            "+{} START {kind}: {name}{args}",
            "-".repeat(state.indent),
        );
        self.write_line(state, &line, Level::Info, at)?;
        state.indent += 1;
        Ok(())
    }

    /// Writes an `END` line, decrementing the indent first.
    fn end(
        &self,
        state: &mut State<Out>,
        kind: impl Display,
        name: &str,
        elapsed: Duration,
        at: SystemTime,
    ) -> Result<()> {
        state.indent = state.indent.saturating_sub(1);
        let line = format!(
            "+{} END {kind}: {name} ({})",
            "-".repeat(state.indent),
            humantime::format_duration(elapsed),
        );
        self.write_line(state, &line, Level::Info, at)
    }

    /// Writes a line prefixed with the timestamp, [`Level`] and the name of
    /// the current thread.
    fn write_line(
        &self,
        state: &mut State<Out>,
        text: &str,
        level: Level,
        at: SystemTime,
    ) -> Result<()> {
        let line = format!(
            "{} - {level} - {} - {text}",
            humantime::format_rfc3339_millis(at),
            thread_name(),
        );
        self.write_raw(state, &line, false)
    }

    /// Appends the given line to the output and flushes, holding the
    /// [`WriteLock`] across both.
    fn write_raw(
        &self,
        state: &mut State<Out>,
        line: &str,
        separator: bool,
    ) -> Result<()> {
        let out = state.out.as_mut().ok_or(Error::Closed)?;
        {
            let _guard = self
                .write_lock
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            out.write_line(line.trim_end()).map_err(Error::Io)?;
            out.flush().map_err(Error::Io)?;
        }
        state.last_was_separator = separator;
        Ok(())
    }
}

/// Name of the current thread, falling back to its id.
fn thread_name() -> String {
    let thread = thread::current();
    thread
        .name()
        .map_or_else(|| format!("{:?}", thread.id()), str::to_owned)
}
