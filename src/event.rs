// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key occurrences in the lifecycle of a test run.
//!
//! The top-level enum here is [`Run`]. An execution engine produces [`Run`]
//! events wrapped into an [`Event`] carrying the occurrence time, and feeds
//! them into a [`Writer`].
//!
//! The engine guarantees start/end pairing per entity, but sibling entities
//! (e.g. parallel suites) may produce their events concurrently.
//!
//! [`Writer`]: crate::Writer

use std::time::{Duration, SystemTime};

use derive_more::{AsRef, Deref, DerefMut, Display};

use crate::Level;

/// Arbitrary event, paired with the time it has happened at.
#[derive(AsRef, Clone, Copy, Debug, Deref, DerefMut)]
#[non_exhaustive]
pub struct Event<T: ?Sized> {
    /// [`SystemTime`] when this [`Event`] has happened.
    pub at: SystemTime,

    /// Actual value of this [`Event`].
    #[as_ref]
    #[deref]
    #[deref_mut]
    pub value: T,
}

impl<T> Event<T> {
    /// Creates a new [`Event`] out of the given `value`, happening now.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self { at: SystemTime::now(), value }
    }

    /// Creates a new [`Event`] out of the given `value`, happening at the
    /// given time.
    #[must_use]
    pub const fn with_time(value: T, at: SystemTime) -> Self {
        Self { at, value }
    }

    /// Unwraps the inner [`Event::value`] loosing all the attached metadata.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Top-level test run event.
#[derive(Clone, Debug)]
pub enum Run {
    /// [`Suite`] event, with the suite's full name.
    Suite(String, Suite),

    /// [`Test`] event, with the test's name.
    Test(String, Test),

    /// [`Keyword`] event, with its [`KeywordKind`] and name.
    Keyword(KeywordKind, String, Keyword),

    /// Standalone log [`Message`].
    Message(Message),
}

impl Run {
    /// Constructs an event of a [`Suite`] being started.
    #[must_use]
    pub fn suite_started(name: impl Into<String>) -> Self {
        Self::Suite(name.into(), Suite::Started)
    }

    /// Constructs an event of a finished [`Suite`].
    #[must_use]
    pub fn suite_finished(name: impl Into<String>, elapsed: Duration) -> Self {
        Self::Suite(name.into(), Suite::Finished { elapsed })
    }

    /// Constructs an event of a [`Test`] being started.
    #[must_use]
    pub fn test_started(name: impl Into<String>) -> Self {
        Self::Test(name.into(), Test::Started)
    }

    /// Constructs an event of a finished [`Test`].
    #[must_use]
    pub fn test_finished(name: impl Into<String>, elapsed: Duration) -> Self {
        Self::Test(name.into(), Test::Finished { elapsed })
    }

    /// Constructs an event of a [`Keyword`] being started with the given
    /// arguments.
    #[must_use]
    pub fn keyword_started(
        kind: KeywordKind,
        name: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::Keyword(
            kind,
            name.into(),
            Keyword::Started { args: args.into_iter().map(Into::into).collect() },
        )
    }

    /// Constructs an event of a finished [`Keyword`].
    #[must_use]
    pub fn keyword_finished(
        kind: KeywordKind,
        name: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self::Keyword(kind, name.into(), Keyword::Finished { elapsed })
    }

    /// Constructs a standalone log [`Message`] event.
    #[must_use]
    pub fn message(level: Level, text: impl Into<String>) -> Self {
        Self::Message(Message { level, text: text.into() })
    }
}

/// Event specific to a particular suite.
#[derive(Clone, Copy, Debug)]
pub enum Suite {
    /// Event of a suite execution being started.
    Started,

    /// Event of a suite execution being finished.
    Finished {
        /// Time the suite has been running for.
        elapsed: Duration,
    },
}

/// Event specific to a particular test.
#[derive(Clone, Copy, Debug)]
pub enum Test {
    /// Event of a test execution being started.
    Started,

    /// Event of a test execution being finished.
    Finished {
        /// Time the test has been running for.
        elapsed: Duration,
    },
}

/// Event specific to a particular keyword call.
///
/// Keywords may nest: a contiguous run of nested keyword starts before any
/// sibling keyword ends forms a single burst in the transcript.
#[derive(Clone, Debug)]
pub enum Keyword {
    /// Event of a keyword execution being started.
    Started {
        /// Arguments the keyword has been called with.
        args: Vec<String>,
    },

    /// Event of a keyword execution being finished.
    Finished {
        /// Time the keyword has been running for.
        elapsed: Duration,
    },
}

/// Kind of an executable keyword-like entity.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum KeywordKind {
    /// Regular keyword call.
    #[display("KEYWORD")]
    Keyword,

    /// Setup of a suite or test.
    #[display("SETUP")]
    Setup,

    /// Teardown of a suite or test.
    #[display("TEARDOWN")]
    Teardown,
}

/// Standalone log message emitted during execution.
#[derive(Clone, Debug)]
pub struct Message {
    /// Severity [`Level`] of this [`Message`].
    pub level: Level,

    /// Text of this [`Message`].
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_produce_expected_variants() {
        assert!(matches!(
            Run::suite_started("S"),
            Run::Suite(name, Suite::Started) if name == "S",
        ));
        assert!(matches!(
            Run::test_finished("T", Duration::from_millis(5)),
            Run::Test(name, Test::Finished { elapsed })
                if name == "T" && elapsed == Duration::from_millis(5),
        ));
        assert!(matches!(
            Run::keyword_started(KeywordKind::Setup, "K", ["a", "b"]),
            Run::Keyword(KeywordKind::Setup, name, Keyword::Started { args })
                if name == "K" && args == ["a", "b"],
        ));
    }

    #[test]
    fn keyword_kind_renders_uppercase() {
        assert_eq!(KeywordKind::Keyword.to_string(), "KEYWORD");
        assert_eq!(KeywordKind::Setup.to_string(), "SETUP");
        assert_eq!(KeywordKind::Teardown.to_string(), "TEARDOWN");
    }

    #[test]
    fn event_carries_explicit_time() {
        let at = SystemTime::UNIX_EPOCH;
        let ev = Event::with_time(Run::message(Level::Info, "hi"), at);
        assert_eq!(ev.at, at);
        assert!(matches!(ev.into_inner(), Run::Message(_)));
    }
}
