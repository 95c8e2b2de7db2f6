//! Severity levels of transcript messages.

use std::str::FromStr;

use derive_more::Display;
use smart_default::SmartDefault;

/// Severity level of a logged [`Message`].
///
/// Levels are totally ordered, from [`Level::Trace`] (least severe) up to
/// [`Level::Error`].
///
/// [`Message`]: crate::event::Message
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Level {
    /// Fine-grained tracing output.
    #[display("TRACE")]
    Trace,

    /// Debugging output.
    #[display("DEBUG")]
    Debug,

    /// Regular informational output.
    #[display("INFO")]
    Info,

    /// Warnings about suspicious, but non-fatal, conditions.
    #[display("WARN")]
    Warn,

    /// Errors.
    #[display("ERROR")]
    Error,
}

impl FromStr for Level {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err("possible options: trace, debug, info, warn, error"),
        }
    }
}

/// Minimum-severity filter deciding which messages reach a transcript.
///
/// Messages at the threshold [`Level`] or above pass, anything below is
/// dropped silently. The default threshold is [`Level::Debug`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, SmartDefault)]
pub struct Threshold {
    /// Minimum [`Level`] passing this [`Threshold`].
    #[default(Level::Debug)]
    min: Level,
}

impl Threshold {
    /// Creates a [`Threshold`] passing the given [`Level`] and above.
    #[must_use]
    pub const fn at_least(min: Level) -> Self {
        Self { min }
    }

    /// Indicates whether a message of the given [`Level`] should be logged.
    #[must_use]
    pub fn is_logged(self, level: Level) -> bool {
        level >= self.min
    }
}
