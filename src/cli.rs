//! CLI options for wiring a [`Transcript`] into an execution engine.
//!
//! [`Transcript`]: crate::Transcript

use std::path::PathBuf;

use smart_default::SmartDefault;

use crate::{writer::Transcript, Level, Threshold};

/// CLI options of a [`Transcript`] writer.
#[derive(Clone, Debug, SmartDefault, clap::Args)]
#[group(skip)]
pub struct Cli {
    /// Path to write the debug transcript of the run into.
    ///
    /// If omitted, no transcript is produced.
    #[arg(long, value_name = "PATH", global = true)]
    pub debug_log: Option<PathBuf>,

    /// Minimum severity of messages recorded into the debug transcript.
    #[arg(
        long,
        value_name = "trace|debug|info|warn|error",
        default_value = "debug",
        global = true
    )]
    #[default(Level::Debug)]
    pub debug_log_level: Level,
}

impl Cli {
    /// Creates the [`Transcript`] described by these options.
    ///
    /// Coordinates through the [`process_write_lock()`], so transcripts
    /// created from several CLI instances pointing at the same path stay
    /// byte-coherent.
    ///
    /// [`process_write_lock()`]: crate::writer::process_write_lock
    #[must_use]
    pub fn to_transcript(&self) -> Transcript {
        Transcript::create(self.debug_log.as_deref())
            .with_threshold(Threshold::at_least(self.debug_log_level))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;

    use super::*;

    #[derive(clap::Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        transcript: Cli,
    }

    #[test]
    fn defaults_to_no_path_and_debug_level() {
        let cli = TestCli::parse_from(["engine"]);
        assert_eq!(cli.transcript.debug_log, None);
        assert_eq!(cli.transcript.debug_log_level, Level::Debug);
    }

    #[test]
    fn parses_path_and_level() {
        let cli = TestCli::parse_from([
            "engine",
            "--debug-log",
            "run/debug.log",
            "--debug-log-level",
            "warn",
        ]);
        assert_eq!(
            cli.transcript.debug_log,
            Some(PathBuf::from("run/debug.log")),
        );
        assert_eq!(cli.transcript.debug_log_level, Level::Warn);
    }

    #[test]
    fn without_path_yields_inert_transcript() {
        let cli = TestCli::parse_from(["engine"]);
        assert!(cli.transcript.to_transcript().is_inert());
    }
}
