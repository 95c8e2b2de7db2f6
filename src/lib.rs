// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Hierarchical, thread-safe debug transcript writing for test execution
//! engines.
//!
//! An execution engine drives suite/test/keyword lifecycle callbacks (plus
//! standalone log messages) into a [`Transcript`], which serializes them in
//! real time as indented, separator-delimited text lines: a faithful, ordered
//! record of the run that survives a crash up to the last successful event.
//!
//! The writer is the synchronization boundary: all operations take `&self`
//! and may be invoked concurrently, e.g. by parallel suites. Writers sharing
//! a destination coordinate through an injectable [`writer::WriteLock`], so
//! no two writes ever interleave their bytes.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use debuglog::{Level, Transcript};
//!
//! # fn main() -> debuglog::Result<()> {
//! let log = Transcript::from_writer(Vec::new());
//! log.start_suite("Root")?;
//! log.start_test("Case")?;
//! log.log_message(Level::Info, "hello")?;
//! log.end_test("Case", Duration::from_millis(10))?;
//! // Ending the outermost suite closes the transcript.
//! log.end_suite("Root", Duration::from_millis(15))?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error;
pub mod event;
pub mod level;
pub mod model;
pub mod writer;

#[doc(inline)]
pub use self::{
    error::{Error, Result},
    event::{Event, KeywordKind, Run},
    level::{Level, Threshold},
    writer::{Transcript, Writer},
};
