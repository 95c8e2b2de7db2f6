// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for outputting [`Run`] events.
//!
//! [`Run`]: crate::event::Run

pub mod out;
pub mod transcript;

use crate::{event::Run, Event, Result};

#[doc(inline)]
pub use self::transcript::{process_write_lock, Transcript, WriteLock};

/// Writer of [`Run`] events to some output.
///
/// A [`Writer`] is the synchronization boundary of a run: [`handle_event()`]
/// takes `&self` and may be invoked concurrently by the execution engine
/// (e.g. under parallel suite execution). Implementations serialize their
/// writes internally.
///
/// [`handle_event()`]: Writer::handle_event
pub trait Writer {
    /// Handles the given [`Run`] event.
    ///
    /// # Errors
    ///
    /// If the event cannot be recorded.
    fn handle_event(&self, event: Event<Run>) -> Result<()>;
}
