// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Consolidated error handling types.

use std::{io, path::PathBuf};

use derive_more::{Display, Error, From};

/// Top-level error of writing a transcript.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// Destination file couldn't be opened for writing.
    #[display("failed to open `{}` for writing: {source}", path.display())]
    Open {
        /// Path that couldn't be opened.
        path: PathBuf,

        /// Underlying I/O error.
        source: io::Error,
    },

    /// I/O failure while appending to a transcript.
    ///
    /// Not retried: continued logging cannot be guaranteed consistent, so it
    /// propagates to the caller of the failed operation.
    #[display("I/O operation failed: {_0}")]
    #[from]
    Io(io::Error),

    /// Write attempted on an already closed transcript.
    #[display("transcript is already closed")]
    Closed,
}

/// Result of writing a transcript.
pub type Result<T> = std::result::Result<T, Error>;
