//! The bounds-check error.

use std::error::Error;
use std::fmt;
use std::panic::Location;

/// A checked access named an index at or past the live length.
///
/// The only recoverable error in the buffer API, returned by
/// [`GrowBuf::at`](crate::GrowBuf::at) and
/// [`GrowBuf::at_mut`](crate::GrowBuf::at_mut). Carries the offending
/// index, the length it was checked against, and the call site that made
/// the access (captured via `#[track_caller]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutOfRange {
    index: usize,
    len: usize,
    location: &'static Location<'static>,
}

impl OutOfRange {
    #[track_caller]
    pub(crate) fn new(index: usize, len: usize) -> Self {
        Self {
            index,
            len,
            location: Location::caller(),
        }
    }

    /// The index that was requested.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The live length the index was checked against.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Source location of the failing access.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "index {} out of range for buffer of length {} (at {})",
            self.index, self.len, self.location
        )
    }
}

impl Error for OutOfRange {}
