//! Test fixtures for cairn development.
//!
//! Provides drop-accounting types for verifying that containers construct
//! and destroy exactly the elements they should: [`DropTally`] hands out
//! [`Tracked`] values and counts how many have been dropped.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::cell::Cell;
use std::rc::Rc;

/// Shared drop counter. Clone-cheap; all [`Tracked`] values minted from
/// the same tally bump the same count.
#[derive(Clone, Default)]
pub struct DropTally {
    drops: Rc<Cell<usize>>,
}

impl DropTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a tracked value carrying `id`.
    pub fn tracked(&self, id: u32) -> Tracked {
        Tracked {
            id,
            drops: Rc::clone(&self.drops),
        }
    }

    /// Number of tracked values dropped so far.
    pub fn count(&self) -> usize {
        self.drops.get()
    }
}

/// A non-trivially-destructible value that reports its drop to the tally
/// it was minted from.
///
/// `Clone` mints a sibling on the same tally, so clones are counted too —
/// a deep-copied container must eventually report one drop per clone.
#[derive(Clone)]
pub struct Tracked {
    id: u32,
    drops: Rc<Cell<usize>>,
}

impl Tracked {
    pub fn id(&self) -> u32 {
        self.id
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Tracked {}

impl std::fmt::Debug for Tracked {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tracked({})", self.id)
    }
}
