//! Opaque block handles.
//!
//! A [`BlockHandle`] names one block in a [`BlockPool`](crate::BlockPool)
//! by its index in the pool's side table. Handles carry no pointer: the
//! payload address is resolved through the pool, so block metadata never
//! has to live in front of the payload and no layout arithmetic is needed
//! to get back from a payload to its bookkeeping record.

use std::fmt;

/// Names a single block inside a [`BlockPool`](crate::BlockPool).
///
/// Handles are epoch-scoped: [`release_all`](crate::BlockPool::release_all)
/// advances the pool's epoch, and every handle remembers the epoch it was
/// issued in. This allows an O(1) staleness check without a lookup —
/// resolving or freeing a handle from a released epoch panics instead of
/// silently aliasing whatever block now occupies the reused index.
/// Handles are cheap to copy and carry no lifetime; the caller is
/// responsible for not outliving the pool that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use]
pub struct BlockHandle {
    pub(crate) index: u32,
    pub(crate) epoch: u32,
}

impl BlockHandle {
    pub(crate) fn new(index: u32, epoch: u32) -> Self {
        Self { index, epoch }
    }

    /// Index of this block in the pool's side table.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The pool epoch this handle was issued in.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }
}

impl fmt::Display for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockHandle(index={}, epoch={})", self.index, self.epoch)
    }
}
