//! The owned-allocation primitive under [`GrowBuf`](crate::GrowBuf).
//!
//! [`RawRange`] owns exactly one contiguous allocation of uninitialized
//! element slots and guarantees its release on every exit path, through
//! whichever backing produced it. It knows nothing about live elements —
//! constructing and dropping values inside the range is the buffer's job.

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;
use std::rc::Rc;

use cairn_pool::{BlockHandle, SharedBlockPool};

/// Where a range's memory came from, and therefore how it is released.
enum Backing {
    /// No allocation: empty range, or zero-sized element type.
    None,
    /// Straight from the system allocator.
    System,
    /// From a shared block pool. Releasing returns the block for
    /// recycling; the pool keeps the actual memory until its own
    /// `release_all`.
    Pool {
        pool: SharedBlockPool,
        handle: BlockHandle,
    },
}

/// One contiguous allocation of `cap` uninitialized `T` slots.
///
/// For zero-sized `T` the range never allocates and reports a capacity of
/// `usize::MAX`, so capacity checks above it never trigger growth.
pub(crate) struct RawRange<T> {
    ptr: NonNull<T>,
    cap: usize,
    backing: Backing,
    _marker: PhantomData<T>,
}

impl<T> RawRange<T> {
    /// A range with no allocation.
    pub(crate) fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: if mem::size_of::<T>() == 0 {
                usize::MAX
            } else {
                0
            },
            backing: Backing::None,
            _marker: PhantomData,
        }
    }

    /// Allocate exactly `cap` slots from the system allocator.
    ///
    /// Aborts the process if the system allocator fails; panics if the
    /// total size overflows a [`Layout`].
    pub(crate) fn with_capacity(cap: usize) -> Self {
        if cap == 0 || mem::size_of::<T>() == 0 {
            return Self::empty();
        }
        let layout = Layout::array::<T>(cap).expect("range size overflows a Layout");
        // SAFETY: `layout` has non-zero size (cap > 0, T non-ZST).
        let raw = unsafe { alloc(layout) };
        let ptr = match NonNull::new(raw.cast::<T>()) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout),
        };
        Self {
            ptr,
            cap,
            backing: Backing::System,
            _marker: PhantomData,
        }
    }

    /// Allocate exactly `cap` slots through a shared block pool.
    ///
    /// The pool recycles a compatible free block when it has one. Empty
    /// and zero-sized requests never touch the pool.
    pub(crate) fn with_capacity_in(cap: usize, pool: &SharedBlockPool) -> Self {
        if cap == 0 || mem::size_of::<T>() == 0 {
            return Self::empty();
        }
        let handle = pool.borrow_mut().allocate::<T>(cap);
        let ptr = pool.borrow().payload::<T>(handle);
        Self {
            ptr,
            cap,
            backing: Backing::Pool {
                pool: Rc::clone(pool),
                handle,
            },
            _marker: PhantomData,
        }
    }

    /// Start of the range. Dangling (but aligned) when nothing is
    /// allocated.
    pub(crate) fn ptr(&self) -> NonNull<T> {
        self.ptr
    }

    /// Number of slots in the range.
    pub(crate) fn cap(&self) -> usize {
        self.cap
    }
}

impl<T> Drop for RawRange<T> {
    fn drop(&mut self) {
        match &self.backing {
            Backing::None => {}
            Backing::System => {
                let layout =
                    Layout::array::<T>(self.cap).expect("layout was valid at allocation");
                // SAFETY: `ptr` came from `alloc` with this exact layout
                // (System backing is only built in `with_capacity`).
                unsafe { dealloc(self.ptr.as_ptr().cast(), layout) };
            }
            Backing::Pool { pool, handle } => {
                pool.borrow_mut().deallocate(*handle);
            }
        }
    }
}
