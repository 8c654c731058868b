//! The growable buffer.

use std::fmt;
use std::mem;
use std::ptr;
use std::slice;

use cairn_pool::SharedBlockPool;

use crate::error::OutOfRange;
use crate::iter::{IntoIter, Iter, IterMut};
use crate::raw::RawRange;

/// A growable, contiguous sequence of `T` with amortized O(1) append.
///
/// Elements `[0, len)` are live and constructed; slots `[len, capacity)`
/// are raw storage. Growth allocates a replacement range of
/// `len + len/2 + 1` slots, relocates the live elements in index order,
/// and releases the old range — one atomic step as far as callers can
/// observe, though any previously obtained pointers into the buffer are
/// invalidated.
///
/// Storage comes from the system allocator, or from a shared
/// [`BlockPool`](cairn_pool::BlockPool) when built via
/// [`with_pool`](Self::with_pool) — every range the buffer ever allocates
/// then goes through (and is recycled by) that pool. There is no allocator
/// type parameter; the backing is a per-instance choice.
///
/// # Access policy
///
/// Two distinct operations, two distinct contracts:
///
/// - [`at`](Self::at) is checked and returns the one recoverable error,
///   [`OutOfRange`].
/// - [`get_unchecked`](Self::get_unchecked) is `unsafe` and genuinely
///   unchecked; an out-of-range index is undefined behavior. This is the
///   deliberate zero-overhead fast path, not an oversight.
///
/// `buf[i]` (the `Index` impl) panics on out-of-range like the standard
/// containers do.
///
/// # Example
///
/// ```
/// use cairn_buf::GrowBuf;
///
/// let mut buf = GrowBuf::new();
/// for i in 0..20 {
///     buf.push(i);
/// }
/// assert_eq!(buf.len(), 20);
/// assert_eq!(buf.front(), Some(&0));
/// assert_eq!(buf.back(), Some(&19));
/// assert!(buf.at(1000).is_err());
/// ```
pub struct GrowBuf<T> {
    range: RawRange<T>,
    len: usize,
    pool: Option<SharedBlockPool>,
}

impl<T> GrowBuf<T> {
    /// An empty buffer. No allocation until the first push.
    pub fn new() -> Self {
        Self {
            range: RawRange::empty(),
            len: 0,
            pool: None,
        }
    }

    /// An empty buffer whose storage will come from `pool`.
    pub fn with_pool(pool: SharedBlockPool) -> Self {
        Self {
            range: RawRange::empty(),
            len: 0,
            pool: Some(pool),
        }
    }

    /// An empty buffer with at least `cap` slots pre-allocated.
    pub fn with_capacity(cap: usize) -> Self {
        let mut buf = Self::new();
        buf.reserve(cap);
        buf
    }

    /// An empty pool-backed buffer with at least `cap` slots pre-allocated.
    pub fn with_capacity_in(cap: usize, pool: SharedBlockPool) -> Self {
        let mut buf = Self::with_pool(pool);
        buf.reserve(cap);
        buf
    }

    /// Append a value. Amortized O(1); may relocate the whole buffer.
    pub fn push(&mut self, value: T) {
        self.push_with(|| value)
    }

    /// Append an element constructed directly in its slot.
    ///
    /// The closure runs after any growth, so the value it produces is
    /// written straight into storage that will not move again until the
    /// next growth.
    pub fn push_with<F>(&mut self, make: F)
    where
        F: FnOnce() -> T,
    {
        if self.len == self.range.cap() {
            self.grow_amortized();
        }
        // SAFETY: slot `len` is in-bounds (len < cap after growth) and
        // holds no live value.
        unsafe { self.range.ptr().as_ptr().add(self.len).write(make()) };
        self.len += 1;
    }

    /// Remove and return the last element, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` held the last live element; the decrement
        // above already reclassified it as raw storage.
        Some(unsafe { self.range.ptr().as_ptr().add(self.len).read() })
    }

    /// Drop every live element. Capacity is retained — only
    /// [`shrink_to_fit`](Self::shrink_to_fit) or dropping the buffer
    /// releases memory.
    pub fn clear(&mut self) {
        if mem::needs_drop::<T>() {
            let live: *mut [T] =
                ptr::slice_from_raw_parts_mut(self.range.ptr().as_ptr(), self.len);
            // len goes to zero first: if an element's Drop panics, the
            // remainder leaks rather than double-dropping.
            self.len = 0;
            // SAFETY: `live` covers exactly the previously live elements.
            unsafe { ptr::drop_in_place(live) };
        } else {
            self.len = 0;
        }
    }

    /// Guarantee `capacity() >= cap`.
    ///
    /// No-op when already satisfied; otherwise relocates into a range of
    /// exactly `cap` slots. Does not change the length.
    pub fn reserve(&mut self, cap: usize) {
        if cap <= self.range.cap() {
            return;
        }
        self.relocate(cap);
    }

    /// Grow or shrink the live length to `new_len`.
    ///
    /// Growing appends clones of `value`; shrinking pops from the back.
    pub fn resize(&mut self, new_len: usize, value: T)
    where
        T: Clone,
    {
        if new_len > self.len {
            if new_len > self.range.cap() {
                self.relocate(new_len);
            }
            while self.len < new_len {
                // SAFETY: len < new_len <= cap, slot is raw.
                unsafe { self.range.ptr().as_ptr().add(self.len).write(value.clone()) };
                self.len += 1;
            }
        } else {
            self.truncate(new_len);
        }
    }

    /// [`resize`](Self::resize) with default-constructed fill.
    ///
    /// Separate operation with a `T: Default` bound, so resizing a
    /// non-defaultable type without a fill value fails to compile instead
    /// of failing at run time.
    pub fn resize_default(&mut self, new_len: usize)
    where
        T: Default,
    {
        if new_len > self.len {
            if new_len > self.range.cap() {
                self.relocate(new_len);
            }
            while self.len < new_len {
                // SAFETY: len < new_len <= cap, slot is raw.
                unsafe { self.range.ptr().as_ptr().add(self.len).write(T::default()) };
                self.len += 1;
            }
        } else {
            self.truncate(new_len);
        }
    }

    /// Relocate so that `capacity() == len()`. No-op when already exact;
    /// an empty buffer drops its allocation entirely.
    pub fn shrink_to_fit(&mut self) {
        if mem::size_of::<T>() == 0 {
            return;
        }
        if self.range.cap() == self.len {
            return;
        }
        self.relocate(self.len);
    }

    /// First live element, `None` if empty.
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// First live element, mutable.
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// Last live element, `None` if empty.
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Last live element, mutable.
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Bounds-checked access.
    ///
    /// The error carries the index, the length, and this call site.
    #[track_caller]
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        if index < self.len {
            // SAFETY: index < len just checked.
            Ok(unsafe { self.get_unchecked(index) })
        } else {
            Err(OutOfRange::new(index, self.len))
        }
    }

    /// Bounds-checked mutable access.
    #[track_caller]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        if index < self.len {
            // SAFETY: index < len just checked.
            Ok(unsafe { self.get_unchecked_mut(index) })
        } else {
            Err(OutOfRange::new(index, self.len))
        }
    }

    /// Unchecked access.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len`](Self::len). No check is made at
    /// any optimization level; violating the contract is undefined
    /// behavior.
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        &*self.range.ptr().as_ptr().add(index)
    }

    /// Unchecked mutable access.
    ///
    /// # Safety
    ///
    /// Same contract as [`get_unchecked`](Self::get_unchecked).
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        &mut *self.range.ptr().as_ptr().add(index)
    }

    /// Raw start pointer of the live range.
    ///
    /// Dangling (but aligned) when nothing is allocated. Valid until the
    /// next mutating operation.
    pub fn as_ptr(&self) -> *const T {
        self.range.ptr().as_ptr()
    }

    /// Raw mutable start pointer of the live range.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.range.ptr().as_ptr()
    }

    /// The live elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [0, len) are live; a dangling-but-aligned pointer is
        // valid for a zero-length slice.
        unsafe { slice::from_raw_parts(self.range.ptr().as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as `as_slice`, plus `&mut self` gives exclusivity.
        unsafe { slice::from_raw_parts_mut(self.range.ptr().as_ptr(), self.len) }
    }

    /// Count of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no live elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total element slots currently allocated, live or not.
    ///
    /// `usize::MAX` for zero-sized element types, which never allocate.
    pub fn capacity(&self) -> usize {
        self.range.cap()
    }

    /// Cursor over the live range.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.range.ptr(), self.len)
    }

    /// Mutable cursor over the live range.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.range.ptr(), self.len)
    }

    /// Drop live elements past `new_len`, back to front.
    fn truncate(&mut self, new_len: usize) {
        while self.len > new_len {
            self.len -= 1;
            if mem::needs_drop::<T>() {
                // SAFETY: slot `len` held the last live element and was
                // reclassified as raw by the decrement.
                unsafe { ptr::drop_in_place(self.range.ptr().as_ptr().add(self.len)) };
            }
        }
    }

    /// 1.5× growth step: `len + len/2 + 1`, so the first growth yields 1.
    fn grow_amortized(&mut self) {
        let new_cap = self
            .len
            .checked_add(self.len / 2)
            .and_then(|c| c.checked_add(1))
            .expect("buffer capacity overflows usize");
        self.relocate(new_cap);
    }

    /// Move the live elements into a fresh range of exactly `new_cap`
    /// slots and release the old range.
    fn relocate(&mut self, new_cap: usize) {
        debug_assert!(new_cap >= self.len, "relocation below the live length");
        let new_range = match &self.pool {
            Some(pool) => RawRange::with_capacity_in(new_cap, pool),
            None => RawRange::with_capacity(new_cap),
        };
        if self.len > 0 {
            // SAFETY: the ranges are distinct allocations; the old one
            // holds `len` live elements and the new one has at least `len`
            // raw slots. The bitwise copy IS the move; the old slots are
            // raw afterwards and are not dropped (RawRange frees memory
            // only).
            unsafe {
                ptr::copy_nonoverlapping(
                    self.range.ptr().as_ptr(),
                    new_range.ptr().as_ptr(),
                    self.len,
                )
            };
        }
        self.range = new_range;
    }
}

impl<T> Default for GrowBuf<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for GrowBuf<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Clone> Clone for GrowBuf<T> {
    /// Deep copy into a fresh range sized to the source's length, through
    /// the same pool when the source is pool-backed.
    fn clone(&self) -> Self {
        let mut out = match &self.pool {
            Some(pool) => Self::with_capacity_in(self.len, std::rc::Rc::clone(pool)),
            None => Self::with_capacity(self.len),
        };
        for item in self.as_slice() {
            out.push(item.clone());
        }
        out
    }
}

impl<T: fmt::Debug> fmt::Debug for GrowBuf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: PartialEq> PartialEq for GrowBuf<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for GrowBuf<T> {}

impl<T> std::ops::Index<usize> for GrowBuf<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T> std::ops::IndexMut<usize> for GrowBuf<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T> Extend<T> for GrowBuf<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for GrowBuf<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buf = Self::new();
        buf.extend(iter);
        buf
    }
}

impl<'a, T> IntoIterator for &'a GrowBuf<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut GrowBuf<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}

impl<T> IntoIterator for GrowBuf<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Consume the buffer, yielding elements front to back. Un-consumed
    /// elements are dropped with the iterator.
    fn into_iter(self) -> IntoIter<T> {
        let this = mem::ManuallyDrop::new(self);
        // SAFETY: each field is moved out exactly once and `this` is never
        // dropped, so nothing is freed or dropped twice.
        let range = unsafe { ptr::read(&this.range) };
        let pool = unsafe { ptr::read(&this.pool) };
        let len = this.len;
        // The buffer's own pool reference is no longer needed; the range
        // keeps the pool alive through its backing if it must.
        drop(pool);
        IntoIter::new(range, len)
    }
}
