//! Pointer-cursor iterators over the live range.
//!
//! [`Iter`] and [`IterMut`] are thin cursors: a position pointer plus a
//! remaining count, no back-reference to the buffer. They depend only on
//! the buffer's contiguous layout; the borrow they carry is what keeps the
//! buffer from mutating (and relocating) underneath them. [`IntoIter`]
//! additionally owns the allocation and drops whatever was not consumed.

use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::mem;
use std::ptr;
use std::ptr::NonNull;

use crate::raw::RawRange;

/// Advance a cursor pointer by one element.
///
/// Zero-sized elements all live at the same (dangling) address, so the
/// pointer stays put and only the count moves.
fn step<T>(ptr: NonNull<T>) -> NonNull<T> {
    if mem::size_of::<T>() == 0 {
        ptr
    } else {
        // SAFETY: callers only step within an allocation they are
        // iterating, so the one-past positions stay in bounds.
        unsafe { NonNull::new_unchecked(ptr.as_ptr().add(1)) }
    }
}

/// Shared cursor over a buffer's live elements.
pub struct Iter<'a, T> {
    ptr: NonNull<T>,
    remaining: usize,
    _marker: PhantomData<&'a T>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(ptr: NonNull<T>, len: usize) -> Self {
        Self {
            ptr,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: `remaining > 0` means the cursor still points at a live
        // element of the borrowed buffer.
        let item = unsafe { &*self.ptr.as_ptr() };
        self.ptr = step(self.ptr);
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: offset `remaining` (post-decrement) is the last element
        // not yet yielded from either end.
        Some(unsafe { &*self.ptr.as_ptr().add(self.remaining) })
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            ptr: self.ptr,
            remaining: self.remaining,
            _marker: PhantomData,
        }
    }
}

/// Exclusive cursor over a buffer's live elements.
pub struct IterMut<'a, T> {
    ptr: NonNull<T>,
    remaining: usize,
    _marker: PhantomData<&'a mut T>,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new(ptr: NonNull<T>, len: usize) -> Self {
        Self {
            ptr,
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        // SAFETY: as `Iter::next`; the cursor yields each element at most
        // once, so the exclusive reborrows never alias.
        let item = unsafe { &mut *self.ptr.as_ptr() };
        self.ptr = step(self.ptr);
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<&'a mut T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // SAFETY: as `Iter::next_back`, plus single-yield exclusivity.
        Some(unsafe { &mut *self.ptr.as_ptr().add(self.remaining) })
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

/// Owning iterator; drops un-consumed elements with itself.
pub struct IntoIter<T> {
    range: RawRange<T>,
    front: usize,
    back: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(range: RawRange<T>, len: usize) -> Self {
        Self {
            range,
            front: 0,
            back: len,
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: slots [front, back) hold live elements; reading slot
        // `front` and advancing reclassifies it as raw.
        let item = unsafe { self.range.ptr().as_ptr().add(self.front).read() };
        self.front += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: slot `back` (post-decrement) is live and yielded once.
        Some(unsafe { self.range.ptr().as_ptr().add(self.back).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        if mem::needs_drop::<T>() {
            while self.front < self.back {
                // SAFETY: [front, back) are still live; each is dropped
                // exactly once before the range releases the memory.
                unsafe {
                    ptr::drop_in_place(self.range.ptr().as_ptr().add(self.front));
                }
                self.front += 1;
            }
        }
    }
}
