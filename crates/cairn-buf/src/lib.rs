//! Growable contiguous-storage buffer for the cairn container family.
//!
//! [`GrowBuf`] is a hand-rolled dynamic array: one contiguous owned
//! allocation, a live-element count, amortized 1.5× growth on append, and
//! a checked/unchecked access split ([`GrowBuf::at`] vs
//! [`GrowBuf::get_unchecked`]). Storage comes from the system allocator by
//! default, or from a shared [`cairn_pool::BlockPool`] when the buffer is
//! built with [`GrowBuf::with_pool`].
//!
//! # Architecture
//!
//! ```text
//! GrowBuf<T>
//! ├── RawRange<T>       one owned allocation: pointer + capacity + backing
//! ├── len               count of live, constructed elements
//! └── Option<SharedBlockPool>   where replacement ranges come from
//! ```
//!
//! Elements `[0, len)` are live; `[len, capacity)` are raw storage that has
//! never been constructed (or whose contents were moved out). `RawRange`
//! releases the memory on every exit path; `GrowBuf` is the only code that
//! constructs or drops elements inside it.
//!
//! # Safety posture
//!
//! This crate contains `unsafe` for placement writes, in-place drops, and
//! the pointer-cursor iterators. Every unsafe block carries a `// SAFETY:`
//! comment stating the invariant it relies on. The single unchecked public
//! entry point is [`GrowBuf::get_unchecked`]/[`GrowBuf::get_unchecked_mut`],
//! whose out-of-range behavior is undefined by contract — the deliberate
//! zero-overhead twin of the checked [`GrowBuf::at`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod buf;
pub mod error;
pub mod iter;
mod raw;

pub use buf::GrowBuf;
pub use error::OutOfRange;
pub use iter::{IntoIter, Iter, IterMut};
