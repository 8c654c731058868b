//! Cairn: a growable contiguous buffer and the block pool that backs it.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the cairn sub-crates. For most users, adding `cairn` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use cairn::prelude::*;
//!
//! // A plain buffer on the system allocator.
//! let mut buf = GrowBuf::new();
//! for i in 0..20 {
//!     buf.push(i);
//! }
//! assert_eq!(buf.len(), 20);
//! assert_eq!(buf.back(), Some(&19));
//!
//! // A buffer whose storage is recycled through a shared block pool.
//! let pool = BlockPool::new().into_shared();
//! let mut pooled = GrowBuf::with_pool(pool.clone());
//! pooled.extend(0..100);
//! drop(pooled);
//! // Every range the buffer used went back to the pool for reuse.
//! assert_eq!(pool.borrow().free_count(), pool.borrow().block_count());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`buf`] | `cairn-buf` | [`GrowBuf`], iterators, [`OutOfRange`] |
//! | [`pool`] | `cairn-pool` | [`BlockPool`], [`BlockHandle`], [`PoolConfig`] |

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The growable buffer and its iterators (re-export of `cairn-buf`).
pub mod buf {
    pub use cairn_buf::*;
}

/// The segregated free-list block pool (re-export of `cairn-pool`).
pub mod pool {
    pub use cairn_pool::*;
}

pub use cairn_buf::{GrowBuf, IntoIter, Iter, IterMut, OutOfRange};
pub use cairn_pool::{BlockHandle, BlockPool, PoolConfig, SharedBlockPool};

/// The types most callers need, in one import.
pub mod prelude {
    pub use cairn_buf::{GrowBuf, OutOfRange};
    pub use cairn_pool::{BlockPool, PoolConfig, SharedBlockPool};
}
