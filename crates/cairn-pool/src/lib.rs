//! Segregated free-list block pool for the cairn container family.
//!
//! A [`BlockPool`] hands out fixed-size-class memory blocks and recycles
//! them on [`deallocate`](BlockPool::deallocate) instead of returning them
//! to the system. Memory goes back to the operating system only on
//! [`release_all`](BlockPool::release_all) (or drop), which tears down
//! every block at once regardless of its free/in-use state.
//!
//! # Architecture
//!
//! ```text
//! BlockPool
//! ├── Vec<BlockMeta>          side table: one record per block ever made
//! ├── Bucket × (classes + 1)  per-size-class member lists (SmallVec<u32>)
//! └── PoolConfig              size-class boundary table
//! ```
//!
//! Callers never see block metadata directly. [`allocate`](BlockPool::allocate)
//! returns an opaque [`BlockHandle`] that indexes into the side table;
//! resolving a handle to its payload pointer is O(1) and involves no
//! pointer arithmetic against an embedded header.
//!
//! # Safety posture
//!
//! The pool owns raw, uninitialized system allocations. Running a
//! constructor or destructor on pool memory is only permitted through
//! [`construct`] and [`destroy`], both `unsafe` with explicit contracts.
//! Every other `unsafe` block in this crate carries a `// SAFETY:` comment.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod config;
pub mod handle;
pub mod pool;

pub use config::PoolConfig;
pub use handle::BlockHandle;
pub use pool::{construct, destroy, BlockPool, SharedBlockPool};
