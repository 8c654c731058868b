//! The block pool: a segregated free-list over system allocations.
//!
//! Blocks are raw system allocations tracked in a side table. A block is
//! born in-use, flips to free on [`BlockPool::deallocate`], and may be
//! handed out again by a later [`BlockPool::allocate`] of a compatible
//! size. Nothing is returned to the system until
//! [`BlockPool::release_all`], which frees every block at once — free or
//! in-use — and invalidates every outstanding [`BlockHandle`].

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::cell::RefCell;
use std::mem;
use std::ptr::NonNull;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::config::PoolConfig;
use crate::handle::BlockHandle;

/// Side-table record for one block.
///
/// The record is the single source of truth for the block's state; the
/// payload itself carries no header, so nothing here may be recovered by
/// pointer arithmetic from the payload address.
struct BlockMeta {
    /// Start of the usable payload. Owned by the pool.
    ptr: NonNull<u8>,
    /// Exact layout the block was allocated with. Needed to free it.
    layout: Layout,
    /// Whether the block is currently available for recycling.
    is_free: bool,
}

/// Per-size-class membership list.
///
/// A block joins exactly one bucket at creation and stays there for its
/// lifetime. Allocation scans the bucket for the first free block that
/// fits; there is no cross-bucket stealing.
struct Bucket {
    members: SmallVec<[u32; 8]>,
}

/// A shared, single-owner-per-thread handle to a [`BlockPool`].
///
/// The pool is single-threaded by design; `Rc<RefCell<_>>` lets a buffer
/// and its creator hold the same pool without a generic allocator
/// parameter. Mutation is serialized by `RefCell`'s dynamic borrows.
pub type SharedBlockPool = Rc<RefCell<BlockPool>>;

/// Segregated free-list pool of recyclable memory blocks.
///
/// See the [crate docs](crate) for the architecture. All operations are
/// O(1) except the free-block scan in [`allocate`](Self::allocate), which
/// is linear in the bucket's membership.
pub struct BlockPool {
    config: PoolConfig,
    blocks: Vec<BlockMeta>,
    buckets: Vec<Bucket>,
    /// Bumped by `release_all`. Handles from earlier epochs are stale:
    /// their indices may have been reissued to unrelated blocks.
    epoch: u32,
}

impl BlockPool {
    /// Create an empty pool with the default size classes.
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    /// Create an empty pool with a custom size-class table.
    pub fn with_config(config: PoolConfig) -> Self {
        let buckets = (0..config.bucket_count())
            .map(|_| Bucket {
                members: SmallVec::new(),
            })
            .collect();
        Self {
            config,
            blocks: Vec::new(),
            buckets,
            epoch: 0,
        }
    }

    /// Allocate a block holding `count` elements of `T`.
    ///
    /// Recycles the first free block in the payload's bucket whose size
    /// and alignment satisfy the request; otherwise takes a fresh system
    /// allocation sized exactly to the payload. The returned payload is
    /// uninitialized either way — use [`construct`] to place values in it.
    ///
    /// Aborts the process if the system allocator fails
    /// ([`handle_alloc_error`]); there is no degraded mode.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero, if `T` is zero-sized, or if the payload
    /// size overflows a [`Layout`].
    pub fn allocate<T>(&mut self, count: usize) -> BlockHandle {
        assert!(count > 0, "allocate requires a non-zero element count");
        assert!(
            mem::size_of::<T>() != 0,
            "zero-sized payloads are not pool-allocated"
        );

        let layout = Layout::array::<T>(count).expect("payload size overflows a Layout");
        let bucket = self.config.bucket_for(layout.size());

        // First-fit scan of the bucket's free blocks. Recycled blocks in
        // the overflow bucket can be smaller than the request, hence the
        // size check; alignment must hold for the payload type too.
        for &index in &self.buckets[bucket].members {
            let meta = &mut self.blocks[index as usize];
            if meta.is_free
                && meta.layout.size() >= layout.size()
                && meta.layout.align() >= layout.align()
            {
                meta.is_free = false;
                return BlockHandle::new(index, self.epoch);
            }
        }

        // SAFETY: `layout` has non-zero size (count > 0 and T non-ZST,
        // both asserted above).
        let raw = unsafe { alloc(layout) };
        let ptr = match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout),
        };

        let index = u32::try_from(self.blocks.len()).expect("block side table exceeds u32 range");
        self.blocks.push(BlockMeta {
            ptr,
            layout,
            is_free: false,
        });
        self.buckets[bucket].members.push(index);
        BlockHandle::new(index, self.epoch)
    }

    /// Resolve a handle to its typed payload pointer.
    ///
    /// The pointer is valid until [`release_all`](Self::release_all) (or
    /// the pool is dropped). The pool does not track what the caller has
    /// constructed there; destruction remains the caller's job.
    ///
    /// # Panics
    ///
    /// Panics on a stale handle — one issued before the pool's last
    /// [`release_all`](Self::release_all) — or one that does not name a
    /// tracked block.
    pub fn payload<T>(&self, handle: BlockHandle) -> NonNull<T> {
        assert_eq!(
            handle.epoch, self.epoch,
            "stale handle: issued before the pool's last release"
        );
        let meta = self
            .blocks
            .get(handle.index as usize)
            .expect("handle does not name a tracked block");
        debug_assert!(!meta.is_free, "resolving the payload of a free block");
        debug_assert!(
            meta.layout.align() >= mem::align_of::<T>(),
            "payload type over-aligned for this block"
        );
        meta.ptr.cast()
    }

    /// Mark a block free for recycling.
    ///
    /// The block stays in its bucket's member list with its free flag set
    /// in the side table; the next fitting [`allocate`](Self::allocate)
    /// picks it up there. The memory stays with the pool and any value in
    /// the payload is NOT dropped — run [`destroy`] first if the payload
    /// holds live values.
    ///
    /// # Panics
    ///
    /// Panics on a stale handle (see [`payload`](Self::payload)) or one
    /// that does not name a tracked block.
    pub fn deallocate(&mut self, handle: BlockHandle) {
        assert_eq!(
            handle.epoch, self.epoch,
            "stale handle: issued before the pool's last release"
        );
        let meta = self
            .blocks
            .get_mut(handle.index as usize)
            .expect("handle does not name a tracked block");
        debug_assert!(!meta.is_free, "block deallocated twice");
        meta.is_free = true;
    }

    /// Free every tracked block back to the system, free or in-use.
    ///
    /// Whole-pool teardown: every pointer and [`BlockHandle`] previously
    /// issued becomes invalid. The pool itself stays usable and starts
    /// tracking from an empty side table. Also run on drop.
    pub fn release_all(&mut self) {
        for meta in self.blocks.drain(..) {
            // SAFETY: `ptr` was produced by `alloc(layout)` with this very
            // layout and has not been freed (only `release_all` frees, and
            // it drains the table).
            unsafe { dealloc(meta.ptr.as_ptr(), meta.layout) };
        }
        for bucket in &mut self.buckets {
            bucket.members.clear();
        }
        // Reissued indices start a new epoch so old handles cannot alias
        // them.
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Number of blocks currently tracked, free or in-use.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of tracked blocks currently free for recycling.
    pub fn free_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_free).count()
    }

    /// Total payload bytes held across all tracked blocks.
    pub fn memory_bytes(&self) -> usize {
        self.blocks.iter().map(|b| b.layout.size()).sum()
    }

    /// The pool's size-class configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Wrap the pool for sharing with the buffers it backs.
    pub fn into_shared(self) -> SharedBlockPool {
        Rc::new(RefCell::new(self))
    }
}

impl Default for BlockPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BlockPool {
    fn drop(&mut self) {
        self.release_all();
    }
}

/// Place `value` into raw pool memory.
///
/// This and [`destroy`] are the only sanctioned ways to run a constructor
/// or destructor on pool-owned storage.
///
/// # Safety
///
/// `location` must be valid for writes of `T` and properly aligned —
/// i.e. a payload pointer from [`BlockPool::payload`] over a block big
/// enough for `T`, or an element slot within one. Any previous value at
/// the location is overwritten without being dropped.
pub unsafe fn construct<T>(location: *mut T, value: T) {
    location.write(value);
}

/// Drop the value at `location` in place.
///
/// A no-op for trivially destructible types; the needs-destruction check
/// happens once here, at the type level, not at call sites.
///
/// # Safety
///
/// `location` must point to a live, properly aligned `T` that is not used
/// again until something is constructed there.
pub unsafe fn destroy<T>(location: *mut T) {
    if mem::needs_drop::<T>() {
        location.drop_in_place();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_allocation_starts_in_use() {
        let mut pool = BlockPool::new();
        let h = pool.allocate::<u64>(4);
        assert_eq!(pool.block_count(), 1);
        assert_eq!(pool.free_count(), 0);
        let _ = pool.payload::<u64>(h);
    }

    #[test]
    fn deallocate_then_allocate_recycles_the_block() {
        let mut pool = BlockPool::new();
        let first = pool.allocate::<u64>(4);
        let first_ptr = pool.payload::<u64>(first);
        pool.deallocate(first);
        assert_eq!(pool.free_count(), 1);

        let second = pool.allocate::<u64>(4);
        assert_eq!(second, first, "same-size request reuses the free block");
        assert_eq!(pool.payload::<u64>(second), first_ptr);
        assert_eq!(pool.block_count(), 1);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn different_size_classes_do_not_share_blocks() {
        let mut pool = BlockPool::new();
        let small = pool.allocate::<u8>(8); // 8 bytes, first class
        pool.deallocate(small);
        let large = pool.allocate::<u8>(64); // 64 bytes, different class
        assert_ne!(small, large);
        assert_eq!(pool.block_count(), 2);
    }

    #[test]
    fn undersized_free_block_is_not_recycled() {
        let mut pool = BlockPool::new();
        // Both land in the overflow bucket, but the free one is smaller
        // than the follow-up request.
        let small_overflow = pool.allocate::<u8>(200);
        pool.deallocate(small_overflow);
        let big_overflow = pool.allocate::<u8>(500);
        assert_ne!(small_overflow, big_overflow);

        // The reverse direction fits: a 500-byte free block satisfies a
        // 200-byte overflow request.
        pool.deallocate(big_overflow);
        let reuse = pool.allocate::<u8>(300);
        assert_eq!(reuse, big_overflow);
    }

    #[test]
    fn release_all_frees_in_use_blocks_too() {
        let mut pool = BlockPool::new();
        let a = pool.allocate::<u32>(10);
        let b = pool.allocate::<u32>(10);
        pool.deallocate(b);
        assert_eq!(pool.block_count(), 2);

        pool.release_all();
        assert_eq!(pool.block_count(), 0);
        assert_eq!(pool.memory_bytes(), 0);
        // Fresh allocations work after teardown.
        let c = pool.allocate::<u32>(10);
        let _ = (a, c);
    }

    #[test]
    #[should_panic(expected = "stale handle")]
    fn stale_handle_panics_after_release() {
        let mut pool = BlockPool::new();
        let h = pool.allocate::<u32>(1);
        pool.release_all();
        let _ = pool.payload::<u32>(h);
    }

    #[test]
    #[should_panic(expected = "stale handle")]
    fn stale_handle_cannot_free_a_reissued_block() {
        let mut pool = BlockPool::new();
        let stale = pool.allocate::<u64>(4);
        pool.release_all();

        // The new block reuses the old index but lives in a newer epoch,
        // so the stale handle must not reach it.
        let fresh = pool.allocate::<u64>(4);
        assert_eq!(fresh.index(), stale.index());
        assert_ne!(fresh, stale);

        pool.deallocate(stale);
    }

    #[test]
    fn release_all_advances_the_epoch() {
        let mut pool = BlockPool::new();
        let before = pool.allocate::<u8>(8);
        pool.release_all();
        let after = pool.allocate::<u8>(8);
        assert_eq!(after.epoch(), before.epoch().wrapping_add(1));
    }

    #[test]
    #[should_panic(expected = "non-zero element count")]
    fn zero_count_allocation_is_a_contract_violation() {
        let mut pool = BlockPool::new();
        let _ = pool.allocate::<u32>(0);
    }

    #[test]
    fn construct_and_destroy_round_trip() {
        use std::cell::Cell;
        use std::rc::Rc;

        struct Loud(Rc<Cell<u32>>);
        impl Drop for Loud {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let drops = Rc::new(Cell::new(0));
        let mut pool = BlockPool::new();
        let h = pool.allocate::<Loud>(1);
        let ptr = pool.payload::<Loud>(h).as_ptr();

        // SAFETY: `ptr` is a fresh, properly aligned slot for one `Loud`.
        unsafe { construct(ptr, Loud(Rc::clone(&drops))) };
        assert_eq!(drops.get(), 0);

        // SAFETY: a live `Loud` sits at `ptr` and is not touched again.
        unsafe { destroy(ptr) };
        assert_eq!(drops.get(), 1);
        pool.deallocate(h);
    }

    #[test]
    fn memory_bytes_tracks_payloads() {
        let mut pool = BlockPool::new();
        let _a = pool.allocate::<u8>(24);
        let _b = pool.allocate::<u8>(100);
        assert_eq!(pool.memory_bytes(), 124);
    }

    #[test]
    fn shared_pool_round_trip() {
        let shared = BlockPool::new().into_shared();
        let h = shared.borrow_mut().allocate::<u64>(2);
        let _ = shared.borrow().payload::<u64>(h);
        shared.borrow_mut().deallocate(h);
        assert_eq!(shared.borrow().free_count(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The side table never grows past the number of fresh
            /// allocations, and recycling keeps it strictly smaller when
            /// sizes repeat.
            #[test]
            fn block_count_bounded_by_alloc_count(
                sizes in proptest::collection::vec(1usize..64, 1..40),
            ) {
                let mut pool = BlockPool::new();
                for &size in &sizes {
                    let h = pool.allocate::<u8>(size);
                    pool.deallocate(h);
                }
                prop_assert!(pool.block_count() <= sizes.len());
            }

            /// Live payload pointers are pairwise distinct.
            #[test]
            fn live_payloads_are_distinct(
                sizes in proptest::collection::vec(1usize..64, 1..20),
            ) {
                let mut pool = BlockPool::new();
                let handles: Vec<_> = sizes.iter().map(|&s| pool.allocate::<u8>(s)).collect();
                let ptrs: Vec<_> = handles
                    .iter()
                    .map(|&h| pool.payload::<u8>(h).as_ptr() as usize)
                    .collect();
                let distinct: std::collections::HashSet<_> = ptrs.iter().collect();
                prop_assert_eq!(distinct.len(), ptrs.len());
            }

            /// free_count equals allocations minus live blocks across any
            /// alternating alloc/dealloc sequence.
            #[test]
            fn free_count_is_consistent(
                ops in proptest::collection::vec((1usize..32, proptest::bool::ANY), 1..40),
            ) {
                let mut pool = BlockPool::new();
                let mut live: Vec<BlockHandle> = Vec::new();
                for &(size, free_one) in &ops {
                    if free_one && !live.is_empty() {
                        pool.deallocate(live.pop().unwrap());
                    } else {
                        live.push(pool.allocate::<u8>(size));
                    }
                }
                prop_assert_eq!(pool.block_count() - live.len(), pool.free_count());
            }
        }
    }
}
