//! Allocator capability interface.
//!
//! The engine never manages memory itself: every buffer is obtained from,
//! and returned to, an allocator injected at construction. The injection
//! seam is the [`StressAllocator`] trait — the Rust rendering of a pair of
//! caller-supplied allocate/free capabilities.
//!
//! Implementations provided here:
//! - [`SystemAllocator`] — pass-through to the process heap
//! - [`CountingAllocator`] — wraps any allocator and keeps shared
//!   allocation statistics
//! - [`ExhaustingAllocator`] — always refuses, for allocation-failure
//!   transparency tests

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Two-operation allocator capability consumed by the stress engine.
///
/// `allocate` returning `None` signals exhaustion; the engine treats that
/// as a transient condition, never an error. `deallocate` consumes exactly
/// what `allocate` returned — ownership of the `Box` makes double-free
/// unrepresentable.
pub trait StressAllocator {
    /// Request a buffer of exactly `size` bytes, or `None` on failure.
    fn allocate(&mut self, size: usize) -> Option<Box<[u8]>>;

    /// Return a buffer previously handed out by `allocate`.
    fn deallocate(&mut self, block: Box<[u8]>);
}

/// Pass-through to the real process heap.
///
/// This is the allocator a RAM soak test runs against: every buffer is a
/// live heap allocation touching physical memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

impl StressAllocator for SystemAllocator {
    fn allocate(&mut self, size: usize) -> Option<Box<[u8]>> {
        Some(vec![0u8; size].into_boxed_slice())
    }

    fn deallocate(&mut self, block: Box<[u8]>) {
        drop(block);
    }
}

/// Shared allocation statistics kept by [`CountingAllocator`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocStats {
    /// Successful allocations
    pub allocations: u64,
    /// Refused allocation requests
    pub failures: u64,
    /// Buffers returned to the allocator
    pub frees: u64,
    /// Bytes currently held by outstanding buffers
    pub live_bytes: usize,
    /// High-water mark of `live_bytes`
    pub peak_live_bytes: usize,
}

impl AllocStats {
    /// Buffers currently outstanding (allocated, not yet freed)
    pub fn outstanding(&self) -> u64 {
        self.allocations - self.frees
    }
}

/// Wraps another allocator and counts traffic through it.
///
/// The statistics live behind an `Rc` handle cloned out via
/// [`CountingAllocator::stats_handle`], so a caller can keep observing them
/// after the allocator has been moved into an engine. The engine is
/// single-threaded, so `Rc<RefCell<_>>` is sufficient.
#[derive(Debug)]
pub struct CountingAllocator<A> {
    inner: A,
    stats: Rc<RefCell<AllocStats>>,
}

impl<A: StressAllocator> CountingAllocator<A> {
    /// Wrap `inner` with fresh counters.
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            stats: Rc::new(RefCell::new(AllocStats::default())),
        }
    }

    /// Shared handle to the live statistics.
    pub fn stats_handle(&self) -> Rc<RefCell<AllocStats>> {
        Rc::clone(&self.stats)
    }
}

impl<A: StressAllocator> StressAllocator for CountingAllocator<A> {
    fn allocate(&mut self, size: usize) -> Option<Box<[u8]>> {
        match self.inner.allocate(size) {
            Some(block) => {
                let mut stats = self.stats.borrow_mut();
                stats.allocations += 1;
                stats.live_bytes += block.len();
                stats.peak_live_bytes = stats.peak_live_bytes.max(stats.live_bytes);
                Some(block)
            }
            None => {
                self.stats.borrow_mut().failures += 1;
                None
            }
        }
    }

    fn deallocate(&mut self, block: Box<[u8]>) {
        let mut stats = self.stats.borrow_mut();
        stats.frees += 1;
        stats.live_bytes -= block.len();
        drop(stats);
        self.inner.deallocate(block);
    }
}

/// Allocator that refuses every request.
///
/// NOTE: Available in all builds to support integration testing of
/// allocation-failure transparency, but should only be used in test code.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExhaustingAllocator;

impl StressAllocator for ExhaustingAllocator {
    fn allocate(&mut self, _size: usize) -> Option<Box<[u8]>> {
        None
    }

    fn deallocate(&mut self, block: Box<[u8]>) {
        drop(block);
    }
}
