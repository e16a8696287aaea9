//! Memstress Core - Heap/RAM Integrity Stress Engine
//!
//! Deterministic allocation-churn engine: randomly sized buffers are
//! obtained from a caller-supplied allocator, filled with a pseudo-random
//! pattern derived from each buffer's size, re-verified on a later visit,
//! and the first mismatch halts the run with a full corruption report.
//!
//! # Architecture
//!
//! - **rng**: Deterministic random number generation (xorshift32)
//! - **pattern**: Size-seeded fill/verify byte streams
//! - **alloc**: Allocator capability trait and stock implementations
//! - **models**: Slot table, event log, corruption report
//! - **engine**: Step loop, configuration, checkpointing
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded xorshift32)
//! 2. Buffer contents are fully derivable from buffer size
//! 3. The first mismatch halts the run and is never overwritten
//! 4. The engine never allocates stress buffers itself — everything goes
//!    through the injected allocator

// Module declarations
pub mod alloc;
pub mod engine;
pub mod models;
pub mod pattern;
pub mod rng;

// Re-exports for convenience
pub use alloc::{
    AllocStats, CountingAllocator, ExhaustingAllocator, StressAllocator, SystemAllocator,
};
pub use engine::{
    compute_config_hash, validate_snapshot, RunState, StateSnapshot, StepOutcome, StressConfig,
    StressEngine, StressError,
};
pub use models::{
    event::{Event, EventLog},
    report::{CorruptionPhase, CorruptionReport, CorruptionSummary},
    slot::Slot,
    state::SlotTable,
};
pub use pattern::Mismatch;
pub use rng::StressRng;
