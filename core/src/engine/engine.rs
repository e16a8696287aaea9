//! Stress Engine
//!
//! Main stress loop integrating all components:
//! - Slot selection and size selection (shared deterministic RNG stream)
//! - Allocation through the injected allocator capability
//! - Size-seeded pattern fill and verification
//! - First-failure corruption reporting
//! - Event logging (optional, for replay and auditing)
//!
//! # Architecture
//!
//! The engine drives a two-way state machine per step:
//!
//! ```text
//! For each step:
//! 1. Draw a slot index uniformly from [0, slot_count)
//! 2. Empty slot:
//!    a. Draw a size uniformly from [0, max_alloc_size)
//!    b. Request a buffer; on refusal skip the step (transient, no error)
//!    c. Fill with the pattern seeded by the buffer's length
//!    d. Optionally re-verify immediately (WRITE-phase detection)
//!    e. Install the buffer in the slot
//! 3. Occupied slot:
//!    a. Regenerate the expected pattern from the remembered length
//!    b. Compare byte-by-byte; mismatch is READ-phase corruption
//!    c. On success release the buffer and clear the slot
//! 4. On continue, increment the iteration counter
//! ```
//!
//! The run is RUNNING until the first mismatch, then STOPPED for good: the
//! engine cannot fix memory, it can only report.
//!
//! # Determinism
//!
//! All randomness goes through the engine-owned seeded xorshift32 stream.
//! Same seed + same config + same allocator behavior = identical runs.
//! Buffer contents never depend on the shared stream — they reseed from
//! the buffer size, so a later visit can verify without replaying history.
//!
//! # Example
//!
//! ```
//! use memstress_core::{StepOutcome, StressConfig, StressEngine, SystemAllocator};
//!
//! let config = StressConfig {
//!     slot_count: 8,
//!     max_alloc_size: 64,
//!     seed: 42,
//!     ..StressConfig::default()
//! };
//!
//! let mut engine = StressEngine::new(config, Box::new(SystemAllocator)).unwrap();
//! for _ in 0..1000 {
//!     if engine.step() == StepOutcome::Stop {
//!         break;
//!     }
//! }
//! assert!(engine.corruption().is_none());
//! ```

use crate::alloc::StressAllocator;
use crate::engine::checkpoint::{self, StateSnapshot};
use crate::models::event::{Event, EventLog};
use crate::models::report::{CorruptionPhase, CorruptionReport};
use crate::models::state::SlotTable;
use crate::pattern;
use crate::rng::StressRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Configuration
// ============================================================================

/// Complete stress-run configuration.
///
/// Immutable for the lifetime of one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StressConfig {
    /// Number of slots in the table (one potential live allocation each)
    pub slot_count: usize,

    /// Exclusive upper bound on allocation sizes in bytes
    pub max_alloc_size: usize,

    /// RNG seed for deterministic slot/size selection (0 is normalized to 1)
    pub seed: u32,

    /// Re-verify every buffer immediately after filling it, classifying a
    /// mismatch as WRITE-phase corruption
    pub verify_on_write: bool,

    /// Record events for replay/auditing; leave off for unbounded soak runs
    pub record_events: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            slot_count: 1024,
            max_alloc_size: 1024,
            seed: 1,
            verify_on_write: true,
            record_events: false,
        }
    }
}

// ============================================================================
// Step / run signals
// ============================================================================

/// Signal returned by one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Keep stepping
    Continue,
    /// Corruption detected; the run is over
    Stop,
}

/// Engine-level run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// No mismatch seen yet
    Running,
    /// Terminal: a mismatch was detected
    Stopped,
}

/// Stress-engine error types.
///
/// Allocation exhaustion is deliberately absent: a refused allocation is a
/// transient condition handled inside `step`, not an error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StressError {
    /// Configuration validation error
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Serialization failed (config hashing, snapshot encoding)
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Snapshot failed validation against the supplied config
    #[error("snapshot validation failed: {0}")]
    SnapshotValidation(String),

    /// The allocator refused a buffer while rebuilding snapshot state
    #[error("allocator exhausted while restoring {size} byte buffer for slot {slot}")]
    RestoreExhausted { slot: usize, size: usize },
}

// ============================================================================
// Engine
// ============================================================================

/// Main engine owning the slot table and driving the stress loop.
///
/// The engine owns its slot table, RNG stream, and corruption record
/// exclusively; no other component mutates them during a run. It holds no
/// background work — the caller decides the pacing by choosing when to
/// invoke [`StressEngine::step`], typically sleeping between calls to
/// reduce CPU/bus contention.
pub struct StressEngine {
    /// Immutable run configuration
    config: StressConfig,

    /// Slot table (the working set)
    state: SlotTable,

    /// Deterministic RNG for slot and size selection
    rng: StressRng,

    /// Injected allocator capability
    allocator: Box<dyn StressAllocator>,

    /// Completed fill/verify steps (skipped steps do not count)
    iterations: u64,

    /// First detected mismatch; never overwritten once set
    corruption: Option<CorruptionReport>,

    /// Event log (populated only when `record_events` is set)
    event_log: EventLog,
}

impl StressEngine {
    /// Create a new engine from configuration and an allocator.
    ///
    /// # Returns
    ///
    /// * `Ok(StressEngine)` - ready to step
    /// * `Err(StressError)` - configuration validation failed
    ///
    /// # Example
    ///
    /// ```
    /// use memstress_core::{StressConfig, StressEngine, SystemAllocator};
    ///
    /// let engine = StressEngine::new(
    ///     StressConfig::default(),
    ///     Box::new(SystemAllocator),
    /// ).unwrap();
    /// assert_eq!(engine.iterations(), 0);
    /// ```
    pub fn new(
        config: StressConfig,
        allocator: Box<dyn StressAllocator>,
    ) -> Result<Self, StressError> {
        Self::validate_config(&config)?;

        let state = SlotTable::new(config.slot_count);
        let rng = StressRng::new(config.seed);

        Ok(Self {
            config,
            state,
            rng,
            allocator,
            iterations: 0,
            corruption: None,
            event_log: EventLog::new(),
        })
    }

    /// Validate configuration
    fn validate_config(config: &StressConfig) -> Result<(), StressError> {
        if config.slot_count == 0 {
            return Err(StressError::InvalidConfig(
                "slot_count must be > 0".to_string(),
            ));
        }

        if config.max_alloc_size == 0 {
            return Err(StressError::InvalidConfig(
                "max_alloc_size must be > 0".to_string(),
            ));
        }

        // The generator draws 32-bit bounds
        if config.slot_count > u32::MAX as usize {
            return Err(StressError::InvalidConfig(
                "slot_count must fit in 32 bits".to_string(),
            ));
        }

        if config.max_alloc_size > u32::MAX as usize {
            return Err(StressError::InvalidConfig(
                "max_alloc_size must fit in 32 bits".to_string(),
            ));
        }

        Ok(())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The run configuration
    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    /// Completed fill/verify steps so far
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// RUNNING until the first mismatch, STOPPED after
    pub fn run_state(&self) -> RunState {
        if self.corruption.is_some() {
            RunState::Stopped
        } else {
            RunState::Running
        }
    }

    /// The first detected mismatch, if any
    pub fn corruption(&self) -> Option<&CorruptionReport> {
        self.corruption.as_ref()
    }

    /// Reference to the slot table
    pub fn slot_table(&self) -> &SlotTable {
        &self.state
    }

    /// Mutable reference to the slot table
    ///
    /// # Safety
    ///
    /// This is primarily for testing (fault injection into live buffers).
    /// Direct mutation bypasses engine invariants. Use with caution.
    pub fn slot_table_mut(&mut self) -> &mut SlotTable {
        &mut self.state
    }

    /// Reference to the event log
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Current RNG state word (exposed for snapshots and diagnostics)
    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    // ========================================================================
    // Step loop
    // ========================================================================

    /// Execute one stress step on a single randomly chosen slot.
    ///
    /// Allocation refusal is transient: the step is skipped, nothing is
    /// counted, and the next call re-draws a fresh slot. A detected
    /// mismatch is terminal: the engine reports [`StepOutcome::Stop`] now
    /// and on every subsequent call.
    pub fn step(&mut self) -> StepOutcome {
        if self.corruption.is_some() {
            return StepOutcome::Stop;
        }

        let index = self.rng.bounded(self.config.slot_count as u32) as usize;

        if self.state.slot(index).is_empty() {
            let size = self.rng.bounded(self.config.max_alloc_size as u32) as usize;

            let Some(mut block) = self.allocator.allocate(size) else {
                // Expected under heap pressure; retried implicitly by the
                // next random step.
                self.record(Event::AllocationFailed {
                    iteration: self.iterations,
                    slot: index,
                    size,
                });
                return StepOutcome::Continue;
            };

            pattern::fill(&mut block);

            if self.config.verify_on_write {
                if let Err(mismatch) = pattern::verify(&block) {
                    return self.halt(index, block, mismatch, CorruptionPhase::Write);
                }
            }

            self.record(Event::Filled {
                iteration: self.iterations,
                slot: index,
                size,
            });
            self.state.slot_mut(index).install(block);
        } else {
            let block = self.state.slot_mut(index).take().unwrap();

            match pattern::verify(&block) {
                Ok(()) => {
                    self.record(Event::Verified {
                        iteration: self.iterations,
                        slot: index,
                        size: block.len(),
                    });
                    self.allocator.deallocate(block);
                }
                Err(mismatch) => {
                    return self.halt(index, block, mismatch, CorruptionPhase::Read);
                }
            }
        }

        self.iterations += 1;
        StepOutcome::Continue
    }

    /// Record the first mismatch and stop the run.
    ///
    /// The failing block moves into the report as quarantined evidence; it
    /// is never returned to the allocator.
    fn halt(
        &mut self,
        slot: usize,
        block: Box<[u8]>,
        mismatch: pattern::Mismatch,
        phase: CorruptionPhase,
    ) -> StepOutcome {
        self.record(Event::CorruptionDetected {
            iteration: self.iterations,
            slot,
            size: block.len(),
            offset: mismatch.offset,
            phase,
        });
        self.corruption = Some(CorruptionReport::new(
            slot,
            block,
            mismatch,
            phase,
            self.iterations,
        ));
        StepOutcome::Stop
    }

    fn record(&mut self, event: Event) {
        if self.config.record_events {
            self.event_log.log(event);
        }
    }

    // ========================================================================
    // Checkpointing
    // ========================================================================

    /// Capture the complete engine state.
    ///
    /// Buffer contents are derivable from buffer sizes, so the snapshot
    /// stores only per-slot sizes alongside the RNG state word and the
    /// iteration counter.
    ///
    /// # Errors
    ///
    /// Fails on a stopped engine (a corrupt run has nothing to resume) or
    /// if the configuration cannot be hashed.
    pub fn snapshot(&self) -> Result<StateSnapshot, StressError> {
        if self.corruption.is_some() {
            return Err(StressError::SnapshotValidation(
                "cannot snapshot a stopped engine".to_string(),
            ));
        }

        Ok(StateSnapshot {
            iteration: self.iterations,
            rng_state: self.rng.state(),
            slot_sizes: self.state.sizes(),
            config_hash: checkpoint::compute_config_hash(&self.config)?,
        })
    }

    /// Rebuild an engine from a snapshot.
    ///
    /// Every occupied slot is re-allocated through `allocator` and
    /// refilled from the size-seeded pattern; the selection stream resumes
    /// from the saved state word. The restored engine replays the exact
    /// continuation of the original run.
    ///
    /// # Errors
    ///
    /// * `InvalidConfig` - the supplied config fails validation
    /// * `SnapshotValidation` - the snapshot does not match the config
    /// * `RestoreExhausted` - the allocator refused a buffer mid-restore
    pub fn restore(
        config: StressConfig,
        allocator: Box<dyn StressAllocator>,
        snapshot: &StateSnapshot,
    ) -> Result<Self, StressError> {
        Self::validate_config(&config)?;
        checkpoint::validate_snapshot(snapshot, &config)?;

        let mut engine = Self {
            state: SlotTable::new(config.slot_count),
            rng: StressRng::new(snapshot.rng_state),
            allocator,
            iterations: snapshot.iteration,
            corruption: None,
            event_log: EventLog::new(),
            config,
        };

        for (slot, size) in snapshot.slot_sizes.iter().enumerate() {
            if let Some(size) = *size {
                let Some(mut block) = engine.allocator.allocate(size) else {
                    // Partial state is cleaned up by Drop.
                    return Err(StressError::RestoreExhausted { slot, size });
                };
                pattern::fill(&mut block);
                engine.state.slot_mut(slot).install(block);
            }
        }

        Ok(engine)
    }
}

impl Drop for StressEngine {
    /// Teardown returns every still-owned slot buffer to the injected
    /// deallocator. A quarantined corruption block stays quarantined.
    fn drop(&mut self) {
        for block in self.state.drain_blocks() {
            self.allocator.deallocate(block);
        }
    }
}

// Manual Debug implementation (the allocator object doesn't implement Debug)
impl std::fmt::Debug for StressEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StressEngine")
            .field("iterations", &self.iterations)
            .field("run_state", &self.run_state())
            .field("occupied_slots", &self.state.occupied_count())
            .field("live_bytes", &self.state.live_bytes())
            .field("event_count", &self.event_log.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::SystemAllocator;

    fn create_test_config() -> StressConfig {
        StressConfig {
            slot_count: 8,
            max_alloc_size: 64,
            seed: 12345,
            verify_on_write: true,
            record_events: true,
        }
    }

    #[test]
    fn test_engine_creation() {
        let engine = StressEngine::new(create_test_config(), Box::new(SystemAllocator)).unwrap();

        assert_eq!(engine.iterations(), 0);
        assert_eq!(engine.run_state(), RunState::Running);
        assert!(engine.corruption().is_none());
        assert_eq!(engine.slot_table().len(), 8);
        assert_eq!(engine.slot_table().occupied_count(), 0);
    }

    #[test]
    fn test_validate_config_zero_slots() {
        let config = StressConfig {
            slot_count: 0,
            ..create_test_config()
        };

        let result = StressEngine::new(config, Box::new(SystemAllocator));
        assert!(matches!(
            result.unwrap_err(),
            StressError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_validate_config_zero_max_alloc() {
        let config = StressConfig {
            max_alloc_size: 0,
            ..create_test_config()
        };

        let result = StressEngine::new(config, Box::new(SystemAllocator));
        assert!(matches!(
            result.unwrap_err(),
            StressError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_step_advances_iterations() {
        let mut engine =
            StressEngine::new(create_test_config(), Box::new(SystemAllocator)).unwrap();

        for _ in 0..100 {
            assert_eq!(engine.step(), StepOutcome::Continue);
        }
        assert_eq!(engine.iterations(), 100);
        assert_eq!(engine.run_state(), RunState::Running);
    }

    #[test]
    fn test_zero_seed_accepted() {
        let config = StressConfig {
            seed: 0,
            ..create_test_config()
        };
        let mut engine = StressEngine::new(config, Box::new(SystemAllocator)).unwrap();
        for _ in 0..10 {
            assert_eq!(engine.step(), StepOutcome::Continue);
        }
    }

    #[test]
    fn test_events_recorded_when_enabled() {
        let mut engine =
            StressEngine::new(create_test_config(), Box::new(SystemAllocator)).unwrap();
        for _ in 0..50 {
            engine.step();
        }
        assert_eq!(engine.event_log().len(), 50);
    }

    #[test]
    fn test_events_skipped_when_disabled() {
        let config = StressConfig {
            record_events: false,
            ..create_test_config()
        };
        let mut engine = StressEngine::new(config, Box::new(SystemAllocator)).unwrap();
        for _ in 0..50 {
            engine.step();
        }
        assert!(engine.event_log().is_empty());
    }

    #[test]
    fn test_write_verify_can_be_disabled() {
        let config = StressConfig {
            verify_on_write: false,
            ..create_test_config()
        };
        let mut engine = StressEngine::new(config, Box::new(SystemAllocator)).unwrap();
        for _ in 0..200 {
            assert_eq!(engine.step(), StepOutcome::Continue);
        }
        assert!(engine.corruption().is_none());
    }

    #[test]
    fn test_debug_format_mentions_state() {
        let engine = StressEngine::new(create_test_config(), Box::new(SystemAllocator)).unwrap();
        let rendered = format!("{:?}", engine);
        assert!(rendered.contains("StressEngine"));
        assert!(rendered.contains("Running"));
    }
}
