//! Stress engine - main allocate/verify loop
//!
//! Implements the per-step state machine driving allocation churn and
//! pattern verification.
//!
//! See `engine.rs` for the loop implementation and `checkpoint.rs` for
//! snapshot/restore support.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use checkpoint::{compute_config_hash, validate_snapshot, StateSnapshot};
pub use engine::{RunState, StepOutcome, StressConfig, StressEngine, StressError};
