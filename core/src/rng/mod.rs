//! Deterministic random number generation
//!
//! Uses the xorshift32 algorithm for fast, deterministic random number
//! generation. CRITICAL: All randomness in the stress engine MUST go
//! through this module.

mod xorshift;

pub use xorshift::StressRng;
