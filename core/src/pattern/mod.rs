//! Size-seeded fill patterns for buffer verification.
//!
//! Every buffer handed to the engine is filled with a pseudo-random byte
//! stream generated by a [`StressRng`] seeded with the buffer's own length.
//! Verification reseeds from the length and regenerates the identical
//! stream, so the expected contents of any live buffer are derivable from
//! its size alone — no matter how many draws the engine's slot-selection
//! generator has advanced between fill and verify.
//!
//! # Key Principles
//!
//! 1. **Determinism**: same length → same byte stream, always
//! 2. **Self-describing buffers**: contents regenerate from `buf.len()`
//! 3. **First mismatch wins**: verification stops at the first bad byte
//!
//! # Example
//!
//! ```
//! use memstress_core::pattern;
//!
//! let mut buf = vec![0u8; 64];
//! pattern::fill(&mut buf);
//! assert!(pattern::verify(&buf).is_ok());
//!
//! buf[17] ^= 0x20; // corrupt one bit
//! let mismatch = pattern::verify(&buf).unwrap_err();
//! assert_eq!(mismatch.offset, 17);
//! ```

use crate::rng::StressRng;
use serde::{Deserialize, Serialize};

/// First divergence between a buffer and its expected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// Byte offset of the first bad byte
    pub offset: usize,
    /// Value the pattern generator produced at fill time
    pub expected: u8,
    /// Value actually read back from memory
    pub actual: u8,
}

/// Fill a buffer with the pattern derived from its length.
pub fn fill(buf: &mut [u8]) {
    let mut rng = StressRng::new(buf.len() as u32);
    for byte in buf.iter_mut() {
        *byte = rng.next_byte();
    }
}

/// Verify a buffer against the pattern derived from its length.
///
/// Returns the first [`Mismatch`], or `Ok(())` if every byte matches.
/// A zero-length buffer always verifies clean.
pub fn verify(buf: &[u8]) -> Result<(), Mismatch> {
    let mut rng = StressRng::new(buf.len() as u32);
    for (offset, &actual) in buf.iter().enumerate() {
        let expected = rng.next_byte();
        if actual != expected {
            return Err(Mismatch {
                offset,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_then_verify_clean() {
        for len in [0usize, 1, 2, 15, 16, 255, 256, 1024] {
            let mut buf = vec![0u8; len];
            fill(&mut buf);
            assert!(verify(&buf).is_ok(), "length {} failed round-trip", len);
        }
    }

    #[test]
    fn test_fill_deterministic_per_length() {
        let mut a = vec![0u8; 128];
        let mut b = vec![0u8; 128];
        fill(&mut a);
        fill(&mut b);
        assert_eq!(a, b, "same length must produce the same stream");
    }

    #[test]
    fn test_different_lengths_different_streams() {
        let mut a = vec![0u8; 64];
        let mut b = vec![0u8; 65];
        fill(&mut a);
        fill(&mut b);
        assert_ne!(&a[..], &b[..64], "length is the seed; streams should differ");
    }

    #[test]
    fn test_verify_reports_first_mismatch() {
        let mut buf = vec![0u8; 32];
        fill(&mut buf);
        let original = buf[5];
        buf[5] ^= 0x01;
        buf[20] ^= 0x80; // second corruption, must not be reported

        let mismatch = verify(&buf).unwrap_err();
        assert_eq!(mismatch.offset, 5);
        assert_eq!(mismatch.expected, original);
        assert_eq!(mismatch.actual, original ^ 0x01);
    }

    #[test]
    fn test_zero_length_verifies_clean() {
        assert!(verify(&[]).is_ok());
    }
}
