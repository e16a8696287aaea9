//! Pattern round-trip properties
//!
//! The whole verification scheme rests on one fact: for any size S, the
//! byte stream generated at fill time can be regenerated later from S
//! alone. These properties pin that down.

use memstress_core::pattern;
use proptest::prelude::*;

proptest! {
    #[test]
    fn fill_then_verify_is_clean(len in 0usize..2048) {
        let mut buf = vec![0u8; len];
        pattern::fill(&mut buf);
        prop_assert!(pattern::verify(&buf).is_ok());
    }

    #[test]
    fn regeneration_is_identical(len in 0usize..2048) {
        let mut first = vec![0u8; len];
        let mut second = vec![0u8; len];
        pattern::fill(&mut first);
        pattern::fill(&mut second);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn any_single_bit_flip_is_located(
        len in 1usize..1024,
        offset_seed in any::<usize>(),
        bit in 0u32..8,
    ) {
        let mut buf = vec![0u8; len];
        pattern::fill(&mut buf);

        let offset = offset_seed % len;
        let original = buf[offset];
        buf[offset] ^= 1u8 << bit;

        let mismatch = pattern::verify(&buf).unwrap_err();
        prop_assert_eq!(mismatch.offset, offset);
        prop_assert_eq!(mismatch.expected, original);
        prop_assert_eq!(mismatch.actual, buf[offset]);
    }
}

#[test]
fn verify_is_pure() {
    let mut buf = vec![0u8; 300];
    pattern::fill(&mut buf);

    // Repeated verification must not disturb the buffer
    for _ in 0..3 {
        assert!(pattern::verify(&buf).is_ok());
    }
}
