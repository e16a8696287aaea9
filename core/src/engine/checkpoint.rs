//! Checkpoint - Save/Restore Engine State
//!
//! Enables serialization and deserialization of complete engine state for
//! pause/resume of long soak runs.
//!
//! # Critical Invariants
//!
//! - **Determinism**: a restored engine replays the identical continuation
//!   of the original run
//! - **Derivable contents**: buffer bytes regenerate from buffer sizes, so
//!   snapshots carry sizes only, never contents
//! - **Config matching**: a snapshot can only be restored with the config
//!   it was taken under (verified by hash)

use crate::engine::engine::{StressConfig, StressError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// Snapshot Structure
// ============================================================================

/// Complete engine state snapshot.
///
/// Captures everything necessary to resume a stress run from an arbitrary
/// step boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Iteration counter at snapshot time
    pub iteration: u64,

    /// Selection-stream state word (CRITICAL for determinism)
    pub rng_state: u32,

    /// Per-slot buffer size, `None` for empty slots
    pub slot_sizes: Vec<Option<usize>>,

    /// SHA256 hash of the original config (for validation)
    pub config_hash: String,
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute a deterministic SHA256 hash of a config.
///
/// Used to verify that a snapshot's config matches the config used to
/// restore it.
///
/// Uses canonical JSON serialization with sorted keys so the hash does not
/// depend on serialization order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, StressError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config)
        .map_err(|e| StressError::Serialization(format!("config serialization failed: {}", e)))?;

    // Recursively sort all object keys for a canonical representation
    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let canonical_value = canonicalize(value);

    let json = serde_json::to_string(&canonical_value)
        .map_err(|e| StressError::Serialization(format!("config serialization failed: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    let result = hasher.finalize();

    Ok(format!("{:x}", result))
}

// ============================================================================
// Validation
// ============================================================================

/// Validate snapshot integrity against the config it will restore under.
///
/// Checks:
/// - The config hash matches
/// - The slot table length matches `slot_count`
/// - Every recorded size is below `max_alloc_size`
/// - The generator state word is nonzero
pub fn validate_snapshot(
    snapshot: &StateSnapshot,
    config: &StressConfig,
) -> Result<(), StressError> {
    let expected_hash = compute_config_hash(config)?;
    if snapshot.config_hash != expected_hash {
        return Err(StressError::SnapshotValidation(format!(
            "config hash mismatch: snapshot was taken under a different config \
             (expected {}, got {})",
            expected_hash, snapshot.config_hash
        )));
    }

    if snapshot.slot_sizes.len() != config.slot_count {
        return Err(StressError::SnapshotValidation(format!(
            "slot table length mismatch: expected {}, got {}",
            config.slot_count,
            snapshot.slot_sizes.len()
        )));
    }

    for (slot, size) in snapshot.slot_sizes.iter().enumerate() {
        if let Some(size) = size {
            if *size >= config.max_alloc_size {
                return Err(StressError::SnapshotValidation(format!(
                    "slot {} records {} bytes, at or above max_alloc_size {}",
                    slot, size, config.max_alloc_size
                )));
            }
        }
    }

    if snapshot.rng_state == 0 {
        return Err(StressError::SnapshotValidation(
            "generator state word is zero".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StressConfig {
        StressConfig {
            slot_count: 4,
            max_alloc_size: 32,
            seed: 7,
            verify_on_write: true,
            record_events: false,
        }
    }

    fn snapshot_for(config: &StressConfig) -> StateSnapshot {
        StateSnapshot {
            iteration: 10,
            rng_state: 0xABCD,
            slot_sizes: vec![Some(8), None, Some(31), None],
            config_hash: compute_config_hash(config).unwrap(),
        }
    }

    #[test]
    fn test_compute_config_hash_deterministic() {
        let hash1 = compute_config_hash(&test_config()).unwrap();
        let hash2 = compute_config_hash(&test_config()).unwrap();
        assert_eq!(hash1, hash2, "Same config should produce same hash");
    }

    #[test]
    fn test_compute_config_hash_different_for_different_configs() {
        let config1 = test_config();
        let config2 = StressConfig {
            seed: 8,
            ..test_config()
        };

        let hash1 = compute_config_hash(&config1).unwrap();
        let hash2 = compute_config_hash(&config2).unwrap();
        assert_ne!(
            hash1, hash2,
            "Different configs should produce different hashes"
        );
    }

    #[test]
    fn test_validate_snapshot_accepts_matching() {
        let config = test_config();
        let snapshot = snapshot_for(&config);
        assert!(validate_snapshot(&snapshot, &config).is_ok());
    }

    #[test]
    fn test_validate_snapshot_rejects_hash_mismatch() {
        let config = test_config();
        let mut snapshot = snapshot_for(&config);
        snapshot.config_hash = "deadbeef".to_string();

        let err = validate_snapshot(&snapshot, &config).unwrap_err();
        assert!(matches!(err, StressError::SnapshotValidation(_)));
    }

    #[test]
    fn test_validate_snapshot_rejects_wrong_slot_count() {
        let config = test_config();
        let mut snapshot = snapshot_for(&config);
        snapshot.slot_sizes.push(None);

        let err = validate_snapshot(&snapshot, &config).unwrap_err();
        assert!(matches!(err, StressError::SnapshotValidation(_)));
    }

    #[test]
    fn test_validate_snapshot_rejects_oversized_slot() {
        let config = test_config();
        let mut snapshot = snapshot_for(&config);
        snapshot.slot_sizes[0] = Some(32); // == max_alloc_size, out of range

        let err = validate_snapshot(&snapshot, &config).unwrap_err();
        assert!(matches!(err, StressError::SnapshotValidation(_)));
    }

    #[test]
    fn test_validate_snapshot_rejects_zero_rng_state() {
        let config = test_config();
        let mut snapshot = snapshot_for(&config);
        snapshot.rng_state = 0;

        let err = validate_snapshot(&snapshot, &config).unwrap_err();
        assert!(matches!(err, StressError::SnapshotValidation(_)));
    }

    #[test]
    fn test_snapshot_serde_round_trip() {
        let config = test_config();
        let snapshot = snapshot_for(&config);

        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: StateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
