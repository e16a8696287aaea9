//! Corruption report
//!
//! The terminal evidence of a failed run. Captures the first mismatch
//! only — once populated it is never overwritten — and quarantines the
//! corrupted buffer itself so the embedding can inspect the damaged bytes
//! before anything frees or reuses that memory.

use crate::pattern::Mismatch;
use serde::{Deserialize, Serialize};

/// Which verification pass detected the mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorruptionPhase {
    /// Immediate re-verify of a just-written buffer failed: the write path
    /// or a physically faulty cell caught on first touch
    Write,
    /// Re-read of a previously verified buffer failed: the memory (or
    /// something writing through it) degraded between fill and verify
    Read,
}

impl CorruptionPhase {
    /// Short label for rendering
    pub fn as_str(&self) -> &'static str {
        match self {
            CorruptionPhase::Write => "WRITE",
            CorruptionPhase::Read => "READ",
        }
    }
}

/// First detected mismatch, with the corrupted buffer held as evidence.
///
/// The block is moved out of its slot into the report and is never
/// returned to the allocator: freeing it would destroy the only forensic
/// record of which bits went bad.
#[derive(Debug)]
pub struct CorruptionReport {
    slot: usize,
    block: Box<[u8]>,
    offset: usize,
    expected: u8,
    actual: u8,
    phase: CorruptionPhase,
    iteration: u64,
}

impl CorruptionReport {
    /// Build a report from the failing block and the detected mismatch
    pub fn new(
        slot: usize,
        block: Box<[u8]>,
        mismatch: Mismatch,
        phase: CorruptionPhase,
        iteration: u64,
    ) -> Self {
        assert!(
            mismatch.offset < block.len(),
            "mismatch offset {} out of bounds for {} byte block",
            mismatch.offset,
            block.len()
        );
        Self {
            slot,
            block,
            offset: mismatch.offset,
            expected: mismatch.expected,
            actual: mismatch.actual,
            phase,
            iteration,
        }
    }

    /// Slot index that held the corrupted buffer
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Size of the corrupted buffer in bytes
    pub fn size(&self) -> usize {
        self.block.len()
    }

    /// Byte offset of the first mismatch
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Value the pattern generator produced at fill time
    pub fn expected(&self) -> u8 {
        self.expected
    }

    /// Value actually read back
    pub fn actual(&self) -> u8 {
        self.actual
    }

    /// Verification pass that caught the mismatch
    pub fn phase(&self) -> CorruptionPhase {
        self.phase
    }

    /// Iterations completed when the mismatch was detected
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Address of the first byte of the quarantined buffer
    pub fn base_address(&self) -> usize {
        self.block.as_ptr() as usize
    }

    /// Address of the mismatching byte
    pub fn fault_address(&self) -> usize {
        self.base_address() + self.offset
    }

    /// The quarantined buffer contents
    pub fn evidence(&self) -> &[u8] {
        &self.block
    }

    /// Bytes around the fault, up to `radius` on each side (hex dumps)
    pub fn evidence_window(&self, radius: usize) -> &[u8] {
        let start = self.offset.saturating_sub(radius);
        let end = (self.offset + radius + 1).min(self.block.len());
        &self.block[start..end]
    }

    /// Serializable summary (everything except the raw buffer)
    pub fn summary(&self) -> CorruptionSummary {
        CorruptionSummary {
            slot: self.slot,
            size: self.size(),
            offset: self.offset,
            expected: self.expected,
            actual: self.actual,
            phase: self.phase,
            iteration: self.iteration,
            base_address: self.base_address(),
            fault_address: self.fault_address(),
        }
    }
}

/// Flat, serializable view of a [`CorruptionReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorruptionSummary {
    pub slot: usize,
    pub size: usize,
    pub offset: usize,
    pub expected: u8,
    pub actual: u8,
    pub phase: CorruptionPhase,
    pub iteration: u64,
    pub base_address: usize,
    pub fault_address: usize,
}
