//! Slot model
//!
//! A slot is one potential live allocation in the stress table. It is
//! either empty (eligible for a new allocation on the next visit) or
//! occupied (exclusively owns a buffer, filled with the pattern derived
//! from its length, pending verification).
//!
//! # Critical Invariants
//!
//! 1. `block.is_none()` ⇔ the slot is eligible for allocation
//! 2. While occupied, the buffer holds exactly the pattern derived from
//!    its length (until the memory under it misbehaves)
//! 3. Slots transition empty→occupied (install) and occupied→empty (take);
//!    nothing else mutates them

/// One potential live allocation.
///
/// The owned buffer's length doubles as the slot's recorded size, and
/// `Option` encodes the empty state — a separate size field would only be
/// meaningful while a buffer is held anyway.
///
/// # Example
/// ```
/// use memstress_core::Slot;
///
/// let mut slot = Slot::new();
/// assert!(slot.is_empty());
///
/// slot.install(vec![0u8; 16].into_boxed_slice());
/// assert_eq!(slot.size(), Some(16));
///
/// let block = slot.take().unwrap();
/// assert!(slot.is_empty());
/// assert_eq!(block.len(), 16);
/// ```
#[derive(Debug, Default)]
pub struct Slot {
    /// Owned buffer while occupied
    block: Option<Box<[u8]>>,
}

impl Slot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self { block: None }
    }

    /// Whether the slot is eligible for a new allocation
    pub fn is_empty(&self) -> bool {
        self.block.is_none()
    }

    /// Length of the owned buffer, while occupied
    pub fn size(&self) -> Option<usize> {
        self.block.as_ref().map(|b| b.len())
    }

    /// Install a freshly filled buffer
    ///
    /// # Panics
    /// Panics if the slot is already occupied (engine state machine bug).
    pub fn install(&mut self, block: Box<[u8]>) {
        assert!(
            self.block.is_none(),
            "slot already occupied by a {} byte buffer",
            self.block.as_ref().map_or(0, |b| b.len())
        );
        self.block = Some(block);
    }

    /// Take the owned buffer out, leaving the slot empty
    pub fn take(&mut self) -> Option<Box<[u8]>> {
        self.block.take()
    }

    /// Read access to the owned buffer, while occupied
    pub fn block(&self) -> Option<&[u8]> {
        self.block.as_deref()
    }

    /// Mutable access to the owned buffer, while occupied
    ///
    /// Only the engine's fill path and test fault injection write through
    /// this; nothing else may mutate a live buffer.
    pub fn block_mut(&mut self) -> Option<&mut [u8]> {
        self.block.as_deref_mut()
    }
}
