//! Event logging for stress-run replay and auditing.
//!
//! The engine never prints; significant state changes are captured as
//! events the embedding layer can render, filter, or discard. Events
//! enable:
//! - Debugging (understand which slot did what, and when)
//! - Determinism checks (two runs with one seed → identical event streams)
//! - Analysis (allocation-failure rates, per-slot churn)
//!
//! Recording is switchable in the engine configuration: a soak run that
//! executes hundreds of millions of steps must not accumulate an unbounded
//! log.
//!
//! # Example
//!
//! ```
//! use memstress_core::Event;
//!
//! let event = Event::Filled {
//!     iteration: 10,
//!     slot: 3,
//!     size: 512,
//! };
//!
//! assert_eq!(event.iteration(), 10);
//! assert_eq!(event.event_type(), "Filled");
//! ```

use crate::models::report::CorruptionPhase;

/// Stress-run event capturing one state change.
///
/// All events include the iteration counter value at the time they
/// occurred, for temporal ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// An empty slot received a freshly filled buffer
    Filled {
        iteration: u64,
        slot: usize,
        size: usize,
    },

    /// The allocator refused a request; the step was skipped
    AllocationFailed {
        iteration: u64,
        slot: usize,
        size: usize,
    },

    /// An occupied slot verified clean and its buffer was released
    Verified {
        iteration: u64,
        slot: usize,
        size: usize,
    },

    /// A mismatch was detected; the run is over
    CorruptionDetected {
        iteration: u64,
        slot: usize,
        size: usize,
        offset: usize,
        phase: CorruptionPhase,
    },
}

impl Event {
    /// Iteration counter value when this event occurred
    pub fn iteration(&self) -> u64 {
        match self {
            Event::Filled { iteration, .. } => *iteration,
            Event::AllocationFailed { iteration, .. } => *iteration,
            Event::Verified { iteration, .. } => *iteration,
            Event::CorruptionDetected { iteration, .. } => *iteration,
        }
    }

    /// Short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Filled { .. } => "Filled",
            Event::AllocationFailed { .. } => "AllocationFailed",
            Event::Verified { .. } => "Verified",
            Event::CorruptionDetected { .. } => "CorruptionDetected",
        }
    }

    /// Slot index this event acted on
    pub fn slot(&self) -> usize {
        match self {
            Event::Filled { slot, .. } => *slot,
            Event::AllocationFailed { slot, .. } => *slot,
            Event::Verified { slot, .. } => *slot,
            Event::CorruptionDetected { slot, .. } => *slot,
        }
    }

    /// Buffer size involved in this event
    pub fn size(&self) -> usize {
        match self {
            Event::Filled { size, .. } => *size,
            Event::AllocationFailed { size, .. } => *size,
            Event::Verified { size, .. } => *size,
            Event::CorruptionDetected { size, .. } => *size,
        }
    }
}

/// Event log for storing and querying stress-run events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events recorded at a specific iteration
    pub fn events_at_iteration(&self, iteration: u64) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.iteration() == iteration)
            .collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific slot
    pub fn events_for_slot(&self, slot: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.slot() == slot).collect()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
