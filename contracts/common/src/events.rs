//! Ledger Events
//!
//! Events are emitted during execution and can be indexed off-chain.
//! An operation that fails emits nothing.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::{Address, WithdrawStrategy};

/// Event types for indexing and filtering
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Ledger Events (0x01 - 0x1F)
    Funded = 0x01,
    Withdrawn = 0x02,

    // Price Feed Events (0x60 - 0x7F)
    AnswerUpdated = 0x60,
    FeedOperatorChanged = 0x61,
    FeedStatusChanged = 0x62,
}

/// Main event enum containing all possible events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum FundMeEvent {
    // ============ Ledger Events ============

    /// Emitted when a contribution is accepted
    Funded {
        funder: Address,
        amount: u128,
        reference_value: u128,
        total_contributed: u128,
        funder_index: u64,
    },

    /// Emitted when the owner drains the ledger
    Withdrawn {
        owner: Address,
        amount: u128,
        funders_cleared: u64,
        strategy: WithdrawStrategy,
    },

    // ============ Price Feed Events ============

    /// Emitted when the feed publishes an answer
    AnswerUpdated {
        round_id: u64,
        answer: i128,
        updated_at: u64,
    },

    /// Emitted when the feed operator changes
    FeedOperatorChanged {
        old_operator: Address,
        new_operator: Address,
    },

    /// Emitted when the feed is switched on or off
    FeedStatusChanged { active: bool },
}

impl FundMeEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Funded { .. } => EventType::Funded,
            Self::Withdrawn { .. } => EventType::Withdrawn,
            Self::AnswerUpdated { .. } => EventType::AnswerUpdated,
            Self::FeedOperatorChanged { .. } => EventType::FeedOperatorChanged,
            Self::FeedStatusChanged { .. } => EventType::FeedStatusChanged,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Event log for collecting multiple events during execution
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<FundMeEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: FundMeEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[FundMeEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<FundMeEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&FundMeEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events were emitted
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let event = FundMeEvent::Withdrawn {
            owner: [1u8; 32],
            amount: 2_000_000_000_000_000_000,
            funders_cleared: 2,
            strategy: WithdrawStrategy::Cheaper,
        };

        assert_eq!(event.event_type(), EventType::Withdrawn);
    }

    #[test]
    fn test_event_serialization() {
        let event = FundMeEvent::Funded {
            funder: [2u8; 32],
            amount: 30_000_000_000_000_000,
            reference_value: 60_000_000_000_000_000_000,
            total_contributed: 30_000_000_000_000_000,
            funder_index: 0,
        };

        let bytes = event.to_bytes();
        let restored = FundMeEvent::from_bytes(&bytes).unwrap();

        assert_eq!(event, restored);
    }

    #[test]
    fn test_event_log() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        log.emit(FundMeEvent::AnswerUpdated {
            round_id: 1,
            answer: 2_000_00000000,
            updated_at: 100,
        });

        log.emit(FundMeEvent::Funded {
            funder: [2u8; 32],
            amount: 1,
            reference_value: 1,
            total_contributed: 1,
            funder_index: 0,
        });

        assert_eq!(log.len(), 2);
        assert!(log.has_events());
        assert_eq!(log.filter_by_type(EventType::Funded).len(), 1);

        log.clear();
        assert!(!log.has_events());
    }
}
