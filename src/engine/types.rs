//! Engine settings, outcomes and the events sent to the UI

use super::state::LikedEntry;
use crate::error::{Result, SwipeError};
use crate::refill::RefillOutcome;
use crate::sync::DEFAULT_SYNC_TIMEOUT;
use eatsease_common::{
    CandidateCard, DragFrame, GestureConfig, GesturePhase, SwipeDecision, SwipeDirection,
    DEFAULT_LIKE_CAP,
};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub like_cap: u32,
    pub sync_timeout: Duration,
    pub gesture: GestureConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            like_cap: DEFAULT_LIKE_CAP,
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
            gesture: GestureConfig::default(),
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<()> {
        if self.like_cap == 0 {
            return Err(SwipeError::Config("like cap must be at least 1".into()));
        }
        if self.sync_timeout.is_zero() {
            return Err(SwipeError::Config("sync timeout must be positive".into()));
        }
        self.gesture.validate()?;
        Ok(())
    }
}

/// Notifications for the surrounding UI
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A like was attempted at the cap; nothing changed
    LimitReached { cap: u32 },
    /// The authoritative count just reached the cap
    NavigateToFinalize(Vec<CandidateCard>),
    /// Refill returned an empty page
    NoMoreCandidates,
    SyncFailed {
        card_id: String,
        menu_title: String,
        reason: String,
    },
    RefillFailed { reason: String },
    /// Raised once; the engine issues no further requests afterwards
    SessionExpired,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncStatus {
    Confirmed { count: u32 },
    Failed { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotTopCard,
    AlreadyDecided,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecisionOutcome {
    Applied {
        card: CandidateCard,
        direction: SwipeDirection,
        sync: SyncStatus,
        refill: Option<RefillOutcome>,
    },
    /// Like refused at the cap; the card stays on top of the queue
    Blocked { card_id: String },
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    Dragging(DragFrame),
    /// Released below the commit threshold; no decision
    Cancelled,
    Decided {
        decision: SwipeDecision,
        outcome: DecisionOutcome,
    },
    /// No card to drag, or an exit animation is already running
    Ignored,
}

/// Read-only view for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSnapshot {
    pub top: Option<CandidateCard>,
    pub queue_len: usize,
    pub queue_generation: u64,
    pub liked: Vec<LikedEntry>,
    pub liked_count: u32,
    pub like_cap: u32,
    pub disliked: Vec<CandidateCard>,
    pub loading: bool,
    pub exhausted: bool,
    pub expired: bool,
    pub gesture: GesturePhase,
}
