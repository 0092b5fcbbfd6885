//! Session state owned by the engine
//!
//! `LikedSet` keeps optimistic likes next to the confirmed ones and never
//! holds more than the cap.

use eatsease_common::{
    AuthoritativeCount, CandidateCard, CardQueue, GestureRecognizer, NavigationTrigger,
    SyncRequest,
};
use std::collections::{HashMap, HashSet, VecDeque};

use super::types::SyncStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeStatus {
    /// Present in the last authoritative list
    Confirmed,
    /// Sync queued or in flight
    Pending,
    /// Sync failed; kept until the next reconciliation decides
    Unconfirmed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LikedEntry {
    pub card: CandidateCard,
    pub status: LikeStatus,
}

/// Locally believed liked menus, bounded by the cap
#[derive(Debug, Clone)]
pub struct LikedSet {
    entries: Vec<LikedEntry>,
    cap: usize,
}

impl LikedSet {
    pub fn new(cap: u32) -> Self {
        Self {
            entries: Vec::new(),
            cap: cap as usize,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LikedEntry] {
        &self.entries
    }

    pub fn cards(&self) -> Vec<CandidateCard> {
        self.entries.iter().map(|e| e.card.clone()).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.card.id == id)
    }

    /// Likes whose sync has not resolved yet; they count against the cap
    pub fn pending(&self) -> u32 {
        self.entries
            .iter()
            .filter(|e| e.status == LikeStatus::Pending)
            .count() as u32
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.cap
    }

    /// Drop likes whose sync failed. Returns how many were removed.
    pub(crate) fn drop_unconfirmed(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.status != LikeStatus::Unconfirmed);
        before - self.entries.len()
    }

    pub(crate) fn push_pending(&mut self, card: CandidateCard) {
        self.entries.push(LikedEntry {
            card,
            status: LikeStatus::Pending,
        });
    }

    pub(crate) fn mark_unconfirmed(&mut self, card_id: &str) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.card.id == card_id) {
            entry.status = LikeStatus::Unconfirmed;
        }
    }

    /// Overwrite with the server list. Only entries whose sync is still
    /// outstanding survive on top of it; failed optimistic entries are dropped.
    pub(crate) fn reconcile(&mut self, server: &[CandidateCard], outstanding: &HashSet<String>) {
        let mut entries: Vec<LikedEntry> = server
            .iter()
            .take(self.cap)
            .map(|card| LikedEntry {
                card: card.clone(),
                status: LikeStatus::Confirmed,
            })
            .collect();

        for entry in self.entries.drain(..) {
            let keep = entry.status == LikeStatus::Pending
                && outstanding.contains(&entry.card.id)
                && !entries
                    .iter()
                    .any(|e| e.card.id == entry.card.id || e.card.title == entry.card.title);
            if keep && entries.len() < self.cap {
                entries.push(entry);
            }
        }
        self.entries = entries;
    }
}

/// Everything the engine owns for one session
pub(crate) struct SessionState {
    pub queue: CardQueue,
    pub liked: LikedSet,
    pub disliked: Vec<CandidateCard>,
    /// Ids decided this session, one decision per card
    pub decided: HashSet<String>,
    pub authoritative: AuthoritativeCount,
    pub navigation: NavigationTrigger,
    pub gesture: GestureRecognizer,
    /// Card under the finger for the current gesture
    pub gesture_card: Option<String>,
    /// Committed decisions not yet sent, in commit order
    pub outbox: VecDeque<SyncRequest>,
    pub next_seq: u64,
    /// Results for callers whose request was drained by someone else
    pub completed: HashMap<u64, SyncStatus>,
    pub exhausted: bool,
    pub expired: bool,
}

impl SessionState {
    pub fn new(cap: u32, gesture: GestureRecognizer) -> Self {
        Self {
            queue: CardQueue::new(),
            liked: LikedSet::new(cap),
            disliked: Vec::new(),
            decided: HashSet::new(),
            authoritative: AuthoritativeCount::default(),
            navigation: NavigationTrigger::new(cap),
            gesture,
            gesture_card: None,
            outbox: VecDeque::new(),
            next_seq: 0,
            completed: HashMap::new(),
            exhausted: false,
            expired: false,
        }
    }

    /// Card ids of likes still waiting in the outbox
    pub fn outstanding_likes(&self) -> HashSet<String> {
        self.outbox
            .iter()
            .filter(|r| r.kind == eatsease_common::SyncKind::LikeDecision)
            .map(|r| r.card_id.clone())
            .collect()
    }
}
