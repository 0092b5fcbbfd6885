//! Candidate card queue
//!
//! Pure container: front = top card = the only card eligible for gestures.
//! The "refill in flight" flag belongs to the refill controller, not here.

use crate::error::{Error, Result};
use crate::types::CandidateCard;
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Default)]
pub struct CardQueue {
    cards: VecDeque<CandidateCard>,
    /// Bumped on every refill
    generation: u64,
}

impl CardQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self) -> Option<&CandidateCard> {
        self.cards.front()
    }

    /// Remove a card by id. Absent ids are a no-op so double-fired UI events are harmless.
    pub fn pop(&mut self, id: &str) -> Option<CandidateCard> {
        let index = self.cards.iter().position(|card| card.id == id)?;
        self.cards.remove(index)
    }

    /// Replace the contents with a fresh page. Duplicate ids keep their first occurrence.
    pub fn refill(&mut self, cards: Vec<CandidateCard>) -> Result<usize> {
        if !self.cards.is_empty() {
            return Err(Error::QueueNotEmpty(self.cards.len()));
        }

        let mut seen = HashSet::new();
        self.cards = cards
            .into_iter()
            .filter(|card| seen.insert(card.id.clone()))
            .collect();
        self.generation += 1;
        Ok(self.cards.len())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cards.iter().any(|card| card.id == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateCard> {
        self.cards.iter()
    }
}
