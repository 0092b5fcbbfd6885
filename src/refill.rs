//! Candidate refill
//!
//! Holds the "refill in flight" flag. The flag is claimed synchronously,
//! before any await, so two empty-queue checks racing each other issue one fetch.

use crate::error::{Result, SwipeError};
use crate::service::ProfileService;
use eatsease_common::CandidateCard;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefillOutcome {
    /// Queue replaced with this many cards
    Refilled(usize),
    /// The service has nothing new yet; shown as "loading more", not as an error
    Exhausted,
    /// Another refill is already running
    AlreadyLoading,
    /// Queue still has cards
    NotNeeded,
}

pub struct RefillController {
    service: Arc<dyn ProfileService>,
    user: String,
    timeout: Duration,
    loading: AtomicBool,
}

/// Clears the loading flag when dropped, including on error or cancellation
pub struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl RefillController {
    pub fn new(service: Arc<dyn ProfileService>, user: impl Into<String>, timeout: Duration) -> Self {
        Self {
            service,
            user: user.into(),
            timeout,
            loading: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Claim the loading flag; `None` when a refill is already in flight
    pub fn try_begin(&self) -> Option<LoadingGuard<'_>> {
        self.loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LoadingGuard { flag: &self.loading })
    }

    /// Fetch one page. Requires the loading flag to be held.
    pub async fn fetch_page(&self, _loading: &LoadingGuard<'_>) -> Result<Vec<CandidateCard>> {
        debug!(user = %self.user, "fetching candidate page");
        tokio::time::timeout(self.timeout, self.service.fetch_candidates(&self.user))
            .await
            .map_err(|_| SwipeError::Timeout(self.timeout))?
    }

    /// Drop cards already decided this session and duplicate ids.
    /// Exclusion is the server's job; this only keeps the queue invariant.
    pub fn prepare_page(
        page: Vec<CandidateCard>,
        is_decided: impl Fn(&str) -> bool,
    ) -> Vec<CandidateCard> {
        let mut seen = HashSet::new();
        page.into_iter()
            .filter(|card| !is_decided(&card.id))
            .filter(|card| seen.insert(card.id.clone()))
            .collect()
    }
}
