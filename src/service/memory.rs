//! In-memory profile service
//!
//! Behaves like the remote service for offline sessions (`eatsease simulate`)
//! and tests: excludes decided menus from pages, silently ignores likes past
//! the cap, and can inject faults, latency and held fetches.

use super::ProfileService;
use crate::error::{Result, SwipeError};
use async_trait::async_trait;
use eatsease_common::{AuthoritativeCount, CandidateCard, DEFAULT_LIKE_CAP};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Failure applied to the next like/dislike/remove call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Never answers; the caller's timeout decides
    Hang,
    Network,
    ServerError,
    SessionExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCall {
    Like(String),
    Dislike(String),
}

#[derive(Debug, Default)]
struct Backend {
    catalog: Vec<CandidateCard>,
    liked: Vec<CandidateCard>,
    disliked: Vec<String>,
    sync_log: Vec<SyncCall>,
    faults: VecDeque<Fault>,
    expired: bool,
    fetch_calls: usize,
    current_liked_calls: usize,
}

pub struct InMemoryProfileService {
    backend: Mutex<Backend>,
    cap: u32,
    page_size: usize,
    serve_decided: bool,
    latency: Duration,
    fetch_gate: Option<Semaphore>,
}

impl InMemoryProfileService {
    pub fn new(catalog: Vec<CandidateCard>) -> Self {
        Self {
            backend: Mutex::new(Backend {
                catalog,
                ..Default::default()
            }),
            cap: DEFAULT_LIKE_CAP,
            page_size: 10,
            serve_decided: false,
            latency: Duration::ZERO,
            fetch_gate: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_cap(mut self, cap: u32) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Keep serving menus the user already decided on, like a misbehaving server
    pub fn serving_decided_menus(mut self) -> Self {
        self.serve_decided = true;
        self
    }

    /// Candidate fetches block until `release_fetches` hands out permits
    pub fn with_held_fetches(mut self) -> Self {
        self.fetch_gate = Some(Semaphore::new(0));
        self
    }

    pub fn release_fetches(&self, permits: usize) {
        if let Some(gate) = &self.fetch_gate {
            gate.add_permits(permits);
        }
    }

    /// Likes recorded by some other session
    pub fn seed_liked(&self, cards: Vec<CandidateCard>) {
        self.backend().liked.extend(cards);
    }

    pub fn push_fault(&self, fault: Fault) {
        self.backend().faults.push_back(fault);
    }

    pub fn expire_session(&self) {
        self.backend().expired = true;
    }

    pub fn liked_titles(&self) -> Vec<String> {
        self.backend().liked.iter().map(|c| c.title.clone()).collect()
    }

    pub fn sync_log(&self) -> Vec<SyncCall> {
        self.backend().sync_log.clone()
    }

    pub fn like_calls(&self) -> usize {
        self.backend()
            .sync_log
            .iter()
            .filter(|call| matches!(call, SyncCall::Like(_)))
            .count()
    }

    pub fn fetch_calls(&self) -> usize {
        self.backend().fetch_calls
    }

    pub fn current_liked_calls(&self) -> usize {
        self.backend().current_liked_calls
    }

    fn backend(&self) -> MutexGuard<'_, Backend> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn check_session(&self) -> Result<()> {
        if self.backend().expired {
            return Err(SwipeError::SessionExpired);
        }
        Ok(())
    }

    async fn apply_fault(&self) -> Result<()> {
        let fault = self.backend().faults.pop_front();
        match fault {
            None => Ok(()),
            Some(Fault::Hang) => std::future::pending().await,
            Some(Fault::Network) => Err(SwipeError::Network("connection reset".into())),
            Some(Fault::ServerError) => Err(SwipeError::ServerError { status: 503 }),
            Some(Fault::SessionExpired) => {
                self.expire_session();
                Err(SwipeError::SessionExpired)
            }
        }
    }
}

impl Backend {
    fn card_for_title(&self, title: &str) -> CandidateCard {
        self.catalog
            .iter()
            .find(|c| c.title == title)
            .cloned()
            .unwrap_or_else(|| CandidateCard::new(format!("menu-{}", title), title))
    }
}

#[async_trait]
impl ProfileService for InMemoryProfileService {
    async fn fetch_candidates(&self, _user: &str) -> Result<Vec<CandidateCard>> {
        self.simulate_latency().await;
        self.check_session()?;
        self.backend().fetch_calls += 1;

        if let Some(gate) = &self.fetch_gate {
            gate.acquire()
                .await
                .map_err(|_| SwipeError::Network("fetch gate closed".into()))?
                .forget();
        }

        let backend = self.backend();
        let page = backend
            .catalog
            .iter()
            .filter(|card| {
                self.serve_decided
                    || (!backend.liked.iter().any(|l| l.id == card.id)
                        && !backend.disliked.contains(&card.title))
            })
            .take(self.page_size)
            .cloned()
            .collect();
        Ok(page)
    }

    async fn record_like(&self, _user: &str, menu_title: &str) -> Result<()> {
        self.simulate_latency().await;
        self.check_session()?;
        self.apply_fault().await?;

        let mut backend = self.backend();
        backend.sync_log.push(SyncCall::Like(menu_title.to_string()));
        let already = backend.liked.iter().any(|c| c.title == menu_title);
        // past the cap the real service drops the like without an error
        if !already && backend.liked.len() < self.cap as usize {
            let card = backend.card_for_title(menu_title);
            backend.liked.push(card);
        }
        Ok(())
    }

    async fn record_dislike(&self, _user: &str, menu_title: &str) -> Result<()> {
        self.simulate_latency().await;
        self.check_session()?;
        self.apply_fault().await?;

        let mut backend = self.backend();
        backend.sync_log.push(SyncCall::Dislike(menu_title.to_string()));
        backend.disliked.push(menu_title.to_string());
        Ok(())
    }

    async fn current_liked(&self, _user: &str) -> Result<AuthoritativeCount> {
        self.simulate_latency().await;
        self.check_session()?;

        let mut backend = self.backend();
        backend.current_liked_calls += 1;
        Ok(AuthoritativeCount {
            count: backend.liked.len() as u32,
            menu_list: backend.liked.clone(),
        })
    }

    async fn remove_liked(&self, _user: &str, menu_title: &str) -> Result<()> {
        self.simulate_latency().await;
        self.check_session()?;
        self.apply_fault().await?;

        self.backend().liked.retain(|c| c.title != menu_title);
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.expire_session();
        Ok(())
    }
}
