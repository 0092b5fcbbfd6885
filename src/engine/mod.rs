//! Swipe decision engine
//!
//! Owns the session state (queue, liked set, disliked log, cached authoritative
//! count) and funnels every mutation through a handful of methods:
//! - `on_gesture` / `on_gesture_result`: gesture → decision → optimistic update → sync
//! - `refresh_count`: reconcile with the server, e.g. when the screen regains focus
//! - `maybe_refill`: fetch a new page once the queue is empty
//! - `remove_liked`: review-screen removal
//!
//! The state lock is never held across an await. Sync requests go through an
//! outbox drained in commit order with one request in flight.

mod state;
mod types;

pub use state::{LikeStatus, LikedEntry, LikedSet};
pub use types::{
    DecisionOutcome, EngineEvent, EngineSettings, EngineSnapshot, GestureOutcome, IgnoreReason,
    SyncStatus,
};

use crate::error::{Result, SwipeError};
use crate::refill::{RefillController, RefillOutcome};
use crate::service::ProfileService;
use crate::sync::PreferenceSyncClient;
use eatsease_common::{
    AuthoritativeCount, CandidateCard, CapacityGate, DragFrame, GestureRecognizer, ReleaseOutcome,
    SwipeDecision, SwipeDirection, SyncRequest,
};
use state::SessionState;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

pub type EventStream = UnboundedReceiver<EngineEvent>;

pub struct SwipeEngine {
    state: Mutex<SessionState>,
    sync: PreferenceSyncClient,
    refill: RefillController,
    gate: CapacityGate,
    settings: EngineSettings,
    events: UnboundedSender<EngineEvent>,
}

impl SwipeEngine {
    pub fn new(
        service: Arc<dyn ProfileService>,
        user: impl Into<String>,
        settings: EngineSettings,
    ) -> Result<(Self, EventStream)> {
        settings.validate()?;
        let user = user.into();
        let gesture = GestureRecognizer::new(settings.gesture)?;
        let (events, receiver) = unbounded_channel();

        let engine = Self {
            state: Mutex::new(SessionState::new(settings.like_cap, gesture)),
            sync: PreferenceSyncClient::new(service.clone(), user.clone(), settings.sync_timeout),
            refill: RefillController::new(service, user, settings.sync_timeout),
            gate: CapacityGate::new(settings.like_cap),
            settings,
            events,
        };
        Ok((engine, receiver))
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: EngineEvent) {
        if self.events.send(event).is_err() {
            debug!("engine event dropped, no listener");
        }
    }

    pub fn user(&self) -> &str {
        self.sync.user()
    }

    pub fn peek_card(&self) -> Option<CandidateCard> {
        self.state().queue.peek().cloned()
    }

    /// Last authoritative liked count
    pub fn liked_count(&self) -> u32 {
        self.state().authoritative.count
    }

    pub fn like_cap(&self) -> u32 {
        self.gate.cap()
    }

    pub fn is_expired(&self) -> bool {
        self.state().expired
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let st = self.state();
        EngineSnapshot {
            top: st.queue.peek().cloned(),
            queue_len: st.queue.len(),
            queue_generation: st.queue.generation(),
            liked: st.liked.entries().to_vec(),
            liked_count: st.authoritative.count,
            like_cap: self.gate.cap(),
            disliked: st.disliked.clone(),
            loading: self.refill.is_loading(),
            exhausted: st.exhausted,
            expired: st.expired,
            gesture: st.gesture.phase(),
        }
    }

    /// Per-frame drag update for the top card. Never suspends.
    pub fn drag(&self, dx: f64) -> Option<DragFrame> {
        let mut st = self.state();
        if st.expired {
            return None;
        }
        let top = st.queue.peek()?.id.clone();
        if !st.gesture.is_exiting() {
            st.gesture_card = Some(top);
        }
        st.gesture.drag(dx)
    }

    /// Drag sample from the UI. On release the decision, if any, is applied
    /// after the exit animation has played.
    pub async fn on_gesture(&self, dx: f64, released: bool) -> Result<GestureOutcome> {
        if !released {
            return Ok(self
                .drag(dx)
                .map(GestureOutcome::Dragging)
                .unwrap_or(GestureOutcome::Ignored));
        }

        let animation = {
            let mut st = self.state();
            if st.expired {
                return Err(SwipeError::SessionExpired);
            }
            let Some(top) = st.queue.peek().map(|c| c.id.clone()) else {
                return Ok(GestureOutcome::Ignored);
            };
            if !st.gesture.is_exiting() {
                st.gesture_card = Some(top);
            }
            match st.gesture.release(dx) {
                ReleaseOutcome::SnapBack => {
                    st.gesture_card = None;
                    debug!(dx, "released below commit threshold");
                    return Ok(GestureOutcome::Cancelled);
                }
                ReleaseOutcome::Ignored => return Ok(GestureOutcome::Ignored),
                ReleaseOutcome::Exit(animation) => animation,
            }
        };

        if !animation.duration.is_zero() {
            tokio::time::sleep(animation.duration).await;
        }

        let decision = {
            let mut st = self.state();
            let direction = st.gesture.finish_exit();
            match (direction, st.gesture_card.take()) {
                (Some(direction), Some(card_id)) => SwipeDecision::new(card_id, direction),
                _ => return Ok(GestureOutcome::Ignored),
            }
        };

        let outcome = self.on_gesture_result(decision.clone()).await?;
        Ok(GestureOutcome::Decided { decision, outcome })
    }

    /// Apply a committed decision for the top card
    pub async fn on_gesture_result(&self, decision: SwipeDecision) -> Result<DecisionOutcome> {
        let (card, seq) = {
            let mut st = self.state();
            if st.expired {
                return Err(SwipeError::SessionExpired);
            }
            if st.decided.contains(&decision.card_id) {
                return Ok(DecisionOutcome::Ignored(IgnoreReason::AlreadyDecided));
            }
            if st.queue.peek().map(|c| c.id.as_str()) != Some(decision.card_id.as_str()) {
                return Ok(DecisionOutcome::Ignored(IgnoreReason::NotTopCard));
            }

            if decision.direction == SwipeDirection::Right {
                // likes still in flight count against the cap; failed ones do not
                let effective = st.authoritative.count + st.liked.pending();
                let mut admitted = self.gate.can_like(effective);
                if admitted && st.liked.is_full() {
                    let dropped = st.liked.drop_unconfirmed();
                    if dropped > 0 {
                        debug!(dropped, "evicted unconfirmed likes to make room");
                    }
                    admitted = !st.liked.is_full();
                }
                if !admitted {
                    info!(
                        card = %decision.card_id,
                        count = effective,
                        liked = st.liked.len(),
                        "like blocked at cap"
                    );
                    self.emit(EngineEvent::LimitReached { cap: self.gate.cap() });
                    return Ok(DecisionOutcome::Blocked {
                        card_id: decision.card_id,
                    });
                }
            }

            let Some(card) = st.queue.pop(&decision.card_id) else {
                return Ok(DecisionOutcome::Ignored(IgnoreReason::NotTopCard));
            };
            match decision.direction {
                SwipeDirection::Right => st.liked.push_pending(card.clone()),
                SwipeDirection::Left => st.disliked.push(card.clone()),
            }
            st.decided.insert(card.id.clone());

            let seq = st.next_seq;
            st.next_seq += 1;
            st.outbox.push_back(SyncRequest {
                seq,
                kind: decision.direction.into(),
                card_id: card.id.clone(),
                menu_title: card.title.clone(),
            });
            debug!(seq, card = %card.id, direction = %decision.direction, "decision applied");
            (card, seq)
        };

        self.flush_outbox().await?;

        let (sync, queue_empty) = {
            let mut st = self.state();
            let sync = st.completed.remove(&seq).unwrap_or_else(|| SyncStatus::Failed {
                reason: "sync request was dropped".into(),
            });
            (sync, st.queue.is_empty())
        };

        let refill = if queue_empty {
            match self.maybe_refill().await {
                Ok(outcome) => Some(outcome),
                Err(SwipeError::SessionExpired) => return Err(SwipeError::SessionExpired),
                Err(err) => {
                    warn!(error = %err, "refill failed");
                    self.emit(EngineEvent::RefillFailed {
                        reason: err.to_string(),
                    });
                    None
                }
            }
        } else {
            None
        };

        Ok(DecisionOutcome::Applied {
            card,
            direction: decision.direction,
            sync,
            refill,
        })
    }

    /// Send queued decisions in commit order, one at a time
    async fn flush_outbox(&self) -> Result<()> {
        let turn = self.sync.turn().await;

        loop {
            let request = {
                let mut st = self.state();
                if st.expired {
                    st.outbox.clear();
                    return Err(SwipeError::SessionExpired);
                }
                match st.outbox.pop_front() {
                    Some(request) => request,
                    None => return Ok(()),
                }
            };

            let result = turn.send(&request).await;

            let mut st = self.state();
            match result {
                Ok(count) => {
                    let confirmed = count.count;
                    self.reconcile(&mut st, count);
                    st.completed
                        .insert(request.seq, SyncStatus::Confirmed { count: confirmed });
                }
                Err(SwipeError::SessionExpired) => {
                    self.expire(&mut st);
                    return Err(SwipeError::SessionExpired);
                }
                Err(err) => {
                    warn!(seq = request.seq, menu = %request.menu_title, error = %err, "sync failed");
                    if request.kind == eatsease_common::SyncKind::LikeDecision {
                        st.liked.mark_unconfirmed(&request.card_id);
                    }
                    self.emit(EngineEvent::SyncFailed {
                        card_id: request.card_id.clone(),
                        menu_title: request.menu_title.clone(),
                        reason: err.to_string(),
                    });
                    st.completed.insert(
                        request.seq,
                        SyncStatus::Failed {
                            reason: err.to_string(),
                        },
                    );
                }
            }
        }
    }

    /// Server state wins over local optimism
    fn reconcile(&self, st: &mut SessionState, mut count: AuthoritativeCount) {
        let cap = self.gate.cap();
        if count.count > cap {
            warn!(count = count.count, cap, "server count above cap, clamping");
            count.count = cap;
        }
        if count.menu_list.len() > cap as usize {
            warn!(len = count.menu_list.len(), cap, "server liked list above cap, truncating");
            count.menu_list.truncate(cap as usize);
        }

        let outstanding = st.outstanding_likes();
        st.liked.reconcile(&count.menu_list, &outstanding);
        let navigate = st.navigation.observe(count.count);
        info!(count = count.count, liked = st.liked.len(), "reconciled liked set");
        st.authoritative = count;

        if navigate {
            info!(cap, "liked set full, navigating to finalize");
            self.emit(EngineEvent::NavigateToFinalize(st.liked.cards()));
        }
    }

    fn expire(&self, st: &mut SessionState) {
        if st.expired {
            return;
        }
        warn!(user = %self.sync.user(), "session expired, halting sync and refill");
        st.expired = true;
        st.outbox.clear();
        self.emit(EngineEvent::SessionExpired);
    }

    fn ensure_active(&self) -> Result<()> {
        if self.state().expired {
            return Err(SwipeError::SessionExpired);
        }
        Ok(())
    }

    /// Re-read the authoritative liked set (screen focus, manual retry)
    pub async fn refresh_count(&self) -> Result<AuthoritativeCount> {
        self.ensure_active()?;
        let turn = self.sync.turn().await;
        let result = turn.fetch_count().await;
        self.apply_count_result(result)
    }

    /// Remove a liked menu on the server and reconcile
    pub async fn remove_liked(&self, menu_title: &str) -> Result<AuthoritativeCount> {
        self.ensure_active()?;
        let turn = self.sync.turn().await;
        let result = turn.remove_liked(menu_title).await;
        self.apply_count_result(result)
    }

    fn apply_count_result(&self, result: Result<AuthoritativeCount>) -> Result<AuthoritativeCount> {
        let mut st = self.state();
        match result {
            Ok(count) => {
                self.reconcile(&mut st, count);
                Ok(st.authoritative.clone())
            }
            Err(SwipeError::SessionExpired) => {
                self.expire(&mut st);
                Err(SwipeError::SessionExpired)
            }
            Err(err) => Err(err),
        }
    }

    /// Fetch a new page if the queue is empty and no refill is running.
    /// Waits for outstanding syncs first so the page is requested against
    /// the server state that includes our last decision.
    pub async fn maybe_refill(&self) -> Result<RefillOutcome> {
        {
            let st = self.state();
            if st.expired {
                return Err(SwipeError::SessionExpired);
            }
            if !st.queue.is_empty() {
                return Ok(RefillOutcome::NotNeeded);
            }
        }

        let Some(loading) = self.refill.try_begin() else {
            debug!("refill already in flight");
            return Ok(RefillOutcome::AlreadyLoading);
        };

        self.flush_outbox().await?;
        let result = self.refill.fetch_page(&loading).await;

        let mut st = self.state();
        let page = match result {
            Ok(page) => page,
            Err(SwipeError::SessionExpired) => {
                self.expire(&mut st);
                return Err(SwipeError::SessionExpired);
            }
            Err(err) => return Err(err),
        };
        if st.expired {
            return Err(SwipeError::SessionExpired);
        }
        if !st.queue.is_empty() {
            return Ok(RefillOutcome::NotNeeded);
        }

        let cards = RefillController::prepare_page(page, |id| {
            st.decided.contains(id) || st.liked.contains(id)
        });
        if cards.is_empty() {
            st.exhausted = true;
            info!("no new candidates");
            self.emit(EngineEvent::NoMoreCandidates);
            return Ok(RefillOutcome::Exhausted);
        }

        let added = st.queue.refill(cards)?;
        st.exhausted = false;
        st.gesture.reset();
        st.gesture_card = None;
        info!(cards = added, generation = st.queue.generation(), "queue refilled");
        Ok(RefillOutcome::Refilled(added))
    }

    /// Initial load: authoritative count first so the cap is known, then candidates
    pub async fn open_session(&self) -> Result<RefillOutcome> {
        self.refresh_count().await?;
        self.maybe_refill().await
    }
}
