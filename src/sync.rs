//! Preference synchronization
//!
//! One request in flight per user: callers take a `SyncTurn` (a fair async
//! lock, so waiters are served in arrival order) and send through it. A send
//! records the decision and then reads the authoritative liked set, so the
//! count is never read while one of our writes is outstanding.

use crate::error::{Result, SwipeError};
use crate::service::ProfileService;
use eatsease_common::{AuthoritativeCount, SyncKind, SyncRequest};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(10);

pub struct PreferenceSyncClient {
    service: Arc<dyn ProfileService>,
    user: String,
    timeout: Duration,
    in_flight: Mutex<()>,
}

/// Exclusive right to talk to the profile service for this user
pub struct SyncTurn<'a> {
    client: &'a PreferenceSyncClient,
    _guard: MutexGuard<'a, ()>,
}

impl PreferenceSyncClient {
    pub fn new(service: Arc<dyn ProfileService>, user: impl Into<String>, timeout: Duration) -> Self {
        Self {
            service,
            user: user.into(),
            timeout,
            in_flight: Mutex::new(()),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Wait until no other request is in flight
    pub async fn turn(&self) -> SyncTurn<'_> {
        SyncTurn {
            client: self,
            _guard: self.in_flight.lock().await,
        }
    }

    /// `turn` + `send` for one-off requests
    pub async fn send(&self, request: &SyncRequest) -> Result<AuthoritativeCount> {
        self.turn().await.send(request).await
    }

    async fn with_timeout<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| SwipeError::Timeout(self.timeout))?
    }
}

impl SyncTurn<'_> {
    /// Record one decision, then fetch the authoritative liked set
    pub async fn send(&self, request: &SyncRequest) -> Result<AuthoritativeCount> {
        let client = self.client;
        debug!(seq = request.seq, kind = ?request.kind, menu = %request.menu_title, "sync send");

        client
            .with_timeout(async {
                match request.kind {
                    SyncKind::LikeDecision => {
                        client.service.record_like(&client.user, &request.menu_title).await?
                    }
                    SyncKind::DislikeDecision => {
                        client.service.record_dislike(&client.user, &request.menu_title).await?
                    }
                }
                client.service.current_liked(&client.user).await
            })
            .await
    }

    pub async fn fetch_count(&self) -> Result<AuthoritativeCount> {
        let client = self.client;
        client.with_timeout(client.service.current_liked(&client.user)).await
    }

    /// Remove a liked menu, then fetch the authoritative liked set
    pub async fn remove_liked(&self, menu_title: &str) -> Result<AuthoritativeCount> {
        let client = self.client;
        client
            .with_timeout(async {
                client.service.remove_liked(&client.user, menu_title).await?;
                client.service.current_liked(&client.user).await
            })
            .await
    }
}
