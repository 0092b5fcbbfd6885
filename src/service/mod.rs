//! Profile / recommendation service seam
//!
//! Every remote call the engine makes goes through `ProfileService`.
//! Implementations convert transport failures into `SwipeError` kinds
//! before returning, so callers never see a raw transport error.

mod http;
mod memory;

pub use http::{HttpProfileService, DEFAULT_BASE_URL};
pub use memory::{Fault, InMemoryProfileService, SyncCall};

use crate::error::Result;
use async_trait::async_trait;
use eatsease_common::{AuthoritativeCount, CandidateCard};

#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Next page of recommendations; already-decided menus are excluded server-side
    async fn fetch_candidates(&self, user: &str) -> Result<Vec<CandidateCard>>;

    async fn record_like(&self, user: &str, menu_title: &str) -> Result<()>;

    async fn record_dislike(&self, user: &str, menu_title: &str) -> Result<()>;

    async fn current_liked(&self, user: &str) -> Result<AuthoritativeCount>;

    async fn remove_liked(&self, user: &str, menu_title: &str) -> Result<()>;

    /// Invalidate the session token
    async fn logout(&self) -> Result<()>;
}
