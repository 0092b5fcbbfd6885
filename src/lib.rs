//! EatsEase swipe engine
//!
//! Menu discovery by swiping: gesture decisions, a capped liked set and its
//! synchronization with the EatsEase profile service.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod refill;
pub mod service;
pub mod session;
pub mod sync;

pub use engine::{
    DecisionOutcome, EngineEvent, EngineSettings, EngineSnapshot, EventStream, GestureOutcome,
    SwipeEngine, SyncStatus,
};
pub use error::{Result, SwipeError};
pub use refill::RefillOutcome;
pub use service::{HttpProfileService, InMemoryProfileService, ProfileService};
