//! EatsEase Common Library
//!
//! I/O-free swipe logic shared by the engine and card front-ends

pub mod types;
pub mod error;
pub mod gesture;
pub mod queue;
pub mod capacity;

pub use types::{
    AuthoritativeCount, CandidateCard, CurrentLikedDto, MenuItemDto, SwipeDecision,
    SwipeDirection, SyncKind, SyncRequest,
};
pub use error::{Error, Result};
pub use gesture::{
    CardTransform, DragFrame, ExitAnimation, GestureConfig, GesturePhase, GestureRecognizer,
    ReleaseOutcome,
};
pub use queue::CardQueue;
pub use capacity::{CapacityGate, NavigationTrigger, DEFAULT_LIKE_CAP};
