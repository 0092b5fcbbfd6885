//! Swipe domain and wire types
//!
//! Types shared by the engine and any card front-end:
//! - CandidateCard: one recommendable menu
//! - SwipeDecision: the committed outcome of one gesture
//! - AuthoritativeCount: the profile service's view of the liked set
//! - MenuItemDto / CurrentLikedDto: JSON payloads of the profile service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One menu waiting for a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCard {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub image_ref: Option<String>,
}

impl CandidateCard {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_ref: None,
        }
    }

    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = Some(image_ref.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    /// Direction of a non-zero horizontal displacement
    pub fn from_offset(dx: f64) -> Option<Self> {
        if dx > 0.0 {
            Some(SwipeDirection::Right)
        } else if dx < 0.0 {
            Some(SwipeDirection::Left)
        } else {
            None
        }
    }

    pub fn sign(self) -> f64 {
        match self {
            SwipeDirection::Left => -1.0,
            SwipeDirection::Right => 1.0,
        }
    }
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwipeDirection::Left => write!(f, "left"),
            SwipeDirection::Right => write!(f, "right"),
        }
    }
}

/// Committed outcome of a gesture. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeDecision {
    pub card_id: String,
    pub direction: SwipeDirection,
    pub client_timestamp: DateTime<Utc>,
}

impl SwipeDecision {
    pub fn new(card_id: impl Into<String>, direction: SwipeDirection) -> Self {
        Self {
            card_id: card_id.into(),
            direction,
            client_timestamp: Utc::now(),
        }
    }
}

/// Liked count and list as last reported by the profile service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoritativeCount {
    pub count: u32,
    pub menu_list: Vec<CandidateCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncKind {
    LikeDecision,
    DislikeDecision,
}

impl From<SwipeDirection> for SyncKind {
    fn from(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Right => SyncKind::LikeDecision,
            SwipeDirection::Left => SyncKind::DislikeDecision,
        }
    }
}

/// One outbound preference update, numbered in commit order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub seq: u64,
    pub kind: SyncKind,
    pub card_id: String,
    pub menu_title: String,
}

/// Menu entry as served by `/recommendation/menu` and `/userProfile/currentLiked`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuItemDto {
    #[serde(rename = "_id")]
    pub id: String,
    pub menu_name: String,
    #[serde(default)]
    pub menu_image: Option<String>,
}

impl From<MenuItemDto> for CandidateCard {
    fn from(dto: MenuItemDto) -> Self {
        Self {
            id: dto.id,
            title: dto.menu_name,
            image_ref: dto.menu_image,
        }
    }
}

impl From<&CandidateCard> for MenuItemDto {
    fn from(card: &CandidateCard) -> Self {
        Self {
            id: card.id.clone(),
            menu_name: card.title.clone(),
            menu_image: card.image_ref.clone(),
        }
    }
}

/// Body of `GET /userProfile/currentLiked/{user}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentLikedDto {
    pub count: i64,
    #[serde(default)]
    pub menu_list: Vec<MenuItemDto>,
}

impl From<CurrentLikedDto> for AuthoritativeCount {
    fn from(dto: CurrentLikedDto) -> Self {
        Self {
            count: u32::try_from(dto.count.max(0)).unwrap_or(u32::MAX),
            menu_list: dto.menu_list.into_iter().map(CandidateCard::from).collect(),
        }
    }
}
