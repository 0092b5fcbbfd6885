//! Swipe gesture recognition
//!
//! Converts horizontal drag offsets of the top card into a single terminal report:
//! - while dragging: a tentative direction plus a transform for the renderer
//! - release below the commit threshold: the card springs back, nothing is decided
//! - release at or beyond it: an exit animation runs, then the direction is reported
//!
//! Offsets are in the same unit as `screen_width` (pixels). Thresholds are
//! fractions of the screen width.

use crate::error::{Error, Result};
use crate::types::SwipeDirection;
use std::time::Duration;

/// Card tilt reached at `ROTATION_RANGE_PX` of displacement
const MAX_ROTATION_DEG: f64 = 20.0;
const ROTATION_RANGE_PX: f64 = 200.0;

/// Thresholds and timing for one recognizer. Built once, never re-derived per screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub screen_width: f64,
    /// Fraction of the screen width past which a direction is shown as tentative
    pub tentative_threshold: f64,
    /// Fraction of the screen width at or past which a release commits
    pub commit_threshold: f64,
    pub exit_duration: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            screen_width: 390.0,
            tentative_threshold: 0.35,
            commit_threshold: 0.5,
            exit_duration: Duration::from_millis(200),
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.screen_width.is_finite() && self.screen_width > 0.0) {
            return Err(Error::Config(format!(
                "screen width must be positive, got {}",
                self.screen_width
            )));
        }
        if !(self.tentative_threshold > 0.0 && self.tentative_threshold <= 1.0) {
            return Err(Error::Config(format!(
                "tentative threshold must be in (0, 1], got {}",
                self.tentative_threshold
            )));
        }
        if !(self.commit_threshold >= self.tentative_threshold && self.commit_threshold <= 1.0) {
            return Err(Error::Config(format!(
                "commit threshold must be in [tentative, 1], got {}",
                self.commit_threshold
            )));
        }
        Ok(())
    }

    pub fn tentative_px(&self) -> f64 {
        self.tentative_threshold * self.screen_width
    }

    pub fn commit_px(&self) -> f64 {
        self.commit_threshold * self.screen_width
    }

    /// `Right` past +T, `Left` past -T, otherwise none
    pub fn tentative_direction(&self, dx: f64) -> Option<SwipeDirection> {
        let threshold = self.tentative_px();
        if dx > threshold {
            Some(SwipeDirection::Right)
        } else if dx < -threshold {
            Some(SwipeDirection::Left)
        } else {
            None
        }
    }

    /// A release commits when `|dx| >= commit`
    pub fn commits(&self, dx: f64) -> bool {
        dx.abs() >= self.commit_px()
    }
}

/// Visual state of the card for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub offset_x: f64,
    pub rotation_deg: f64,
    pub opacity: f64,
}

impl CardTransform {
    pub const ORIGIN: CardTransform = CardTransform {
        offset_x: 0.0,
        rotation_deg: 0.0,
        opacity: 1.0,
    };

    pub fn at(offset_x: f64, opacity: f64) -> Self {
        let rotation_deg =
            (offset_x / ROTATION_RANGE_PX * MAX_ROTATION_DEG).clamp(-MAX_ROTATION_DEG, MAX_ROTATION_DEG);
        Self {
            offset_x,
            rotation_deg,
            opacity: opacity.clamp(0.0, 1.0),
        }
    }
}

/// Slide off-screen with a linear fade to transparent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitAnimation {
    pub direction: SwipeDirection,
    pub from_x: f64,
    pub to_x: f64,
    pub duration: Duration,
}

impl ExitAnimation {
    fn progress(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    pub fn frame(&self, elapsed: Duration) -> CardTransform {
        let p = self.progress(elapsed);
        CardTransform::at(self.from_x + (self.to_x - self.from_x) * p, 1.0 - p)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }
}

/// Frame produced while the finger is down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragFrame {
    pub tentative: Option<SwipeDirection>,
    pub transform: CardTransform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GesturePhase {
    Idle,
    Dragging { dx: f64, tentative: Option<SwipeDirection> },
    /// Committed; waiting for the exit animation to finish
    Exiting(ExitAnimation),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReleaseOutcome {
    /// Below the commit threshold: spring back to origin, report no decision
    SnapBack,
    /// Committed: play the animation, then call `finish_exit`
    Exit(ExitAnimation),
    /// An exit is already running; the release handler is not re-entered
    Ignored,
}

#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    phase: GesturePhase,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            phase: GesturePhase::Idle,
        })
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    pub fn is_exiting(&self) -> bool {
        matches!(self.phase, GesturePhase::Exiting(_))
    }

    /// Per-frame drag update. Returns `None` once an exit is running.
    pub fn drag(&mut self, dx: f64) -> Option<DragFrame> {
        if self.is_exiting() {
            return None;
        }
        let tentative = self.config.tentative_direction(dx);
        self.phase = GesturePhase::Dragging { dx, tentative };
        Some(DragFrame {
            tentative,
            transform: CardTransform::at(dx, 1.0),
        })
    }

    /// Finger lifted at `dx`. Only the final displacement counts, not the peak.
    /// A release straight from `Idle` is a one-sample gesture (quick flick).
    pub fn release(&mut self, dx: f64) -> ReleaseOutcome {
        if self.is_exiting() {
            return ReleaseOutcome::Ignored;
        }

        let direction = match SwipeDirection::from_offset(dx) {
            Some(direction) if self.config.commits(dx) => direction,
            _ => {
                self.phase = GesturePhase::Idle;
                return ReleaseOutcome::SnapBack;
            }
        };

        let animation = ExitAnimation {
            direction,
            from_x: dx,
            to_x: direction.sign() * self.config.screen_width,
            duration: self.config.exit_duration,
        };
        self.phase = GesturePhase::Exiting(animation);
        ReleaseOutcome::Exit(animation)
    }

    /// Exit animation completed. Yields the committed direction exactly once.
    pub fn finish_exit(&mut self) -> Option<SwipeDirection> {
        match self.phase {
            GesturePhase::Exiting(animation) => {
                self.phase = GesturePhase::Idle;
                Some(animation.direction)
            }
            _ => None,
        }
    }

    /// Drop any gesture in progress (top card replaced underneath the finger)
    pub fn reset(&mut self) {
        self.phase = GesturePhase::Idle;
    }
}
