//! Terminal swipe sessions
//!
//! Drives `SwipeEngine` the way a card screen would: synthetic drag samples,
//! a release, then whatever events the engine raised.

use crate::cli::ScriptStep;
use crate::engine::{
    DecisionOutcome, EngineEvent, EngineSettings, EventStream, GestureOutcome, LikeStatus,
    SwipeEngine, SyncStatus,
};
use crate::error::{Result, SwipeError};
use crate::refill::RefillOutcome;
use crate::service::{InMemoryProfileService, ProfileService};
use dialoguer::Select;
use eatsease_common::CandidateCard;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

const DEMO_MENUS: &[&str] = &[
    "Pad Thai",
    "Som Tam",
    "Tom Yum Goong",
    "Khao Man Gai",
    "Green Curry",
    "Massaman Curry",
    "Khao Soi",
    "Larb Moo",
    "Pad Kra Pao",
    "Boat Noodles",
    "Khao Pad",
    "Mango Sticky Rice",
];

/// Drag samples sent before the release
const DRAG_FRAMES: u32 = 4;

pub fn demo_catalog() -> Vec<CandidateCard> {
    DEMO_MENUS
        .iter()
        .enumerate()
        .map(|(i, title)| CandidateCard::new(format!("demo-{:02}", i + 1), *title))
        .collect()
}

pub fn demo_service(page_size: usize, latency: Duration) -> Arc<InMemoryProfileService> {
    Arc::new(
        InMemoryProfileService::new(demo_catalog())
            .with_page_size(page_size)
            .with_latency(latency),
    )
}

/// Release offset that produces `step` under the engine's thresholds
pub fn release_offset(step: ScriptStep, settings: &EngineSettings) -> f64 {
    let gesture = &settings.gesture;
    match step {
        ScriptStep::Like => gesture.commit_px() * 1.2,
        ScriptStep::Dislike => -gesture.commit_px() * 1.2,
        ScriptStep::Nudge => gesture.tentative_px() * 0.5,
    }
}

/// A full gesture: a few drag frames, then the release
pub async fn perform(engine: &SwipeEngine, step: ScriptStep) -> Result<GestureOutcome> {
    let target = release_offset(step, engine.settings());
    for frame in 1..=DRAG_FRAMES {
        engine
            .on_gesture(target * frame as f64 / DRAG_FRAMES as f64, false)
            .await?;
    }
    engine.on_gesture(target, true).await
}

/// Print pending events. `true` when the session should end.
pub fn report_events(events: &mut EventStream) -> bool {
    let mut finished = false;
    while let Ok(event) = events.try_recv() {
        match event {
            EngineEvent::LimitReached { cap } => {
                println!("⚠ Limit reached: you can only like up to {} menus", cap);
            }
            EngineEvent::NavigateToFinalize(liked) => {
                println!("\n🎉 Your {} favourites are ready:", liked.len());
                for (i, card) in liked.iter().enumerate() {
                    println!("  {}. {}", i + 1, card.title);
                }
                finished = true;
            }
            EngineEvent::NoMoreCandidates => {
                println!("⏳ Looking for more menus... none yet");
            }
            EngineEvent::SyncFailed { menu_title, reason, .. } => {
                println!("✗ Could not save \"{}\": {}", menu_title, reason);
            }
            EngineEvent::RefillFailed { reason } => {
                println!("✗ Could not load more menus: {}", reason);
            }
            EngineEvent::SessionExpired => {
                println!("✗ Session expired");
                finished = true;
            }
        }
    }
    finished
}

fn describe(outcome: &GestureOutcome) -> String {
    match outcome {
        GestureOutcome::Cancelled => "released early, card returned".into(),
        GestureOutcome::Ignored | GestureOutcome::Dragging(_) => "ignored".into(),
        GestureOutcome::Decided { outcome, .. } => match outcome {
            DecisionOutcome::Applied { card, direction, sync, .. } => {
                let sync = match sync {
                    SyncStatus::Confirmed { count } => format!("saved, {} liked", count),
                    SyncStatus::Failed { reason } => format!("not saved ({})", reason),
                };
                format!("{} {} - {}", direction, card.title, sync)
            }
            DecisionOutcome::Blocked { .. } => "like refused, list is full".into(),
            DecisionOutcome::Ignored(reason) => format!("ignored ({:?})", reason),
        },
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Scripted session against the demo menu
pub async fn run_simulation(steps: &[ScriptStep], page_size: usize, latency: Duration) -> Result<()> {
    let service = demo_service(page_size, latency);
    let (engine, mut events) = SwipeEngine::new(service, "demo", EngineSettings::default())?;

    engine.open_session().await?;
    if report_events(&mut events) {
        return Ok(());
    }

    for (i, step) in steps.iter().enumerate() {
        let Some(card) = engine.peek_card() else {
            println!("No cards left");
            break;
        };
        let outcome = perform(&engine, *step).await?;
        println!("[{}] {:<18} {}", i + 1, card.title, describe(&outcome));
        if report_events(&mut events) {
            break;
        }
    }

    print_liked(&engine);
    Ok(())
}

fn print_liked(engine: &SwipeEngine) {
    let snapshot = engine.snapshot();
    println!(
        "\nLiked {}/{} (server), {} locally:",
        snapshot.liked_count,
        snapshot.like_cap,
        snapshot.liked.len()
    );
    for entry in &snapshot.liked {
        let mark = match entry.status {
            LikeStatus::Confirmed => "✔",
            LikeStatus::Pending => "…",
            LikeStatus::Unconfirmed => "?",
        };
        println!("  {} {}", mark, entry.card.title);
    }
}

/// Network hiccups, timeouts and 5xx end one action, not the session.
/// `None` means the error was reported and the loop can go on.
pub fn recoverable<T>(result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_transient() => {
            tracing::warn!(error = %err, "recoverable failure");
            println!("✗ {} (try again)", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Interactive session: one prompt per top card
pub async fn run_interactive(service: Arc<dyn ProfileService>, user: &str, settings: EngineSettings) -> Result<()> {
    let (engine, mut events) = SwipeEngine::new(service, user, settings)?;

    let loading = spinner("Finding menus for you...");
    let opened = engine.open_session().await;
    loading.finish_and_clear();
    recoverable(opened)?;

    loop {
        if report_events(&mut events) {
            break;
        }

        let Some(card) = engine.peek_card() else {
            let choice = Select::new()
                .with_prompt("No menus right now")
                .items(&["Check again", "Quit"])
                .default(0)
                .interact()?;
            if choice == 1 {
                break;
            }
            let loading = spinner("Loading more menus...");
            let outcome = engine.maybe_refill().await;
            loading.finish_and_clear();
            if let Some(RefillOutcome::Exhausted) = recoverable(outcome)? {
                println!("Still nothing new, try again later");
            }
            continue;
        };

        println!(
            "\n🍽  {}   ({}/{} liked)",
            card.title,
            engine.liked_count(),
            engine.like_cap()
        );
        let choice = Select::new()
            .items(&["👍 Like", "👎 Dislike", "↩ Let go", "🔄 Refresh", "Quit"])
            .default(0)
            .interact()?;

        let step = match choice {
            0 => ScriptStep::Like,
            1 => ScriptStep::Dislike,
            2 => ScriptStep::Nudge,
            3 => {
                recoverable(engine.refresh_count().await)?;
                continue;
            }
            _ => break,
        };
        if let Some(outcome) = recoverable(perform(&engine, step).await)? {
            println!("  {}", describe(&outcome));
        }
    }

    print_liked(&engine);
    Ok(())
}

pub async fn run_liked(service: Arc<dyn ProfileService>, user: &str, settings: EngineSettings) -> Result<()> {
    let (engine, _events) = SwipeEngine::new(service, user, settings)?;
    engine.refresh_count().await?;
    print_liked(&engine);
    Ok(())
}

pub async fn run_unlike(
    service: Arc<dyn ProfileService>,
    user: &str,
    settings: EngineSettings,
    title: &str,
) -> Result<()> {
    let (engine, _events) = SwipeEngine::new(service, user, settings)?;
    let count = engine.remove_liked(title).await?;
    println!("✔ Removed \"{}\" ({} liked)", title, count.count);
    Ok(())
}

/// Hand an expired session back to login: invalidate the token and say so
pub async fn handle_expiry<T>(service: &dyn ProfileService, result: Result<T>) -> Result<T> {
    if let Err(SwipeError::SessionExpired) = &result {
        if let Err(err) = service.logout().await {
            tracing::warn!(error = %err, "logout failed");
        }
        println!("Your session has expired. Please log in again and update the token with `eatsease config --set-token`.");
    }
    result
}
