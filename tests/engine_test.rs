//! Swipe engine scenarios
//!
//! Runs the engine against the in-memory profile service: decisions, the
//! like cap, navigation, refill and sync failures.

use async_trait::async_trait;
use eatsease_common::{
    AuthoritativeCount, CandidateCard, GestureConfig, SwipeDecision, SwipeDirection,
};
use eatsease_swipe::engine::{IgnoreReason, LikeStatus};
use eatsease_swipe::service::{Fault, SyncCall};
use eatsease_swipe::{
    DecisionOutcome, EngineEvent, EngineSettings, EventStream, GestureOutcome,
    InMemoryProfileService, ProfileService, RefillOutcome, SwipeEngine, SwipeError, SyncStatus,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn menus(titles: &[&str]) -> Vec<CandidateCard> {
    titles
        .iter()
        .map(|t| CandidateCard::new(format!("id-{}", t), *t))
        .collect()
}

fn settings() -> EngineSettings {
    EngineSettings {
        sync_timeout: Duration::from_millis(300),
        gesture: GestureConfig {
            exit_duration: Duration::ZERO,
            ..GestureConfig::default()
        },
        ..EngineSettings::default()
    }
}

fn engine(service: &Arc<InMemoryProfileService>) -> (SwipeEngine, EventStream) {
    SwipeEngine::new(service.clone(), "somchai", settings()).unwrap()
}

fn drain(events: &mut EventStream) -> Vec<EngineEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn navigations(events: &[EngineEvent]) -> Vec<Vec<CandidateCard>> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::NavigateToFinalize(liked) => Some(liked.clone()),
            _ => None,
        })
        .collect()
}

fn liked_titles(engine: &SwipeEngine) -> Vec<String> {
    engine
        .snapshot()
        .liked
        .into_iter()
        .map(|e| e.card.title)
        .collect()
}

/// Full swipe: release at 60% of the screen width
async fn swipe(engine: &SwipeEngine, direction: SwipeDirection) -> GestureOutcome {
    let dx = direction.sign() * 0.6 * engine.settings().gesture.screen_width;
    engine.on_gesture(dx / 2.0, false).await.unwrap();
    engine.on_gesture(dx, true).await.unwrap()
}

fn applied(outcome: &GestureOutcome) -> &DecisionOutcome {
    match outcome {
        GestureOutcome::Decided { outcome, .. } => outcome,
        other => panic!("expected a decision, got {:?}", other),
    }
}

/// One right swipe: liked [A], queue [B, C], one like sent, no navigation
#[tokio::test]
async fn test_single_right_swipe() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["A", "B", "C"])));
    let (engine, mut events) = engine(&service);
    engine.open_session().await.unwrap();

    let outcome = swipe(&engine, SwipeDirection::Right).await;

    match applied(&outcome) {
        DecisionOutcome::Applied { card, direction, sync, .. } => {
            assert_eq!(card.title, "A");
            assert_eq!(*direction, SwipeDirection::Right);
            assert_eq!(*sync, SyncStatus::Confirmed { count: 1 });
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(liked_titles(&engine), vec!["A"]);
    assert_eq!(engine.snapshot().queue_len, 2);
    assert_eq!(engine.peek_card().unwrap().title, "B");
    assert_eq!(service.sync_log(), vec![SyncCall::Like("A".into())]);
    assert!(navigations(&drain(&mut events)).is_empty());
}

/// Five confirmed likes navigate exactly once with the full set
#[tokio::test]
async fn test_fifth_like_navigates_once() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["A", "B", "C", "D", "E", "F"])));
    let (engine, mut events) = engine(&service);
    engine.open_session().await.unwrap();

    for expected in 1..=5u32 {
        let outcome = swipe(&engine, SwipeDirection::Right).await;
        match applied(&outcome) {
            DecisionOutcome::Applied { sync, .. } => {
                assert_eq!(*sync, SyncStatus::Confirmed { count: expected })
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    let navigated = navigations(&drain(&mut events));
    assert_eq!(navigated.len(), 1);
    let titles: Vec<_> = navigated[0].iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "B", "C", "D", "E"]);
    assert_eq!(engine.liked_count(), 5);
}

/// At the cap a right swipe is refused without touching state or the server
#[tokio::test]
async fn test_right_swipe_at_cap_is_blocked() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["F", "G"])));
    service.seed_liked(menus(&["A", "B", "C", "D", "E"]));
    let (engine, mut events) = engine(&service);
    engine.open_session().await.unwrap();
    drain(&mut events);

    let before = liked_titles(&engine);
    let outcome = swipe(&engine, SwipeDirection::Right).await;

    assert!(matches!(applied(&outcome), DecisionOutcome::Blocked { card_id } if card_id == "id-F"));
    assert_eq!(liked_titles(&engine), before);
    assert_eq!(engine.peek_card().unwrap().title, "F");
    assert_eq!(engine.snapshot().queue_len, 2);
    assert!(service.sync_log().is_empty());
    assert_eq!(drain(&mut events), vec![EngineEvent::LimitReached { cap: 5 }]);
}

/// Left swipes still work at the cap
#[tokio::test]
async fn test_left_swipe_allowed_at_cap() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["F", "G"])));
    service.seed_liked(menus(&["A", "B", "C", "D", "E"]));
    let (engine, _events) = engine(&service);
    engine.open_session().await.unwrap();

    let outcome = swipe(&engine, SwipeDirection::Left).await;

    assert!(matches!(applied(&outcome), DecisionOutcome::Applied { .. }));
    assert_eq!(engine.snapshot().disliked.len(), 1);
    assert_eq!(service.sync_log(), vec![SyncCall::Dislike("F".into())]);
}

/// Two empty-queue checks racing each other issue one fetch
#[tokio::test]
async fn test_concurrent_refill_fetches_once() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["A", "B"])).with_held_fetches());
    let (engine, _events) = SwipeEngine::new(
        service.clone(),
        "somchai",
        EngineSettings {
            sync_timeout: Duration::from_secs(5),
            ..settings()
        },
    )
    .unwrap();

    let (first, second) = tokio::join!(engine.maybe_refill(), async {
        let second = engine.maybe_refill().await;
        service.release_fetches(1);
        second
    });

    assert_eq!(first.unwrap(), RefillOutcome::Refilled(2));
    assert_eq!(second.unwrap(), RefillOutcome::AlreadyLoading);
    assert_eq!(service.fetch_calls(), 1);
    assert!(!engine.snapshot().loading);
}

/// The last decision triggers one refill; a racing check adds no fetch
#[tokio::test]
async fn test_last_card_refill_is_not_duplicated() {
    let service = Arc::new(
        InMemoryProfileService::new(menus(&["A", "B", "C"]))
            .with_page_size(1)
            .with_held_fetches(),
    );
    let (engine, _events) = SwipeEngine::new(
        service.clone(),
        "somchai",
        EngineSettings {
            sync_timeout: Duration::from_secs(5),
            ..settings()
        },
    )
    .unwrap();
    service.release_fetches(1);
    engine.open_session().await.unwrap();
    assert_eq!(service.fetch_calls(), 1);

    let decision = SwipeDecision::new("id-A", SwipeDirection::Left);
    let (decided, racing) = tokio::join!(engine.on_gesture_result(decision), async {
        while !engine.snapshot().loading {
            tokio::task::yield_now().await;
        }
        let racing = engine.maybe_refill().await;
        service.release_fetches(1);
        racing
    });

    match decided.unwrap() {
        DecisionOutcome::Applied { refill, .. } => {
            assert_eq!(refill, Some(RefillOutcome::Refilled(1)))
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(racing.unwrap(), RefillOutcome::AlreadyLoading);
    assert_eq!(service.fetch_calls(), 2);
    assert_eq!(engine.peek_card().unwrap().title, "B");
}

/// Released below the commit threshold: the card returns and nothing changes
#[tokio::test]
async fn test_release_below_commit_threshold() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["A", "B"])));
    let (engine, _events) = engine(&service);
    engine.open_session().await.unwrap();

    let dx = 0.3 * engine.settings().gesture.screen_width;
    let frame = engine.on_gesture(dx, false).await.unwrap();
    assert!(matches!(frame, GestureOutcome::Dragging(f) if f.tentative.is_none()));

    let outcome = engine.on_gesture(dx, true).await.unwrap();

    assert_eq!(outcome, GestureOutcome::Cancelled);
    assert_eq!(engine.peek_card().unwrap().title, "A");
    assert_eq!(engine.snapshot().queue_len, 2);
    assert!(engine.snapshot().liked.is_empty());
    assert!(service.sync_log().is_empty());
}

/// A drag that reverses before release is decided by the final offset
#[tokio::test]
async fn test_reversed_drag_uses_final_offset() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["A", "B"])));
    let (engine, _events) = engine(&service);
    engine.open_session().await.unwrap();

    let width = engine.settings().gesture.screen_width;
    engine.on_gesture(0.8 * width, false).await.unwrap();
    let outcome = engine.on_gesture(-0.6 * width, true).await.unwrap();

    match applied(&outcome) {
        DecisionOutcome::Applied { direction, .. } => assert_eq!(*direction, SwipeDirection::Left),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(service.sync_log(), vec![SyncCall::Dislike("A".into())]);
}

/// Timed-out like stays local until the next fetch overwrites it
#[tokio::test]
async fn test_timed_out_like_is_overwritten_on_refresh() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["A", "B", "C"])));
    let (engine, mut events) = engine(&service);
    engine.open_session().await.unwrap();
    service.push_fault(Fault::Hang);

    let outcome = swipe(&engine, SwipeDirection::Right).await;

    match applied(&outcome) {
        DecisionOutcome::Applied { sync, .. } => assert!(matches!(sync, SyncStatus::Failed { .. })),
        other => panic!("unexpected {:?}", other),
    }
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.liked.len(), 1);
    assert_eq!(snapshot.liked[0].card.title, "A");
    assert_eq!(snapshot.liked[0].status, LikeStatus::Unconfirmed);
    assert_eq!(snapshot.liked_count, 0);
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, EngineEvent::SyncFailed { menu_title, .. } if menu_title == "A")));

    // another session liked something meanwhile
    service.seed_liked(menus(&["Z"]));
    let count = engine.refresh_count().await.unwrap();

    assert_eq!(count.count, 1);
    assert_eq!(liked_titles(&engine), vec!["Z"]);
    assert_eq!(engine.snapshot().liked[0].status, LikeStatus::Confirmed);
}

/// Network failures surface as a failed sync, not as an engine error
#[tokio::test]
async fn test_network_failure_keeps_session() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["A", "B", "C"])));
    let (engine, _events) = engine(&service);
    engine.open_session().await.unwrap();
    service.push_fault(Fault::Network);

    let outcome = swipe(&engine, SwipeDirection::Left).await;
    assert!(matches!(
        applied(&outcome),
        DecisionOutcome::Applied { sync: SyncStatus::Failed { .. }, .. }
    ));

    let outcome = swipe(&engine, SwipeDirection::Right).await;
    assert!(matches!(
        applied(&outcome),
        DecisionOutcome::Applied { sync: SyncStatus::Confirmed { count: 1 }, .. }
    ));
    assert!(!engine.is_expired());
}

/// LikedSet never exceeds the cap over a long mixed session
#[tokio::test]
async fn test_liked_set_never_exceeds_cap() {
    let titles = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L"];
    let service = Arc::new(InMemoryProfileService::new(menus(&titles)).with_page_size(3));
    let (engine, _events) = engine(&service);
    engine.open_session().await.unwrap();

    let script = [
        SwipeDirection::Right,
        SwipeDirection::Left,
        SwipeDirection::Right,
        SwipeDirection::Right,
        SwipeDirection::Left,
        SwipeDirection::Right,
        SwipeDirection::Right,
        SwipeDirection::Right,
        SwipeDirection::Right,
        SwipeDirection::Right,
    ];
    for direction in script {
        if engine.peek_card().is_none() {
            break;
        }
        let before = engine.snapshot();
        swipe(&engine, direction).await;
        let after = engine.snapshot();

        assert!(after.liked.len() <= 5);
        if direction == SwipeDirection::Right && before.liked_count == 5 {
            assert_eq!(after.liked.len(), before.liked.len());
        }
    }
    assert_eq!(engine.liked_count(), 5);
    assert_eq!(service.liked_titles().len(), 5);
}

/// Cards already decided never come back, even if the server resends them
#[tokio::test]
async fn test_decided_cards_never_requeued() {
    let service = Arc::new(
        InMemoryProfileService::new(menus(&["A", "B", "C", "D"]))
            .with_page_size(3)
            .serving_decided_menus(),
    );
    let (engine, mut events) = engine(&service);
    engine.open_session().await.unwrap();

    swipe(&engine, SwipeDirection::Right).await;
    swipe(&engine, SwipeDirection::Left).await;
    let outcome = swipe(&engine, SwipeDirection::Left).await;

    match applied(&outcome) {
        DecisionOutcome::Applied { refill, .. } => assert_eq!(*refill, Some(RefillOutcome::Exhausted)),
        other => panic!("unexpected {:?}", other),
    }
    assert!(engine.peek_card().is_none());
    assert!(engine.snapshot().exhausted);
    assert!(drain(&mut events).contains(&EngineEvent::NoMoreCandidates));
    assert_eq!(engine.snapshot().queue_len, 0);
}

/// An empty page is an explicit state; a later page clears it
#[tokio::test]
async fn test_empty_page_then_new_candidates() {
    let service = Arc::new(InMemoryProfileService::new(Vec::new()));
    let (engine, mut events) = engine(&service);

    assert_eq!(engine.open_session().await.unwrap(), RefillOutcome::Exhausted);
    assert!(engine.snapshot().exhausted);
    assert!(!engine.snapshot().loading);
    assert_eq!(drain(&mut events), vec![EngineEvent::NoMoreCandidates]);

    let service = Arc::new(InMemoryProfileService::new(menus(&["A"])));
    let (engine, _events) = SwipeEngine::new(service, "somchai", settings()).unwrap();
    assert_eq!(engine.maybe_refill().await.unwrap(), RefillOutcome::Refilled(1));
    assert_eq!(engine.maybe_refill().await.unwrap(), RefillOutcome::NotNeeded);
    assert!(!engine.snapshot().exhausted);
}

/// Refreshing does not re-fire navigation; dropping below the cap re-arms it
#[tokio::test]
async fn test_navigation_is_edge_triggered() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["F", "G"])));
    service.seed_liked(menus(&["A", "B", "C", "D", "E"]));
    let (engine, mut events) = engine(&service);

    engine.open_session().await.unwrap();
    engine.refresh_count().await.unwrap();
    engine.refresh_count().await.unwrap();
    assert_eq!(navigations(&drain(&mut events)).len(), 1);

    let count = engine.remove_liked("C").await.unwrap();
    assert_eq!(count.count, 4);
    assert!(navigations(&drain(&mut events)).is_empty());

    swipe(&engine, SwipeDirection::Right).await;
    let navigated = navigations(&drain(&mut events));
    assert_eq!(navigated.len(), 1);
    assert!(navigated[0].iter().any(|c| c.title == "F"));
    assert!(!navigated[0].iter().any(|c| c.title == "C"));
}

/// Decisions reach the server in commit order
#[tokio::test]
async fn test_sync_order_matches_commit_order() {
    let service = Arc::new(
        InMemoryProfileService::new(menus(&["A", "B", "C", "D"])).with_latency(Duration::from_millis(5)),
    );
    let (engine, _events) = engine(&service);
    engine.open_session().await.unwrap();

    swipe(&engine, SwipeDirection::Right).await;
    swipe(&engine, SwipeDirection::Left).await;
    swipe(&engine, SwipeDirection::Right).await;

    assert_eq!(
        service.sync_log(),
        vec![
            SyncCall::Like("A".into()),
            SyncCall::Dislike("B".into()),
            SyncCall::Like("C".into()),
        ]
    );
}

/// Stale or repeated decisions are ignored
#[tokio::test]
async fn test_duplicate_decision_ignored() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["A", "B"])));
    let (engine, _events) = engine(&service);
    engine.open_session().await.unwrap();

    let first = engine
        .on_gesture_result(SwipeDecision::new("id-A", SwipeDirection::Left))
        .await
        .unwrap();
    assert!(matches!(first, DecisionOutcome::Applied { .. }));

    let again = engine
        .on_gesture_result(SwipeDecision::new("id-A", SwipeDirection::Left))
        .await
        .unwrap();
    assert_eq!(again, DecisionOutcome::Ignored(IgnoreReason::AlreadyDecided));

    let not_top = engine
        .on_gesture_result(SwipeDecision::new("id-Z", SwipeDirection::Right))
        .await
        .unwrap();
    assert_eq!(not_top, DecisionOutcome::Ignored(IgnoreReason::NotTopCard));
    assert_eq!(service.sync_log().len(), 1);
}

/// Expiry halts every further sync and refill
#[tokio::test]
async fn test_session_expiry_latches() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["A", "B", "C"])));
    let (engine, mut events) = engine(&service);
    engine.open_session().await.unwrap();
    service.push_fault(Fault::SessionExpired);

    let dx = 0.6 * engine.settings().gesture.screen_width;
    let result = engine.on_gesture(dx, true).await;
    assert!(matches!(result, Err(SwipeError::SessionExpired)));
    assert!(engine.is_expired());

    let fetches = service.fetch_calls();
    let reads = service.current_liked_calls();

    assert!(matches!(engine.maybe_refill().await, Err(SwipeError::SessionExpired)));
    assert!(matches!(engine.refresh_count().await, Err(SwipeError::SessionExpired)));
    assert!(matches!(engine.on_gesture(dx, true).await, Err(SwipeError::SessionExpired)));
    assert_eq!(engine.on_gesture(dx, false).await.unwrap(), GestureOutcome::Ignored);

    assert_eq!(service.fetch_calls(), fetches);
    assert_eq!(service.current_liked_calls(), reads);
    let expired: Vec<_> = drain(&mut events)
        .into_iter()
        .filter(|e| *e == EngineEvent::SessionExpired)
        .collect();
    assert_eq!(expired.len(), 1);
}

/// Server lists above the cap are truncated locally
#[tokio::test]
async fn test_server_list_above_cap_is_truncated() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["X"])).with_cap(7));
    service.seed_liked(menus(&["A", "B", "C", "D", "E", "F", "G"]));
    let (engine, _events) = engine(&service);

    let count = engine.refresh_count().await.unwrap();

    assert_eq!(count.count, 5);
    assert_eq!(engine.snapshot().liked.len(), 5);
}

/// A failed like does not hold the cap hostage: the next like evicts it
#[tokio::test]
async fn test_timed_out_like_does_not_block_next_like() {
    let service = Arc::new(InMemoryProfileService::new(menus(&["F", "G", "H"])));
    service.seed_liked(menus(&["A", "B", "C", "D"]));
    let (engine, mut events) = engine(&service);
    engine.open_session().await.unwrap();
    service.push_fault(Fault::Hang);

    swipe(&engine, SwipeDirection::Right).await;
    assert_eq!(engine.liked_count(), 4);
    assert_eq!(engine.snapshot().liked.len(), 5);
    drain(&mut events);

    let outcome = swipe(&engine, SwipeDirection::Right).await;

    match applied(&outcome) {
        DecisionOutcome::Applied { card, sync, .. } => {
            assert_eq!(card.title, "G");
            assert_eq!(*sync, SyncStatus::Confirmed { count: 5 });
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(liked_titles(&engine), vec!["A", "B", "C", "D", "G"]);
    assert_eq!(service.liked_titles(), vec!["A", "B", "C", "D", "G"]);
    let events = drain(&mut events);
    assert!(!events.iter().any(|e| matches!(e, EngineEvent::LimitReached { .. })));
    assert_eq!(navigations(&events).len(), 1);
}

/// Reports a count one lower than the list it returns
struct MiscountingService {
    like_calls: AtomicUsize,
}

#[async_trait]
impl ProfileService for MiscountingService {
    async fn fetch_candidates(&self, _user: &str) -> eatsease_swipe::Result<Vec<CandidateCard>> {
        Ok(menus(&["F", "G"]))
    }

    async fn record_like(&self, _user: &str, _menu_title: &str) -> eatsease_swipe::Result<()> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.like_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn record_dislike(&self, _user: &str, _menu_title: &str) -> eatsease_swipe::Result<()> {
        Ok(())
    }

    async fn current_liked(&self, _user: &str) -> eatsease_swipe::Result<AuthoritativeCount> {
        Ok(AuthoritativeCount {
            count: 4,
            menu_list: menus(&["A", "B", "C", "D", "E"]),
        })
    }

    async fn remove_liked(&self, _user: &str, _menu_title: &str) -> eatsease_swipe::Result<()> {
        Ok(())
    }

    async fn logout(&self) -> eatsease_swipe::Result<()> {
        Ok(())
    }
}

/// A full local list blocks likes even when the server count says otherwise
#[tokio::test]
async fn test_full_liked_list_blocks_despite_low_count() {
    let service = Arc::new(MiscountingService {
        like_calls: AtomicUsize::new(0),
    });
    let (engine, mut events) = SwipeEngine::new(service.clone(), "somchai", settings()).unwrap();
    engine.open_session().await.unwrap();
    assert_eq!(engine.liked_count(), 4);
    assert_eq!(engine.snapshot().liked.len(), 5);

    let outcome = swipe(&engine, SwipeDirection::Right).await;

    assert!(matches!(applied(&outcome), DecisionOutcome::Blocked { card_id } if card_id == "id-F"));
    assert_eq!(engine.snapshot().liked.len(), 5);
    assert_eq!(service.like_calls.load(Ordering::SeqCst), 0);
    assert!(drain(&mut events).contains(&EngineEvent::LimitReached { cap: 5 }));
}

/// A decision committed while the previous sync is in flight is sent after it
#[tokio::test]
async fn test_overlapping_decisions_reach_server_in_order() {
    let service = Arc::new(
        InMemoryProfileService::new(menus(&["A", "B", "C"])).with_latency(Duration::from_millis(20)),
    );
    let (engine, _events) = engine(&service);
    engine.open_session().await.unwrap();

    let (first, second) = tokio::join!(
        engine.on_gesture_result(SwipeDecision::new("id-A", SwipeDirection::Right)),
        async {
            // A's sync is still sleeping in the service
            assert!(service.sync_log().is_empty());
            assert!(engine.snapshot().liked.iter().any(|e| e.status == LikeStatus::Pending));
            engine
                .on_gesture_result(SwipeDecision::new("id-B", SwipeDirection::Left))
                .await
        }
    );

    assert!(matches!(
        first.unwrap(),
        DecisionOutcome::Applied { sync: SyncStatus::Confirmed { count: 1 }, .. }
    ));
    assert!(matches!(
        second.unwrap(),
        DecisionOutcome::Applied { sync: SyncStatus::Confirmed { count: 1 }, .. }
    ));
    assert_eq!(
        service.sync_log(),
        vec![SyncCall::Like("A".into()), SyncCall::Dislike("B".into())]
    );
    assert_eq!(liked_titles(&engine), vec!["A"]);
    assert_eq!(engine.snapshot().liked[0].status, LikeStatus::Confirmed);
}

/// Two rapid likes at count 4: the second is blocked before the first confirms
#[tokio::test]
async fn test_rapid_likes_at_four_block_the_second() {
    let service = Arc::new(
        InMemoryProfileService::new(menus(&["F", "G", "H"])).with_latency(Duration::from_millis(20)),
    );
    service.seed_liked(menus(&["A", "B", "C", "D"]));
    let (engine, mut events) = engine(&service);
    engine.open_session().await.unwrap();
    drain(&mut events);

    let (first, second) = tokio::join!(
        engine.on_gesture_result(SwipeDecision::new("id-F", SwipeDirection::Right)),
        engine.on_gesture_result(SwipeDecision::new("id-G", SwipeDirection::Right)),
    );

    assert!(matches!(
        first.unwrap(),
        DecisionOutcome::Applied { sync: SyncStatus::Confirmed { count: 5 }, .. }
    ));
    assert_eq!(
        second.unwrap(),
        DecisionOutcome::Blocked {
            card_id: "id-G".into()
        }
    );
    assert_eq!(service.like_calls(), 1);
    assert_eq!(engine.peek_card().unwrap().title, "G");
    assert!(engine.snapshot().liked.len() <= 5);
    let events = drain(&mut events);
    assert!(events.contains(&EngineEvent::LimitReached { cap: 5 }));
    assert_eq!(navigations(&events).len(), 1);
}
