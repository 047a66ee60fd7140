use crate::common::TestContext;
use crate::common::builders::{drama, url_for};
use crate::common::mocks::FakeCatalog;
use dramapop::events::{NavigationOutcome, PlayerEvent, PlayerEventKind};
use dramapop::history::HistoryStore;
use dramapop::models::{DramaId, WatchHistoryItem};
use dramapop::player::{MediaEvent, PlaybackState, SkipVisibility};
use dramapop::utils::{CatalogError, Clock, PlaybackError};
use std::time::Duration;

async fn stored(ctx: &TestContext, drama_id: &str) -> Option<WatchHistoryItem> {
    ctx.session
        .with(|c| c.history().get(&DramaId::new(drama_id)).unwrap())
        .await
}

async fn play_to(ctx: &TestContext, duration: f64) {
    let generation = ctx.generation().await;
    ctx.session
        .handle_media_event(generation, MediaEvent::Ready { duration })
        .await;
}

#[tokio::test]
async fn test_open_drama_loads_and_records_history() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));

    let outcome = ctx.session.open_drama(DramaId::new("d1"), Some(3)).await;

    assert_eq!(
        outcome,
        NavigationOutcome::Opened {
            drama_id: DramaId::new("d1"),
            episode_index: 3,
            url: url_for("d1", 3),
        }
    );
    assert_eq!(ctx.media.loaded_urls(), vec![url_for("d1", 3)]);

    let item = stored(&ctx, "d1").await.unwrap();
    assert_eq!(item.episode_index, 3);
    assert_eq!(item.total_episodes, Some(10));
    assert_eq!(item.progress, 0);
    assert_eq!(item.title.as_deref(), Some("Drama d1"));
    assert_eq!(item.last_watched_at, ctx.clock.now());
}

#[tokio::test]
async fn test_stale_fetch_cannot_overwrite_newer_episode() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));
    let first_gate = ctx.catalog.gate("d1", 1);
    let second_gate = ctx.catalog.gate("d1", 2);

    let (first, second, _) = tokio::join!(
        ctx.session.open_episode(DramaId::new("d1"), 1),
        ctx.session.open_episode(DramaId::new("d1"), 2),
        async {
            second_gate.send(()).unwrap();
            tokio::task::yield_now().await;
            first_gate.send(()).unwrap();
        }
    );

    assert!(second.is_opened());
    assert_eq!(
        first,
        NavigationOutcome::Superseded {
            drama_id: DramaId::new("d1"),
            episode_index: 1
        }
    );
    assert_eq!(ctx.media.loaded_urls(), vec![url_for("d1", 2)]);
    assert_eq!(stored(&ctx, "d1").await.unwrap().episode_index, 2);
}

#[tokio::test]
async fn test_stale_fetch_resolving_first_is_still_dropped() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));
    let first_gate = ctx.catalog.gate("d1", 1);
    let second_gate = ctx.catalog.gate("d1", 2);

    let (first, second, _) = tokio::join!(
        ctx.session.open_episode(DramaId::new("d1"), 1),
        ctx.session.open_episode(DramaId::new("d1"), 2),
        async {
            first_gate.send(()).unwrap();
            tokio::task::yield_now().await;
            second_gate.send(()).unwrap();
        }
    );

    assert!(matches!(first, NavigationOutcome::Superseded { .. }));
    assert!(second.is_opened());
    assert_eq!(ctx.media.loaded_urls(), vec![url_for("d1", 2)]);
    let current = ctx
        .session
        .with(|c| c.player().session().map(|s| s.episode_index()))
        .await;
    assert_eq!(current, Some(2));
    assert_eq!(stored(&ctx, "d1").await.unwrap().episode_index, 2);
}

#[tokio::test]
async fn test_progress_is_not_written_while_next_episode_loads() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));
    ctx.session.open_episode(DramaId::new("d1"), 1).await;
    let old_generation = ctx.generation().await;
    play_to(&ctx, 100.0).await;

    let gate = ctx.catalog.gate("d1", 2);
    let (_, _) = tokio::join!(ctx.session.open_episode(DramaId::new("d1"), 2), async {
        ctx.clock.advance(Duration::from_secs(30));
        ctx.session
            .handle_media_event(old_generation, MediaEvent::TimeUpdate(80.0))
            .await;
        assert!(!ctx.session.tick().await);
        gate.send(()).unwrap();
    });

    let item = stored(&ctx, "d1").await.unwrap();
    assert_eq!((item.episode_index, item.progress), (2, 0));
}

#[tokio::test]
async fn test_auto_advance_opens_next_episode_exactly_once() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));
    ctx.session.open_drama(DramaId::new("d1"), Some(5)).await;
    play_to(&ctx, 60.0).await;
    let generation = ctx.generation().await;

    let outcome = ctx
        .session
        .handle_media_event(generation, MediaEvent::Ended)
        .await;
    let repeated = ctx
        .session
        .handle_media_event(generation, MediaEvent::Ended)
        .await;

    assert_eq!(
        outcome,
        NavigationOutcome::Opened {
            drama_id: DramaId::new("d1"),
            episode_index: 6,
            url: url_for("d1", 6),
        }
    );
    assert_eq!(repeated, NavigationOutcome::Ignored);
    assert_eq!(ctx.catalog.episode_fetches("d1", 6), 1);
}

#[tokio::test]
async fn test_last_episode_end_finishes() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));
    ctx.session.open_drama(DramaId::new("d1"), Some(10)).await;
    play_to(&ctx, 60.0).await;
    let generation = ctx.generation().await;
    let mut navigation = ctx
        .events
        .subscribe_to_kinds(vec![PlayerEventKind::Navigation]);

    let outcome = ctx
        .session
        .handle_media_event(generation, MediaEvent::Ended)
        .await;

    assert_eq!(outcome, NavigationOutcome::Ignored);
    assert_eq!(ctx.catalog.episode_fetches("d1", 11), 0);
    assert_eq!(
        navigation.drain(),
        vec![PlayerEvent::Navigation(NavigationOutcome::Finished {
            drama_id: DramaId::new("d1"),
            episode_index: 10
        })]
    );
    let state = ctx.session.with(|c| c.player().state()).await;
    assert_eq!(state, PlaybackState::Ended);
    assert_eq!(stored(&ctx, "d1").await.unwrap().progress, 100);
}

#[tokio::test]
async fn test_auto_play_disabled_finishes() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));
    ctx.session.with(|c| c.set_auto_play(false)).await;
    ctx.session.open_drama(DramaId::new("d1"), Some(5)).await;
    play_to(&ctx, 60.0).await;
    let generation = ctx.generation().await;

    ctx.session
        .handle_media_event(generation, MediaEvent::Ended)
        .await;

    assert_eq!(ctx.catalog.episode_fetches("d1", 6), 0);
}

#[tokio::test]
async fn test_periodic_progress_is_throttled() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));
    ctx.session.open_drama(DramaId::new("d1"), Some(1)).await;
    play_to(&ctx, 200.0).await;
    let generation = ctx.generation().await;

    for second in 1..=25u32 {
        ctx.clock.advance(Duration::from_secs(1));
        ctx.session
            .handle_media_event(generation, MediaEvent::TimeUpdate(f64::from(second)))
            .await;
    }

    // Saves land at 10s and 20s only
    assert_eq!(stored(&ctx, "d1").await.unwrap().progress, 10);
}

#[tokio::test]
async fn test_skip_outro_visibility_wins_on_short_episode() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));
    ctx.session.open_drama(DramaId::new("d1"), Some(1)).await;
    play_to(&ctx, 40.0).await;
    let generation = ctx.generation().await;

    ctx.session
        .handle_media_event(generation, MediaEvent::TimeUpdate(35.0))
        .await;

    let visibility = ctx.session.with(|c| c.player().skip_visibility()).await;
    assert_eq!(
        visibility,
        SkipVisibility {
            intro: false,
            outro: true
        }
    );
}

#[tokio::test]
async fn test_resume_opens_episode_from_history() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));
    ctx.session
        .with(|c| {
            c.history_mut()
                .upsert(WatchHistoryItem::new(
                    DramaId::new("d1"),
                    7,
                    Some(10),
                    64,
                    chrono::Utc::now(),
                ))
                .unwrap()
        })
        .await;

    let outcome = ctx.session.open_drama(DramaId::new("d1"), None).await;

    assert!(matches!(
        outcome,
        NavigationOutcome::Opened {
            episode_index: 7,
            ..
        }
    ));
    assert_eq!(stored(&ctx, "d1").await.unwrap().progress, 64);
}

#[tokio::test]
async fn test_new_drama_starts_at_first_episode() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d2", 4)));

    let outcome = ctx.session.open_drama(DramaId::new("d2"), None).await;

    assert!(matches!(
        outcome,
        NavigationOutcome::Opened {
            episode_index: 1,
            ..
        }
    ));
    assert_eq!(ctx.catalog.detail_fetches(), 1);
}

#[tokio::test]
async fn test_out_of_range_navigation_is_ignored() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 3)));
    ctx.session.open_drama(DramaId::new("d1"), Some(3)).await;
    let mut navigation = ctx
        .events
        .subscribe_to_kinds(vec![PlayerEventKind::Navigation]);

    assert_eq!(ctx.session.go_next().await, NavigationOutcome::Ignored);
    assert_eq!(
        ctx.session.go_to_episode(0).await,
        NavigationOutcome::Ignored
    );
    assert_eq!(ctx.catalog.episode_fetches("d1", 4), 0);
    assert!(navigation.drain().is_empty());

    let state = ctx.session.with(|c| c.player().state()).await;
    assert_eq!(state, PlaybackState::Loading);
}

#[tokio::test]
async fn test_previous_and_go_to_episode() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));
    ctx.session.open_drama(DramaId::new("d1"), Some(4)).await;

    assert!(matches!(
        ctx.session.go_previous().await,
        NavigationOutcome::Opened {
            episode_index: 3,
            ..
        }
    ));
    assert!(matches!(
        ctx.session.go_to_episode(9).await,
        NavigationOutcome::Opened {
            episode_index: 9,
            ..
        }
    ));
    assert_eq!(stored(&ctx, "d1").await.unwrap().episode_index, 9);
}

#[tokio::test]
async fn test_fetch_failure_is_surfaced() {
    let catalog = FakeCatalog::new().with_drama(drama("d1", 10));
    catalog.fail_episode("d1", 2, CatalogError::Network("timed out".into()));
    let ctx = TestContext::new(catalog);
    let mut navigation = ctx
        .events
        .subscribe_to_kinds(vec![PlayerEventKind::Navigation]);

    let outcome = ctx.session.open_drama(DramaId::new("d1"), Some(2)).await;

    assert!(matches!(
        outcome,
        NavigationOutcome::Failed {
            error: PlaybackError::FetchFailed(_),
            ..
        }
    ));
    assert_eq!(navigation.drain().len(), 1);
    assert_eq!(ctx.catalog.episode_fetches("d1", 2), 1);
    assert!(stored(&ctx, "d1").await.is_none());
}

#[tokio::test]
async fn test_load_failure_then_manual_fallback() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 10)));
    ctx.session.open_drama(DramaId::new("d1"), Some(1)).await;
    let generation = ctx.generation().await;

    let outcome = ctx
        .session
        .handle_media_event(generation, MediaEvent::Error("HTTP 403".into()))
        .await;
    assert_eq!(outcome, NavigationOutcome::Ignored);
    let state = ctx.session.with(|c| c.player().state()).await;
    assert_eq!(state, PlaybackState::Error("HTTP 403".into()));
    assert_eq!(ctx.media.loaded_urls().len(), 1);

    let retried = ctx.session.retry_with_fallback().await;

    assert!(matches!(
        retried,
        NavigationOutcome::Opened { ref url, .. } if url == "https://cdn-b.example/d1/1/540.m3u8"
    ));
    assert_eq!(ctx.catalog.episode_fetches("d1", 1), 1);
}

#[tokio::test]
async fn test_unknown_total_is_reconciled_later() {
    let ctx = TestContext::new(FakeCatalog::new().with_drama(drama("d1", 3)));

    let outcome = ctx.session.open_episode(DramaId::new("d1"), 2).await;
    assert!(outcome.is_opened());
    assert_eq!(ctx.catalog.detail_fetches(), 0);

    assert!(ctx.session.refresh_drama(&DramaId::new("d1")).await);
    let total = ctx
        .session
        .with(|c| c.total_episodes(&DramaId::new("d1")))
        .await;
    assert_eq!(total, Some(3));
    assert_eq!(ctx.session.go_to_episode(4).await, NavigationOutcome::Ignored);
}
