//! Weekly rollover and boundary-reset scenarios. 2024-07-13 is a
//! Saturday; under the app's week arithmetic the boundary falls at
//! Saturday midnight, so that Saturday computes as week 29 and the
//! rollover there records week 28.

mod support;

use std::sync::Arc;

use weekfocus::{
    App, Clock, FocusTracker, MemoryKvStore, NullNotifier, ScoreBoard, Store, WeeklyScore,
};

use chrono::{TimeZone, Utc};
use support::{
    build, harness_at, manual_clock, test_timer_config, FailingTaskProgress, RecordingTaskProgress,
};

#[tokio::test]
async fn rollover_snapshots_the_previous_week() {
    let store = Store::new(Arc::new(MemoryKvStore::new()));
    store.save_pomodoro_count(12);
    store.save_focus_minutes(120);
    store.save_focus_minutes_week(2024, 28, 340);

    // A session opened on Friday carries its counters across the boundary.
    let h = build(
        store,
        manual_clock(2024, 7, 12, 9, 0),
        Arc::new(RecordingTaskProgress::with_completion(80)),
    );
    assert_eq!(h.focus.minutes_this_week(), 340);

    h.clock.advance_secs(86_400); // Saturday 09:00
    let created = h.scores.check_week_end().expect("a record is created");
    assert_eq!(created.id, "2024-28");
    assert_eq!(created.week_number, 28);
    assert_eq!(created.year, 2024);
    assert_eq!(created.completion_percentage, 80);
    assert_eq!(created.pomodoro_count, 12);
    assert_eq!(created.focus_minutes, 340);

    assert_eq!(h.store.pomodoro_count(), 0);
    assert_eq!(h.store.focus_minutes(), 0);
    assert_eq!(h.focus.minutes_since_rollover(), 0);
    assert_eq!(h.tasks.cleared(), 1);
    assert_eq!(h.store.last_checked_week().as_deref(), Some("2024-29"));
    assert_eq!(h.scores.weekly_scores(), vec![created]);
}

#[tokio::test]
async fn rollover_is_idempotent_within_a_week() {
    let h = harness_at(2024, 7, 13, 9, 0);

    assert!(h.scores.check_week_end().is_some());
    assert!(h.scores.check_week_end().is_none());
    h.clock.advance_secs(3600);
    assert!(h.scores.check_week_end().is_none());

    assert_eq!(h.scores.weekly_scores().len(), 1);
    assert_eq!(h.tasks.cleared(), 1);
    assert_eq!(h.store.last_checked_week().as_deref(), Some("2024-29"));
}

#[tokio::test]
async fn rollover_only_fires_on_saturday() {
    // 2024-07-12 is a Friday.
    let h = harness_at(2024, 7, 12, 9, 0);
    assert!(h.scores.check_week_end().is_none());
    assert_eq!(h.store.last_checked_week(), None);
    assert_eq!(h.tasks.cleared(), 0);
}

#[tokio::test]
async fn duplicate_record_guard_still_advances_the_cursor() {
    let store = Store::new(Arc::new(MemoryKvStore::new()));
    store.save_pomodoro_count(12);
    store.add_weekly_score(&WeeklyScore {
        id: "2024-28".into(),
        week_number: 28,
        year: 2024,
        completion_percentage: 55,
        pomodoro_count: 7,
        focus_minutes: 200,
        end_date: Utc.with_ymd_and_hms(2024, 7, 6, 8, 0, 0).unwrap(),
    });

    let h = build(
        store,
        manual_clock(2024, 7, 13, 9, 0),
        Arc::new(RecordingTaskProgress::default()),
    );

    assert!(h.scores.check_week_end().is_none());
    assert_eq!(h.scores.weekly_scores().len(), 1);
    // Snapshot-side resets were skipped along with the snapshot.
    assert_eq!(h.store.pomodoro_count(), 12);
    // The cross-component effects still ran.
    assert_eq!(h.tasks.cleared(), 1);
    assert_eq!(h.store.last_checked_week().as_deref(), Some("2024-29"));
}

#[tokio::test]
async fn missing_task_provider_records_zero_percent() {
    let store = Store::new(Arc::new(MemoryKvStore::new()));
    store.save_pomodoro_count(3);
    let clock: Arc<dyn Clock> = Arc::new(manual_clock(2024, 7, 13, 9, 0));
    let focus = FocusTracker::new(store.clone(), clock.clone());
    let scores = ScoreBoard::new(store.clone(), clock, Arc::new(FailingTaskProgress), focus);

    let created = scores.check_week_end().expect("record still created");
    assert_eq!(created.completion_percentage, 0);
    assert_eq!(created.pomodoro_count, 3);
    // The failing clear is tolerated and the cursor still advances.
    assert_eq!(store.last_checked_week().as_deref(), Some("2024-29"));
}

#[tokio::test]
async fn run_checks_snapshots_before_zeroing_the_week() {
    let store = Store::new(Arc::new(MemoryKvStore::new()));
    store.save_focus_minutes_week(2024, 28, 340);
    store.save_focus_minutes_today("2024-07-12", 40);
    store.set_last_focus_day("2024-07-12");
    store.set_last_focus_week("2024-28");

    let h = build(
        store,
        manual_clock(2024, 7, 12, 9, 0),
        Arc::new(RecordingTaskProgress::with_completion(80)),
    );

    h.clock.advance_secs(86_400); // Saturday 09:00
    h.scheduler.run_checks();

    // The rollover read the finished week before the reset zeroed it.
    let scores = h.scores.weekly_scores();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].focus_minutes, 340);

    assert_eq!(h.focus.minutes_this_week(), 0);
    assert_eq!(h.focus.minutes_today(), 0);
    assert_eq!(h.store.focus_minutes_week(2024, 29), 0);
    assert_eq!(h.store.last_focus_day().as_deref(), Some("2024-07-13"));
    assert_eq!(h.store.last_focus_week().as_deref(), Some("2024-29"));
    assert_eq!(h.tasks.cleared(), 1);

    // Re-running the checks changes nothing further.
    h.scheduler.run_checks();
    assert_eq!(h.scores.weekly_scores().len(), 1);
    assert_eq!(h.tasks.cleared(), 1);
}

#[tokio::test]
async fn daily_reset_fires_on_a_date_change() {
    // 2024-01-02 is a Tuesday: only the daily boundary applies.
    let store = Store::new(Arc::new(MemoryKvStore::new()));
    store.save_focus_minutes_today("2024-01-02", 37);
    store.save_focus_minutes_week(2024, 1, 90);
    store.set_last_focus_day("2024-01-01");
    store.set_last_focus_week("2024-1");

    let h = build(
        store,
        manual_clock(2024, 1, 2, 0, 5),
        Arc::new(RecordingTaskProgress::default()),
    );

    h.scheduler.run_checks();

    assert_eq!(h.focus.minutes_today(), 0);
    assert_eq!(h.store.last_focus_day().as_deref(), Some("2024-01-02"));
    // The weekly counter is untouched off-Saturday.
    assert_eq!(h.focus.minutes_this_week(), 90);
    assert_eq!(h.store.last_focus_week().as_deref(), Some("2024-1"));
}

#[tokio::test]
async fn daily_reset_is_a_no_op_within_the_same_day() {
    let store = Store::new(Arc::new(MemoryKvStore::new()));
    store.save_focus_minutes_today("2024-01-02", 37);
    store.set_last_focus_day("2024-01-02");

    let h = build(
        store,
        manual_clock(2024, 1, 2, 23, 0),
        Arc::new(RecordingTaskProgress::default()),
    );

    h.scheduler.run_checks();
    assert_eq!(h.focus.minutes_today(), 37);
}

#[tokio::test]
async fn weekly_reset_requires_saturday() {
    // 2024-07-10 is a Wednesday; a stale week marker must not trigger.
    let store = Store::new(Arc::new(MemoryKvStore::new()));
    store.save_focus_minutes_week(2024, 28, 150);
    store.set_last_focus_day("2024-07-10");
    store.set_last_focus_week("2024-27");

    let h = build(
        store,
        manual_clock(2024, 7, 10, 12, 0),
        Arc::new(RecordingTaskProgress::default()),
    );

    h.scheduler.run_checks();
    assert_eq!(h.focus.minutes_this_week(), 150);
    assert_eq!(h.store.last_focus_week().as_deref(), Some("2024-27"));
}

#[tokio::test]
async fn app_startup_runs_recovery_and_boundary_checks() {
    let kv = Arc::new(MemoryKvStore::new());
    let store = Store::new(kv.clone());
    store.save_pomodoro_count(5);

    let tasks = Arc::new(RecordingTaskProgress::with_completion(40));
    let app = App::with_clock(
        kv,
        tasks.clone(),
        Arc::new(NullNotifier),
        Arc::new(manual_clock(2024, 7, 13, 9, 0)),
        test_timer_config(),
    )
    .await;

    let scores = app.scores().weekly_scores();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].id, "2024-28");
    assert_eq!(scores[0].completion_percentage, 40);
    assert_eq!(scores[0].pomodoro_count, 5);
    assert_eq!(tasks.cleared(), 1);
    assert_eq!(app.store().pomodoro_count(), 0);

    // Safe to invoke on every page view.
    app.check_boundaries();
    assert_eq!(app.scores().weekly_scores().len(), 1);

    assert!(!app.timer().state().await.is_running);
    app.shutdown().await;
}

#[tokio::test]
async fn first_january_week_keeps_the_literal_subtraction() {
    // 2025-01-04 is the first Saturday of 2025 and computes as week 2,
    // so the record is labeled week 1 of 2025 even though most of that
    // week belonged to 2024.
    let h = harness_at(2025, 1, 4, 9, 0);
    let created = h.scores.check_week_end().expect("record created");
    assert_eq!(created.id, "2025-1");
    assert_eq!(created.week_number, 1);
    assert_eq!(created.year, 2025);
}

#[tokio::test]
async fn scheduler_poll_loop_starts_and_stops_cleanly() {
    // The first tick fires immediately and must not panic against an
    // in-memory store.
    let h = harness_at(2024, 7, 12, 9, 0);
    let handle = h.scheduler.spawn();
    h.scheduler.stop();
    let _ = handle.await;
}
