//! Timing and lifecycle tests for the click scheduler.
//!
//! Runs on tokio's paused clock, so intervals are exact and the tests take
//! no wall-clock time.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{self, Instant};

use clickloop::pointer::{Pointer, PointerError};
use clickloop::{ClickAction, ClickMode, ClickScheduler, Coordinates};

/// Records every click with its offset from the start of the test.
struct TimelinePointer {
    start: Instant,
    clicks: Mutex<Vec<(Coordinates, Duration)>>,
}

impl TimelinePointer {
    fn new() -> Arc<Self> {
        Arc::new(TimelinePointer {
            start: Instant::now(),
            clicks: Mutex::new(Vec::new()),
        })
    }

    fn clicks(&self) -> Vec<(Coordinates, Duration)> {
        self.clicks.lock().unwrap().clone()
    }

    fn count_at(&self, at: Coordinates) -> usize {
        self.clicks().iter().filter(|(c, _)| *c == at).count()
    }
}

impl Pointer for TimelinePointer {
    fn click_at(&self, at: Coordinates) -> Result<(), PointerError> {
        self.clicks.lock().unwrap().push((at, self.start.elapsed()));
        Ok(())
    }
}

fn counting_callback(scheduler: &ClickScheduler) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let cb_count = count.clone();
    scheduler.set_stop_callback(Arc::new(move || {
        cb_count.fetch_add(1, Ordering::SeqCst);
    }));
    count
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn close_to(actual: Duration, expected_ms: u64) -> bool {
    let expected = ms(expected_ms);
    let diff = if actual > expected {
        actual - expected
    } else {
        expected - actual
    };
    diff <= ms(2)
}

// ==================== Parallel mode ====================

#[tokio::test(start_paused = true)]
async fn test_parallel_actions_click_on_their_own_intervals() {
    let pointer = TimelinePointer::new();
    let scheduler = ClickScheduler::new(pointer.clone(), Handle::current());
    let a = Coordinates::new(10, 10);
    let b = Coordinates::new(20, 20);
    scheduler.set_actions(vec![
        ClickAction::new(1, a.x, a.y, 100),
        ClickAction::new(2, b.x, b.y, 250),
    ]);

    assert!(scheduler.start());
    time::sleep(ms(1050)).await;
    scheduler.stop();

    // T/d1 = 10.5 and T/d2 = 4.2, within one tick.
    let count_a = pointer.count_at(a);
    let count_b = pointer.count_at(b);
    assert!((9..=11).contains(&count_a), "a clicked {} times", count_a);
    assert!((3..=5).contains(&count_b), "b clicked {} times", count_b);

    let b_times: Vec<Duration> = pointer
        .clicks()
        .into_iter()
        .filter(|(c, _)| *c == b)
        .map(|(_, t)| t)
        .collect();
    assert!(close_to(b_times[0], 250));
    assert!(close_to(b_times[1], 500));
}

#[tokio::test(start_paused = true)]
async fn test_first_click_waits_one_interval() {
    let pointer = TimelinePointer::new();
    let scheduler = ClickScheduler::new(pointer.clone(), Handle::current());
    scheduler.set_actions(vec![ClickAction::new(1, 0, 0, 300)]);

    scheduler.start();
    time::sleep(ms(299)).await;
    assert!(pointer.clicks().is_empty());
    time::sleep(ms(2)).await;
    assert_eq!(pointer.clicks().len(), 1);
    scheduler.stop();
}

#[tokio::test(start_paused = true)]
async fn test_non_positive_delay_uses_minimum() {
    let pointer = TimelinePointer::new();
    let scheduler = ClickScheduler::new(pointer.clone(), Handle::current());
    scheduler.set_min_delay(ms(100));
    let zero = Coordinates::new(1, 1);
    let negative = Coordinates::new(2, 2);
    scheduler.set_actions(vec![
        ClickAction::new(1, zero.x, zero.y, 0),
        ClickAction::new(2, negative.x, negative.y, -40),
    ]);

    scheduler.start();
    time::sleep(ms(1050)).await;
    scheduler.stop();

    assert_eq!(pointer.count_at(zero), 10);
    assert_eq!(pointer.count_at(negative), 10);
}

// ==================== Sequential mode ====================

#[tokio::test(start_paused = true)]
async fn test_sequential_clicks_in_order_with_each_delay() {
    let pointer = TimelinePointer::new();
    let scheduler = ClickScheduler::new(pointer.clone(), Handle::current());
    scheduler.set_mode(ClickMode::Sequential);
    let a = Coordinates::new(1, 1);
    let b = Coordinates::new(2, 2);
    scheduler.set_actions(vec![
        ClickAction::new(1, a.x, a.y, 100),
        ClickAction::new(2, b.x, b.y, 200),
    ]);

    scheduler.start();
    time::sleep(ms(1250)).await;
    scheduler.stop();

    let clicks = pointer.clicks();
    let expected = [
        (a, 100),
        (b, 300),
        (a, 400),
        (b, 600),
        (a, 700),
        (b, 900),
        (a, 1000),
        (b, 1200),
    ];
    assert_eq!(clicks.len(), expected.len(), "clicks: {:?}", clicks);
    for ((coords, at), (want_coords, want_ms)) in clicks.iter().zip(expected.iter()) {
        assert_eq!(coords, want_coords);
        assert!(close_to(*at, *want_ms), "click at {:?}, wanted {}ms", at, want_ms);
    }
}

#[tokio::test(start_paused = true)]
async fn test_mode_change_applies_to_next_cycle_only() {
    let pointer = TimelinePointer::new();
    let scheduler = ClickScheduler::new(pointer.clone(), Handle::current());
    scheduler.set_actions(vec![
        ClickAction::new(1, 1, 1, 100),
        ClickAction::new(2, 2, 2, 100),
    ]);

    scheduler.start();
    scheduler.set_mode(ClickMode::Sequential);
    assert_eq!(scheduler.active_workers(), 2);
    scheduler.stop();
    time::sleep(ms(1)).await;

    scheduler.start();
    assert_eq!(scheduler.active_workers(), 1);
    scheduler.stop();
}

// ==================== Lifecycle ====================

#[tokio::test(start_paused = true)]
async fn test_start_stop_fires_callback_exactly_once() {
    let pointer = TimelinePointer::new();
    let scheduler = ClickScheduler::new(pointer.clone(), Handle::current());
    let stops = counting_callback(&scheduler);
    scheduler.set_actions(vec![ClickAction::new(1, 0, 0, 100)]);

    assert!(!scheduler.is_running());
    scheduler.start();
    assert!(scheduler.is_running());

    time::sleep(ms(250)).await;
    assert!(scheduler.stop());
    assert!(!scheduler.is_running());
    assert!(!scheduler.stop());

    time::sleep(ms(10)).await;
    assert_eq!(stops.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.active_workers(), 0);

    let clicks_after_stop = pointer.clicks().len();
    time::sleep(ms(500)).await;
    assert_eq!(pointer.clicks().len(), clicks_after_stop);
    assert_eq!(stops.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_callback_runs_after_workers_exit() {
    let pointer = TimelinePointer::new();
    let scheduler = Arc::new(ClickScheduler::new(pointer, Handle::current()));
    let seen_workers = Arc::new(Mutex::new(None));

    let weak = Arc::downgrade(&scheduler);
    let seen = seen_workers.clone();
    scheduler.set_stop_callback(Arc::new(move || {
        if let Some(scheduler) = weak.upgrade() {
            *seen.lock().unwrap() = Some(scheduler.active_workers());
        }
    }));
    scheduler.set_actions(vec![
        ClickAction::new(1, 0, 0, 100),
        ClickAction::new(2, 0, 0, 100),
        ClickAction::new(3, 0, 0, 100),
    ]);

    scheduler.start();
    time::sleep(ms(150)).await;
    scheduler.stop();
    time::sleep(ms(10)).await;

    assert_eq!(*seen_workers.lock().unwrap(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn test_callback_may_restart_scheduler() {
    let pointer = TimelinePointer::new();
    let scheduler = Arc::new(ClickScheduler::new(pointer, Handle::current()));
    scheduler.set_actions(vec![ClickAction::new(1, 0, 0, 100)]);

    let restarted = Arc::new(AtomicUsize::new(0));
    let weak = Arc::downgrade(&scheduler);
    let restarted_cb = restarted.clone();
    scheduler.set_stop_callback(Arc::new(move || {
        if restarted_cb.fetch_add(1, Ordering::SeqCst) == 0 {
            if let Some(scheduler) = weak.upgrade() {
                scheduler.start();
            }
        }
    }));

    scheduler.start();
    time::sleep(ms(150)).await;
    scheduler.stop();
    time::sleep(ms(10)).await;

    assert!(scheduler.is_running());
    scheduler.stop();
    time::sleep(ms(10)).await;
    assert_eq!(restarted.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_immediate_restart_is_not_cancelled_by_previous_cycle() {
    let pointer = TimelinePointer::new();
    let scheduler = ClickScheduler::new(pointer.clone(), Handle::current());
    let stops = counting_callback(&scheduler);
    scheduler.set_actions(vec![ClickAction::new(1, 0, 0, 100)]);

    scheduler.start();
    scheduler.stop();
    assert!(scheduler.start());

    time::sleep(ms(350)).await;
    assert!(scheduler.is_running());
    assert_eq!(pointer.clicks().len(), 3);
    assert_eq!(stops.load(Ordering::SeqCst), 1);

    scheduler.stop();
    time::sleep(ms(10)).await;
    assert_eq!(stops.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_callback_last_writer_wins() {
    let pointer = TimelinePointer::new();
    let scheduler = ClickScheduler::new(pointer, Handle::current());
    let first = counting_callback(&scheduler);
    let second = counting_callback(&scheduler);
    scheduler.set_actions(vec![ClickAction::new(1, 0, 0, 100)]);

    scheduler.start();
    scheduler.stop();
    time::sleep(ms(10)).await;

    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failing_pointer_does_not_end_cycle() {
    struct BrokenPointer(AtomicUsize);

    impl Pointer for BrokenPointer {
        fn click_at(&self, at: Coordinates) -> Result<(), PointerError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(PointerError::Click {
                at,
                message: "no display".to_string(),
            })
        }
    }

    let pointer = Arc::new(BrokenPointer(AtomicUsize::new(0)));
    let scheduler = ClickScheduler::new(pointer.clone(), Handle::current());
    scheduler.set_actions(vec![ClickAction::new(1, 0, 0, 100)]);

    scheduler.start();
    time::sleep(ms(350)).await;
    assert!(scheduler.is_running());
    assert_eq!(pointer.0.load(Ordering::SeqCst), 3);
    scheduler.stop();
}
