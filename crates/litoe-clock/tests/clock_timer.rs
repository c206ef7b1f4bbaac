//! Integration tests for the cancellable clock timer.
//!
//! Runs with paused tokio time: `sleep_until` resolves as soon as the
//! runtime auto-advances, so these tests are instant and deterministic.

use std::time::Duration;

use litoe_clock::{ClockConfig, ClockTimer, TurnClock};
use litoe_game::{GameState, Outcome};
use litoe_protocol::Handle;
use tokio::time::{self, Instant};

// =========================================================================
// Helpers
// =========================================================================

fn timer_1s() -> ClockTimer {
    ClockTimer::new(ClockConfig::default())
}

fn two_seated(clock_secs: u32) -> GameState {
    let mut s = GameState::new(clock_secs);
    s.players = vec![Handle::from("ann"), Handle::from("bob")];
    s
}

// =========================================================================
// ClockConfig
// =========================================================================

#[test]
fn test_default_period_is_one_second() {
    assert_eq!(ClockConfig::default().period, Duration::from_secs(1));
}

#[test]
fn test_period_is_clamped_to_minimum() {
    let cfg = ClockConfig::with_period(Duration::from_millis(1)).validated();
    assert_eq!(cfg.period, ClockConfig::MIN_PERIOD);
    let t = ClockTimer::new(ClockConfig::with_period(Duration::ZERO));
    assert_eq!(t.period(), ClockConfig::MIN_PERIOD);
}

// =========================================================================
// Arming
// =========================================================================

#[test]
fn test_timer_starts_disarmed() {
    let t = timer_1s();
    assert!(!t.is_armed());
    assert_eq!(t.armed_for(), None);
    assert_eq!(t.tick_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_disarmed_timer_never_fires() {
    let mut t = timer_1s();
    let fired = time::timeout(Duration::from_secs(3600), t.wait_for_tick()).await;
    assert!(fired.is_err());
    assert_eq!(t.tick_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_armed_timer_fires_after_one_period() {
    let mut t = timer_1s();
    let start = Instant::now();
    t.arm(7);
    let tick = t.wait_for_tick().await;
    assert_eq!(tick.tick, 1);
    assert_eq!(tick.armed_for, 7);
    assert!(!tick.overrun);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_timer_is_periodic_while_armed() {
    let mut t = timer_1s();
    let start = Instant::now();
    t.arm(3);
    for n in 1..=3 {
        let tick = t.wait_for_tick().await;
        assert_eq!(tick.tick, n);
        assert_eq!(tick.armed_for, 3);
    }
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_rearm_restarts_the_period() {
    let mut t = timer_1s();
    let start = Instant::now();
    t.arm(1);
    time::advance(Duration::from_millis(700)).await;
    t.arm(2);
    let tick = t.wait_for_tick().await;
    assert_eq!(tick.armed_for, 2);
    assert_eq!(start.elapsed(), Duration::from_millis(1700));
}

#[tokio::test(start_paused = true)]
async fn test_retarget_keeps_the_deadline() {
    let mut t = timer_1s();
    let start = Instant::now();
    t.arm(1);
    time::advance(Duration::from_millis(700)).await;
    t.retarget(2);
    assert_eq!(t.armed_for(), Some(2));
    let tick = t.wait_for_tick().await;
    assert_eq!(tick.armed_for, 2);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[test]
fn test_retarget_does_not_arm() {
    let mut t = timer_1s();
    t.retarget(5);
    assert!(!t.is_armed());
}

#[tokio::test(start_paused = true)]
async fn test_disarm_cancels_pending_tick() {
    let mut t = timer_1s();
    t.arm(1);
    t.disarm();
    assert!(!t.is_armed());
    let fired = time::timeout(Duration::from_secs(10), t.wait_for_tick()).await;
    assert!(fired.is_err());
    // Idempotent.
    t.disarm();
    assert!(!t.is_armed());
}

// =========================================================================
// Driving the turn clock
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_timer_runs_clock_down_to_timeout() {
    let mut t = timer_1s();
    let mut state = two_seated(3);
    let me = Handle::from("ann");

    t.arm(state.version);
    while TurnClock::holds_authority(&state, &me) {
        let tick = t.wait_for_tick().await;
        assert_eq!(tick.armed_for, state.version);
        state = TurnClock::tick(&state).unwrap();
        // A new snapshot re-arms against its own version.
        t.disarm();
        if TurnClock::holds_authority(&state, &me) {
            t.arm(state.version);
        }
    }

    assert_eq!(state.clocks, [0, 3]);
    assert_eq!(state.outcome, Some(Outcome::Winner(Handle::from("bob"))));
    assert!(!t.is_armed());
    assert_eq!(t.tick_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_select_loop_prefers_fresh_snapshot() {
    let mut t = timer_1s();
    let (tx, mut rx) = tokio::sync::mpsc::channel::<u64>(4);
    t.arm(10);

    tokio::spawn(async move {
        time::sleep(Duration::from_millis(500)).await;
        let _ = tx.send(11).await;
    });

    let mut seen = Vec::new();
    for _ in 0..2 {
        tokio::select! {
            Some(version) = rx.recv() => {
                t.disarm();
                t.arm(version);
                seen.push(("snapshot", version));
            }
            tick = t.wait_for_tick() => {
                seen.push(("tick", tick.armed_for));
            }
        }
    }

    // The tick for version 10 never fires; the first tick is for 11.
    assert_eq!(seen, vec![("snapshot", 11), ("tick", 11)]);
}
