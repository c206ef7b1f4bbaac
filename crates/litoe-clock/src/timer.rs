//! Cancellable fixed-period timer that drives the turn clock.
//!
//! The timer is armed against one snapshot version at a time. Arming again
//! (a newer snapshot arrived) or disarming (turn authority lost, game over,
//! room left) throws the pending deadline away, so a tick computed from an
//! outdated document can never fire.
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(event) = subscription.next() => {
//!             timer.disarm();
//!             if TurnClock::holds_authority(&state, &me) {
//!                 timer.arm(state.version);
//!             }
//!         }
//!         tick = timer.wait_for_tick() => { /* tick the armed snapshot */ }
//!     }
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Time between ticks. One tick takes one unit off a player's clock.
    pub period: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
        }
    }
}

impl ClockConfig {
    /// Shortest accepted period.
    pub const MIN_PERIOD: Duration = Duration::from_millis(10);

    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }

    /// Clamps the period to at least [`Self::MIN_PERIOD`].
    ///
    /// Called automatically by [`ClockTimer::new`].
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD {
            warn!(
                period_ms = self.period.as_secs_f64() * 1000.0,
                min_ms = Self::MIN_PERIOD.as_secs_f64() * 1000.0,
                "clock period below minimum, clamping"
            );
            self.period = Self::MIN_PERIOD;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tick info
// ---------------------------------------------------------------------------

/// A fired tick, returned by [`ClockTimer::wait_for_tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTick {
    /// Monotonically increasing tick number over the timer's lifetime.
    pub tick: u64,
    /// Snapshot version the timer was armed against.
    pub armed_for: u64,
    /// `true` if the timer woke up more than 10% of a period late.
    pub overrun: bool,
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Fixed-period timer owned by one client for one room.
///
/// Starts disarmed. While disarmed, [`wait_for_tick`](Self::wait_for_tick)
/// pends forever, which keeps it safe as a `tokio::select!` branch.
#[derive(Debug)]
pub struct ClockTimer {
    config: ClockConfig,
    next_tick: Option<Instant>,
    armed_for: Option<u64>,
    tick_count: u64,
}

impl ClockTimer {
    pub fn new(config: ClockConfig) -> Self {
        let config = config.validated();
        debug!(
            period_ms = config.period.as_secs_f64() * 1000.0,
            "clock timer created"
        );
        Self {
            config,
            next_tick: None,
            armed_for: None,
            tick_count: 0,
        }
    }

    /// Arms the timer against snapshot `version`. The first tick fires one
    /// full period from now; any previously pending deadline is dropped.
    pub fn arm(&mut self, version: u64) {
        if let Some(previous) = self.armed_for {
            if previous != version {
                trace!(previous, version, "re-arming clock timer");
            }
        }
        self.armed_for = Some(version);
        self.next_tick = Some(Instant::now() + self.config.period);
    }

    /// Moves an armed timer to snapshot `version`, keeping its deadline.
    /// Does nothing while disarmed.
    pub fn retarget(&mut self, version: u64) {
        if let Some(armed) = self.armed_for.as_mut() {
            trace!(previous = *armed, version, "clock timer retargeted");
            *armed = version;
        }
    }

    /// Cancels the pending tick. Idempotent.
    pub fn disarm(&mut self) {
        if self.armed_for.take().is_some() {
            trace!(tick = self.tick_count, "clock timer disarmed");
        }
        self.next_tick = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed_for.is_some()
    }

    /// The snapshot version the timer is armed against.
    pub fn armed_for(&self) -> Option<u64> {
        self.armed_for
    }

    /// Total ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn period(&self) -> Duration {
        self.config.period
    }

    /// Waits until the next tick is due.
    ///
    /// The timer stays armed against the same version afterwards and fires
    /// again one period later, so a lost publish is simply retried on the
    /// next tick until a new snapshot re-arms or disarms the timer.
    pub async fn wait_for_tick(&mut self) -> ClockTick {
        let (next, armed_for) = match (self.next_tick, self.armed_for) {
            (Some(next), Some(version)) => (next, version),
            _ => {
                // Never completes; select! handles other branches.
                std::future::pending::<()>().await;
                unreachable!()
            }
        };

        time::sleep_until(next).await;

        let now = Instant::now();
        let period = self.config.period;
        let late_by = now.saturating_duration_since(next);
        let overrun = late_by > period / 10;
        if overrun {
            warn!(
                tick = self.tick_count + 1,
                late_ms = late_by.as_secs_f64() * 1000.0,
                "clock tick fired late"
            );
        }

        self.tick_count += 1;
        // Always schedule from now, never from the missed deadline.
        self.next_tick = Some(now + period);

        trace!(tick = self.tick_count, armed_for, overrun, "clock tick fired");

        ClockTick {
            tick: self.tick_count,
            armed_for,
            overrun,
        }
    }
}

impl Default for ClockTimer {
    fn default() -> Self {
        Self::new(ClockConfig::default())
    }
}
