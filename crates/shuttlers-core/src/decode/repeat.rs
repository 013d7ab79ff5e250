// Shuttlers Shuttle Repeat Timer
// Deadline-based auto-repeat while the shuttle ring is held off center

use std::time::{Duration, Instant};

use crate::binding::Direction;

/// Most repeats `due` reports at once; a longer stall resynchronizes.
pub const MAX_CATCH_UP: u32 = 8;

#[derive(Debug, Clone, Copy)]
struct Armed {
    direction: Direction,
    period: Duration,
    next_fire: Instant,
}

/// Repeats shuttle actions while the ring is held at a nonzero position.
///
/// The period is the host key-repeat interval divided by the magnitude, so
/// position 7 repeats seven times as fast as position 1. The timer is polled
/// by the owner (`due`) rather than running on its own thread.
#[derive(Debug, Clone)]
pub struct ShuttleRepeat {
    interval: Duration,
    armed: Option<Armed>,
}

impl ShuttleRepeat {
    /// Create a disarmed timer with the given base interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            armed: None,
        }
    }

    /// Create with the base interval in milliseconds
    pub fn with_interval_ms(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Base repeat interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns true while the timer is armed
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Direction of the armed timer
    pub fn direction(&self) -> Option<Direction> {
        self.armed.map(|a| a.direction)
    }

    /// Repeat period of the armed timer
    pub fn period(&self) -> Option<Duration> {
        self.armed.map(|a| a.period)
    }

    /// (Re)arm for a new position; magnitude 0 cancels.
    ///
    /// The caller emits the first action itself; the first repeat is due one
    /// period after `now`.
    pub fn arm(&mut self, direction: Direction, magnitude: u8, now: Instant) {
        if magnitude == 0 {
            self.cancel();
            return;
        }
        let period = self.interval / magnitude as u32;
        self.armed = Some(Armed {
            direction,
            period,
            next_fire: now + period,
        });
    }

    /// Disarm the timer
    pub fn cancel(&mut self) {
        self.armed = None;
    }

    /// When the next repeat is due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.armed.map(|a| a.next_fire)
    }

    /// Number of repeats elapsed up to `now`; advances the deadline past them.
    ///
    /// At most `MAX_CATCH_UP` are reported. When the owner fell further
    /// behind than that, the next repeat is scheduled one period after `now`.
    pub fn due(&mut self, now: Instant) -> u32 {
        let Some(armed) = self.armed.as_mut() else {
            return 0;
        };
        if armed.period.is_zero() {
            armed.next_fire = now;
            return 1;
        }

        let mut fired = 0;
        while armed.next_fire <= now && fired < MAX_CATCH_UP {
            armed.next_fire += armed.period;
            fired += 1;
        }
        if armed.next_fire <= now {
            log::debug!("shuttle repeat fell behind, resynchronizing");
            armed.next_fire = now + armed.period;
        }
        fired
    }
}

impl Default for ShuttleRepeat {
    fn default() -> Self {
        Self::with_interval_ms(40)
    }
}
