use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time source threaded through every wait, settle delay and
/// detection window.
///
/// All blocking in the dispense cycle goes through `sleep`, so swapping
/// in a virtual implementation lets a full cycle (motion settles,
/// vibration windows, the whole pickup wait) run in microseconds under
/// test.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Whole milliseconds since `epoch`; 0 if `epoch` lies in the future.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        dur.as_millis() as u64
    }
}

/// Production clock: `Instant::now` plus a real `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

/// Time-of-day source for the scheduler: a battery-backed RTC on the device,
/// the OS clock in simulation, or a scripted fake in tests.
///
/// No timezone or drift responsibility; the scheduler compares raw
/// hour/minute values against its table.
pub trait WallClock {
    /// Current local (hour, minute, second), hour in 0..24.
    fn now_hms(&self) -> (u8, u8, u8);
}

pub mod test_clock {
    use super::*;

    /// Virtual clock for tests: `now` reports a fixed origin plus an
    /// offset, and `sleep` advances the offset instead of blocking.
    /// Clones share the offset, so a rig and its assertions see the same
    /// timeline.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset: std::sync::Arc<std::sync::Mutex<Duration>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: std::sync::Arc::new(std::sync::Mutex::new(Duration::ZERO)),
            }
        }

        /// Move the virtual time forward by `d`.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Jump to an absolute offset from the origin.
        pub fn set_offset(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = d;
            }
        }

        /// Total virtual time elapsed since the origin.
        pub fn elapsed(&self) -> Duration {
            self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            let off = self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO);
            self.origin + off
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }
}
