//! Runtime configuration structs consumed by the machine and the loop.
//!
//! These mirror the TOML-facing schema in `dispenser_config` but carry no
//! serde baggage; `conversions` bridges the two.

/// Timing of the open/return/home motion profile. Per-slot setpoints live
/// on [`crate::slot::Slot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionCfg {
    /// Settle delay after each commanded move (ms).
    pub settle_ms: u64,
}

impl Default for MotionCfg {
    fn default() -> Self {
        Self { settle_ms: 1000 }
    }
}

/// Drop and pickup detection windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionCfg {
    /// Motion cycles attempted before declaring a dispense failure.
    pub max_retries: u32,
    /// Window for the vibration sensor to confirm a drop (ms).
    pub vibration_timeout_ms: u64,
    /// Consecutive active reads required to accept a drop.
    pub vibration_confirm_count: u32,
    /// Vibration poll interval (ms).
    pub vibration_poll_ms: u64,
    /// Total window for the patient to retrieve the pill (ms).
    pub pickup_timeout_ms: u64,
    /// Outlet beam poll interval (ms).
    pub outlet_poll_ms: u64,
}

impl Default for DetectionCfg {
    fn default() -> Self {
        Self {
            max_retries: 6,
            vibration_timeout_ms: 2000,
            vibration_confirm_count: 3,
            vibration_poll_ms: 30,
            pickup_timeout_ms: 60_000,
            outlet_poll_ms: 120,
        }
    }
}

/// Local feedback behavior: display geometry and message dwell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackCfg {
    /// Minimum dwell after each status screen (ms).
    pub message_hold_ms: u64,
    /// Characters per display row.
    pub display_width: usize,
}

impl Default for FeedbackCfg {
    fn default() -> Self {
        Self {
            message_hold_ms: 2000,
            display_width: 16,
        }
    }
}

/// Control loop cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopCfg {
    /// Tick interval (ms). Must stay well under a minute so no schedule
    /// minute is skipped.
    pub poll_ms: u64,
    /// Idle-screen dwell (ms).
    pub idle_hold_ms: u64,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self {
            poll_ms: 500,
            idle_hold_ms: 1000,
        }
    }
}
