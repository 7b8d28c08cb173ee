//! Bridges from the TOML-facing schema in `dispenser_config` to the
//! runtime structs the machine consumes.

use crate::config::{DetectionCfg, FeedbackCfg, LoopCfg, MotionCfg};
use crate::schedule::ScheduleEntry;
use crate::slot::Slot;

impl From<&dispenser_config::Motion> for MotionCfg {
    fn from(m: &dispenser_config::Motion) -> Self {
        Self {
            settle_ms: m.settle_ms,
        }
    }
}

impl From<&dispenser_config::Detection> for DetectionCfg {
    fn from(d: &dispenser_config::Detection) -> Self {
        Self {
            max_retries: d.max_retries,
            vibration_timeout_ms: d.vibration_timeout_ms,
            vibration_confirm_count: d.vibration_confirm_count,
            vibration_poll_ms: d.vibration_poll_ms,
            pickup_timeout_ms: d.pickup_timeout_ms,
            outlet_poll_ms: d.outlet_poll_ms,
        }
    }
}

impl From<&dispenser_config::Feedback> for FeedbackCfg {
    fn from(f: &dispenser_config::Feedback) -> Self {
        Self {
            message_hold_ms: f.message_hold_ms,
            display_width: f.display_width,
        }
    }
}

impl From<&dispenser_config::ControlLoop> for LoopCfg {
    fn from(c: &dispenser_config::ControlLoop) -> Self {
        Self {
            poll_ms: c.poll_ms,
            idle_hold_ms: c.idle_hold_ms,
        }
    }
}

impl From<&dispenser_config::ScheduleEntryCfg> for ScheduleEntry {
    fn from(e: &dispenser_config::ScheduleEntryCfg) -> Self {
        ScheduleEntry::new(e.hour, e.minute, e.slot, e.enabled)
    }
}

impl From<&dispenser_config::ScheduleRow> for ScheduleEntry {
    fn from(r: &dispenser_config::ScheduleRow) -> Self {
        ScheduleEntry::new(r.hour, r.minute, r.slot, r.enabled)
    }
}

/// Slot table from the config, with per-slot setpoints falling back to
/// the `[motion]` defaults.
pub fn slots_from_config(
    slots: &[dispenser_config::SlotCfg],
    motion: &dispenser_config::Motion,
) -> Vec<Slot> {
    slots
        .iter()
        .enumerate()
        .map(|(index, s)| Slot {
            index,
            home_deg: s.home_deg.unwrap_or(motion.home_deg),
            dispense_deg: s.dispense_deg.unwrap_or(motion.dispense_deg),
            return_deg: s.return_deg.unwrap_or(motion.return_deg),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_setpoints_fall_back_to_motion_defaults() {
        let motion = dispenser_config::Motion::default();
        let slots = vec![
            dispenser_config::SlotCfg {
                servo_pin: 13,
                home_deg: None,
                dispense_deg: Some(10.0),
                return_deg: None,
            },
            dispenser_config::SlotCfg {
                servo_pin: 12,
                home_deg: Some(90.0),
                dispense_deg: None,
                return_deg: None,
            },
        ];
        let out = slots_from_config(&slots, &motion);
        assert_eq!(out[0].index, 0);
        assert_eq!(out[0].home_deg, 180.0);
        assert_eq!(out[0].dispense_deg, 10.0);
        assert_eq!(out[1].index, 1);
        assert_eq!(out[1].home_deg, 90.0);
        assert_eq!(out[1].dispense_deg, 0.0);
    }
}
