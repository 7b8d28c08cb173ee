//! Simulated hardware.
//!
//! Deterministic stand-ins: the vibration sensor confirms every drop and
//! the outlet plays a present/present/removed pattern, so a simulated
//! dispense always ends in "taken" unless the caller opts into a quiet
//! vibration sensor.

use dispenser_traits::{Actuator, Annunciator, DigitalInput, RemoteChannel, TextDisplay};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Servo that tracks its commanded position and logs every move.
#[derive(Debug)]
pub struct SimServo {
    slot: usize,
    position_deg: f32,
}

impl SimServo {
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            position_deg: 180.0,
        }
    }

    pub fn position_deg(&self) -> f32 {
        self.position_deg
    }
}

impl Actuator for SimServo {
    fn move_to(&mut self, degrees: f32) -> Result<(), BoxError> {
        tracing::debug!(slot = self.slot, degrees, "sim servo move");
        self.position_deg = degrees;
        Ok(())
    }
}

/// Vibration switch. Active on every read unless constructed quiet,
/// which exercises the retry and failure paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimVibration {
    quiet: bool,
}

impl SimVibration {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl DigitalInput for SimVibration {
    fn is_active(&mut self) -> Result<bool, BoxError> {
        Ok(!self.quiet)
    }
}

/// Outlet break-beam playing present, present, removed in a loop, so
/// every pickup wait sees a complete cycle.
#[derive(Debug, Default)]
pub struct SimOutlet {
    polls: u32,
}

impl SimOutlet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DigitalInput for SimOutlet {
    fn is_active(&mut self) -> Result<bool, BoxError> {
        self.polls += 1;
        Ok(!self.polls.is_multiple_of(3))
    }
}

/// Two-row display rendered into the log stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDisplay;

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl TextDisplay for ConsoleDisplay {
    fn rows(&self) -> usize {
        2
    }

    fn write_row(&mut self, row: usize, text: &str) -> Result<(), BoxError> {
        tracing::info!(row, text = text.trim_end(), "display");
        Ok(())
    }
}

/// Remote channel that lands everything in the local log. Used as the
/// offline fallback when no transport is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRemote;

impl LogRemote {
    pub fn new() -> Self {
        Self
    }
}

impl RemoteChannel for LogRemote {
    fn status(&mut self, msg: &str) -> Result<(), BoxError> {
        tracing::info!(status = msg, "remote");
        Ok(())
    }

    fn log_event(&mut self, msg: &str) -> Result<(), BoxError> {
        tracing::info!(event = msg, "remote");
        Ok(())
    }

    fn alert(&mut self, event: &str, msg: &str) -> Result<(), BoxError> {
        tracing::warn!(event, alert = msg, "remote");
        Ok(())
    }
}

/// Buzzer and LEDs rendered into the log stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimAnnunciator;

impl SimAnnunciator {
    pub fn new() -> Self {
        Self
    }
}

impl Annunciator for SimAnnunciator {
    fn beep(&mut self, times: u8, pulse_ms: u64) -> Result<(), BoxError> {
        tracing::debug!(times, pulse_ms, "sim beep");
        Ok(())
    }

    fn set_leds(&mut self, green: bool, red: bool) -> Result<(), BoxError> {
        tracing::debug!(green, red, "sim leds");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_outlet_completes_a_cycle_every_three_polls() {
        let mut outlet = SimOutlet::new();
        for _ in 0..3 {
            assert!(outlet.is_active().unwrap());
            assert!(outlet.is_active().unwrap());
            assert!(!outlet.is_active().unwrap());
        }
    }

    #[test]
    fn quiet_vibration_never_confirms() {
        let mut v = SimVibration::quiet();
        assert!(!v.is_active().unwrap());
        let mut v = SimVibration::new();
        assert!(v.is_active().unwrap());
    }

    #[test]
    fn sim_servo_tracks_position() {
        let mut s = SimServo::new(0);
        assert_eq!(s.position_deg(), 180.0);
        s.move_to(0.0).unwrap();
        assert_eq!(s.position_deg(), 0.0);
    }
}
