pub mod clock;

pub use clock::{Clock, MonotonicClock, WallClock};

/// One dispensing actuator (servo or equivalent), pre-bound to its slot.
pub trait Actuator {
    /// Command the actuator to an absolute position in degrees.
    fn move_to(&mut self, degrees: f32) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// A debounce-free digital input: vibration switch, IR break-beam, etc.
///
/// `true` means the signal is asserted in its domain sense (vibration
/// detected, pill present in the outlet). Polarity mapping is the
/// implementation's job.
pub trait DigitalInput {
    fn is_active(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Character display with independently addressable rows.
pub trait TextDisplay {
    /// Number of rows the display offers.
    fn rows(&self) -> usize;
    /// Write one full row. The caller pads/truncates to the display width.
    fn write_row(&mut self, row: usize, text: &str)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Alert severity as understood by the remote channel.
///
/// Remote transports typically map `event` to a named event type and
/// `message` to its free-text payload.
pub trait RemoteChannel {
    /// Replace the remote status line.
    fn status(&mut self, msg: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Append to the remote event log.
    fn log_event(&mut self, msg: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    /// Raise a named alert with a free-text payload.
    fn alert(
        &mut self,
        event: &str,
        msg: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Local buzzer and status LEDs.
pub trait Annunciator {
    fn beep(&mut self, times: u8, pulse_ms: u64)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn set_leds(
        &mut self,
        green: bool,
        red: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

// Boxed trait objects must remain usable wherever the generic core expects
// an `impl Trait`, so forward each trait through Box.

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn move_to(&mut self, degrees: f32) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).move_to(degrees)
    }
}

impl<T: DigitalInput + ?Sized> DigitalInput for Box<T> {
    fn is_active(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        (**self).is_active()
    }
}

impl<T: TextDisplay + ?Sized> TextDisplay for Box<T> {
    fn rows(&self) -> usize {
        (**self).rows()
    }
    fn write_row(
        &mut self,
        row: usize,
        text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).write_row(row, text)
    }
}

impl<T: RemoteChannel + ?Sized> RemoteChannel for Box<T> {
    fn status(&mut self, msg: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).status(msg)
    }
    fn log_event(&mut self, msg: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).log_event(msg)
    }
    fn alert(
        &mut self,
        event: &str,
        msg: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).alert(event, msg)
    }
}

impl<T: Annunciator + ?Sized> Annunciator for Box<T> {
    fn beep(
        &mut self,
        times: u8,
        pulse_ms: u64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).beep(times, pulse_ms)
    }
    fn set_leds(
        &mut self,
        green: bool,
        red: bool,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).set_leds(green, red)
    }
}
