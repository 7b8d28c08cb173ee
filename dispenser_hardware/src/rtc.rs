use chrono::{Local, Timelike};
use dispenser_traits::WallClock;

/// Wall clock backed by the OS time. On the device the OS clock is
/// disciplined from the battery-backed RTC at boot, so reading it here is
/// equivalent to polling the RTC chip.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRtc;

impl SystemRtc {
    pub fn new() -> Self {
        Self
    }
}

impl WallClock for SystemRtc {
    fn now_hms(&self) -> (u8, u8, u8) {
        let now = Local::now();
        (now.hour() as u8, now.minute() as u8, now.second() as u8)
    }
}
