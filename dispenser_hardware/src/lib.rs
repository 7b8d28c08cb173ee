#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Hardware backends for the dispenser traits.
//!
//! The simulator backends build everywhere and are deterministic enough
//! to drive a full dispense cycle to a "taken" outcome. The real GPIO and
//! I2C backends live behind the `hardware` feature and target a Raspberry
//! Pi via `rppal`.

mod error;
#[cfg(feature = "hardware")]
pub mod gpio;
pub mod rtc;
pub mod sim;

pub use error::HwError;
pub use rtc::SystemRtc;
pub use sim::{ConsoleDisplay, LogRemote, SimAnnunciator, SimOutlet, SimServo, SimVibration};
