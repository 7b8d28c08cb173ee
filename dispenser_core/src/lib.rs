#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Core control logic for the pill dispenser.
//!
//! Everything here is hardware-agnostic: actuators, sensors, display and
//! remote channel arrive as `dispenser_traits` objects, and all timing
//! flows through an injectable clock so the full dispense cycle runs
//! under test in virtual time.
//!
//! The shape of a cycle: bounded motion retries with vibration-confirmed
//! drop detection, then an outlet wait for the patient to take the pill,
//! with local and remote feedback at every step.

pub mod builder;
pub mod config;
pub mod conversions;
pub mod device;
pub mod error;
mod hw_error;
pub mod machine;
pub mod mocks;
pub mod motion;
pub mod outcome;
pub mod presenter;
pub mod remote;
pub mod runner;
pub mod schedule;
pub mod sensors;
pub mod slot;
pub mod util;

pub use builder::{Dispenser, DispenserBuilder, build_dispenser};
pub use config::{DetectionCfg, FeedbackCfg, LoopCfg, MotionCfg};
pub use conversions::slots_from_config;
pub use device::DeviceState;
pub use error::{BuildError, DispenserError, Result};
pub use machine::DispenserCore;
pub use outcome::{AlertKind, DispenseOutcome, DispensePhase};
pub use presenter::FeedbackPresenter;
pub use remote::{CommandEndpoint, CommandQueue, RemoteCommand, command_channel, parse_hhmm};
pub use schedule::{ScheduleEntry, Scheduler};
pub use slot::Slot;
pub use util::greeting_for_hour;

pub use dispenser_traits::{Clock, MonotonicClock, WallClock};
