//! The dispense state machine.
//!
//! One `dispense` call runs a complete cycle: bounded motion retries with
//! drop confirmation, then the pickup wait, then back to idle with the
//! actuator parked home. Hardware faults abort with `Err`; everything the
//! mechanism can recover from is a soft outcome.

use std::sync::Arc;

use dispenser_traits::{Actuator, Clock, DigitalInput};

use crate::config::{DetectionCfg, MotionCfg};
use crate::device::DeviceState;
use crate::error::Result;
use crate::motion;
use crate::outcome::{AlertKind, DispenseOutcome, DispensePhase};
use crate::presenter::FeedbackPresenter;
use crate::sensors;
use crate::slot::Slot;

pub struct DispenserCore<A, V, P>
where
    A: Actuator,
    V: DigitalInput,
    P: DigitalInput,
{
    pub(crate) actuators: Vec<A>,
    pub(crate) slots: Vec<Slot>,
    pub(crate) vibration: V,
    pub(crate) outlet: P,
    pub(crate) presenter: FeedbackPresenter,
    pub(crate) motion: MotionCfg,
    pub(crate) detection: DetectionCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) phase: DispensePhase,
    pub(crate) last_outcome: Option<DispenseOutcome>,
}

impl<A, V, P> DispenserCore<A, V, P>
where
    A: Actuator,
    V: DigitalInput,
    P: DigitalInput,
{
    pub fn phase(&self) -> DispensePhase {
        self.phase
    }

    pub fn last_outcome(&self) -> Option<DispenseOutcome> {
        self.last_outcome
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn presenter_mut(&mut self) -> &mut FeedbackPresenter {
        &mut self.presenter
    }

    pub fn clock(&self) -> &(dyn Clock + Send + Sync) {
        &*self.clock
    }

    /// Run one full dispense cycle for `slot`.
    ///
    /// Returns `Ok(None)` without touching the hardware when the system is
    /// disabled or the slot is not configured; `Ok(Some(outcome))` after a
    /// completed cycle. `Err` means a hardware fault mid-cycle; the
    /// actuator may not be home and the caller should treat the mechanism
    /// as out of service.
    pub fn dispense(
        &mut self,
        state: &DeviceState,
        slot: usize,
    ) -> Result<Option<DispenseOutcome>> {
        if !state.enabled {
            tracing::trace!(slot, "dispense ignored, system disabled");
            return Ok(None);
        }
        let Some(s) = self.slots.get(slot).copied() else {
            tracing::warn!(slot, "dispense ignored, slot not configured");
            return Ok(None);
        };
        let label = s.label();
        let ready = format!("Slot {label} Ready");

        self.presenter.set_leds(false, false);
        self.presenter.beep(1, 200);
        self.presenter.show(&ready, "Dispensing...");
        self.presenter.status(&format!("Dispensing slot {label}"));
        self.presenter.log_event(&format!("Dispense start, slot {label}"));

        let mut confirmed = false;
        let mut attempt: u32 = 0;
        while !confirmed && attempt < self.detection.max_retries {
            attempt += 1;
            self.phase = DispensePhase::Dispensing { attempt };
            motion::run_dispense_motion(&mut self.actuators[slot], &s, &self.motion, &*self.clock)?;
            confirmed =
                sensors::wait_for_drop(&mut self.vibration, &self.detection, &*self.clock)?;
            if confirmed {
                self.presenter.show(&ready, "Pill dispensed!");
                self.presenter.set_leds(true, false);
                self.presenter.beep(1, 250);
                self.presenter
                    .log_event(&format!("Pill dispensed, slot {label}"));
            } else {
                let retry = format!("Retry {attempt}/{}", self.detection.max_retries);
                self.presenter.show("No vibration", &retry);
                self.presenter.set_leds(false, true);
                self.presenter.beep(2, 180);
                self.presenter
                    .log_event(&format!("No vibration, retry {attempt}, slot {label}"));
            }
        }

        if !confirmed {
            self.presenter.show("DISPENSE ERROR!", &ready);
            self.presenter.set_leds(false, true);
            self.presenter.beep(4, 250);
            motion::park_home(&mut self.actuators[slot], &s, &self.motion, &*self.clock)?;
            self.presenter.set_leds(false, false);
            self.presenter.status(&format!("DISPENSE ERROR slot {label}"));
            self.presenter.alert(
                AlertKind::DispenseFailed,
                &format!("Slot {label} failed to dispense after {attempt} attempts"),
            );
            self.phase = DispensePhase::Idle;
            self.last_outcome = Some(DispenseOutcome::Failed);
            tracing::error!(slot, attempts = attempt, "dispense failed, no drop confirmation");
            return Ok(Some(DispenseOutcome::Failed));
        }

        self.phase = DispensePhase::AwaitingPickup;
        self.presenter.show("Take your pill", "Waiting...");
        self.presenter.status(&format!("Pill ready in slot {label}"));
        self.presenter
            .log_event(&format!("Waiting for pickup, slot {label}"));

        let taken = sensors::wait_for_outlet_cycle(&mut self.outlet, &self.detection, &*self.clock)?;

        let outcome = if taken {
            self.presenter.show("Pill taken", "Thank you!");
            self.presenter.set_leds(false, false);
            self.presenter.beep(2, 180);
            self.presenter.status(&format!("Pill taken, slot {label}"));
            self.presenter
                .log_event(&format!("Pill taken, slot {label}"));
            DispenseOutcome::Taken
        } else {
            self.presenter.show("ALERT!", "Pill not taken!");
            self.presenter.set_leds(false, true);
            self.presenter.beep(3, 250);
            self.presenter
                .status(&format!("ALERT: pill not taken, slot {label}"));
            self.presenter.alert(
                AlertKind::PillNotTaken,
                &format!("Pill from slot {label} was not taken"),
            );
            DispenseOutcome::NotTaken
        };

        motion::park_home(&mut self.actuators[slot], &s, &self.motion, &*self.clock)?;
        self.presenter.set_leds(false, false);
        self.phase = DispensePhase::Idle;
        self.last_outcome = Some(outcome);
        tracing::info!(slot, ?outcome, attempts = attempt, "dispense cycle finished");
        Ok(Some(outcome))
    }
}
