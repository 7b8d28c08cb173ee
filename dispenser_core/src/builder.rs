//! Type-state builder for the dispense machine.
//!
//! The three mandatory hardware pieces (actuators, vibration sensor,
//! outlet sensor) are tracked in the type so `try_build` only exists once
//! all of them were supplied. The display is mandatory too but arrives
//! boxed like the other feedback sinks, so it is checked at build time.

use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use dispenser_traits::{
    Actuator, Annunciator, Clock, DigitalInput, MonotonicClock, RemoteChannel, TextDisplay,
    WallClock,
};

use crate::config::{DetectionCfg, FeedbackCfg, LoopCfg, MotionCfg};
use crate::device::DeviceState;
use crate::error::{BuildError, Result};
use crate::machine::DispenserCore;
use crate::outcome::{DispenseOutcome, DispensePhase};
use crate::presenter::FeedbackPresenter;
use crate::remote::CommandQueue;
use crate::slot::Slot;

pub struct Missing;
pub struct Set;

type BoxedCore = DispenserCore<Box<dyn Actuator>, Box<dyn DigitalInput>, Box<dyn DigitalInput>>;

/// Machine with boxed hardware, as produced by [`DispenserBuilder`].
pub struct Dispenser {
    inner: BoxedCore,
}

impl std::fmt::Debug for Dispenser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispenser").finish_non_exhaustive()
    }
}

impl Dispenser {
    pub fn builder() -> DispenserBuilder<Missing, Missing, Missing> {
        DispenserBuilder::new()
    }

    pub fn dispense(&mut self, state: &DeviceState, slot: usize) -> Result<Option<DispenseOutcome>> {
        self.inner.dispense(state, slot)
    }

    pub fn phase(&self) -> DispensePhase {
        self.inner.phase()
    }

    pub fn last_outcome(&self) -> Option<DispenseOutcome> {
        self.inner.last_outcome()
    }

    pub fn slot_count(&self) -> usize {
        self.inner.slot_count()
    }

    pub fn presenter_mut(&mut self) -> &mut FeedbackPresenter {
        self.inner.presenter_mut()
    }

    /// Run one control-loop tick. See [`crate::runner::run_once`].
    pub fn run_once(
        &mut self,
        state: &mut DeviceState,
        rtc: &dyn WallClock,
        commands: &CommandQueue,
        cfg: &LoopCfg,
    ) -> Result<()> {
        crate::runner::run_once(&mut self.inner, state, rtc, commands, cfg)
    }

    /// Run the control loop until `shutdown` flips. See
    /// [`crate::runner::run_loop`].
    pub fn run_loop(
        &mut self,
        state: &mut DeviceState,
        rtc: &dyn WallClock,
        commands: &CommandQueue,
        cfg: &LoopCfg,
        shutdown: &AtomicBool,
    ) -> Result<()> {
        crate::runner::run_loop(&mut self.inner, state, rtc, commands, cfg, shutdown)
    }
}

pub struct DispenserBuilder<Act, Vib, Out> {
    actuators: Vec<Box<dyn Actuator>>,
    slots: Option<Vec<Slot>>,
    vibration: Option<Box<dyn DigitalInput>>,
    outlet: Option<Box<dyn DigitalInput>>,
    display: Option<Box<dyn TextDisplay>>,
    remote: Option<Box<dyn RemoteChannel>>,
    annunciator: Option<Box<dyn Annunciator>>,
    motion: MotionCfg,
    detection: DetectionCfg,
    feedback: FeedbackCfg,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    _marker: PhantomData<(Act, Vib, Out)>,
}

impl DispenserBuilder<Missing, Missing, Missing> {
    pub fn new() -> Self {
        Self {
            actuators: Vec::new(),
            slots: None,
            vibration: None,
            outlet: None,
            display: None,
            remote: None,
            annunciator: None,
            motion: MotionCfg::default(),
            detection: DetectionCfg::default(),
            feedback: FeedbackCfg::default(),
            clock: None,
            _marker: PhantomData,
        }
    }
}

impl Default for DispenserBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Act, Vib, Out> DispenserBuilder<Act, Vib, Out> {
    fn retag<A2, V2, O2>(self) -> DispenserBuilder<A2, V2, O2> {
        DispenserBuilder {
            actuators: self.actuators,
            slots: self.slots,
            vibration: self.vibration,
            outlet: self.outlet,
            display: self.display,
            remote: self.remote,
            annunciator: self.annunciator,
            motion: self.motion,
            detection: self.detection,
            feedback: self.feedback,
            clock: self.clock,
            _marker: PhantomData,
        }
    }

    /// One actuator per slot, in slot order.
    pub fn with_actuators<T>(mut self, actuators: Vec<T>) -> DispenserBuilder<Set, Vib, Out>
    where
        T: Actuator + 'static,
    {
        self.actuators = actuators
            .into_iter()
            .map(|a| Box::new(a) as Box<dyn Actuator>)
            .collect();
        self.retag()
    }

    pub fn with_vibration_sensor<T>(mut self, sensor: T) -> DispenserBuilder<Act, Set, Out>
    where
        T: DigitalInput + 'static,
    {
        self.vibration = Some(Box::new(sensor));
        self.retag()
    }

    pub fn with_outlet_sensor<T>(mut self, sensor: T) -> DispenserBuilder<Act, Vib, Set>
    where
        T: DigitalInput + 'static,
    {
        self.outlet = Some(Box::new(sensor));
        self.retag()
    }

    /// Override the default slot geometry. Must match the actuator count.
    pub fn with_slots(mut self, slots: Vec<Slot>) -> Self {
        self.slots = Some(slots);
        self
    }

    pub fn with_display<T>(mut self, display: T) -> Self
    where
        T: TextDisplay + 'static,
    {
        self.display = Some(Box::new(display));
        self
    }

    pub fn with_remote<T>(mut self, remote: T) -> Self
    where
        T: RemoteChannel + 'static,
    {
        self.remote = Some(Box::new(remote));
        self
    }

    pub fn with_annunciator<T>(mut self, annunciator: T) -> Self
    where
        T: Annunciator + 'static,
    {
        self.annunciator = Some(Box::new(annunciator));
        self
    }

    pub fn with_motion(mut self, motion: MotionCfg) -> Self {
        self.motion = motion;
        self
    }

    pub fn with_detection(mut self, detection: DetectionCfg) -> Self {
        self.detection = detection;
        self
    }

    pub fn with_feedback(mut self, feedback: FeedbackCfg) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

impl DispenserBuilder<Set, Set, Set> {
    pub fn try_build(self) -> std::result::Result<Dispenser, BuildError> {
        let vibration = self.vibration.ok_or(BuildError::MissingVibrationSensor)?;
        let outlet = self.outlet.ok_or(BuildError::MissingOutletSensor)?;
        let display = self.display.ok_or(BuildError::MissingDisplay)?;
        let inner = validate_and_build(
            self.actuators,
            self.slots,
            vibration,
            outlet,
            display,
            self.remote,
            self.annunciator,
            self.motion,
            self.detection,
            self.feedback,
            self.clock,
        )?;
        Ok(Dispenser { inner })
    }
}

fn invalid(msg: impl Into<String>) -> BuildError {
    BuildError::InvalidConfig(msg.into())
}

/// Single source of truth for construction-time validation, shared by the
/// boxed builder and the generic entry point.
#[allow(clippy::too_many_arguments)]
fn validate_and_build<A, V, P>(
    actuators: Vec<A>,
    slots: Option<Vec<Slot>>,
    vibration: V,
    outlet: P,
    display: Box<dyn TextDisplay>,
    remote: Option<Box<dyn RemoteChannel>>,
    annunciator: Option<Box<dyn Annunciator>>,
    motion: MotionCfg,
    detection: DetectionCfg,
    feedback: FeedbackCfg,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
) -> std::result::Result<DispenserCore<A, V, P>, BuildError>
where
    A: Actuator,
    V: DigitalInput,
    P: DigitalInput,
{
    if actuators.is_empty() {
        return Err(BuildError::MissingActuators);
    }
    let slots = slots.unwrap_or_else(|| (0..actuators.len()).map(Slot::new).collect());
    if slots.len() != actuators.len() {
        return Err(invalid(format!(
            "{} slots configured for {} actuators",
            slots.len(),
            actuators.len()
        )));
    }
    for (i, s) in slots.iter().enumerate() {
        if s.index != i {
            return Err(invalid(format!(
                "slot at position {i} carries index {}",
                s.index
            )));
        }
        for (name, deg) in [
            ("home_deg", s.home_deg),
            ("dispense_deg", s.dispense_deg),
            ("return_deg", s.return_deg),
        ] {
            if !deg.is_finite() || !(0.0..=360.0).contains(&deg) {
                return Err(invalid(format!(
                    "slot {i}: {name} must be within 0..=360 degrees, got {deg}"
                )));
            }
        }
    }

    if motion.settle_ms == 0 {
        return Err(invalid("motion settle_ms must be >= 1"));
    }
    if detection.max_retries == 0 {
        return Err(invalid("max_retries must be >= 1"));
    }
    if detection.vibration_confirm_count == 0 {
        return Err(invalid("vibration_confirm_count must be >= 1"));
    }
    if detection.vibration_poll_ms == 0 || detection.vibration_timeout_ms == 0 {
        return Err(invalid("vibration poll and timeout must be >= 1 ms"));
    }
    if detection.vibration_poll_ms > detection.vibration_timeout_ms {
        return Err(invalid("vibration poll must not exceed the vibration timeout"));
    }
    // The streak's first read lands at t=0, each further read one poll
    // later; all of them must land inside the timeout.
    if u64::from(detection.vibration_confirm_count - 1) * detection.vibration_poll_ms
        >= detection.vibration_timeout_ms
    {
        return Err(invalid(
            "vibration_confirm_count reads cannot fit inside the vibration timeout",
        ));
    }
    if detection.outlet_poll_ms == 0 || detection.pickup_timeout_ms == 0 {
        return Err(invalid("outlet poll and pickup timeout must be >= 1 ms"));
    }
    if detection.outlet_poll_ms > detection.pickup_timeout_ms {
        return Err(invalid("outlet poll must not exceed the pickup timeout"));
    }
    if feedback.display_width == 0 {
        return Err(invalid("display_width must be >= 1"));
    }
    if display.rows() < 2 {
        return Err(invalid("display must offer at least two rows"));
    }

    let clock = clock.unwrap_or_else(|| Arc::new(MonotonicClock::new()));
    let presenter = FeedbackPresenter::new(display, remote, annunciator, Arc::clone(&clock), &feedback);
    Ok(DispenserCore {
        actuators,
        slots,
        vibration,
        outlet,
        presenter,
        motion,
        detection,
        clock,
        phase: DispensePhase::default(),
        last_outcome: None,
    })
}

/// Statically dispatched construction for callers that know their
/// hardware types at compile time; validation matches `try_build`.
#[allow(clippy::too_many_arguments)]
pub fn build_dispenser<A, V, P>(
    actuators: Vec<A>,
    slots: Option<Vec<Slot>>,
    vibration: V,
    outlet: P,
    display: Box<dyn TextDisplay>,
    remote: Option<Box<dyn RemoteChannel>>,
    annunciator: Option<Box<dyn Annunciator>>,
    motion: MotionCfg,
    detection: DetectionCfg,
    feedback: FeedbackCfg,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
) -> std::result::Result<DispenserCore<A, V, P>, BuildError>
where
    A: Actuator,
    V: DigitalInput,
    P: DigitalInput,
{
    validate_and_build(
        actuators,
        slots,
        vibration,
        outlet,
        display,
        remote,
        annunciator,
        motion,
        detection,
        feedback,
        clock,
    )
}
