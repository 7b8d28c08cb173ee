//! Config loading, hardware assembly and command execution.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dispenser_config::Config;
use dispenser_core::{
    DeviceState, DispenseOutcome, Dispenser, LoopCfg, ScheduleEntry, Scheduler, command_channel,
    slots_from_config,
};
use dispenser_traits::{Actuator, Annunciator, DigitalInput, TextDisplay};
use eyre::WrapErr;

pub fn load_config(path: &Path) -> eyre::Result<Config> {
    let text =
        std::fs::read_to_string(path).wrap_err_with(|| format!("read config {path:?}"))?;
    let cfg =
        dispenser_config::load_toml(&text).wrap_err_with(|| format!("parse config {path:?}"))?;
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn scheduler_from(cfg: &Config, csv: Option<&Path>) -> eyre::Result<Scheduler> {
    let entries: Vec<ScheduleEntry> = match csv {
        Some(path) => dispenser_config::load_schedule_csv(path, cfg.slots.len())?
            .iter()
            .map(ScheduleEntry::from)
            .collect(),
        None => cfg.schedule.iter().map(ScheduleEntry::from).collect(),
    };
    Ok(Scheduler::new(entries))
}

#[cfg(feature = "hardware")]
fn actuators(cfg: &Config) -> eyre::Result<Vec<Box<dyn Actuator>>> {
    use dispenser_hardware::gpio::ServoPin;
    cfg.slots
        .iter()
        .enumerate()
        .map(|(i, s)| {
            ServoPin::new(s.servo_pin, i)
                .map(|p| Box::new(p) as Box<dyn Actuator>)
                .wrap_err_with(|| format!("open servo pin {}", s.servo_pin))
        })
        .collect()
}

#[cfg(not(feature = "hardware"))]
fn actuators(cfg: &Config) -> eyre::Result<Vec<Box<dyn Actuator>>> {
    Ok((0..cfg.slots.len())
        .map(|i| Box::new(dispenser_hardware::SimServo::new(i)) as Box<dyn Actuator>)
        .collect())
}

#[cfg(feature = "hardware")]
fn vibration_sensor(cfg: &Config) -> eyre::Result<Box<dyn DigitalInput>> {
    let pin = dispenser_hardware::gpio::GpioInput::new(cfg.pins.vibration, true)
        .wrap_err_with(|| format!("open vibration pin {}", cfg.pins.vibration))?;
    Ok(Box::new(pin))
}

#[cfg(not(feature = "hardware"))]
fn vibration_sensor(_cfg: &Config) -> eyre::Result<Box<dyn DigitalInput>> {
    Ok(Box::new(dispenser_hardware::SimVibration::new()))
}

#[cfg(feature = "hardware")]
fn outlet_sensor(cfg: &Config) -> eyre::Result<Box<dyn DigitalInput>> {
    // The break-beam pulls low while the beam is interrupted.
    let pin = dispenser_hardware::gpio::GpioInput::new(cfg.pins.ir, false)
        .wrap_err_with(|| format!("open outlet pin {}", cfg.pins.ir))?;
    Ok(Box::new(pin))
}

#[cfg(not(feature = "hardware"))]
fn outlet_sensor(_cfg: &Config) -> eyre::Result<Box<dyn DigitalInput>> {
    Ok(Box::new(dispenser_hardware::SimOutlet::new()))
}

#[cfg(feature = "hardware")]
fn display(cfg: &Config) -> eyre::Result<Box<dyn TextDisplay>> {
    // A dead LCD must not keep pills from dispensing; fall back to
    // console output and keep going.
    match dispenser_hardware::gpio::I2cLcd::new(0x27, cfg.feedback.display_width) {
        Ok(lcd) => Ok(Box::new(lcd)),
        Err(e) => {
            tracing::warn!(error = %e, "I2C LCD unavailable, using console display");
            Ok(Box::new(dispenser_hardware::ConsoleDisplay::new()))
        }
    }
}

#[cfg(not(feature = "hardware"))]
fn display(_cfg: &Config) -> eyre::Result<Box<dyn TextDisplay>> {
    Ok(Box::new(dispenser_hardware::ConsoleDisplay::new()))
}

#[cfg(feature = "hardware")]
fn annunciator(cfg: &Config) -> eyre::Result<Box<dyn Annunciator>> {
    match dispenser_hardware::gpio::GpioAnnunciator::new(
        cfg.pins.buzzer,
        cfg.pins.led_green,
        cfg.pins.led_red,
    ) {
        Ok(ann) => Ok(Box::new(ann)),
        Err(e) => {
            tracing::warn!(error = %e, "buzzer/led pins unavailable, audio-visual cues disabled");
            Ok(Box::new(dispenser_hardware::SimAnnunciator::new()))
        }
    }
}

#[cfg(not(feature = "hardware"))]
fn annunciator(_cfg: &Config) -> eyre::Result<Box<dyn Annunciator>> {
    Ok(Box::new(dispenser_hardware::SimAnnunciator::new()))
}

fn build_machine(cfg: &Config) -> eyre::Result<Dispenser> {
    let slots = slots_from_config(&cfg.slots, &cfg.motion);
    Dispenser::builder()
        .with_actuators(actuators(cfg)?)
        .with_vibration_sensor(vibration_sensor(cfg)?)
        .with_outlet_sensor(outlet_sensor(cfg)?)
        .with_display(display(cfg)?)
        .with_remote(dispenser_hardware::LogRemote::new())
        .with_annunciator(annunciator(cfg)?)
        .with_slots(slots)
        .with_motion((&cfg.motion).into())
        .with_detection((&cfg.detection).into())
        .with_feedback((&cfg.feedback).into())
        .try_build()
        .map_err(eyre::Report::new)
}

/// The scheduled dispensing loop. Runs until ctrl-c.
pub fn run(cfg: &Config, schedule_csv: Option<&Path>) -> eyre::Result<()> {
    let mut dispenser = build_machine(cfg)?;
    let mut state = DeviceState::new(scheduler_from(cfg, schedule_csv)?);
    let (endpoint, queue) = command_channel();

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || {
            tracing::info!("shutdown requested");
            shutdown.store(true, Ordering::Relaxed);
        })
        .wrap_err("install signal handler")?;
    }

    // No external transport is wired up yet; announce startup through the
    // same path a reconnecting transport would use.
    endpoint.connectivity_restored();

    let rtc = dispenser_hardware::SystemRtc::new();
    let loop_cfg: LoopCfg = (&cfg.control_loop).into();
    tracing::info!(
        slots = dispenser.slot_count(),
        entries = state.scheduler.entries().len(),
        "dispenser ready"
    );
    dispenser.run_loop(&mut state, &rtc, &queue, &loop_cfg, &shutdown)
}

/// One manual dispense cycle.
pub fn dispense_once(cfg: &Config, slot: usize) -> eyre::Result<DispenseOutcome> {
    if slot >= cfg.slots.len() {
        eyre::bail!(
            "slot {slot} is not configured ({} slots)",
            cfg.slots.len()
        );
    }
    let mut dispenser = build_machine(cfg)?;
    let state = DeviceState::new(Scheduler::default());
    match dispenser.dispense(&state, slot)? {
        Some(outcome) => Ok(outcome),
        // Unreachable after the slot check: a fresh state is enabled.
        None => eyre::bail!("dispense was refused"),
    }
}

/// Probe every hardware piece once without moving anything.
pub fn self_check(cfg: &Config) -> eyre::Result<()> {
    let mut vibration = vibration_sensor(cfg)?;
    let mut outlet = outlet_sensor(cfg)?;
    let mut screen = display(cfg)?;
    let _actuators = actuators(cfg)?;
    let _annunciator = annunciator(cfg)?;

    let vibration_active = vibration
        .is_active()
        .map_err(|e| eyre::eyre!("vibration sensor: {e}"))?;
    let outlet_present = outlet
        .is_active()
        .map_err(|e| eyre::eyre!("outlet sensor: {e}"))?;
    screen
        .write_row(0, "Self check")
        .and_then(|()| screen.write_row(1, "OK"))
        .map_err(|e| eyre::eyre!("display: {e}"))?;

    tracing::info!(vibration_active, outlet_present, "self check passed");
    println!("self check: ok");
    Ok(())
}
