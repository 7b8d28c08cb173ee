//! The cooperative control loop.
//!
//! Single-threaded by construction: remote commands, the idle screen and
//! the scheduler all run through one tick function, so a dispense in
//! flight is never interrupted. Commands arriving meanwhile queue up and
//! are applied, strictly in arrival order, at the top of the next tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use dispenser_traits::{Actuator, DigitalInput, WallClock};

use crate::config::LoopCfg;
use crate::device::DeviceState;
use crate::error::Result;
use crate::machine::DispenserCore;
use crate::remote::{CommandQueue, RemoteCommand};
use crate::util::greeting_for_hour;

/// Run ticks until `shutdown` flips true. Errors out of a tick stop the
/// loop; soft outcomes do not.
pub fn run_loop<A, V, P>(
    dispenser: &mut DispenserCore<A, V, P>,
    state: &mut DeviceState,
    rtc: &dyn WallClock,
    commands: &CommandQueue,
    cfg: &LoopCfg,
    shutdown: &AtomicBool,
) -> Result<()>
where
    A: Actuator,
    V: DigitalInput,
    P: DigitalInput,
{
    tracing::info!("control loop started");
    while !shutdown.load(Ordering::Relaxed) {
        run_once(dispenser, state, rtc, commands, cfg)?;
    }
    tracing::info!("control loop stopped");
    Ok(())
}

/// One tick: drain remote commands, then either show the disabled screen
/// or show the clock and fire due schedule entries. Extracted from
/// [`run_loop`] so tests can drive the loop with scripted clocks.
pub fn run_once<A, V, P>(
    dispenser: &mut DispenserCore<A, V, P>,
    state: &mut DeviceState,
    rtc: &dyn WallClock,
    commands: &CommandQueue,
    cfg: &LoopCfg,
) -> Result<()>
where
    A: Actuator,
    V: DigitalInput,
    P: DigitalInput,
{
    for cmd in commands.drain() {
        apply_command(dispenser, state, cmd)?;
    }

    if !state.enabled {
        dispenser
            .presenter_mut()
            .show_for("System Disabled", "Remote control", Duration::from_millis(cfg.idle_hold_ms));
        dispenser.clock().sleep(Duration::from_millis(cfg.poll_ms));
        return Ok(());
    }

    let (hour, minute, second) = rtc.now_hms();
    let clock_line = format!("Time {hour:02}:{minute:02}:{second:02}");
    dispenser.presenter_mut().show_for(
        &clock_line,
        greeting_for_hour(hour),
        Duration::from_millis(cfg.idle_hold_ms),
    );

    for slot in state.scheduler.due_slots(hour, minute) {
        dispenser
            .presenter_mut()
            .log_event(&format!("Schedule triggered, slot {}", slot + 1));
        dispenser.dispense(state, slot)?;
    }

    dispenser.clock().sleep(Duration::from_millis(cfg.poll_ms));
    Ok(())
}

fn apply_command<A, V, P>(
    dispenser: &mut DispenserCore<A, V, P>,
    state: &mut DeviceState,
    cmd: RemoteCommand,
) -> Result<()>
where
    A: Actuator,
    V: DigitalInput,
    P: DigitalInput,
{
    match cmd {
        RemoteCommand::Dispense { slot } => {
            // Checked here as well as in the machine so a disabled system
            // produces no feedback at all for a manual trigger.
            if state.enabled {
                dispenser
                    .presenter_mut()
                    .log_event(&format!("Manual dispense requested, slot {}", slot + 1));
                dispenser.dispense(state, slot)?;
            } else {
                tracing::debug!(slot, "manual dispense ignored, system disabled");
            }
        }
        RemoteCommand::SetSchedule {
            entry,
            hour,
            minute,
        } => {
            if state.scheduler.set_time(entry, hour, minute) {
                dispenser.presenter_mut().log_event(&format!(
                    "Schedule updated, entry {entry} -> {hour:02}:{minute:02}"
                ));
            }
        }
        RemoteCommand::SetEnabled(enabled) => {
            state.enabled = enabled;
            let msg = if enabled {
                "System ENABLED"
            } else {
                "System DISABLED"
            };
            dispenser.presenter_mut().status(msg);
            dispenser.presenter_mut().log_event(msg);
        }
        RemoteCommand::ConnectivityRestored => {
            dispenser.presenter_mut().status("System online");
            dispenser.presenter_mut().log_event("Remote channel connected");
        }
    }
    Ok(())
}
