//! The fixed open/return/home motion profile of one dispensing cycle.

use std::time::Duration;

use dispenser_traits::{Actuator, Clock};
use eyre::WrapErr;

use crate::config::MotionCfg;
use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::slot::Slot;

fn move_to<A>(actuator: &mut A, degrees: f32, what: &'static str) -> Result<()>
where
    A: Actuator + ?Sized,
{
    actuator
        .move_to(degrees)
        .map_err(|e| eyre::Report::new(map_hw_error(e.as_ref())))
        .wrap_err(what)
}

/// One full motion cycle: release position, intermediate return, home.
/// Each move is followed by a settle delay so the mechanism comes to rest
/// before the next command or sensor read.
pub fn run_dispense_motion<A>(
    actuator: &mut A,
    slot: &Slot,
    motion: &MotionCfg,
    clock: &dyn Clock,
) -> Result<()>
where
    A: Actuator + ?Sized,
{
    tracing::debug!(slot = slot.index, "dispense motion start");
    let settle = Duration::from_millis(motion.settle_ms);
    move_to(actuator, slot.dispense_deg, "moving to release position")?;
    clock.sleep(settle);
    move_to(actuator, slot.return_deg, "moving to return position")?;
    clock.sleep(settle);
    move_to(actuator, slot.home_deg, "moving home")?;
    clock.sleep(settle);
    Ok(())
}

/// Drive the actuator to its resting position, regardless of where the
/// cycle left it.
pub fn park_home<A>(
    actuator: &mut A,
    slot: &Slot,
    motion: &MotionCfg,
    clock: &dyn Clock,
) -> Result<()>
where
    A: Actuator + ?Sized,
{
    move_to(actuator, slot.home_deg, "parking home")?;
    clock.sleep(Duration::from_millis(motion.settle_ms));
    Ok(())
}
