//! Debounced waits over the raw digital inputs.
//!
//! Both waits are clock-driven polling loops so tests can script them with
//! a virtual clock. Timeouts are soft outcomes (`Ok(false)`), not errors;
//! only a failing sensor read escalates.

use std::time::Duration;

use dispenser_traits::{Clock, DigitalInput};
use eyre::WrapErr;

use crate::config::DetectionCfg;
use crate::error::Result;
use crate::hw_error::map_hw_error;

fn read_input<D>(sensor: &mut D, what: &'static str) -> Result<bool>
where
    D: DigitalInput + ?Sized,
{
    sensor
        .is_active()
        .map_err(|e| eyre::Report::new(map_hw_error(e.as_ref())))
        .wrap_err(what)
}

/// Wait for vibration evidence that a pill physically left its slot.
///
/// Accepts after `vibration_confirm_count` consecutive active reads; any
/// quiet read resets the streak. A silent `vibration_timeout_ms` window
/// returns `Ok(false)`.
pub fn wait_for_drop<D>(sensor: &mut D, cfg: &DetectionCfg, clock: &dyn Clock) -> Result<bool>
where
    D: DigitalInput + ?Sized,
{
    let epoch = clock.now();
    let mut streak: u32 = 0;
    while clock.ms_since(epoch) < cfg.vibration_timeout_ms {
        if read_input(sensor, "reading vibration sensor")? {
            streak += 1;
            if streak >= cfg.vibration_confirm_count {
                tracing::debug!(streak, "vibration confirmed, pill dropped");
                return Ok(true);
            }
        } else {
            streak = 0;
        }
        clock.sleep(Duration::from_millis(cfg.vibration_poll_ms));
    }
    tracing::debug!(
        timeout_ms = cfg.vibration_timeout_ms,
        "no vibration within the detection window"
    );
    Ok(false)
}

/// Wait for the full outlet cycle: pill present, then pill removed.
///
/// A bare "present" read only proves the pill reached the tray; retrieval
/// is the event that matters, so both edges must land before
/// `pickup_timeout_ms` expires.
pub fn wait_for_outlet_cycle<D>(
    sensor: &mut D,
    cfg: &DetectionCfg,
    clock: &dyn Clock,
) -> Result<bool>
where
    D: DigitalInput + ?Sized,
{
    let epoch = clock.now();
    let mut seen_present = false;
    while clock.ms_since(epoch) < cfg.pickup_timeout_ms {
        let present = read_input(sensor, "reading outlet sensor")?;
        if !seen_present {
            if present {
                seen_present = true;
                tracing::debug!("outlet: pill present");
            }
        } else if !present {
            tracing::debug!("outlet: pill removed");
            return Ok(true);
        }
        clock.sleep(Duration::from_millis(cfg.outlet_poll_ms));
    }
    tracing::debug!(seen_present, "outlet cycle incomplete within the pickup window");
    Ok(false)
}
