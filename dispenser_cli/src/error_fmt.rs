//! Human-readable error descriptions and structured JSON error formatting.

use dispenser_core::{BuildError, DispenserError};

/// Map an eyre::Report to an explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingActuators => {
                "What happened: No slot actuators were provided to the dispenser.\nLikely causes: Empty [[slots]] table or servo initialization failed.\nHow to fix: Configure at least one [[slots]] entry with its servo_pin.".to_string()
            }
            BuildError::MissingVibrationSensor => {
                "What happened: No vibration sensor was provided.\nLikely causes: Sensor failed to initialize or was not wired into the builder.\nHow to fix: Check pins.vibration in the config and the sensor wiring.".to_string()
            }
            BuildError::MissingOutletSensor => {
                "What happened: No outlet sensor was provided.\nLikely causes: IR break-beam failed to initialize or was not wired into the builder.\nHow to fix: Check pins.ir in the config and the sensor wiring.".to_string()
            }
            BuildError::MissingDisplay => {
                "What happened: No display was provided.\nLikely causes: LCD failed to initialize or was not wired into the builder.\nHow to fix: Check the I2C wiring and address, then rerun.".to_string()
            }
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(de) = err.downcast_ref::<DispenserError>() {
        return match de {
            DispenserError::HardwareTimeout(msg) => format!(
                "What happened: A hardware operation timed out ({msg}).\nLikely causes: Sensor not wired correctly, no power/ground, or a stuck bus.\nHow to fix: Verify the [pins] values and power, then rerun."
            ),
            DispenserError::Hardware(msg) | DispenserError::HardwareFault(msg) => format!(
                "What happened: A hardware fault interrupted the cycle ({msg}).\nLikely causes: Wiring, GPIO permissions, or a failing peripheral.\nHow to fix: Check connections and GPIO access; the actuator may not be parked home."
            ),
            DispenserError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nHow to fix: Edit the config file, then rerun."
            ),
            DispenserError::State(msg) => format!(
                "What happened: The machine refused the operation ({msg}).\nHow to fix: Re-run with --log-level=debug for details."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("schedule csv must have headers") {
        return "Invalid headers in schedule CSV. Expected 'hour,minute,slot,enabled'.".to_string();
    }

    if lower.contains("invalid configuration") || lower.contains("must be") {
        return "What happened: Configuration is invalid or incomplete.\nLikely causes: Missing [pins]/[[slots]] sections or out-of-range values.\nHow to fix: Edit the TOML config and try again.".to_string();
    }

    if lower.contains("open servo pin")
        || lower.contains("open vibration pin")
        || lower.contains("open outlet pin")
    {
        return "What happened: Failed to initialize hardware pins.\nLikely causes: Incorrect pin numbers or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.chain().nth(1) {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 3 for hardware faults mid-cycle, 2 for anything
/// wrong with the configuration, 1 otherwise. Codes 4 and 5 are reserved
/// for the not-taken and failed dispense outcomes.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(de) = err.downcast_ref::<DispenserError>() {
        return match de {
            DispenserError::Hardware(_)
            | DispenserError::HardwareFault(_)
            | DispenserError::HardwareTimeout(_) => 3,
            DispenserError::Config(_) => 2,
            DispenserError::State(_) => 1,
        };
    }
    if err.downcast_ref::<BuildError>().is_some() {
        return 2;
    }
    let lower = err.to_string().to_ascii_lowercase();
    if lower.contains("config") || lower.contains("schedule csv") {
        return 2;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = if err.downcast_ref::<BuildError>().is_some() {
        "BuildError"
    } else if let Some(de) = err.downcast_ref::<DispenserError>() {
        match de {
            DispenserError::Hardware(_) => "Hardware",
            DispenserError::HardwareFault(_) => "HardwareFault",
            DispenserError::HardwareTimeout(_) => "HardwareTimeout",
            DispenserError::Config(_) => "Config",
            DispenserError::State(_) => "State",
        }
    } else {
        "Error"
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
