#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and schedule parsing for the pill dispenser.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - The schedule CSV loader enforces exact headers so a miswired export
//!   fails loudly instead of silently dosing at the wrong time.

use serde::Deserialize;

/// Schedule CSV schema.
///
/// Expected headers:
/// hour,minute,slot,enabled
///
/// Example:
/// hour,minute,slot,enabled
/// 8,0,0,true
/// 20,0,1,true
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ScheduleRow {
    pub hour: u8,
    pub minute: u8,
    pub slot: usize,
    pub enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct Pins {
    pub vibration: u8,
    pub ir: u8,
    pub buzzer: Option<u8>,
    pub led_red: Option<u8>,
    pub led_green: Option<u8>,
}

/// One dispensing compartment. Setpoints fall back to `[motion]` defaults.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SlotCfg {
    pub servo_pin: u8,
    pub home_deg: Option<f32>,
    pub dispense_deg: Option<f32>,
    pub return_deg: Option<f32>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Motion {
    /// Default resting position (degrees).
    pub home_deg: f32,
    /// Default release position (degrees).
    pub dispense_deg: f32,
    /// Default intermediate return position (degrees).
    pub return_deg: f32,
    /// Settle delay between moves (ms).
    pub settle_ms: u64,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            home_deg: 180.0,
            dispense_deg: 0.0,
            return_deg: 180.0,
            settle_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Detection {
    /// Motion cycles attempted before declaring a dispense failure.
    pub max_retries: u32,
    /// Window for the vibration sensor to confirm a drop (ms).
    pub vibration_timeout_ms: u64,
    /// Consecutive active reads required to accept a drop (1 = single read).
    pub vibration_confirm_count: u32,
    /// Vibration poll interval (ms).
    pub vibration_poll_ms: u64,
    /// Total window for the patient to retrieve the pill (ms).
    pub pickup_timeout_ms: u64,
    /// Outlet IR poll interval (ms); coarser than vibration by design.
    pub outlet_poll_ms: u64,
}

impl Default for Detection {
    fn default() -> Self {
        Self {
            max_retries: 6,
            vibration_timeout_ms: 2000,
            vibration_confirm_count: 3,
            vibration_poll_ms: 30,
            pickup_timeout_ms: 60_000,
            outlet_poll_ms: 120,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Feedback {
    /// Minimum dwell after each status message (ms).
    pub message_hold_ms: u64,
    /// Characters per display row.
    pub display_width: usize,
}

impl Default for Feedback {
    fn default() -> Self {
        Self {
            message_hold_ms: 2000,
            display_width: 16,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ControlLoop {
    /// Main loop tick (ms). Must stay well under a minute for the scheduler.
    pub poll_ms: u64,
    /// Idle-screen dwell (ms).
    pub idle_hold_ms: u64,
}

impl Default for ControlLoop {
    fn default() -> Self {
        Self {
            poll_ms: 500,
            idle_hold_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ScheduleEntryCfg {
    pub hour: u8,
    pub minute: u8,
    pub slot: usize,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub pins: Pins,
    pub slots: Vec<SlotCfg>,
    #[serde(default)]
    pub motion: Motion,
    #[serde(default)]
    pub detection: Detection,
    #[serde(default)]
    pub feedback: Feedback,
    #[serde(default)]
    pub control_loop: ControlLoop,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default = "default_schedule")]
    pub schedule: Vec<ScheduleEntryCfg>,
}

/// Morning dose from slot 0, evening dose from slot 1.
fn default_schedule() -> Vec<ScheduleEntryCfg> {
    vec![
        ScheduleEntryCfg {
            hour: 8,
            minute: 0,
            slot: 0,
            enabled: true,
        },
        ScheduleEntryCfg {
            hour: 20,
            minute: 0,
            slot: 1,
            enabled: true,
        },
    ]
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

fn check_angle(name: &str, deg: f32) -> eyre::Result<()> {
    if !deg.is_finite() || !(0.0..=360.0).contains(&deg) {
        eyre::bail!("{name} must be within 0..=360 degrees, got {deg}");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Slots
        if self.slots.is_empty() {
            eyre::bail!("at least one [[slots]] entry is required");
        }
        check_angle("motion.home_deg", self.motion.home_deg)?;
        check_angle("motion.dispense_deg", self.motion.dispense_deg)?;
        check_angle("motion.return_deg", self.motion.return_deg)?;
        for (i, s) in self.slots.iter().enumerate() {
            if let Some(d) = s.home_deg {
                check_angle(&format!("slots[{i}].home_deg"), d)?;
            }
            if let Some(d) = s.dispense_deg {
                check_angle(&format!("slots[{i}].dispense_deg"), d)?;
            }
            if let Some(d) = s.return_deg {
                check_angle(&format!("slots[{i}].return_deg"), d)?;
            }
        }

        // Motion
        if self.motion.settle_ms == 0 {
            eyre::bail!("motion.settle_ms must be >= 1");
        }

        // Detection
        if self.detection.max_retries == 0 {
            eyre::bail!("detection.max_retries must be >= 1");
        }
        if self.detection.vibration_timeout_ms == 0 {
            eyre::bail!("detection.vibration_timeout_ms must be >= 1");
        }
        if self.detection.vibration_confirm_count == 0 {
            eyre::bail!("detection.vibration_confirm_count must be >= 1");
        }
        if self.detection.vibration_poll_ms == 0 {
            eyre::bail!("detection.vibration_poll_ms must be >= 1");
        }
        if self.detection.vibration_poll_ms > self.detection.vibration_timeout_ms {
            eyre::bail!("detection.vibration_poll_ms must not exceed the vibration timeout");
        }
        if u64::from(self.detection.vibration_confirm_count - 1)
            * self.detection.vibration_poll_ms
            >= self.detection.vibration_timeout_ms
        {
            eyre::bail!(
                "detection.vibration_confirm_count reads cannot fit inside the vibration timeout"
            );
        }
        if self.detection.pickup_timeout_ms == 0 {
            eyre::bail!("detection.pickup_timeout_ms must be >= 1");
        }
        if self.detection.outlet_poll_ms == 0 {
            eyre::bail!("detection.outlet_poll_ms must be >= 1");
        }
        if self.detection.outlet_poll_ms > self.detection.pickup_timeout_ms {
            eyre::bail!("detection.outlet_poll_ms must not exceed the pickup timeout");
        }

        // Feedback
        if self.feedback.display_width == 0 {
            eyre::bail!("feedback.display_width must be >= 1");
        }

        // Control loop
        if self.control_loop.poll_ms == 0 {
            eyre::bail!("control_loop.poll_ms must be >= 1");
        }
        if self.control_loop.poll_ms >= 60_000 {
            eyre::bail!("control_loop.poll_ms must be below one minute or schedule entries may be skipped");
        }

        // Schedule
        for (i, e) in self.schedule.iter().enumerate() {
            if e.hour >= 24 {
                eyre::bail!("schedule entry {i}: hour must be in 0..24, got {}", e.hour);
            }
            if e.minute >= 60 {
                eyre::bail!(
                    "schedule entry {i}: minute must be in 0..60, got {}",
                    e.minute
                );
            }
            if e.slot >= self.slots.len() {
                eyre::bail!(
                    "schedule entry {i}: slot {} is not configured ({} slots)",
                    e.slot,
                    self.slots.len()
                );
            }
        }

        Ok(())
    }
}

/// Load a schedule table from CSV with strict `hour,minute,slot,enabled`
/// headers. Rows are range-checked against `slot_count`.
pub fn load_schedule_csv(
    path: &std::path::Path,
    slot_count: usize,
) -> eyre::Result<Vec<ScheduleRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open schedule CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["hour", "minute", "slot", "enabled"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "schedule CSV must have headers 'hour,minute,slot,enabled', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ScheduleRow>().enumerate() {
        match rec {
            Ok(row) => {
                if row.hour >= 24 {
                    eyre::bail!("CSV row {}: hour must be in 0..24", idx + 2);
                }
                if row.minute >= 60 {
                    eyre::bail!("CSV row {}: minute must be in 0..60", idx + 2);
                }
                if row.slot >= slot_count {
                    eyre::bail!(
                        "CSV row {}: slot {} is not configured ({} slots)",
                        idx + 2,
                        row.slot,
                        slot_count
                    );
                }
                rows.push(row);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    Ok(rows)
}
