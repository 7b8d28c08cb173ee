//! Terminal outcomes and observable phases of a dispense cycle.

/// Terminal result of one dispense invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispenseOutcome {
    /// Drop confirmed and the pill was retrieved from the outlet tray.
    Taken,
    /// Drop confirmed but the outlet cycle never completed.
    NotTaken,
    /// No drop confirmation across the full retry budget.
    Failed,
}

/// Where the cycle currently is. Readable between calls; a finished
/// machine is always back at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispensePhase {
    #[default]
    Idle,
    /// Motion plus drop detection, 1-based attempt counter.
    Dispensing { attempt: u32 },
    /// Drop confirmed, waiting for the outlet cycle.
    AwaitingPickup,
}

/// Caretaker-facing alert conditions with stable remote event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    DispenseFailed,
    PillNotTaken,
}

impl AlertKind {
    /// Event name as seen by remote transports. Stable; external
    /// integrations key on these strings.
    pub fn event_name(self) -> &'static str {
        match self {
            AlertKind::DispenseFailed => "dispense_failed",
            AlertKind::PillNotTaken => "pill_not_taken",
        }
    }
}
