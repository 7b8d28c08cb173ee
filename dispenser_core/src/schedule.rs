//! Wall-clock dispense schedule with edge-triggered re-arming.

/// One schedule line: fire `slot` when the wall clock reads hour:minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub hour: u8,
    pub minute: u8,
    pub slot: usize,
    pub enabled: bool,
    // True while the wall clock sits on the matching minute and the entry
    // already fired; cleared the moment the minute moves on.
    triggered: bool,
}

impl ScheduleEntry {
    pub fn new(hour: u8, minute: u8, slot: usize, enabled: bool) -> Self {
        Self {
            hour,
            minute,
            slot,
            enabled,
            triggered: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scheduler {
    entries: Vec<ScheduleEntry>,
}

impl Scheduler {
    pub fn new(entries: Vec<ScheduleEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Slots due at the given wall-clock time, in table order.
    ///
    /// An entry fires at most once per matching minute, however often the
    /// loop polls; moving off the minute re-arms it. Duplicate entries on
    /// the same time each fire independently.
    pub fn due_slots(&mut self, hour: u8, minute: u8) -> Vec<usize> {
        let mut due = Vec::new();
        for e in &mut self.entries {
            if e.enabled && e.hour == hour && e.minute == minute {
                if !e.triggered {
                    e.triggered = true;
                    due.push(e.slot);
                }
            } else {
                e.triggered = false;
            }
        }
        due
    }

    /// Remote schedule update. Re-enables the entry; moving it to a new
    /// time also clears its trigger latch so the new minute can fire.
    /// Repeating the current time is idempotent: a minute that already
    /// dispensed stays latched, so duplicate commands never double a dose.
    /// Returns false (keeping the previous time) for unknown entries or
    /// out-of-range values.
    pub fn set_time(&mut self, entry: usize, hour: u8, minute: u8) -> bool {
        match self.entries.get_mut(entry) {
            Some(e) if hour < 24 && minute < 60 => {
                if (e.hour, e.minute) != (hour, minute) {
                    e.triggered = false;
                }
                e.hour = hour;
                e.minute = minute;
                e.enabled = true;
                tracing::info!(entry, hour, minute, "schedule entry updated");
                true
            }
            Some(_) => {
                tracing::warn!(
                    entry,
                    hour,
                    minute,
                    "schedule update out of range, keeping previous time"
                );
                false
            }
            None => {
                tracing::warn!(entry, "schedule update for unknown entry");
                false
            }
        }
    }
}
