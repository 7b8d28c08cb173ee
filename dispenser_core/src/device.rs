//! Device-wide mutable state, threaded explicitly through entry points
//! instead of living in globals.

use crate::schedule::Scheduler;

pub struct DeviceState {
    /// Master enable. Only the remote surface flips it; while false the
    /// machine refuses every dispense and the scheduler is not consulted.
    pub enabled: bool,
    pub scheduler: Scheduler,
}

impl DeviceState {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            enabled: true,
            scheduler,
        }
    }
}
