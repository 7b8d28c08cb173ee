/// One independently actuated pill compartment and its servo setpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Zero-based position in the slot table; matches the actuator index.
    pub index: usize,
    /// Resting position (degrees).
    pub home_deg: f32,
    /// Release position (degrees).
    pub dispense_deg: f32,
    /// Intermediate position on the way back home (degrees).
    pub return_deg: f32,
}

impl Slot {
    /// Slot with the stock drum geometry: rest at 180, release at 0.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            home_deg: 180.0,
            dispense_deg: 0.0,
            return_deg: 180.0,
        }
    }

    /// Human-facing 1-based label used on the display and remote channel.
    pub fn label(&self) -> usize {
        self.index + 1
    }
}
