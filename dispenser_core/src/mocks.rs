//! Simple helper mocks for tests and examples.

use dispenser_traits::{Actuator, DigitalInput, TextDisplay};

/// Actuator that accepts every move silently.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopActuator;

impl Actuator for NoopActuator {
    fn move_to(&mut self, _degrees: f32) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// Input pinned to a constant level.
#[derive(Debug, Clone, Copy)]
pub struct ConstInput(pub bool);

impl DigitalInput for ConstInput {
    fn is_active(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0)
    }
}

/// Two-row display that swallows writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl TextDisplay for NullDisplay {
    fn rows(&self) -> usize {
        2
    }

    fn write_row(
        &mut self,
        _row: usize,
        _text: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}
