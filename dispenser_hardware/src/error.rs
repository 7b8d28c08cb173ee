use thiserror::Error;

/// Typed hardware backend errors. The core maps these onto its own
/// taxonomy when the `hardware-errors` feature is on.
#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio: {0}")]
    Gpio(String),
    #[error("bus: {0}")]
    Bus(String),
    #[error("timeout: {0}")]
    Timeout(String),
}
