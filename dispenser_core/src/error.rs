use thiserror::Error;

/// Core error taxonomy. Hardware failures are stringly-typed at this level;
/// the `hardware-errors` feature maps backend errors onto the precise
/// variants before they surface here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispenserError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("hardware timeout: {0}")]
    HardwareTimeout(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

/// Construction-time errors from the builder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("no actuators were provided")]
    MissingActuators,
    #[error("no vibration sensor was provided")]
    MissingVibrationSensor,
    #[error("no outlet sensor was provided")]
    MissingOutletSensor,
    #[error("a display is required")]
    MissingDisplay,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = eyre::Result<T>;
