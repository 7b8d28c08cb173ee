use crate::error::DispenserError;

/// Map a boxed backend error onto the core taxonomy.
///
/// With the `hardware-errors` feature the backend's typed errors keep
/// their identity (fault vs timeout); without it everything collapses to
/// the generic `Hardware` variant.
#[cfg(feature = "hardware-errors")]
pub(crate) fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> DispenserError {
    use dispenser_hardware::HwError;
    if let Some(hw) = e.downcast_ref::<HwError>() {
        return match hw {
            HwError::Timeout(m) => DispenserError::HardwareTimeout(m.clone()),
            HwError::Gpio(m) | HwError::Bus(m) => DispenserError::HardwareFault(m.clone()),
        };
    }
    DispenserError::Hardware(e.to_string())
}

#[cfg(not(feature = "hardware-errors"))]
pub(crate) fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> DispenserError {
    DispenserError::Hardware(e.to_string())
}
