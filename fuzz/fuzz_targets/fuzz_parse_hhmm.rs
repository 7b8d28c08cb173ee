#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // "HH:MM" parsing must never panic, and anything it accepts must be
    // a valid wall-clock time.
    if let Some((hour, minute)) = dispenser_core::parse_hhmm(data) {
        assert!(hour < 24);
        assert!(minute < 60);
    }
});
