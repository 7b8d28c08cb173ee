//! Time-of-day helpers for the idle screen.

/// Greeting shown under the clock while the machine is idle.
pub fn greeting_for_hour(hour: u8) -> &'static str {
    match hour {
        5..=11 => "Good Morning",
        12..=16 => "Good Afternoon",
        17..=20 => "Good Evening",
        _ => "Good Night",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_bands() {
        assert_eq!(greeting_for_hour(5), "Good Morning");
        assert_eq!(greeting_for_hour(11), "Good Morning");
        assert_eq!(greeting_for_hour(12), "Good Afternoon");
        assert_eq!(greeting_for_hour(16), "Good Afternoon");
        assert_eq!(greeting_for_hour(17), "Good Evening");
        assert_eq!(greeting_for_hour(20), "Good Evening");
        assert_eq!(greeting_for_hour(21), "Good Night");
        assert_eq!(greeting_for_hour(0), "Good Night");
        assert_eq!(greeting_for_hour(4), "Good Night");
    }
}
