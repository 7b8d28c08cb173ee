//! Property checks over the pure pieces: time parsing and the scheduler.

use dispenser_core::{ScheduleEntry, Scheduler, parse_hhmm};
use proptest::prelude::*;

proptest! {
    #[test]
    fn parse_hhmm_never_panics(s in ".{0,32}") {
        let _ = parse_hhmm(&s);
    }

    #[test]
    fn parsed_times_are_always_in_range(s in ".{0,16}") {
        if let Some((h, m)) = parse_hhmm(&s) {
            prop_assert!(h < 24);
            prop_assert!(m < 60);
        }
    }

    #[test]
    fn well_formed_times_round_trip(h in 0u8..24, m in 0u8..60) {
        prop_assert_eq!(parse_hhmm(&format!("{h:02}:{m:02}")), Some((h, m)));
        prop_assert_eq!(parse_hhmm(&format!("{h}:{m}")), Some((h, m)));
    }

    #[test]
    fn out_of_range_times_are_rejected(h in 24u8.., m in 60u8..) {
        prop_assert_eq!(parse_hhmm(&format!("{h:02}:00")), None);
        prop_assert_eq!(parse_hhmm(&format!("00:{m:02}")), None);
    }

    #[test]
    fn scheduler_fires_each_entry_at_most_once_per_minute(
        entries in prop::collection::vec(
            (0u8..24, 0u8..60, 0usize..4, any::<bool>()),
            0..8,
        ),
        hour in 0u8..24,
        minute in 0u8..60,
        polls in 1usize..5,
    ) {
        let table: Vec<ScheduleEntry> = entries
            .iter()
            .map(|&(h, m, slot, enabled)| ScheduleEntry::new(h, m, slot, enabled))
            .collect();
        let matching = table
            .iter()
            .filter(|e| e.enabled && e.hour == hour && e.minute == minute)
            .count();

        let mut s = Scheduler::new(table);
        let first = s.due_slots(hour, minute);
        prop_assert_eq!(first.len(), matching);
        // Re-polling the same minute never re-fires.
        for _ in 1..polls {
            prop_assert!(s.due_slots(hour, minute).is_empty());
        }
    }

    #[test]
    fn scheduler_rearms_after_leaving_the_minute(h in 0u8..23) {
        let mut s = Scheduler::new(vec![ScheduleEntry::new(h, 0, 0, true)]);
        prop_assert_eq!(s.due_slots(h, 0).len(), 1);
        prop_assert!(s.due_slots(h, 1).is_empty());
        prop_assert_eq!(s.due_slots(h, 0).len(), 1);
    }
}
