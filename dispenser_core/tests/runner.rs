//! Control loop ticks: scheduler firing, remote commands, disabled mode.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use dispenser_core::{
    DetectionCfg, DeviceState, Dispenser, FeedbackCfg, LoopCfg, MotionCfg, ScheduleEntry,
    Scheduler, command_channel,
};
use dispenser_traits::clock::test_clock::TestClock;
use dispenser_traits::{Actuator, DigitalInput, TextDisplay, WallClock};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
struct SpyActuator {
    moves: Rc<RefCell<Vec<f32>>>,
}

impl Actuator for SpyActuator {
    fn move_to(&mut self, degrees: f32) -> Result<(), BoxError> {
        self.moves.borrow_mut().push(degrees);
        Ok(())
    }
}

struct ConstInput(bool);

impl DigitalInput for ConstInput {
    fn is_active(&mut self) -> Result<bool, BoxError> {
        Ok(self.0)
    }
}

/// Outlet that reports the pill present once, then gone.
struct QuickPickup {
    polls: u32,
}

impl DigitalInput for QuickPickup {
    fn is_active(&mut self) -> Result<bool, BoxError> {
        self.polls += 1;
        Ok(self.polls == 1)
    }
}

#[derive(Clone)]
struct SpyDisplay {
    rows: Rc<RefCell<Vec<(usize, String)>>>,
}

impl TextDisplay for SpyDisplay {
    fn rows(&self) -> usize {
        2
    }
    fn write_row(&mut self, row: usize, text: &str) -> Result<(), BoxError> {
        self.rows.borrow_mut().push((row, text.to_string()));
        Ok(())
    }
}

/// Scripted wall clock; repeats the last time once exhausted.
struct FakeRtc {
    times: RefCell<Vec<(u8, u8, u8)>>,
    pos: RefCell<usize>,
}

impl FakeRtc {
    fn new(times: &[(u8, u8, u8)]) -> Self {
        Self {
            times: RefCell::new(times.to_vec()),
            pos: RefCell::new(0),
        }
    }
}

impl WallClock for FakeRtc {
    fn now_hms(&self) -> (u8, u8, u8) {
        let times = self.times.borrow();
        let mut pos = self.pos.borrow_mut();
        let i = (*pos).min(times.len() - 1);
        *pos += 1;
        times[i]
    }
}

struct Rig {
    dispenser: Dispenser,
    moves: Rc<RefCell<Vec<f32>>>,
    screens: Rc<RefCell<Vec<(usize, String)>>>,
}

fn rig() -> Rig {
    let moves = Rc::new(RefCell::new(Vec::new()));
    let screens = Rc::new(RefCell::new(Vec::new()));
    let dispenser = Dispenser::builder()
        .with_actuators(vec![
            SpyActuator {
                moves: Rc::clone(&moves),
            },
            SpyActuator {
                moves: Rc::clone(&moves),
            },
        ])
        .with_vibration_sensor(ConstInput(true))
        .with_outlet_sensor(QuickPickup { polls: 0 })
        .with_display(SpyDisplay {
            rows: Rc::clone(&screens),
        })
        .with_detection(DetectionCfg {
            max_retries: 2,
            vibration_timeout_ms: 300,
            vibration_confirm_count: 1,
            vibration_poll_ms: 30,
            pickup_timeout_ms: 600,
            outlet_poll_ms: 120,
        })
        .with_motion(MotionCfg { settle_ms: 50 })
        .with_feedback(FeedbackCfg {
            message_hold_ms: 100,
            display_width: 16,
        })
        .with_clock(Arc::new(TestClock::new()))
        .try_build()
        .expect("build dispenser");
    Rig {
        dispenser,
        moves,
        screens,
    }
}

fn loop_cfg() -> LoopCfg {
    LoopCfg {
        poll_ms: 100,
        idle_hold_ms: 100,
    }
}

fn motion_cycles(moves: &Rc<RefCell<Vec<f32>>>) -> usize {
    // Each dispense contributes 3 moves per cycle plus one park.
    moves.borrow().len()
}

#[test]
fn schedule_fires_once_per_matching_minute() {
    let mut r = rig();
    let mut state = DeviceState::new(Scheduler::new(vec![ScheduleEntry::new(8, 0, 0, true)]));
    let (_ep, queue) = command_channel();
    // Approach the minute, three polls inside 08:00, then the next minute.
    let rtc = FakeRtc::new(&[(7, 59, 59), (8, 0, 0), (8, 0, 20), (8, 0, 40), (8, 1, 0)]);

    for _ in 0..5 {
        r.dispenser
            .run_once(&mut state, &rtc, &queue, &loop_cfg())
            .expect("tick");
    }
    // Exactly one dispense: one motion cycle plus the park.
    assert_eq!(motion_cycles(&r.moves), 4);
}

#[test]
fn schedule_rearms_on_the_next_day() {
    let mut r = rig();
    let mut state = DeviceState::new(Scheduler::new(vec![ScheduleEntry::new(8, 0, 0, true)]));
    let (_ep, queue) = command_channel();
    let rtc = FakeRtc::new(&[(8, 0, 0), (8, 1, 0), (8, 0, 0)]);

    for _ in 0..3 {
        r.dispenser
            .run_once(&mut state, &rtc, &queue, &loop_cfg())
            .expect("tick");
    }
    assert_eq!(motion_cycles(&r.moves), 8, "two full dispenses expected");
}

#[test]
fn two_entries_on_the_same_minute_both_fire() {
    let mut r = rig();
    let mut state = DeviceState::new(Scheduler::new(vec![
        ScheduleEntry::new(20, 0, 0, true),
        ScheduleEntry::new(20, 0, 1, true),
    ]));
    let (_ep, queue) = command_channel();
    let rtc = FakeRtc::new(&[(20, 0, 5)]);

    r.dispenser
        .run_once(&mut state, &rtc, &queue, &loop_cfg())
        .expect("tick");
    assert_eq!(motion_cycles(&r.moves), 8, "both slots dispense");
}

#[test]
fn manual_dispense_runs_on_the_next_tick() {
    let mut r = rig();
    let mut state = DeviceState::new(Scheduler::default());
    let (ep, queue) = command_channel();
    let rtc = FakeRtc::new(&[(12, 30, 0)]);

    ep.manual_dispense(1);
    r.dispenser
        .run_once(&mut state, &rtc, &queue, &loop_cfg())
        .expect("tick");
    assert_eq!(motion_cycles(&r.moves), 4);
}

#[test]
fn manual_dispense_while_disabled_is_inert() {
    let mut r = rig();
    let mut state = DeviceState::new(Scheduler::default());
    state.enabled = false;
    let (ep, queue) = command_channel();
    let rtc = FakeRtc::new(&[(12, 30, 0)]);

    ep.manual_dispense(0);
    r.dispenser
        .run_once(&mut state, &rtc, &queue, &loop_cfg())
        .expect("tick");
    assert!(r.moves.borrow().is_empty(), "no motion while disabled");
    // Only the disabled screen was shown.
    let screens = r.screens.borrow();
    assert!(
        screens
            .iter()
            .any(|(_, text)| text.starts_with("System Disabled"))
    );
}

#[test]
fn disabled_mode_suppresses_the_scheduler() {
    let mut r = rig();
    let mut state = DeviceState::new(Scheduler::new(vec![ScheduleEntry::new(8, 0, 0, true)]));
    let (ep, queue) = command_channel();
    let rtc = FakeRtc::new(&[(8, 0, 0), (8, 0, 30)]);

    ep.set_enabled(false);
    for _ in 0..2 {
        r.dispenser
            .run_once(&mut state, &rtc, &queue, &loop_cfg())
            .expect("tick");
    }
    assert!(!state.enabled);
    assert!(r.moves.borrow().is_empty());
}

#[test]
fn commands_apply_in_arrival_order() {
    let mut r = rig();
    let mut state = DeviceState::new(Scheduler::default());
    let (ep, queue) = command_channel();
    let rtc = FakeRtc::new(&[(12, 0, 0)]);

    // Disable, try to dispense, re-enable: the dispense lands while the
    // system is disabled and must be dropped.
    ep.set_enabled(false);
    ep.manual_dispense(0);
    ep.set_enabled(true);
    r.dispenser
        .run_once(&mut state, &rtc, &queue, &loop_cfg())
        .expect("tick");
    assert!(state.enabled);
    assert!(r.moves.borrow().is_empty());
}

#[test]
fn remote_schedule_update_moves_the_dose() {
    let mut r = rig();
    let mut state = DeviceState::new(Scheduler::new(vec![ScheduleEntry::new(8, 0, 0, true)]));
    let (ep, queue) = command_channel();
    let rtc = FakeRtc::new(&[(9, 30, 0), (9, 30, 20)]);

    assert!(ep.set_schedule(0, "09:30"));
    r.dispenser
        .run_once(&mut state, &rtc, &queue, &loop_cfg())
        .expect("tick");
    assert_eq!(motion_cycles(&r.moves), 4, "fires at the new time");
    r.dispenser
        .run_once(&mut state, &rtc, &queue, &loop_cfg())
        .expect("tick");
    assert_eq!(motion_cycles(&r.moves), 4, "still once per minute");
}

#[test]
fn repeated_schedule_update_does_not_double_dose() {
    let mut r = rig();
    let mut state = DeviceState::new(Scheduler::new(vec![ScheduleEntry::new(8, 0, 0, true)]));
    let (ep, queue) = command_channel();
    let rtc = FakeRtc::new(&[(8, 0, 0), (8, 0, 30)]);

    r.dispenser
        .run_once(&mut state, &rtc, &queue, &loop_cfg())
        .expect("tick");
    assert_eq!(motion_cycles(&r.moves), 4);
    // A transport retransmitting the current time must not re-arm the
    // minute that already dispensed.
    assert!(ep.set_schedule(0, "08:00"));
    r.dispenser
        .run_once(&mut state, &rtc, &queue, &loop_cfg())
        .expect("tick");
    assert_eq!(motion_cycles(&r.moves), 4, "duplicate update is not another dose");
}

#[test]
fn malformed_schedule_update_keeps_the_old_time() {
    let mut r = rig();
    let mut state = DeviceState::new(Scheduler::new(vec![ScheduleEntry::new(8, 0, 0, true)]));
    let (ep, queue) = command_channel();
    let rtc = FakeRtc::new(&[(8, 0, 0)]);

    assert!(!ep.set_schedule(0, "25:99"));
    assert!(!ep.set_schedule(0, "soon"));
    r.dispenser
        .run_once(&mut state, &rtc, &queue, &loop_cfg())
        .expect("tick");
    // The 08:00 entry is untouched and fires normally.
    assert_eq!(motion_cycles(&r.moves), 4);
}

#[test]
fn idle_screen_shows_clock_and_greeting() {
    let mut r = rig();
    let mut state = DeviceState::new(Scheduler::default());
    let (_ep, queue) = command_channel();
    let rtc = FakeRtc::new(&[(7, 15, 42)]);

    r.dispenser
        .run_once(&mut state, &rtc, &queue, &loop_cfg())
        .expect("tick");
    let screens = r.screens.borrow();
    assert!(
        screens
            .iter()
            .any(|(row, text)| *row == 0 && text.starts_with("Time 07:15:42"))
    );
    assert!(
        screens
            .iter()
            .any(|(row, text)| *row == 1 && text.starts_with("Good Morning"))
    );
}
