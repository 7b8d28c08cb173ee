//! Construction-time validation.

use dispenser_core::mocks::{ConstInput, NoopActuator, NullDisplay};
use dispenser_core::{BuildError, DetectionCfg, Dispenser, FeedbackCfg, MotionCfg, Slot};
use dispenser_traits::TextDisplay;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

struct OneRowDisplay;

impl TextDisplay for OneRowDisplay {
    fn rows(&self) -> usize {
        1
    }
    fn write_row(&mut self, _row: usize, _text: &str) -> Result<(), BoxError> {
        Ok(())
    }
}

#[test]
fn builds_with_defaults() {
    let d = Dispenser::builder()
        .with_actuators(vec![NoopActuator, NoopActuator])
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .with_display(NullDisplay)
        .try_build()
        .expect("defaults should build");
    assert_eq!(d.slot_count(), 2);
}

#[test]
fn rejects_empty_actuator_list() {
    let err = Dispenser::builder()
        .with_actuators(Vec::<NoopActuator>::new())
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .with_display(NullDisplay)
        .try_build()
        .expect_err("no actuators");
    assert_eq!(err, BuildError::MissingActuators);
}

#[test]
fn rejects_missing_display() {
    let err = Dispenser::builder()
        .with_actuators(vec![NoopActuator])
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .try_build()
        .expect_err("no display");
    assert_eq!(err, BuildError::MissingDisplay);
}

#[test]
fn rejects_single_row_display() {
    let err = Dispenser::builder()
        .with_actuators(vec![NoopActuator])
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .with_display(OneRowDisplay)
        .try_build()
        .expect_err("one row");
    assert!(matches!(err, BuildError::InvalidConfig(_)));
}

#[test]
fn rejects_slot_actuator_count_mismatch() {
    let err = Dispenser::builder()
        .with_actuators(vec![NoopActuator])
        .with_slots(vec![Slot::new(0), Slot::new(1)])
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .with_display(NullDisplay)
        .try_build()
        .expect_err("mismatch");
    assert!(matches!(err, BuildError::InvalidConfig(_)));
}

#[test]
fn rejects_out_of_order_slot_indices() {
    let err = Dispenser::builder()
        .with_actuators(vec![NoopActuator, NoopActuator])
        .with_slots(vec![Slot::new(1), Slot::new(0)])
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .with_display(NullDisplay)
        .try_build()
        .expect_err("bad indices");
    assert!(matches!(err, BuildError::InvalidConfig(_)));
}

#[test]
fn rejects_out_of_range_setpoint() {
    let mut slot = Slot::new(0);
    slot.dispense_deg = 540.0;
    let err = Dispenser::builder()
        .with_actuators(vec![NoopActuator])
        .with_slots(vec![slot])
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .with_display(NullDisplay)
        .try_build()
        .expect_err("540 degrees");
    assert!(matches!(err, BuildError::InvalidConfig(_)));
}

#[test]
fn rejects_zero_retry_budget() {
    let err = Dispenser::builder()
        .with_actuators(vec![NoopActuator])
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .with_display(NullDisplay)
        .with_detection(DetectionCfg {
            max_retries: 0,
            ..DetectionCfg::default()
        })
        .try_build()
        .expect_err("zero retries");
    assert!(matches!(err, BuildError::InvalidConfig(_)));
}

#[test]
fn rejects_poll_longer_than_its_window() {
    let err = Dispenser::builder()
        .with_actuators(vec![NoopActuator])
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .with_display(NullDisplay)
        .with_detection(DetectionCfg {
            vibration_poll_ms: 5000,
            ..DetectionCfg::default()
        })
        .try_build()
        .expect_err("poll 5s, window 2s");
    assert!(matches!(err, BuildError::InvalidConfig(_)));
}

#[test]
fn rejects_streak_that_cannot_fit_the_window() {
    // 100 confirming reads 30 ms apart can never land inside 2000 ms.
    let err = Dispenser::builder()
        .with_actuators(vec![NoopActuator])
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .with_display(NullDisplay)
        .with_detection(DetectionCfg {
            vibration_confirm_count: 100,
            ..DetectionCfg::default()
        })
        .try_build()
        .expect_err("unsatisfiable debounce");
    assert!(matches!(err, BuildError::InvalidConfig(_)));
}

#[test]
fn rejects_zero_settle_and_zero_width() {
    let err = Dispenser::builder()
        .with_actuators(vec![NoopActuator])
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .with_display(NullDisplay)
        .with_motion(MotionCfg { settle_ms: 0 })
        .try_build()
        .expect_err("zero settle");
    assert!(matches!(err, BuildError::InvalidConfig(_)));

    let err = Dispenser::builder()
        .with_actuators(vec![NoopActuator])
        .with_vibration_sensor(ConstInput(false))
        .with_outlet_sensor(ConstInput(false))
        .with_display(NullDisplay)
        .with_feedback(FeedbackCfg {
            message_hold_ms: 2000,
            display_width: 0,
        })
        .try_build()
        .expect_err("zero width");
    assert!(matches!(err, BuildError::InvalidConfig(_)));
}
