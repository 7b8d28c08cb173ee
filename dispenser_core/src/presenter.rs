//! Patient- and caretaker-facing feedback: display, remote channel,
//! buzzer and LEDs.
//!
//! Everything here is best-effort. A dead display or an offline remote
//! channel must never abort a dispense, so failures are logged and
//! swallowed instead of propagated.

use std::sync::Arc;
use std::time::Duration;

use dispenser_traits::{Annunciator, Clock, RemoteChannel, TextDisplay};

use crate::config::FeedbackCfg;
use crate::outcome::AlertKind;

pub struct FeedbackPresenter {
    display: Box<dyn TextDisplay>,
    remote: Option<Box<dyn RemoteChannel>>,
    annunciator: Option<Box<dyn Annunciator>>,
    clock: Arc<dyn Clock + Send + Sync>,
    width: usize,
    hold: Duration,
    // Last text committed per row, truncated to the display width.
    // Rewriting identical text causes visible flicker on character LCDs.
    last: [String; 2],
}

impl FeedbackPresenter {
    pub fn new(
        display: Box<dyn TextDisplay>,
        remote: Option<Box<dyn RemoteChannel>>,
        annunciator: Option<Box<dyn Annunciator>>,
        clock: Arc<dyn Clock + Send + Sync>,
        cfg: &FeedbackCfg,
    ) -> Self {
        Self {
            display,
            remote,
            annunciator,
            clock,
            width: cfg.display_width,
            hold: Duration::from_millis(cfg.message_hold_ms),
            last: [String::new(), String::new()],
        }
    }

    /// Show a two-line screen and dwell for the default message hold.
    pub fn show(&mut self, line1: &str, line2: &str) {
        let hold = self.hold;
        self.show_for(line1, line2, hold);
    }

    /// Show a two-line screen and dwell for `hold`. Rows whose visible
    /// text is unchanged are not rewritten.
    pub fn show_for(&mut self, line1: &str, line2: &str, hold: Duration) {
        self.render_row(0, line1);
        self.render_row(1, line2);
        self.clock.sleep(hold);
    }

    fn render_row(&mut self, row: usize, text: &str) {
        let fitted: String = text.chars().take(self.width).collect();
        if self.last[row] == fitted {
            return;
        }
        let padded = format!("{fitted:<width$}", width = self.width);
        match self.display.write_row(row, &padded) {
            Ok(()) => self.last[row] = fitted,
            Err(e) => tracing::warn!(row, error = %e, "display write failed"),
        }
    }

    /// Replace the remote status line.
    pub fn status(&mut self, msg: &str) {
        tracing::info!(status = msg);
        if let Some(remote) = self.remote.as_mut()
            && let Err(e) = remote.status(msg)
        {
            tracing::warn!(error = %e, "remote status update failed");
        }
    }

    /// Append to the remote event log.
    pub fn log_event(&mut self, msg: &str) {
        tracing::info!(event = msg);
        if let Some(remote) = self.remote.as_mut()
            && let Err(e) = remote.log_event(msg)
        {
            tracing::warn!(error = %e, "remote log append failed");
        }
    }

    /// Raise a named caretaker alert. Emitted exactly once per call site;
    /// the retry loop funnels all its attempts into a single alert.
    pub fn alert(&mut self, kind: AlertKind, msg: &str) {
        tracing::error!(event = kind.event_name(), alert = msg);
        if let Some(remote) = self.remote.as_mut()
            && let Err(e) = remote.alert(kind.event_name(), msg)
        {
            tracing::warn!(error = %e, "remote alert delivery failed");
        }
    }

    pub fn beep(&mut self, times: u8, pulse_ms: u64) {
        if let Some(ann) = self.annunciator.as_mut()
            && let Err(e) = ann.beep(times, pulse_ms)
        {
            tracing::warn!(error = %e, "buzzer failed");
        }
    }

    pub fn set_leds(&mut self, green: bool, red: bool) {
        if let Some(ann) = self.annunciator.as_mut()
            && let Err(e) = ann.set_leds(green, red)
        {
            tracing::warn!(error = %e, "led update failed");
        }
    }
}
