//! Remote operator surface.
//!
//! Transports (an MQTT bridge, a debug socket, a test harness) hold a
//! cloneable [`CommandEndpoint`] and push fire-and-forget commands into an
//! unbounded channel; the control loop drains them between ticks, so a
//! command arriving mid-dispense queues instead of interleaving.

use crossbeam_channel::{Receiver, Sender, unbounded};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Manual dispense of one slot.
    Dispense { slot: usize },
    /// Move a schedule entry to a new time.
    SetSchedule { entry: usize, hour: u8, minute: u8 },
    /// Master enable toggle.
    SetEnabled(bool),
    /// Transport (re)connected; the loop announces itself.
    ConnectivityRestored,
}

/// Transport-facing half. Sending never blocks; a command sent after the
/// loop is gone is logged and dropped.
#[derive(Debug, Clone)]
pub struct CommandEndpoint {
    tx: Sender<RemoteCommand>,
}

/// Control-loop half.
#[derive(Debug)]
pub struct CommandQueue {
    rx: Receiver<RemoteCommand>,
}

pub fn command_channel() -> (CommandEndpoint, CommandQueue) {
    let (tx, rx) = unbounded();
    (CommandEndpoint { tx }, CommandQueue { rx })
}

impl CommandQueue {
    /// Drain everything currently queued without blocking.
    pub fn drain(&self) -> Vec<RemoteCommand> {
        self.rx.try_iter().collect()
    }
}

impl CommandEndpoint {
    fn send(&self, cmd: RemoteCommand) {
        if self.tx.send(cmd).is_err() {
            tracing::warn!(?cmd, "control loop gone, dropping remote command");
        }
    }

    pub fn manual_dispense(&self, slot: usize) {
        tracing::debug!(slot, "remote: manual dispense");
        self.send(RemoteCommand::Dispense { slot });
    }

    pub fn set_enabled(&self, enabled: bool) {
        tracing::debug!(enabled, "remote: master enable");
        self.send(RemoteCommand::SetEnabled(enabled));
    }

    pub fn connectivity_restored(&self) {
        self.send(RemoteCommand::ConnectivityRestored);
    }

    /// Update a schedule entry from an "HH:MM" string. Malformed or
    /// out-of-range input is logged and dropped, keeping the previously
    /// configured time; returns whether the command was queued.
    pub fn set_schedule(&self, entry: usize, time: &str) -> bool {
        match parse_hhmm(time) {
            Some((hour, minute)) => {
                tracing::debug!(entry, hour, minute, "remote: schedule update");
                self.send(RemoteCommand::SetSchedule {
                    entry,
                    hour,
                    minute,
                });
                true
            }
            None => {
                tracing::warn!(entry, input = time, "ignoring malformed schedule time");
                false
            }
        }
    }

    /// Route a named transport command with a free-text payload. Returns
    /// false for unknown names or unparseable payloads.
    pub fn dispatch(&self, command: &str, payload: &str) -> bool {
        for (name, handler) in COMMANDS {
            if *name == command {
                return handler(self, payload);
            }
        }
        tracing::warn!(command, "unknown remote command");
        false
    }
}

/// Strict "HH:MM" parse: exactly one colon, decimal digits on both sides,
/// hour in 0..24, minute in 0..60.
pub fn parse_hhmm(s: &str) -> Option<(u8, u8)> {
    let (h, m) = s.trim().split_once(':')?;
    if h.is_empty()
        || m.is_empty()
        || !h.bytes().all(|b| b.is_ascii_digit())
        || !m.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let hour: u8 = h.parse().ok()?;
    let minute: u8 = m.parse().ok()?;
    (hour < 24 && minute < 60).then_some((hour, minute))
}

type Handler = fn(&CommandEndpoint, &str) -> bool;

// Named command table decoupling transports from the queue: a transport
// delivers (command, payload) strings and the table routes them.
const COMMANDS: &[(&str, Handler)] = &[
    ("dispense", handle_dispense),
    ("schedule", handle_schedule),
    ("enable", handle_enable),
    ("online", handle_online),
];

fn handle_dispense(ep: &CommandEndpoint, payload: &str) -> bool {
    match payload.trim().parse::<usize>() {
        Ok(slot) => {
            ep.manual_dispense(slot);
            true
        }
        Err(_) => {
            tracing::warn!(payload, "dispense command needs a slot number");
            false
        }
    }
}

// Payload: "<entry> HH:MM".
fn handle_schedule(ep: &CommandEndpoint, payload: &str) -> bool {
    let Some((entry, time)) = payload.trim().split_once(' ') else {
        tracing::warn!(payload, "schedule command needs '<entry> HH:MM'");
        return false;
    };
    let Ok(entry) = entry.parse::<usize>() else {
        tracing::warn!(payload, "schedule command needs a numeric entry");
        return false;
    };
    ep.set_schedule(entry, time)
}

fn handle_enable(ep: &CommandEndpoint, payload: &str) -> bool {
    match payload.trim() {
        "1" | "on" | "true" => {
            ep.set_enabled(true);
            true
        }
        "0" | "off" | "false" => {
            ep.set_enabled(false);
            true
        }
        other => {
            tracing::warn!(payload = other, "enable command needs on/off");
            false
        }
    }
}

fn handle_online(ep: &CommandEndpoint, _payload: &str) -> bool {
    ep.connectivity_restored();
    true
}
