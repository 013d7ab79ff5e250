// Shuttlers Recording Sink
// Keeps every action in memory; used by tests and dry runs

use std::fmt;

use super::EffectorSink;
use crate::command::CommandTable;
use crate::Key;

/// One action received by a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkAction {
    Key { key: Key, pressed: bool },
    PointerButton { button: u8, pressed: bool },
    PointerButtonToTargetWindow { button: u8, pressed: bool },
    Command { index: usize, value: i32 },
    Flush,
}

impl fmt::Display for SinkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let polarity = |pressed: bool| if pressed { "press" } else { "release" };
        match self {
            SinkAction::Key { key, pressed } => write!(f, "key {} {}", key, polarity(*pressed)),
            SinkAction::PointerButton { button, pressed } => {
                write!(f, "button {} {}", button, polarity(*pressed))
            }
            SinkAction::PointerButtonToTargetWindow { button, pressed } => {
                write!(f, "target-button {} {}", button, polarity(*pressed))
            }
            SinkAction::Command { index, value } => write!(f, "command #{} value={}", index, value),
            SinkAction::Flush => write!(f, "flush"),
        }
    }
}

/// Sink that records actions instead of injecting them.
///
/// A `logging()` recorder writes each action to the log at info level
/// instead of keeping it. An attached command table runs commands for real.
#[derive(Debug, Default)]
pub struct RecordingSink {
    actions: Vec<SinkAction>,
    log_actions: bool,
    commands: Option<CommandTable>,
}

impl RecordingSink {
    /// Create a silent recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder that only logs actions
    pub fn logging() -> Self {
        Self {
            log_actions: true,
            ..Self::default()
        }
    }

    /// Run commands through this table as well as recording them
    pub fn with_commands(mut self, commands: CommandTable) -> Self {
        self.commands = Some(commands);
        self
    }

    /// Actions recorded so far
    pub fn actions(&self) -> &[SinkAction] {
        &self.actions
    }

    /// Take the recorded actions, leaving the recorder empty
    pub fn take(&mut self) -> Vec<SinkAction> {
        std::mem::take(&mut self.actions)
    }

    fn record(&mut self, action: SinkAction) {
        if self.log_actions {
            log::info!("{}", action);
        } else {
            self.actions.push(action);
        }
    }
}

impl EffectorSink for RecordingSink {
    fn emit_key(&mut self, key: Key, pressed: bool) {
        self.record(SinkAction::Key { key, pressed });
    }

    fn emit_pointer_button(&mut self, button: u8, pressed: bool) {
        self.record(SinkAction::PointerButton { button, pressed });
    }

    fn emit_pointer_button_to_target_window(&mut self, button: u8, pressed: bool) {
        self.record(SinkAction::PointerButtonToTargetWindow { button, pressed });
    }

    fn invoke_command(&mut self, index: usize, value: i32) {
        self.record(SinkAction::Command { index, value });
        if let Some(commands) = self.commands.as_mut() {
            commands.invoke(index, value);
        }
    }

    fn flush(&mut self) {
        self.record(SinkAction::Flush);
    }
}
