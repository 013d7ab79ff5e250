// Shuttlers Commands
// Handlers behind `Command(index)` bindings

use std::fmt;
use std::process::{Child, Command as Process, Stdio};

/// A named action run by a `Command` binding.
///
/// Commands receive every event for their control with its polarity value
/// (1 press, 0 release, +1/-1 for axis steps) and decide themselves what to
/// act on. They are responsible for their own output; the translator does
/// not flush after them.
pub trait Command: fmt::Debug + Send {
    /// Name used in the configuration
    fn name(&self) -> &str;

    /// Handle one event
    fn run(&mut self, value: i32);

    /// Collect finished background work; called before every dispatch.
    fn reap(&mut self) {}
}

/// Writes a fixed message to stdout on press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintCommand {
    name: String,
    message: String,
}

impl PrintCommand {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Command for PrintCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, value: i32) {
        if value != 0 {
            println!("{}", self.message);
        }
    }
}

/// Launches a program on press without waiting for it.
#[derive(Debug)]
pub struct SpawnCommand {
    name: String,
    program: String,
    args: Vec<String>,
    children: Vec<Child>,
}

impl SpawnCommand {
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            children: Vec::new(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Children still running
    pub fn running(&self) -> usize {
        self.children.len()
    }
}

impl Command for SpawnCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, value: i32) {
        if value == 0 {
            return;
        }

        match Process::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                log::debug!("command '{}' started pid {}", self.name, child.id());
                self.children.push(child);
            }
            Err(e) => log::warn!("command '{}' failed to start {}: {}", self.name, self.program, e),
        }
    }

    fn reap(&mut self) {
        self.children
            .retain_mut(|child| matches!(child.try_wait(), Ok(None)));
    }
}

impl Drop for SpawnCommand {
    fn drop(&mut self) {
        self.reap();
    }
}

/// Commands addressed by index, in configuration order.
#[derive(Debug, Default)]
pub struct CommandTable {
    commands: Vec<Box<dyn Command>>,
}

impl CommandTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command and return its index
    pub fn push(&mut self, command: Box<dyn Command>) -> usize {
        self.commands.push(command);
        self.commands.len() - 1
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Index of the command with this name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.commands.iter().position(|c| c.name() == name)
    }

    /// Name of the command at `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.commands.get(index).map(|c| c.name())
    }

    /// Collect finished background work of every command
    pub fn reap(&mut self) {
        for command in &mut self.commands {
            command.reap();
        }
    }

    /// Run the command at `index`; returns false if there is none.
    ///
    /// Binding tables are validated against the command count at load, so a
    /// miss here means the table and the commands came from different configs.
    pub fn invoke(&mut self, index: usize, value: i32) -> bool {
        self.reap();
        match self.commands.get_mut(index) {
            Some(command) => {
                log::debug!("command '{}' value={}", command.name(), value);
                command.run(value);
                true
            }
            None => {
                log::warn!("command index {} not configured", index);
                false
            }
        }
    }
}

impl FromIterator<Box<dyn Command>> for CommandTable {
    fn from_iter<I: IntoIterator<Item = Box<dyn Command>>>(iter: I) -> Self {
        Self {
            commands: iter.into_iter().collect(),
        }
    }
}
