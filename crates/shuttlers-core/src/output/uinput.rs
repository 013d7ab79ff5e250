// Shuttlers uinput Output Layer
// Virtual keyboard/pointer device that injects resolved actions

use evdev::uinput::VirtualDeviceBuilder;
use evdev::{AttributeSet, EventType, InputEvent, Key as EvKey, RelativeAxisType};

use super::EffectorSink;
use crate::command::CommandTable;
use crate::key::MAX_OUTPUT_KEY;
use crate::Key;

/// Name of the virtual device; the reader skips devices with this name.
pub const VIRTUAL_DEVICE_NAME: &str = "Shuttlers (virtual) Pointer";

/// Error types for uinput operations
#[derive(Debug, thiserror::Error)]
pub enum UInputError {
    #[error("Failed to create virtual device: {0}")]
    DeviceCreation(String),

    #[error("Failed to write event: {0}")]
    WriteError(String),
}

/// How an X-style pointer button number is expressed through uinput.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PointerOutput {
    Button(EvKey),
    Wheel { axis: RelativeAxisType, delta: i32 },
}

/// Map X button numbers: 1-3 left/middle/right, 4/5 wheel up/down,
/// 6/7 wheel left/right, 8/9 back/forward side buttons.
fn pointer_output(button: u8) -> Option<PointerOutput> {
    let output = match button {
        1 => PointerOutput::Button(EvKey::BTN_LEFT),
        2 => PointerOutput::Button(EvKey::BTN_MIDDLE),
        3 => PointerOutput::Button(EvKey::BTN_RIGHT),
        4 => PointerOutput::Wheel { axis: RelativeAxisType::REL_WHEEL, delta: 1 },
        5 => PointerOutput::Wheel { axis: RelativeAxisType::REL_WHEEL, delta: -1 },
        6 => PointerOutput::Wheel { axis: RelativeAxisType::REL_HWHEEL, delta: -1 },
        7 => PointerOutput::Wheel { axis: RelativeAxisType::REL_HWHEEL, delta: 1 },
        8 => PointerOutput::Button(EvKey::BTN_SIDE),
        9 => PointerOutput::Button(EvKey::BTN_EXTRA),
        _ => return None,
    };
    Some(output)
}

/// Events for one pointer button transition. Wheel "buttons" only scroll on
/// press, like X's buttons 4-7.
fn pointer_events(button: u8, pressed: bool) -> Option<Vec<InputEvent>> {
    match pointer_output(button)? {
        PointerOutput::Button(key) => Some(vec![InputEvent::new(
            EventType::KEY,
            key.code(),
            pressed as i32,
        )]),
        PointerOutput::Wheel { axis, delta } if pressed => {
            Some(vec![InputEvent::new(EventType::RELATIVE, axis.0, delta)])
        }
        PointerOutput::Wheel { .. } => Some(Vec::new()),
    }
}

/// Effector sink backed by a uinput virtual device.
///
/// Every action is written as its own SYN-terminated report, so the kernel
/// commits it immediately and `flush` has nothing left to do.
pub struct UInputSink {
    device: evdev::uinput::VirtualDevice,
    commands: CommandTable,
    pressed: Vec<u16>,
}

impl UInputSink {
    /// Create the virtual device
    pub fn new(commands: CommandTable) -> Result<Self, UInputError> {
        let mut keys = AttributeSet::new();
        for code in 1..=MAX_OUTPUT_KEY {
            keys.insert(EvKey::new(code));
        }
        for key in [
            EvKey::BTN_LEFT,
            EvKey::BTN_RIGHT,
            EvKey::BTN_MIDDLE,
            EvKey::BTN_SIDE,
            EvKey::BTN_EXTRA,
        ] {
            keys.insert(key);
        }

        let mut axes = AttributeSet::new();
        axes.insert(RelativeAxisType::REL_WHEEL);
        axes.insert(RelativeAxisType::REL_HWHEEL);

        let device = VirtualDeviceBuilder::new()
            .map_err(|e: std::io::Error| UInputError::DeviceCreation(e.to_string()))?
            .name(VIRTUAL_DEVICE_NAME)
            .with_keys(&keys)
            .map_err(|e: std::io::Error| UInputError::DeviceCreation(e.to_string()))?
            .with_relative_axes(&axes)
            .map_err(|e: std::io::Error| UInputError::DeviceCreation(e.to_string()))?
            .build()
            .map_err(|e: std::io::Error| UInputError::DeviceCreation(e.to_string()))?;

        Ok(Self {
            device,
            commands,
            pressed: Vec::new(),
        })
    }

    fn write(&mut self, events: &[InputEvent]) -> Result<(), UInputError> {
        if events.is_empty() {
            return Ok(());
        }
        let mut report = events.to_vec();
        // SYN event is required for the kernel to process the report
        report.push(InputEvent::new(EventType::SYNCHRONIZATION, 0, 0));
        self.device
            .emit(&report)
            .map_err(|e: std::io::Error| UInputError::WriteError(e.to_string()))
    }

    fn track(&mut self, code: u16, pressed: bool) {
        if pressed {
            if !self.pressed.contains(&code) {
                self.pressed.push(code);
            }
        } else {
            self.pressed.retain(|c| *c != code);
        }
    }

    fn write_pointer(&mut self, button: u8, pressed: bool) {
        let Some(events) = pointer_events(button, pressed) else {
            log::warn!("pointer button {} has no uinput equivalent", button);
            return;
        };
        if let Some(PointerOutput::Button(key)) = pointer_output(button) {
            self.track(key.code(), pressed);
        }
        if let Err(e) = self.write(&events) {
            log::warn!("Error sending pointer button {}: {}", button, e);
        }
    }

    /// Release every key and button this sink still holds down
    pub fn release_all(&mut self) -> Result<(), UInputError> {
        let held = std::mem::take(&mut self.pressed);
        let events: Vec<_> = held
            .iter()
            .map(|code| InputEvent::new(EventType::KEY, *code, 0))
            .collect();
        self.write(&events)
    }
}

impl EffectorSink for UInputSink {
    fn emit_key(&mut self, key: Key, pressed: bool) {
        self.track(key.code(), pressed);
        let event = InputEvent::new(EventType::KEY, key.code(), pressed as i32);
        if let Err(e) = self.write(&[event]) {
            log::warn!("Error sending key {}: {}", key, e);
        }
    }

    fn emit_pointer_button(&mut self, button: u8, pressed: bool) {
        self.write_pointer(button, pressed);
    }

    fn emit_pointer_button_to_target_window(&mut self, button: u8, pressed: bool) {
        // uinput cannot address a window; the focused one receives it
        log::debug!("target-window button {} delivered to focused window", button);
        self.write_pointer(button, pressed);
    }

    fn invoke_command(&mut self, index: usize, value: i32) {
        self.commands.invoke(index, value);
    }

    fn flush(&mut self) {
        log::trace!("flush");
    }
}

impl Drop for UInputSink {
    fn drop(&mut self) {
        let _ = self.release_all();
    }
}
