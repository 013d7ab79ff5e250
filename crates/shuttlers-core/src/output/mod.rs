// Shuttlers Output Layer
// Effector sinks that carry out resolved actions

mod recorder;

#[cfg(feature = "pure-rust")]
mod uinput;

pub use recorder::{RecordingSink, SinkAction};

#[cfg(feature = "pure-rust")]
pub use uinput::{UInputError, UInputSink, VIRTUAL_DEVICE_NAME};

use crate::Key;

/// Receives the actions produced by the translator.
///
/// Delivery failures are the sink's concern; the translator never observes
/// them.
pub trait EffectorSink {
    /// Press or release a key
    fn emit_key(&mut self, key: Key, pressed: bool);

    /// Press or release an X-style pointer button in the focused window
    fn emit_pointer_button(&mut self, button: u8, pressed: bool);

    /// Press or release a pointer button aimed at a target other than the
    /// focused window
    fn emit_pointer_button_to_target_window(&mut self, button: u8, pressed: bool);

    /// Run the command at `index` with the event's polarity value
    fn invoke_command(&mut self, index: usize, value: i32);

    /// Commit the actions emitted so far
    fn flush(&mut self);
}

impl<S: EffectorSink + ?Sized> EffectorSink for &mut S {
    fn emit_key(&mut self, key: Key, pressed: bool) {
        (**self).emit_key(key, pressed)
    }

    fn emit_pointer_button(&mut self, button: u8, pressed: bool) {
        (**self).emit_pointer_button(button, pressed)
    }

    fn emit_pointer_button_to_target_window(&mut self, button: u8, pressed: bool) {
        (**self).emit_pointer_button_to_target_window(button, pressed)
    }

    fn invoke_command(&mut self, index: usize, value: i32) {
        (**self).invoke_command(index, value)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

impl<S: EffectorSink + ?Sized> EffectorSink for Box<S> {
    fn emit_key(&mut self, key: Key, pressed: bool) {
        (**self).emit_key(key, pressed)
    }

    fn emit_pointer_button(&mut self, button: u8, pressed: bool) {
        (**self).emit_pointer_button(button, pressed)
    }

    fn emit_pointer_button_to_target_window(&mut self, button: u8, pressed: bool) {
        (**self).emit_pointer_button_to_target_window(button, pressed)
    }

    fn invoke_command(&mut self, index: usize, value: i32) {
        (**self).invoke_command(index, value)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}
