use std::fmt;

/// Press/release polarity of a button sub-event.
///
/// evdev key values:
///   0 == 'released'
///   1 == 'pressed'
///   2 == 'repeated'
///
/// The ShuttlePro never autorepeats, but any nonzero value is still treated
/// as the button being down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Action {
    Release = 0,
    Press = 1,
    Repeat = 2,
}

impl Action {
    /// Returns true if the action is either PRESS or REPEAT
    pub fn is_pressed(self) -> bool {
        matches!(self, Action::Press | Action::Repeat)
    }

    /// Returns true if this is a RELEASE event
    pub fn is_released(self) -> bool {
        matches!(self, Action::Release)
    }

    /// Decode a raw key value. Unknown nonzero values count as presses.
    pub fn from_value(value: i32) -> Self {
        match value {
            0 => Action::Release,
            2 => Action::Repeat,
            _ => Action::Press,
        }
    }

    /// Build an action from a boolean press flag
    pub fn from_pressed(pressed: bool) -> Self {
        if pressed {
            Action::Press
        } else {
            Action::Release
        }
    }

    /// Convert Action to its i32 representation
    pub fn to_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Release => write!(f, "release"),
            Action::Press => write!(f, "press"),
            Action::Repeat => write!(f, "repeat"),
        }
    }
}
