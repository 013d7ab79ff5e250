// Shuttlers Binding Types
// Physical controls of the jog/shuttle device and what they are bound to

use std::fmt;

use strum_macros::{Display, EnumString};

use crate::Key;

/// Number of physical buttons on the ShuttlePro v2.
///
/// ```text
///    K0  K1  K2  K3
///  K4  K5  K6  K7  K8
///
///  -7 <- Shuttle -> +7
///         Jog
///
///    K9          K10
///   K11           K12
/// ```
pub const NUM_KEYS: usize = 13;

/// Index of a physical button, always in `[0, NUM_KEYS)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PhysicalKey(u8);

impl PhysicalKey {
    /// Create a key if the index is in range
    pub fn new(index: usize) -> Option<Self> {
        if index < NUM_KEYS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Index into per-key tables
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Bit of this key in a `ButtonState` mask
    pub fn bit(self) -> u16 {
        1u16 << self.0
    }

    /// Iterate over every physical key
    pub fn all() -> impl Iterator<Item = PhysicalKey> {
        (0..NUM_KEYS as u8).map(PhysicalKey)
    }
}

impl fmt::Display for PhysicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "K{}", self.0)
    }
}

/// Logical meaning of a physical control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Binding {
    /// Nothing bound; also the "no override" value of activation layers
    #[default]
    Unbound,
    /// Synthesize a key press/release
    KeyCode(Key),
    /// Synthesize an X-style pointer button (1 = left, 4/5 = wheel, ...)
    PointerClick(u8),
    /// Pointer button delivered to a target other than the focused window
    PointerClickToTargetWindow(u8),
    /// Run the command at this index of the command table
    Command(usize),
}

impl Binding {
    /// Returns true for the `Unbound` variant
    pub fn is_unbound(&self) -> bool {
        matches!(self, Binding::Unbound)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Unbound => write!(f, "none"),
            Binding::KeyCode(key) => write!(f, "key:{}", key),
            Binding::PointerClick(button) => write!(f, "button:{}", button),
            Binding::PointerClickToTargetWindow(button) => write!(f, "target-button:{}", button),
            Binding::Command(index) => write!(f, "command#{}", index),
        }
    }
}

/// Rotation sense of the jog wheel or shuttle ring.
///
/// Clockwise is the direction in which the raw jog counter increases and the
/// shuttle position becomes positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Direction {
    #[strum(serialize = "cw")]
    Clockwise,
    #[strum(serialize = "ccw")]
    CounterClockwise,
}

impl Direction {
    /// Direction of a signed step (positive = clockwise)
    pub fn from_sign(value: i32) -> Option<Self> {
        match value.signum() {
            1 => Some(Direction::Clockwise),
            -1 => Some(Direction::CounterClockwise),
            _ => None,
        }
    }

    /// The opposite sense
    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    /// Signed unit step (+1 clockwise, -1 counter-clockwise)
    pub fn step(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// A bindable control: a button or one sense of a rotary axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Button(PhysicalKey),
    Jog(Direction),
    Shuttle(Direction),
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Control::Button(key) => write!(f, "{}", key),
            Control::Jog(direction) => write!(f, "jog_{}", direction),
            Control::Shuttle(direction) => write!(f, "shuttle_{}", direction),
        }
    }
}
