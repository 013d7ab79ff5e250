// Shuttlers Held-Button Tracking
// Bitmask of currently held physical buttons

use std::fmt;

use crate::binding::{PhysicalKey, NUM_KEYS};

/// Bitmask over `PhysicalKey`, one bit per button, set while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ButtonState(u16);

impl ButtonState {
    /// Mask with no buttons held
    pub fn empty() -> Self {
        Self(0)
    }

    /// Build a mask from raw bits; bits beyond the last key are dropped
    pub fn from_bits(bits: u16) -> Self {
        Self(bits & ((1u16 << NUM_KEYS) - 1))
    }

    /// Raw bits
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Check if a button is held
    pub fn is_held(self, key: PhysicalKey) -> bool {
        self.0 & key.bit() != 0
    }

    /// Copy of this mask with one bit set or cleared
    pub fn with(self, key: PhysicalKey, held: bool) -> Self {
        if held {
            Self(self.0 | key.bit())
        } else {
            Self(self.0 & !key.bit())
        }
    }

    /// Check if no button is held
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Held buttons in index order
    pub fn held(self) -> impl Iterator<Item = PhysicalKey> {
        PhysicalKey::all().filter(move |key| self.is_held(*key))
    }
}

impl fmt::Display for ButtonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.0, width = NUM_KEYS)
    }
}

/// Tracks which buttons are held from press/release sub-events.
///
/// Press sets the key's bit and release clears it. The device is expected to
/// strictly alternate press and release per key; a repeated press is a no-op.
#[derive(Debug, Clone, Default)]
pub struct ButtonTracker {
    state: ButtonState,
}

impl ButtonTracker {
    /// Create a tracker with nothing held
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a press or release and return the updated mask
    pub fn on_key_event(&mut self, key: PhysicalKey, pressed: bool) -> ButtonState {
        self.state = self.state.with(key, pressed);
        self.state
    }

    /// Current mask
    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Forget every held button (device reopened)
    pub fn clear(&mut self) {
        self.state = ButtonState::empty();
    }
}
