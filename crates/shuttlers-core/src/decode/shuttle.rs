// Shuttlers Shuttle Decoder
// Absolute shuttle ring position to scroll bursts

use crate::binding::Direction;

/// Largest absolute shuttle position.
pub const SHUTTLE_MAX: i32 = 7;

/// A change of shuttle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuttleBurst {
    /// New signed position
    pub position: i8,
}

impl ShuttleBurst {
    /// Direction of the burst, `None` when the ring returned to center
    pub fn direction(self) -> Option<Direction> {
        Direction::from_sign(self.position as i32)
    }

    /// Number of discrete actions in the burst (0 = stop)
    pub fn magnitude(self) -> u8 {
        self.position.unsigned_abs()
    }

    /// Returns true when this burst marks the return to center
    pub fn is_stop(self) -> bool {
        self.position == 0
    }
}

/// Tracks the last reported shuttle ring position.
#[derive(Debug, Clone, Default)]
pub struct ShuttleDecoder {
    last: i8,
}

impl ShuttleDecoder {
    /// Create a decoder centred at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed position
    pub fn last(&self) -> i8 {
        self.last
    }

    /// The last report had an odd magnitude.
    ///
    /// The device stops reporting the ring once it springs back to center;
    /// an odd position left behind is the stale "between detents" value.
    pub fn is_between_detents(&self) -> bool {
        self.last % 2 != 0
    }

    /// Decode a raw shuttle report. Positions are clamped to
    /// `[-SHUTTLE_MAX, SHUTTLE_MAX]`; an unchanged position yields `None`.
    pub fn on_shuttle(&mut self, raw: i32) -> Option<ShuttleBurst> {
        let position = raw.clamp(-SHUTTLE_MAX, SHUTTLE_MAX) as i8;
        if position == self.last {
            return None;
        }
        self.last = position;
        Some(ShuttleBurst { position })
    }

    /// Force the ring back to center, as if a 0 report had arrived
    pub fn return_to_center(&mut self) -> Option<ShuttleBurst> {
        self.on_shuttle(0)
    }
}
