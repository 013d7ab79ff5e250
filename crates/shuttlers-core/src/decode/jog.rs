// Shuttlers Jog Decoder
// 8-bit wrapping jog counter to clockwise/counter-clockwise steps

use crate::binding::Direction;

/// Outcome of one jog report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JogEvent {
    /// Same counter value as last time; the device repeats the jog value in
    /// every frame, so this is not a rotation.
    Idle,
    /// One detent of rotation
    Step(Direction),
    /// Counter moved by an even amount that cannot be attributed to a
    /// direction; the new value is recorded and nothing is emitted.
    Skipped,
}

/// Decodes the jog wheel's wrapping counter.
///
/// The device advances an 8-bit counter by one per detent. Reports are
/// batched, so the decoder only looks at parity: an odd difference is one
/// step in the direction of the unsigned comparison. The comparison is wrong
/// across the 255/0 boundary and is kept that way; the only correction is the
/// 255 <-> 1 pair (XOR of 254), which is reported as a single step in the
/// sense opposite to the comparison.
#[derive(Debug, Clone, Default)]
pub struct JogDecoder {
    last: u8,
}

impl JogDecoder {
    /// Create a decoder with the counter at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Last observed counter value
    pub fn last(&self) -> u8 {
        self.last
    }

    /// Decode a raw jog report. Values outside 0..=255 are truncated to the
    /// low 8 bits.
    pub fn on_jog(&mut self, raw: i32) -> JogEvent {
        let value = (raw & 0xff) as u8;
        if value == self.last {
            return JogEvent::Idle;
        }

        let event = match (self.last, value) {
            (255, 1) => JogEvent::Step(Direction::Clockwise),
            (1, 255) => JogEvent::Step(Direction::CounterClockwise),
            (last, value) if (last ^ value) & 1 != 0 => JogEvent::Step(direction_of(value > last)),
            _ => JogEvent::Skipped,
        };

        self.last = value;
        event
    }
}

fn direction_of(increased: bool) -> Direction {
    if increased {
        Direction::Clockwise
    } else {
        Direction::CounterClockwise
    }
}
