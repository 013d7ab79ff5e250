// Shuttlers Event Frames
// Raw sub-events as read from the device, batched per read

use smallvec::SmallVec;

/// EV_SYN event type code
pub const EV_SYN: u16 = 0x00;
/// EV_KEY event type code
pub const EV_KEY: u16 = 0x01;
/// EV_REL event type code
pub const EV_REL: u16 = 0x02;

/// Code of the first button (BTN_0); button n arrives as `KEY_CODE_BASE + n`
pub const KEY_CODE_BASE: u16 = 0x100;
/// REL_DIAL carries the jog counter
pub const REL_JOG: u16 = 0x07;
/// REL_WHEEL carries the shuttle position
pub const REL_SHUTTLE: u16 = 0x08;
/// REL_WHEEL_HI_RES duplicate of the shuttle, ignored
pub const REL_SHUTTLE_HI_RES: u16 = 0x0b;

/// Maximum number of sub-events read at once
pub const MAX_FRAME_EVENTS: usize = 6;

/// Event type of a raw sub-event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Sync,
    Key,
    Relative,
    /// Anything else (EV_MSC scan codes and so on)
    Other(u16),
}

impl EventKind {
    /// Classify a raw evdev type code
    pub fn from_type(event_type: u16) -> Self {
        match event_type {
            EV_SYN => EventKind::Sync,
            EV_KEY => EventKind::Key,
            EV_REL => EventKind::Relative,
            other => EventKind::Other(other),
        }
    }
}

/// Which relative axis a `Relative` sub-event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Jog,
    Shuttle,
    Unknown(u16),
}

impl Axis {
    /// Classify a relative axis code
    pub fn from_code(code: u16) -> Self {
        match code {
            REL_JOG => Axis::Jog,
            REL_SHUTTLE => Axis::Shuttle,
            other => Axis::Unknown(other),
        }
    }
}

/// One (type, code, value) sub-event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEvent {
    pub kind: EventKind,
    pub code: u16,
    pub value: i32,
}

impl RawEvent {
    /// Build from raw evdev fields
    pub fn new(event_type: u16, code: u16, value: i32) -> Self {
        Self {
            kind: EventKind::from_type(event_type),
            code,
            value,
        }
    }

    /// Synchronization marker
    pub fn sync() -> Self {
        Self::new(EV_SYN, 0, 0)
    }

    /// Button sub-event for physical button `index`
    pub fn button(index: u16, value: i32) -> Self {
        Self::new(EV_KEY, KEY_CODE_BASE + index, value)
    }

    /// Jog counter report
    pub fn jog(value: i32) -> Self {
        Self::new(EV_REL, REL_JOG, value)
    }

    /// Shuttle position report
    pub fn shuttle(value: i32) -> Self {
        Self::new(EV_REL, REL_SHUTTLE, value)
    }

    /// Returns true for the synchronization marker
    pub fn is_sync(&self) -> bool {
        self.kind == EventKind::Sync
    }
}

#[cfg(feature = "pure-rust")]
impl From<evdev::InputEvent> for RawEvent {
    fn from(event: evdev::InputEvent) -> Self {
        Self::new(event.event_type().0, event.code(), event.value())
    }
}

/// Sub-events returned by a single read, at most `MAX_FRAME_EVENTS` inline.
///
/// Everything up to the first synchronization marker is the frame; events
/// after it belong to the next frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFrame {
    events: SmallVec<[RawEvent; MAX_FRAME_EVENTS]>,
}

impl EventFrame {
    /// Create an empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sub-event
    pub fn push(&mut self, event: RawEvent) {
        self.events.push(event);
    }

    /// Number of sub-events read, including the marker and anything after it
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing was read
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All sub-events as read
    pub fn as_slice(&self) -> &[RawEvent] {
        &self.events
    }

    /// Sub-events before the first synchronization marker
    pub fn until_sync(&self) -> impl Iterator<Item = &RawEvent> {
        self.events.iter().take_while(|event| !event.is_sync())
    }

    /// Clear for reuse
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl FromIterator<RawEvent> for EventFrame {
    fn from_iter<I: IntoIterator<Item = RawEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

impl AsRef<[RawEvent]> for EventFrame {
    fn as_ref(&self) -> &[RawEvent] {
        &self.events
    }
}
