// Shuttlers Event Handling
// Raw device frames and the evdev reader that produces them

pub mod frame;
#[cfg(feature = "pure-rust")]
pub mod reader;

pub use frame::{
    Axis, EventFrame, EventKind, RawEvent, EV_KEY, EV_REL, EV_SYN, KEY_CODE_BASE,
    MAX_FRAME_EVENTS, REL_JOG, REL_SHUTTLE, REL_SHUTTLE_HI_RES,
};
#[cfg(feature = "pure-rust")]
pub use reader::{is_shuttle_node, DeviceError, ShuttleDevice};
