// Shuttlers Axis Decoders
// Turn raw jog/shuttle reports into discrete rotation events

mod jog;
mod repeat;
mod shuttle;

pub use jog::{JogDecoder, JogEvent};
pub use repeat::ShuttleRepeat;
pub use shuttle::{ShuttleBurst, ShuttleDecoder, SHUTTLE_MAX};
