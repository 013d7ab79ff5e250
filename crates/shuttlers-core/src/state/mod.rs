// Shuttlers Device State
// State owned by the translator between frames

mod buttons;

pub use buttons::{ButtonState, ButtonTracker};
