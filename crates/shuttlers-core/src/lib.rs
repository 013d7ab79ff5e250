// Shuttlers Core Library
// Input event translation for jog/shuttle/button devices

pub mod action;
pub mod binding;
pub mod command;
pub mod config;
pub mod decode;
pub mod event;
pub mod key;
pub mod layer;
pub mod output;
pub mod state;
pub mod translator;

pub use action::Action;
pub use binding::{Binding, Control, Direction, PhysicalKey, NUM_KEYS};
pub use command::{Command, CommandTable, PrintCommand, SpawnCommand};
pub use config::{parse_binding, BindingParseError, CommandSpec, Config, ConfigError};
pub use decode::{JogDecoder, JogEvent, ShuttleBurst, ShuttleDecoder, ShuttleRepeat};
pub use event::{EventFrame, RawEvent};
pub use key::Key;
pub use layer::{BindingTable, BindingTableError, Layer};
pub use output::{EffectorSink, RecordingSink, SinkAction};
pub use state::{ButtonState, ButtonTracker};
pub use translator::{
    FrameOutcome, ShuttleMode, TranslateError, Translator, TranslatorConfig,
};

#[cfg(feature = "pure-rust")]
pub use event::{DeviceError, ShuttleDevice};
#[cfg(feature = "pure-rust")]
pub use output::{UInputError, UInputSink};
