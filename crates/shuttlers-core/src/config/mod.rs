// Shuttlers Config API
// Binding string grammar and TOML configuration loading

pub mod binding_parser;
pub mod parser;

pub use binding_parser::{parse_binding, BindingParseError};
pub use parser::{
    CommandSpec, Config, ConfigError, ConfigToml, LayerToml, DEFAULT_REPEAT_INTERVAL_MS,
};
