// Shuttlers Config Parser - TOML with Serde
// Parses configuration from TOML files

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;

use super::binding_parser::{parse_binding, BindingParseError};
use crate::binding::{Binding, Control, Direction, PhysicalKey, NUM_KEYS};
use crate::command::{CommandTable, PrintCommand, SpawnCommand};
use crate::layer::{BindingTable, BindingTableError, Layer};
use crate::translator::{ShuttleMode, TranslatorConfig};

/// Host key repeat interval used when none is configured
pub const DEFAULT_REPEAT_INTERVAL_MS: u64 = 40;

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid binding for {control} in layer '{layer}': {source}")]
    InvalidBinding {
        layer: String,
        control: String,
        source: BindingParseError,
    },

    #[error("Invalid key index '{key}' in layer '{layer}' (expected 0..{max})", max = NUM_KEYS)]
    InvalidKeyIndex { layer: String, key: String },

    #[error("Invalid command '{name}': {reason}")]
    InvalidCommand { name: String, reason: String },

    #[error("Repeat interval must be nonzero")]
    InvalidRepeatInterval,

    #[error("Invalid binding table: {0}")]
    InvalidTable(#[from] BindingTableError),
}

/// Main configuration structure (root TOML table)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    /// Device selection
    #[serde(default)]
    pub device: Option<DeviceConfig>,

    /// Shuttle ring behavior
    #[serde(default)]
    pub shuttle: Option<ShuttleConfig>,

    /// Named commands; table order is the command index
    #[serde(default)]
    pub commands: IndexMap<String, CommandToml>,

    /// Activation layers, highest priority first
    #[serde(default)]
    pub layer: Vec<LayerToml>,

    /// Base layer
    #[serde(default)]
    pub base: Option<LayerToml>,
}

/// Device selection
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Explicit event node, skips discovery
    pub path: Option<PathBuf>,
    /// Quit when the device goes away instead of waiting for it
    pub exit_on_disconnect: Option<bool>,
}

/// Shuttle ring configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShuttleConfig {
    pub mode: Option<ShuttleModeToml>,
    /// Repeat interval at magnitude 1 (milliseconds)
    pub repeat_interval_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShuttleModeToml {
    Burst,
    Repeat,
}

/// Command definition: `{ print = "..." }` or `{ spawn = ["prog", ...] }`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandToml {
    Print(String),
    Spawn(Vec<String>),
}

/// Layer table, used for both `[[layer]]` and `[base]`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerToml {
    pub name: Option<String>,

    /// Button index that enables this layer while held
    pub activation: Option<usize>,

    /// Button bindings, `"<index>" = "<binding>"`
    #[serde(default)]
    pub keys: IndexMap<String, String>,

    pub jog_cw: Option<String>,
    pub jog_ccw: Option<String>,
    pub shuttle_cw: Option<String>,
    pub shuttle_ccw: Option<String>,
}

/// A command as configured, before it is instantiated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSpec {
    Print { name: String, message: String },
    Spawn { name: String, program: String, args: Vec<String> },
}

impl CommandSpec {
    pub fn name(&self) -> &str {
        match self {
            CommandSpec::Print { name, .. } | CommandSpec::Spawn { name, .. } => name,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Explicit device node
    pub device_path: Option<PathBuf>,
    /// Quit on disconnect instead of reopening
    pub exit_on_disconnect: bool,
    /// Shuttle ring behavior
    pub shuttle_mode: ShuttleMode,
    /// Commands in index order
    pub commands: Vec<CommandSpec>,
    /// Layers
    pub bindings: BindingTable,
}

impl Default for Config {
    /// The stock layout: K0 left click, K1 right click, K2/K3 print
    /// commands, jog and shuttle scroll vertically.
    fn default() -> Self {
        let key = |index| PhysicalKey::new(index).unwrap_or_default();
        let base = Layer::base("base")
            .with(Control::Button(key(0)), Binding::PointerClick(1))
            .with(Control::Button(key(1)), Binding::PointerClick(3))
            .with(Control::Button(key(2)), Binding::Command(0))
            .with(Control::Button(key(3)), Binding::Command(1))
            .with(Control::Jog(Direction::Clockwise), Binding::PointerClick(4))
            .with(Control::Jog(Direction::CounterClockwise), Binding::PointerClick(5))
            .with(Control::Shuttle(Direction::Clockwise), Binding::PointerClick(5))
            .with(Control::Shuttle(Direction::CounterClockwise), Binding::PointerClick(4));

        Self {
            device_path: None,
            exit_on_disconnect: false,
            shuttle_mode: ShuttleMode::Burst,
            commands: vec![
                CommandSpec::Print {
                    name: "command1".to_string(),
                    message: "Command 1".to_string(),
                },
                CommandSpec::Print {
                    name: "command2".to_string(),
                    message: "Command 2".to_string(),
                },
            ],
            bindings: BindingTable::new(Vec::new(), base),
        }
    }
}

impl Config {
    /// Parse a TOML configuration file
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;

        toml_config.to_config()
    }

    /// Get the default config path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("shuttlers").join("config.toml"))
    }

    /// Load from the default location, falling back to the stock layout
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                log::debug!("Loading config from {}", path.display());
                return Self::from_toml_path(path);
            }
        }
        log::debug!("No config file, using built-in layout");
        Ok(Self::default())
    }

    /// Instantiate the configured commands
    pub fn command_table(&self) -> CommandTable {
        self.commands
            .iter()
            .map(|spec| -> Box<dyn crate::command::Command> {
                match spec {
                    CommandSpec::Print { name, message } => {
                        Box::new(PrintCommand::new(name.as_str(), message.as_str()))
                    }
                    CommandSpec::Spawn {
                        name,
                        program,
                        args,
                    } => Box::new(SpawnCommand::new(name.as_str(), program.as_str(), args.clone())),
                }
            })
            .collect()
    }

    /// Settings for the translator
    pub fn to_translator_config(&self) -> TranslatorConfig {
        TranslatorConfig {
            bindings: self.bindings.clone(),
            shuttle_mode: self.shuttle_mode,
        }
    }
}

impl ConfigToml {
    /// Convert to internal Config
    pub fn to_config(&self) -> Result<Config, ConfigError> {
        let commands = self
            .commands
            .iter()
            .map(|(name, command)| command_spec(name, command))
            .collect::<Result<Vec<_>, _>>()?;
        let command_index = |name: &str| self.commands.get_index_of(name);

        let mut layers = Vec::with_capacity(self.layer.len());
        for (i, entry) in self.layer.iter().enumerate() {
            let name = entry
                .name
                .clone()
                .unwrap_or_else(|| format!("layer{}", i));
            layers.push(build_layer(name, entry, &command_index)?);
        }

        let base = match &self.base {
            Some(entry) => {
                let name = entry.name.clone().unwrap_or_else(|| "base".to_string());
                build_layer(name, entry, &command_index)?
            }
            None => Layer::base("base"),
        };

        let bindings = BindingTable::new(layers, base);
        bindings.validate(commands.len())?;

        let shuttle_mode = match &self.shuttle {
            Some(ShuttleConfig {
                mode: Some(ShuttleModeToml::Repeat),
                repeat_interval_ms,
            }) => {
                let ms = repeat_interval_ms.unwrap_or(DEFAULT_REPEAT_INTERVAL_MS);
                if ms == 0 {
                    return Err(ConfigError::InvalidRepeatInterval);
                }
                ShuttleMode::Repeat {
                    interval: Duration::from_millis(ms),
                }
            }
            _ => ShuttleMode::Burst,
        };

        let (device_path, exit_on_disconnect) = match &self.device {
            Some(device) => (device.path.clone(), device.exit_on_disconnect.unwrap_or(false)),
            None => (None, false),
        };

        log::debug!(
            "Config: {} layer(s), {} command(s), shuttle {:?}",
            bindings.layers().len(),
            commands.len(),
            shuttle_mode
        );

        Ok(Config {
            device_path,
            exit_on_disconnect,
            shuttle_mode,
            commands,
            bindings,
        })
    }
}

fn command_spec(name: &str, command: &CommandToml) -> Result<CommandSpec, ConfigError> {
    match command {
        CommandToml::Print(message) => Ok(CommandSpec::Print {
            name: name.to_string(),
            message: message.clone(),
        }),
        CommandToml::Spawn(argv) => {
            let Some((program, args)) = argv.split_first() else {
                return Err(ConfigError::InvalidCommand {
                    name: name.to_string(),
                    reason: "spawn needs a program".to_string(),
                });
            };
            Ok(CommandSpec::Spawn {
                name: name.to_string(),
                program: program.clone(),
                args: args.to_vec(),
            })
        }
    }
}

fn build_layer<F>(name: String, entry: &LayerToml, command_index: &F) -> Result<Layer, ConfigError>
where
    F: Fn(&str) -> Option<usize>,
{
    let mut layer = match entry.activation {
        Some(index) => {
            let key = PhysicalKey::new(index).ok_or_else(|| ConfigError::InvalidKeyIndex {
                layer: name.clone(),
                key: index.to_string(),
            })?;
            Layer::activated_by(name.clone(), key)
        }
        None => Layer::base(name.clone()),
    };

    let parse = |control: Control, text: &str| {
        parse_binding(text, command_index).map_err(|source| ConfigError::InvalidBinding {
            layer: name.clone(),
            control: control.to_string(),
            source,
        })
    };

    for (index, text) in &entry.keys {
        let key = index
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(PhysicalKey::new)
            .ok_or_else(|| ConfigError::InvalidKeyIndex {
                layer: name.clone(),
                key: index.clone(),
            })?;
        let control = Control::Button(key);
        layer.set(control, parse(control, text)?);
    }

    let axes = [
        (Control::Jog(Direction::Clockwise), &entry.jog_cw),
        (Control::Jog(Direction::CounterClockwise), &entry.jog_ccw),
        (Control::Shuttle(Direction::Clockwise), &entry.shuttle_cw),
        (Control::Shuttle(Direction::CounterClockwise), &entry.shuttle_ccw),
    ];
    for (control, text) in axes {
        if let Some(text) = text {
            layer.set(control, parse(control, text)?);
        }
    }

    Ok(layer)
}
