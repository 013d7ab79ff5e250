// Shuttlers Config API - Binding String Parser
// Parses binding strings like "key:PAGEDOWN" or "button:4" into a Binding

use crate::binding::Binding;
use crate::key::key_from_name;

/// Errors that can occur during binding parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingParseError {
    /// Empty input string
    EmptyInput,
    /// Prefix before ':' not recognized
    UnknownKind(String),
    /// Prefix given without a value (e.g., "key:")
    MissingValue(String),
    /// Key name not recognized
    UnknownKey(String),
    /// Pointer button not a number in 1..=255
    InvalidButton(String),
    /// No command with this name is configured
    UnknownCommand(String),
}

impl std::fmt::Display for BindingParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingParseError::EmptyInput => write!(f, "binding string cannot be empty"),
            BindingParseError::UnknownKind(kind) => write!(f, "unknown binding kind: '{}'", kind),
            BindingParseError::MissingValue(kind) => write!(f, "binding '{}:' needs a value", kind),
            BindingParseError::UnknownKey(name) => write!(f, "unknown key name: '{}'", name),
            BindingParseError::InvalidButton(value) => {
                write!(f, "invalid pointer button: '{}'", value)
            }
            BindingParseError::UnknownCommand(name) => write!(f, "unknown command: '{}'", name),
        }
    }
}

impl std::error::Error for BindingParseError {}

/// Parse a binding string
///
/// Accepted forms: `none`, `key:<NAME|code>`, `button:<n>`,
/// `target-button:<n>`, `command:<name>`. `command_index` maps a command
/// name to its index in the command table.
///
/// # Examples
/// ```
/// use shuttlers_core::config::parse_binding;
/// use shuttlers_core::{Binding, Key};
/// let binding = parse_binding("key:Tab", |_| None).unwrap();
/// assert_eq!(binding, Binding::KeyCode(Key::from(15)));
/// ```
pub fn parse_binding<F>(exp: &str, command_index: F) -> Result<Binding, BindingParseError>
where
    F: Fn(&str) -> Option<usize>,
{
    let trimmed = exp.trim();
    if trimmed.is_empty() {
        return Err(BindingParseError::EmptyInput);
    }
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(Binding::Unbound);
    }

    let Some((kind, value)) = trimmed.split_once(':') else {
        return Err(BindingParseError::UnknownKind(trimmed.to_string()));
    };
    let kind = kind.trim().to_ascii_lowercase();
    let value = value.trim();
    if value.is_empty() {
        return Err(BindingParseError::MissingValue(kind));
    }

    match kind.as_str() {
        "key" => key_from_name(value)
            .map(Binding::KeyCode)
            .ok_or_else(|| BindingParseError::UnknownKey(value.to_string())),
        "button" => parse_button(value).map(Binding::PointerClick),
        "target-button" => parse_button(value).map(Binding::PointerClickToTargetWindow),
        "command" => command_index(value)
            .map(Binding::Command)
            .ok_or_else(|| BindingParseError::UnknownCommand(value.to_string())),
        _ => Err(BindingParseError::UnknownKind(kind)),
    }
}

fn parse_button(value: &str) -> Result<u8, BindingParseError> {
    match value.parse::<u8>() {
        Ok(button) if button > 0 => Ok(button),
        _ => Err(BindingParseError::InvalidButton(value.to_string())),
    }
}
