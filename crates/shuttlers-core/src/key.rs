// Shuttlers Key Type
// Output key codes from Linux input-event-codes.h, used by KeyCode bindings

use std::fmt;
use std::str::FromStr;

/// A key code emitted by a `KeyCode` binding.
///
/// Newtype around u16; the numeric values match Linux input-event-codes.h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Key(pub u16);

/// Canonical name first, aliases after it.
const KEY_NAMES: &[(&str, u16)] = &[
    ("ESC", 1),
    ("ESCAPE", 1),
    ("KEY_1", 2),
    ("1", 2),
    ("KEY_2", 3),
    ("2", 3),
    ("KEY_3", 4),
    ("3", 4),
    ("KEY_4", 5),
    ("4", 5),
    ("KEY_5", 6),
    ("5", 6),
    ("KEY_6", 7),
    ("6", 7),
    ("KEY_7", 8),
    ("7", 8),
    ("KEY_8", 9),
    ("8", 9),
    ("KEY_9", 10),
    ("9", 10),
    ("KEY_0", 11),
    ("0", 11),
    ("MINUS", 12),
    ("EQUAL", 13),
    ("BACKSPACE", 14),
    ("TAB", 15),
    ("Q", 16),
    ("W", 17),
    ("E", 18),
    ("R", 19),
    ("T", 20),
    ("Y", 21),
    ("U", 22),
    ("I", 23),
    ("O", 24),
    ("P", 25),
    ("LEFT_BRACE", 26),
    ("RIGHT_BRACE", 27),
    ("ENTER", 28),
    ("RETURN", 28),
    ("LEFT_CTRL", 29),
    ("CTRL", 29),
    ("A", 30),
    ("S", 31),
    ("D", 32),
    ("F", 33),
    ("G", 34),
    ("H", 35),
    ("J", 36),
    ("K", 37),
    ("L", 38),
    ("SEMICOLON", 39),
    ("APOSTROPHE", 40),
    ("GRAVE", 41),
    ("LEFT_SHIFT", 42),
    ("SHIFT", 42),
    ("BACKSLASH", 43),
    ("Z", 44),
    ("X", 45),
    ("C", 46),
    ("V", 47),
    ("B", 48),
    ("N", 49),
    ("M", 50),
    ("COMMA", 51),
    ("DOT", 52),
    ("SLASH", 53),
    ("RIGHT_SHIFT", 54),
    ("KPASTERISK", 55),
    ("LEFT_ALT", 56),
    ("ALT", 56),
    ("SPACE", 57),
    ("CAPSLOCK", 58),
    ("F1", 59),
    ("F2", 60),
    ("F3", 61),
    ("F4", 62),
    ("F5", 63),
    ("F6", 64),
    ("F7", 65),
    ("F8", 66),
    ("F9", 67),
    ("F10", 68),
    ("NUMLOCK", 69),
    ("SCROLLLOCK", 70),
    ("KP7", 71),
    ("KP8", 72),
    ("KP9", 73),
    ("KPMINUS", 74),
    ("KP4", 75),
    ("KP5", 76),
    ("KP6", 77),
    ("KPPLUS", 78),
    ("KP1", 79),
    ("KP2", 80),
    ("KP3", 81),
    ("KP0", 82),
    ("KPDOT", 83),
    ("F11", 87),
    ("F12", 88),
    ("KPENTER", 96),
    ("KP_RETURN", 96),
    ("RIGHT_CTRL", 97),
    ("KPSLASH", 98),
    ("SYSRQ", 99),
    ("PRINT", 99),
    ("RIGHT_ALT", 100),
    ("HOME", 102),
    ("UP", 103),
    ("PAGE_UP", 104),
    ("PAGEUP", 104),
    ("LEFT", 105),
    ("RIGHT", 106),
    ("END", 107),
    ("DOWN", 108),
    ("PAGE_DOWN", 109),
    ("PAGEDOWN", 109),
    ("INSERT", 110),
    ("DELETE", 111),
    ("MUTE", 113),
    ("VOLUMEDOWN", 114),
    ("VOLUMEUP", 115),
    ("PAUSE", 119),
    ("LEFT_META", 125),
    ("META", 125),
    ("SUPER", 125),
    ("RIGHT_META", 126),
    ("COMPOSE", 127),
    ("STOP", 128),
    ("UNDO", 131),
    ("COPY", 133),
    ("PASTE", 135),
    ("FIND", 136),
    ("CUT", 137),
    ("MENU", 139),
    ("BACK", 158),
    ("FORWARD", 159),
    ("NEXTSONG", 163),
    ("PLAYPAUSE", 164),
    ("PREVIOUSSONG", 165),
    ("STOPCD", 166),
    ("RECORD", 167),
    ("REWIND", 168),
    ("REFRESH", 173),
    ("REDO", 182),
    ("FASTFORWARD", 208),
];

/// Highest key code the virtual output device registers.
pub const MAX_OUTPUT_KEY: u16 = 255;

impl Key {
    /// Get the raw numeric code value
    pub fn code(self) -> u16 {
        self.0
    }

    /// Get the name of this key
    pub fn name(self) -> &'static str {
        key_name(self.0)
    }
}

impl From<u16> for Key {
    fn from(code: u16) -> Self {
        Key(code)
    }
}

impl From<Key> for u16 {
    fn from(key: Key) -> Self {
        key.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match key_name(self.0) {
            "UNKNOWN" => write!(f, "#{}", self.0),
            name => write!(f, "{}", name),
        }
    }
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_name(s).ok_or_else(|| format!("Unknown key: {}", s))
    }
}

/// Display name for a key code
pub fn key_name(code: u16) -> &'static str {
    KEY_NAMES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(name, _)| *name)
        .unwrap_or("UNKNOWN")
}

/// Parse a key name (case-insensitive, optional `KEY_` prefix) or a raw
/// code written as `#<code>` into a key.
///
/// Bare digits are the digit keys: `2` is KEY_2 (code 3), `#2` is code 2.
/// Raw codes must lie in `1..=MAX_OUTPUT_KEY`.
pub fn key_from_name(name: &str) -> Option<Key> {
    let upper = name.trim().to_uppercase();
    if upper.is_empty() {
        return None;
    }

    let lookup = |n: &str| {
        KEY_NAMES
            .iter()
            .find(|(candidate, _)| *candidate == n)
            .map(|(_, code)| Key(*code))
    };

    if let Some(key) = lookup(&upper) {
        return Some(key);
    }
    if let Some(stripped) = upper.strip_prefix("KEY_") {
        if let Some(key) = lookup(stripped) {
            return Some(key);
        }
    }

    match upper.strip_prefix('#').map(|code| code.trim().parse::<u16>()) {
        Some(Ok(code)) if code > 0 && code <= MAX_OUTPUT_KEY => Some(Key(code)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(key_from_name("a"), Some(Key::from(30)));
        assert_eq!(key_from_name("A"), Some(Key::from(30)));
        assert_eq!(key_from_name("ENTER"), Some(Key::from(28)));
        assert_eq!(key_from_name("page_down"), Some(Key::from(109)));
        assert_eq!(key_from_name("KEY_TAB"), Some(Key::from(15)));
        assert_eq!(key_from_name("1"), Some(Key::from(2)));
    }

    #[test]
    fn test_key_from_numeric_code() {
        assert_eq!(key_from_name("#28"), Some(Key::from(28)));
        assert_eq!(key_from_name("#255"), Some(Key::from(255)));
        assert_eq!(key_from_name("28"), None);
        assert_eq!(key_from_name("#0"), None);
        assert_eq!(key_from_name("#256"), None);
        assert_eq!(key_from_name("#70000"), None);
        assert_eq!(key_from_name(""), None);
        assert_eq!(key_from_name("NOT_A_KEY"), None);
    }

    #[test]
    fn test_digit_names_are_digit_keys() {
        assert_eq!(key_from_name("0"), Some(Key::from(11)));
        assert_eq!(key_from_name("2"), Some(Key::from(3)));
        assert_eq!(key_from_name("#2"), Some(Key::from(2)));
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::from(30).to_string(), "A");
        assert_eq!(Key::from(28).to_string(), "ENTER");
        assert_eq!(Key::from(240).to_string(), "#240");
        assert_eq!(key_from_name(&Key::from(240).to_string()), Some(Key::from(240)));
    }

    #[test]
    fn test_key_from_str() {
        assert_eq!("LEFT_CTRL".parse::<Key>(), Ok(Key::from(29)));
        assert!("bogus".parse::<Key>().is_err());
    }
}
