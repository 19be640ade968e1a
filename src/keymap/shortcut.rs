//! Keyboard shortcut: one keystroke, or a two-keystroke chord

use std::fmt;
use std::str::FromStr;

use super::config::{parse_key_string, KeymapError};
use super::types::Keystroke;

/// A keyboard shortcut bound to an action in a keymap
///
/// Most shortcuts are a single keystroke. A chord adds a second keystroke
/// that must follow the first (e.g. `ctrl+k ctrl+c`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Shortcut {
    pub first: Keystroke,
    pub second: Option<Keystroke>,
}

impl Shortcut {
    /// Create a single-keystroke shortcut
    pub const fn new(keystroke: Keystroke) -> Self {
        Self {
            first: keystroke,
            second: None,
        }
    }

    /// Create a chord shortcut
    pub const fn chord(first: Keystroke, second: Keystroke) -> Self {
        Self {
            first,
            second: Some(second),
        }
    }

    pub fn is_chord(&self) -> bool {
        self.second.is_some()
    }
}

impl From<Keystroke> for Shortcut {
    fn from(keystroke: Keystroke) -> Self {
        Shortcut::new(keystroke)
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.second {
            Some(second) => write!(f, "{} {}", self.first, second),
            None => write!(f, "{}", self.first),
        }
    }
}

/// Parses `"ctrl+s"` or a whitespace-separated chord like `"ctrl+k ctrl+c"`
impl FromStr for Shortcut {
    type Err = KeymapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let strokes: Vec<&str> = s.split_whitespace().collect();
        match strokes.as_slice() {
            [first] => Ok(Shortcut::new(parse_key_string(first)?)),
            [first, second] => Ok(Shortcut::chord(
                parse_key_string(first)?,
                parse_key_string(second)?,
            )),
            _ => Err(KeymapError::InvalidKey(format!(
                "Shortcut must have one or two keystrokes: {:?}",
                s
            ))),
        }
    }
}
