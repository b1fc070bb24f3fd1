//! Keypad keys and layouts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::calculator::AngleMode;

use super::KeypadError;

/// Keys that append their label unchanged.
const INPUT_LABELS: &[&str] = &[
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", ".", "+", "-", "*", "/", "×", "÷", "%", "^",
    "(", ")", "x^y", "mod", "EE", "π",
];

/// Keys that append their label followed by an opening parenthesis.
const FUNCTION_LABELS: &[&str] = &[
    "sin", "cos", "tan", "ln", "log", "√", "exp", "n!", "1/x", "|x|", "x^2", "x^3",
];

/// Memory keys. They are accepted but do nothing.
const MEMORY_LABELS: &[&str] = &["MC", "MR", "MS", "M+", "M-"];

/// A single keypad button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Digit, point, operator, parenthesis or constant.
    Input(&'static str),
    /// Function key; pressing it opens a call.
    Function(&'static str),
    /// Insert the last result.
    Ans,
    /// Switch the angle mode.
    Mode(AngleMode),
    Equals,
    /// C: clear the buffer and the previous expression.
    Clear,
    /// CE: clear the buffer only.
    ClearEntry,
    /// ←: delete the last character.
    Backspace,
    Memory(&'static str),
}

impl Key {
    /// The label printed on the button.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input(label) | Self::Function(label) | Self::Memory(label) => *label,
            Self::Ans => "Ans",
            Self::Mode(mode) => mode.label(),
            Self::Equals => "=",
            Self::Clear => "C",
            Self::ClearEntry => "CE",
            Self::Backspace => "←",
        }
    }

    /// Text appended to the expression buffer, if the key appends anything
    /// by itself. `Ans` depends on keypad state and is handled there.
    pub fn fragment(&self) -> Option<String> {
        match self {
            Self::Input(label) => Some(label.to_string()),
            Self::Function(label) => Some(format!("{label}(")),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Key {
    type Err = KeypadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "Ans" => Self::Ans,
            "DEG" => Self::Mode(AngleMode::Degrees),
            "RAD" => Self::Mode(AngleMode::Radians),
            "=" => Self::Equals,
            "C" => Self::Clear,
            "CE" => Self::ClearEntry,
            "←" | "back" => Self::Backspace,
            _ => {
                if let Some(label) = INPUT_LABELS.iter().copied().find(|l| *l == s) {
                    Self::Input(label)
                } else if let Some(label) = FUNCTION_LABELS.iter().copied().find(|l| *l == s) {
                    Self::Function(label)
                } else if let Some(label) = MEMORY_LABELS.iter().copied().find(|l| *l == s) {
                    Self::Memory(label)
                } else {
                    return Err(KeypadError::UnknownKey(s.to_string()));
                }
            }
        };
        Ok(key)
    }
}

/// Which keypad is in use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Four-function keypad.
    Basic,
    #[default]
    Scientific,
}

const BASIC_ROWS: &[&[&str]] = &[
    &["7", "8", "9", "÷"],
    &["4", "5", "6", "×"],
    &["1", "2", "3", "-"],
    &["0", ".", "=", "+"],
    &["C"],
];

const SCIENTIFIC_ROWS: &[&[&str]] = &[
    &["MC", "MR", "MS", "M+", "M-", "←", "CE", "C"],
    &["7", "8", "9", "/", "%", "x^2", "x^3", "x^y"],
    &["4", "5", "6", "*", "n!", "(", ")", "1/x"],
    &["1", "2", "3", "-", "sin", "cos", "tan", "ln"],
    &["0", ".", "π", "+", "Ans", "DEG", "RAD", "="],
    &["log", "√", "exp", "|x|", "mod", "EE", "^", "×", "÷"],
];

/// Characters a free-typed fragment may contain on the basic keypad.
const BASIC_CHARS: &str = "0123456789.+-*/×÷ ";

impl Layout {
    /// Button labels, row by row.
    pub fn rows(self) -> &'static [&'static [&'static str]] {
        match self {
            Self::Basic => BASIC_ROWS,
            Self::Scientific => SCIENTIFIC_ROWS,
        }
    }

    /// Whether the layout has a button for this key.
    pub fn accepts(self, key: &Key) -> bool {
        match self {
            Self::Scientific => true,
            Self::Basic => {
                let label = key.label();
                self.rows().iter().any(|row| row.contains(&label))
                    || matches!(key, Key::Input("*" | "/"))
            }
        }
    }

    /// Whether a free-typed fragment only uses what the layout offers.
    pub fn accepts_text(self, text: &str) -> bool {
        match self {
            Self::Scientific => true,
            Self::Basic => text.chars().all(|c| BASIC_CHARS.contains(c)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Basic => f.write_str("basic"),
            Self::Scientific => f.write_str("scientific"),
        }
    }
}
