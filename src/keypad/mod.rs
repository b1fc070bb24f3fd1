//! Incremental expression builder.
//!
//! A [`Keypad`] accumulates key presses into an expression buffer and hands the
//! buffer to the evaluator when `=` is pressed. It owns the state the keypad
//! shows: the buffer, the previous expression, the last answer and the angle
//! mode.

mod key;

pub use key::{Key, Layout};

use thiserror::Error;
use tracing::{debug, warn};

use crate::calculator::{
    AngleMode, CalcResult, ERROR_MARKER, evaluate_expression, looks_like_input,
};
use crate::config::Config;

/// Rejected keypad input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeypadError {
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("the {layout} keypad has no '{key}' key")]
    NotOnLayout { key: String, layout: Layout },

    #[error("'{0}' is not calculator input")]
    NotCalculatorInput(String),
}

/// What the keypad currently shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Display {
    /// The last evaluated expression, shown above the input line.
    pub expression: String,
    /// The input line: the buffer, a result, or the error marker.
    pub input: String,
    pub mode: AngleMode,
}

#[derive(Clone, Debug)]
pub struct Keypad {
    layout: Layout,
    mode: AngleMode,
    buffer: String,
    input: String,
    previous: String,
    ans: String,
    thousands_separators: bool,
    auto_close_parens: bool,
}

impl Keypad {
    pub fn new(layout: Layout, mode: AngleMode) -> Self {
        Self {
            layout,
            mode,
            buffer: String::new(),
            input: String::new(),
            previous: String::new(),
            ans: String::new(),
            thousands_separators: false,
            auto_close_parens: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.layout, config.angle_mode)
            .with_thousands_separators(config.thousands_separators)
            .with_auto_close_parens(config.auto_close_parens)
    }

    /// Group result digits in threes on the input line.
    pub fn with_thousands_separators(mut self, enabled: bool) -> Self {
        self.thousands_separators = enabled;
        self
    }

    /// Close unbalanced parentheses when `=` is pressed.
    pub fn with_auto_close_parens(mut self, enabled: bool) -> Self {
        self.auto_close_parens = enabled;
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn mode(&self) -> AngleMode {
        self.mode
    }

    /// The pending, not yet evaluated expression.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// The last successful result, empty before the first one.
    pub fn ans(&self) -> &str {
        &self.ans
    }

    pub fn display(&self) -> Display {
        Display {
            expression: self.previous.clone(),
            input: self.input.clone(),
            mode: self.mode,
        }
    }

    /// Press a key. Returns the evaluation outcome when the key is `=`.
    pub fn press(&mut self, key: Key) -> Result<Option<CalcResult>, KeypadError> {
        if !self.layout.accepts(&key) {
            return Err(KeypadError::NotOnLayout {
                key: key.label().to_string(),
                layout: self.layout,
            });
        }

        debug!(key = key.label(), buffer = %self.buffer, "key pressed");

        match key {
            Key::Input(_) | Key::Function(_) => {
                if let Some(fragment) = key.fragment() {
                    self.append(&fragment);
                }
            }
            Key::Ans => {
                let ans = self.ans.clone();
                self.append(&ans);
            }
            Key::Mode(mode) => self.mode = mode,
            Key::Equals => return Ok(Some(self.equals())),
            Key::Clear => {
                self.buffer.clear();
                self.previous.clear();
                self.sync_input();
            }
            Key::ClearEntry => {
                self.buffer.clear();
                self.sync_input();
            }
            Key::Backspace => {
                self.buffer.pop();
                self.sync_input();
            }
            Key::Memory(label) => debug!(label, "memory keys are not implemented"),
        }

        Ok(None)
    }

    /// Parse a key label and press it.
    pub fn press_label(&mut self, label: &str) -> Result<Option<CalcResult>, KeypadError> {
        let key = label.parse()?;
        self.press(key)
    }

    /// Append free-typed text to the buffer.
    pub fn type_text(&mut self, text: &str) -> Result<(), KeypadError> {
        if !looks_like_input(text) || !self.layout.accepts_text(text) {
            warn!(text, layout = %self.layout, "rejected typed input");
            return Err(KeypadError::NotCalculatorInput(text.to_string()));
        }

        self.append(text.trim());
        Ok(())
    }

    fn append(&mut self, fragment: &str) {
        self.buffer.push_str(fragment);
        self.sync_input();
    }

    fn sync_input(&mut self) {
        self.input = self.buffer.clone();
    }

    fn equals(&mut self) -> CalcResult {
        let mut expression = self.buffer.clone();
        if self.auto_close_parens {
            let open = expression.matches('(').count();
            let close = expression.matches(')').count();
            expression.push_str(&")".repeat(open.saturating_sub(close)));
        }

        let result = evaluate_expression(&expression, self.mode, self.thousands_separators);
        match &result {
            CalcResult::Success {
                expression,
                display_result,
                raw_result,
                ..
            } => {
                self.previous = expression.clone();
                self.ans = raw_result.clone();
                self.buffer = raw_result.clone();
                self.input = display_result.clone();
            }
            CalcResult::Error { expression, .. } => {
                self.previous = expression.clone();
                self.buffer.clear();
                self.input = ERROR_MARKER.to_string();
            }
        }

        result
    }
}
