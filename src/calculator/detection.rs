//! Input detection for free-typed fragments.
//!
//! Decides whether a line typed into the keypad session is calculator input
//! that may be appended to the expression buffer.

use lazy_static::lazy_static;
use regex::Regex;

/// Words the evaluator understands, besides single-letter constants.
const KNOWN_WORDS: &[&str] = &[
    "sin", "cos", "tan", "ln", "log", "exp", "sqrt", "abs", "factorial", "pow", "mod", "pi", "e",
    "EE", "E", "x", "y", "n",
];

lazy_static! {
    /// Matches strings made only of calculator-alphabet characters.
    /// Allows: digits, whitespace, operators, parentheses, dots, commas,
    /// letters (for functions) and the keypad symbols.
    static ref CALC_SAFE_CHARS: Regex = Regex::new(
        r"^[\d\s\.\,\+\-\*/%\^()a-zA-Z×÷π√|!]+$"
    ).unwrap();

    /// A run of letters inside a fragment.
    static ref WORDS: Regex = Regex::new(r"[A-Za-z]+").unwrap();
}

/// Check if a typed fragment looks like calculator input.
///
/// Returns `true` if the fragment:
/// 1. Is not blank
/// 2. Contains only calculator-alphabet characters
/// 3. Contains no letter runs other than known function names and constants
///
/// This is a fast pre-check; the fragment can still fail to evaluate.
pub fn looks_like_input(input: &str) -> bool {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return false;
    }

    if !CALC_SAFE_CHARS.is_match(trimmed) {
        return false;
    }

    WORDS
        .find_iter(trimmed)
        .all(|word| KNOWN_WORDS.contains(&word.as_str()))
}
