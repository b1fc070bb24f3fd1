//! Calculator module for evaluating keypad expressions.
//!
//! This module provides functionality to:
//! - Tokenize calculator notation (`sin(`, `n!(`, `1/x(`, `π`, `EE`, ...)
//! - Evaluate expressions against a fixed function namespace
//! - Detect whether typed text is calculator input

mod detection;
mod error;
mod evaluation;
mod token;

pub use detection::looks_like_input;
pub use error::{ERROR_MARKER, EvalError};
pub use evaluation::{AngleMode, CalcResult, evaluate, evaluate_expression, format_raw};
pub use token::{Constant, Function, Token, tokenize};
