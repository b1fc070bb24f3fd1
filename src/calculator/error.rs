//! Evaluation failures.
//!
//! Callers treat every [`EvalError`] the same way: the expression could not be
//! evaluated and the display shows [`ERROR_MARKER`]. The variants only exist so
//! logs and tests can tell the causes apart.

use thiserror::Error;

/// Text shown on the display when an evaluation fails.
pub const ERROR_MARKER: &str = "Error";

/// Why an expression could not be evaluated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A character sequence that is not part of the calculator alphabet.
    #[error("unknown token '{token}' at position {position}")]
    UnknownToken {
        /// The offending text.
        token: String,
        /// Character offset in the expression.
        position: usize,
    },

    /// A known token in a place the grammar does not allow.
    #[error("unexpected {found}, expected {expected}")]
    Syntax {
        /// What the parser wanted.
        expected: &'static str,
        /// What it got instead.
        found: String,
    },

    /// The expression stopped early (trailing operator, missing `)`, empty input).
    #[error("unexpected end of expression, expected {expected}")]
    UnexpectedEnd {
        /// What the parser wanted.
        expected: &'static str,
    },

    /// A function was called with the wrong number of arguments.
    #[error("{function} takes {expected} argument(s), got {got}")]
    Arity {
        /// Function name.
        function: &'static str,
        /// Accepted argument count.
        expected: usize,
        /// Supplied argument count.
        got: usize,
    },

    /// Division or modulo by zero, or zero raised to a negative power.
    #[error("division by zero")]
    DivisionByZero,

    /// A function argument outside its mathematical domain.
    #[error("math domain error in {function}")]
    Domain {
        /// Function or operator name.
        function: &'static str,
    },

    /// Parentheses, calls or signs nested deeper than the evaluator allows.
    #[error("expression nested deeper than {limit} levels")]
    TooDeep {
        /// Maximum nesting depth.
        limit: usize,
    },

    /// A result that is not a finite number.
    #[error("numerical result out of range")]
    Overflow,
}
