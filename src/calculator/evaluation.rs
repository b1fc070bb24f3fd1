//! Expression evaluation.
//!
//! A recursive-descent evaluator over the calculator grammar. It computes the
//! value while parsing, against a fixed namespace of functions and constants;
//! nothing outside that namespace is reachable from an expression.

use std::fmt;
use std::iter::Peekable;
use std::vec::IntoIter;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{ERROR_MARKER, EvalError};
use super::token::{Function, Token, tokenize};

/// How trigonometric functions interpret their argument.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleMode {
    #[default]
    #[serde(rename = "deg")]
    Degrees,
    #[serde(rename = "rad")]
    Radians,
}

impl AngleMode {
    /// Label shown on the keypad.
    pub fn label(self) -> &'static str {
        match self {
            Self::Degrees => "DEG",
            Self::Radians => "RAD",
        }
    }

    fn to_radians(self, angle: f64) -> f64 {
        match self {
            Self::Degrees => angle.to_radians(),
            Self::Radians => angle,
        }
    }
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Evaluate a calculator expression in the given angle mode.
pub fn evaluate(expression: &str, mode: AngleMode) -> Result<f64, EvalError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        mode,
        depth: 0,
    };

    let value = parser.parse_expr()?;
    if let Some(extra) = parser.tokens.next() {
        return Err(EvalError::Syntax {
            expected: "operator or end of expression",
            found: extra.to_string(),
        });
    }

    finite(value)
}

/// Nesting limit for parentheses, calls, signs and exponents.
const MAX_DEPTH: usize = 256;

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    mode: AngleMode,
    depth: usize,
}

impl Parser {
    fn parse_expr(&mut self) -> Result<f64, EvalError> {
        let mut lhs = self.parse_term()?;

        while let Some(Token::Plus | Token::Minus) = self.tokens.peek() {
            let is_plus = self.tokens.next() == Some(Token::Plus);
            let rhs = self.parse_term()?;
            lhs = finite(if is_plus { lhs + rhs } else { lhs - rhs })?;
        }

        Ok(lhs)
    }

    fn parse_term(&mut self) -> Result<f64, EvalError> {
        let mut lhs = self.parse_unary()?;

        while let Some(op @ (Token::Star | Token::Slash | Token::Percent)) = self.tokens.peek() {
            let op = *op;
            self.tokens.next();
            let rhs = self.parse_unary()?;

            lhs = match op {
                Token::Star => finite(lhs * rhs)?,
                Token::Slash => divide(lhs, rhs)?,
                _ => modulo(lhs, rhs)?,
            };
        }

        Ok(lhs)
    }

    /// Every nested construct recurses through here, so this is where the
    /// nesting depth is bounded.
    fn parse_unary(&mut self) -> Result<f64, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep { limit: MAX_DEPTH });
        }

        self.depth += 1;
        let value = self.parse_signed();
        self.depth -= 1;
        value
    }

    fn parse_signed(&mut self) -> Result<f64, EvalError> {
        match self.tokens.peek() {
            Some(Token::Minus) => {
                self.tokens.next();
                Ok(-self.parse_unary()?)
            }
            Some(Token::Plus) => {
                self.tokens.next();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    /// `a ^ b` binds tighter than a sign on its left and is right associative,
    /// so `-2^2` is -4 and `2^3^2` is 512.
    fn parse_power(&mut self) -> Result<f64, EvalError> {
        let base = self.parse_primary()?;

        if let Some(Token::Caret) = self.tokens.peek() {
            self.tokens.next();
            let exponent = self.parse_unary()?;
            return power(base, exponent);
        }

        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<f64, EvalError> {
        let Some(token) = self.tokens.next() else {
            return Err(EvalError::UnexpectedEnd {
                expected: "number, constant, function or '('",
            });
        };

        match token {
            Token::Number(num) => Ok(num),
            Token::Constant(constant) => Ok(constant.value()),
            Token::LParen => {
                let value = self.parse_expr()?;
                self.expect_close()?;
                Ok(value)
            }
            Token::Call(function) => {
                let args = self.parse_args()?;
                if args.len() != function.arity() {
                    return Err(EvalError::Arity {
                        function: function.name(),
                        expected: function.arity(),
                        got: args.len(),
                    });
                }
                self.apply(function, &args)
            }
            other => Err(EvalError::Syntax {
                expected: "number, constant, function or '('",
                found: other.to_string(),
            }),
        }
    }

    /// Arguments after a function opener, up to and including the `)`.
    fn parse_args(&mut self) -> Result<Vec<f64>, EvalError> {
        let mut args = vec![self.parse_expr()?];
        while let Some(Token::Comma) = self.tokens.peek() {
            self.tokens.next();
            args.push(self.parse_expr()?);
        }
        self.expect_close()?;
        Ok(args)
    }

    fn expect_close(&mut self) -> Result<(), EvalError> {
        match self.tokens.next() {
            Some(Token::RParen) => Ok(()),
            Some(other) => Err(EvalError::Syntax {
                expected: "')'",
                found: other.to_string(),
            }),
            None => Err(EvalError::UnexpectedEnd { expected: "')'" }),
        }
    }

    fn apply(&self, function: Function, args: &[f64]) -> Result<f64, EvalError> {
        let x = args[0];
        let domain = || EvalError::Domain {
            function: function.name(),
        };

        let value = match function {
            Function::Sin => self.mode.to_radians(x).sin(),
            Function::Cos => self.mode.to_radians(x).cos(),
            Function::Tan => self.mode.to_radians(x).tan(),
            Function::Ln if x <= 0.0 => return Err(domain()),
            Function::Ln => x.ln(),
            Function::Log if x <= 0.0 => return Err(domain()),
            Function::Log => x.log10(),
            Function::Exp => x.exp(),
            Function::Sqrt if x < 0.0 => return Err(domain()),
            Function::Sqrt => x.sqrt(),
            Function::Factorial => factorial(x)?,
            Function::Reciprocal => divide(1.0, x)?,
            Function::Abs => x.abs(),
            Function::Square => power(x, 2.0)?,
            Function::Cube => power(x, 3.0)?,
            Function::Pow => power(x, args[1])?,
        };

        finite(value)
    }
}

fn finite(value: f64) -> Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::Overflow)
    }
}

fn divide(lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    if rhs == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    finite(lhs / rhs)
}

/// Floored modulo: the result takes the sign of the divisor.
fn modulo(lhs: f64, rhs: f64) -> Result<f64, EvalError> {
    if rhs == 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    let rem = lhs % rhs;
    if rem != 0.0 && (rem < 0.0) != (rhs < 0.0) {
        finite(rem + rhs)
    } else {
        finite(rem)
    }
}

fn power(base: f64, exponent: f64) -> Result<f64, EvalError> {
    if base == 0.0 && exponent < 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    // Real results only
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(EvalError::Domain { function: "pow" });
    }
    finite(base.powf(exponent))
}

fn factorial(x: f64) -> Result<f64, EvalError> {
    if x < 0.0 || x.fract() != 0.0 {
        return Err(EvalError::Domain {
            function: "factorial",
        });
    }

    // 171! no longer fits in an f64
    if x > 170.0 {
        return Err(EvalError::Overflow);
    }

    Ok((2..=x as u32).fold(1.0, |acc, n| acc * f64::from(n)))
}

/// Result of evaluating a calculator expression.
#[derive(Clone, Debug)]
pub enum CalcResult {
    /// Successful calculation with a valid numeric result.
    Success {
        /// The original expression.
        expression: String,
        /// The numeric value.
        value: f64,
        /// Formatted for display (optionally with thousand separators).
        display_result: String,
        /// Re-parseable form, used for `Ans` and as the next buffer.
        raw_result: String,
    },
    /// The expression could not be evaluated.
    Error {
        /// The original expression.
        expression: String,
        /// The cause, for logs.
        error: EvalError,
    },
}

impl CalcResult {
    /// Get the expression that was evaluated.
    pub fn expression(&self) -> &str {
        match self {
            Self::Success { expression, .. } => expression,
            Self::Error { expression, .. } => expression,
        }
    }

    /// Check if this is a successful result.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Get the display string (result or the error marker).
    pub fn display(&self) -> &str {
        match self {
            Self::Success { display_result, .. } => display_result,
            Self::Error { .. } => ERROR_MARKER,
        }
    }

    /// Get the raw result (only for successful results).
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Success { raw_result, .. } => Some(raw_result),
            Self::Error { .. } => None,
        }
    }

    /// Get the numeric value (only for successful results).
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Success { value, .. } => Some(*value),
            Self::Error { .. } => None,
        }
    }
}

/// Evaluate an expression and format the outcome for the display.
pub fn evaluate_expression(input: &str, mode: AngleMode, separators: bool) -> CalcResult {
    let expression = input.trim().to_string();

    match evaluate(&expression, mode) {
        Ok(value) => {
            debug!(%expression, %mode, value, "evaluated expression");
            let raw_result = format_raw(value);
            let display_result = if separators {
                format_display(&raw_result)
            } else {
                raw_result.clone()
            };
            CalcResult::Success {
                expression,
                value,
                display_result,
                raw_result,
            }
        }
        Err(error) => {
            debug!(%expression, %mode, %error, "evaluation failed");
            CalcResult::Error { expression, error }
        }
    }
}

/// Format a number so that evaluating the text gives back the same value.
pub fn format_raw(value: f64) -> String {
    let abs = value.abs();
    if value.fract() == 0.0 && abs < 1e15 {
        format!("{}", value as i64)
    } else if abs >= 1e15 || abs < 1e-4 {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

/// Add thousand separators to the integer part of a raw result.
fn format_display(raw: &str) -> String {
    // Exponent forms are already compact
    if raw.contains('e') {
        return raw.to_string();
    }

    let (sign, unsigned) = match raw.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", raw),
    };
    let (int_part, dec_part) = match unsigned.find('.') {
        Some(dot_pos) => unsigned.split_at(dot_pos),
        None => (unsigned, ""),
    };

    format!("{}{}{}", sign, format_with_separators(int_part), dec_part)
}

/// Group a string of digits in threes.
fn format_with_separators(digits: &str) -> String {
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str) -> f64 {
        evaluate(expr, AngleMode::Radians).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval("2+3*4"), 14.0);
        assert_eq!(eval("(2+3)*4"), 20.0);
        assert_eq!(eval("10-4-3"), 3.0);
        assert_eq!(eval("100/10/5"), 2.0);
        assert_eq!(eval("7/2"), 3.5);
    }

    #[test]
    fn test_power_associativity_and_sign() {
        assert_eq!(eval("2^3^2"), 512.0);
        assert_eq!(eval("-2^2"), -4.0);
        assert_eq!(eval("2^-1"), 0.5);
        assert_eq!(eval("(-2)^2"), 4.0);
        assert_eq!(eval("3--2"), 5.0);
    }

    #[test]
    fn test_modulo_sign_follows_divisor() {
        assert_eq!(eval("7 mod 3"), 1.0);
        assert_eq!(eval("-7%3"), 2.0);
        assert_eq!(eval("7%-3"), -2.0);
        assert_eq!(eval("6%3"), 0.0);
    }

    #[test]
    fn test_angle_modes() {
        assert!(approx(evaluate("sin(90)", AngleMode::Degrees).unwrap(), 1.0));
        assert!(approx(evaluate("cos(180)", AngleMode::Degrees).unwrap(), -1.0));
        assert!(approx(evaluate("tan(45)", AngleMode::Degrees).unwrap(), 1.0));
        assert!(approx(evaluate("sin(π/2)", AngleMode::Radians).unwrap(), 1.0));
        assert!(approx(evaluate("sin(90)", AngleMode::Radians).unwrap(), 90f64.sin()));
    }

    #[test]
    fn test_fixed_exponent_keys() {
        assert_eq!(eval("x^2(3)"), 9.0);
        assert_eq!(eval("x^3(2)"), 8.0);
        assert_eq!(eval("pow(2, 10)"), 1024.0);
        assert!(matches!(
            evaluate("x^2(3, 2)", AngleMode::Radians),
            Err(EvalError::Arity { .. })
        ));
        assert!(matches!(
            evaluate("pow(3)", AngleMode::Radians),
            Err(EvalError::Arity { .. })
        ));
    }

    #[test]
    fn test_scientific_functions() {
        assert_eq!(eval("n!(5)"), 120.0);
        assert_eq!(eval("n!(0)"), 1.0);
        assert_eq!(eval("1/x(4)"), 0.25);
        assert_eq!(eval("|x|(-3)"), 3.0);
        assert_eq!(eval("√(16)"), 4.0);
        assert!(approx(eval("log(1000)"), 3.0));
        assert!(approx(eval("ln(e)"), 1.0));
        assert!(approx(eval("exp(1)"), std::f64::consts::E));
        assert!(approx(eval("EE"), std::f64::consts::E));
    }

    #[test]
    fn test_domain_errors() {
        for expr in ["√(-1)", "ln(0)", "log(-1)", "n!(-1)", "n!(2.5)", "(-8)^(1/3)"] {
            assert!(
                matches!(evaluate(expr, AngleMode::Radians), Err(EvalError::Domain { .. })),
                "{expr} should be a domain error"
            );
        }
    }

    #[test]
    fn test_division_by_zero() {
        for expr in ["5/0", "1/x(0)", "5%0", "0^-1"] {
            assert_eq!(
                evaluate(expr, AngleMode::Radians),
                Err(EvalError::DivisionByZero),
                "{expr}"
            );
        }
    }

    #[test]
    fn test_overflow() {
        assert_eq!(evaluate("exp(1000)", AngleMode::Radians), Err(EvalError::Overflow));
        assert_eq!(evaluate("n!(171)", AngleMode::Radians), Err(EvalError::Overflow));
        assert_eq!(evaluate("1e308*10", AngleMode::Radians), Err(EvalError::Overflow));
    }

    #[test]
    fn test_malformed_input() {
        for expr in ["", "2+", "(2+3", "2+3)", "sin(90", "2 3", "2π", "2(3)", "*2", "()"] {
            assert!(evaluate(expr, AngleMode::Degrees).is_err(), "{expr} should fail");
        }
    }

    #[test]
    fn test_deep_nesting_fails_cleanly() {
        let parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(
            evaluate(&parens, AngleMode::Degrees),
            Err(EvalError::TooDeep { limit: MAX_DEPTH })
        );

        let signs = format!("{}1", "-".repeat(200_000));
        assert!(matches!(
            evaluate(&signs, AngleMode::Degrees),
            Err(EvalError::TooDeep { .. })
        ));

        let calls = format!("{}1{}", "|x|(".repeat(50_000), ")".repeat(50_000));
        assert!(evaluate(&calls, AngleMode::Degrees).is_err());

        let exponents = format!("1{}", "^1".repeat(50_000));
        assert!(evaluate(&exponents, AngleMode::Degrees).is_err());
    }

    #[test]
    fn test_moderate_nesting_still_evaluates() {
        let parens = format!("{}2{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(eval(&parens), 2.0);
        assert_eq!(eval(&format!("{}3", "-".repeat(100))), 3.0);
    }

    #[test]
    fn test_format_raw() {
        assert_eq!(format_raw(14.0), "14");
        assert_eq!(format_raw(-5.0), "-5");
        assert_eq!(format_raw(3.5), "3.5");
        assert_eq!(format_raw(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_raw(1e15), "1e15");
        assert_eq!(format_raw(0.000015), "1.5e-5");
        assert_eq!(format_raw(-0.0), "0");
    }

    #[test]
    fn test_format_raw_round_trips() {
        for value in [std::f64::consts::PI, 1.0 / 3.0, 2.5e20, -1.25e-9, 123456.789] {
            let raw = format_raw(value);
            assert_eq!(eval(&raw), value, "{raw}");
        }
    }

    #[test]
    fn test_thousand_separators() {
        let result = evaluate_expression("1000 * 1000", AngleMode::Degrees, true);
        assert!(result.is_success());
        assert_eq!(result.display(), "1,000,000");
        assert_eq!(result.raw(), Some("1000000"));

        let result = evaluate_expression("-1234.5", AngleMode::Degrees, true);
        assert_eq!(result.display(), "-1,234.5");
    }

    #[test]
    fn test_error_result_uses_marker() {
        let result = evaluate_expression("1 / 0", AngleMode::Degrees, false);
        assert!(!result.is_success());
        assert_eq!(result.display(), "Error");
        assert_eq!(result.raw(), None);
        assert_eq!(result.expression(), "1 / 0");
    }
}
