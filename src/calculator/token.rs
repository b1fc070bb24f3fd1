//! Tokenizer for calculator notation.
//!
//! Every key fragment the keypad can produce (`sin(`, `n!(`, `1/x(`, `x^y`,
//! `π`, `EE`, ...) is recognised directly as a token, so the expression never
//! goes through a chain of textual rewrites before it is parsed.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

use super::error::EvalError;

lazy_static! {
    /// Decimal literal with an optional exponent. `EE` is the keypad's
    /// exponent key and is accepted wherever `e` is.
    static ref NUMBER: Regex = Regex::new(
        r"^(?:\d+\.?\d*|\.\d+)(?:(?:EE|[eE])[+-]?\d+)?"
    ).unwrap();

    /// A run of letters: function names, constants and the `mod` operator.
    static ref WORD: Regex = Regex::new(r"^[A-Za-z]+").unwrap();
}

/// A named constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constant {
    /// `π` or `pi`
    Pi,
    /// Euler's number: `e`, or `EE` on its own
    E,
}

impl Constant {
    /// Numeric value of the constant.
    pub fn value(self) -> f64 {
        match self {
            Self::Pi => std::f64::consts::PI,
            Self::E => std::f64::consts::E,
        }
    }
}

/// A function of the restricted namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Ln,
    Log,
    Exp,
    Sqrt,
    Factorial,
    Reciprocal,
    Abs,
    Square,
    Cube,
    Pow,
}

impl Function {
    /// Name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Ln => "ln",
            Self::Log => "log",
            Self::Exp => "exp",
            Self::Sqrt => "sqrt",
            Self::Factorial => "factorial",
            Self::Reciprocal => "1/x",
            Self::Abs => "abs",
            Self::Square => "x^2",
            Self::Cube => "x^3",
            Self::Pow => "pow",
        }
    }

    /// Number of arguments the function takes.
    pub fn arity(self) -> usize {
        match self {
            Self::Pow => 2,
            _ => 1,
        }
    }

    /// Look up a function by the name typed before its `(`.
    fn from_word(word: &str) -> Option<Self> {
        let function = match word {
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "ln" => Self::Ln,
            "log" => Self::Log,
            "exp" => Self::Exp,
            "sqrt" => Self::Sqrt,
            "factorial" => Self::Factorial,
            "abs" => Self::Abs,
            "pow" => Self::Pow,
            _ => return None,
        };
        Some(function)
    }
}

/// A lexical unit of calculator notation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Token {
    /// Decimal literal, exponent already applied.
    Number(f64),

    /// '+'
    Plus,

    /// '-'
    Minus,

    /// '*', '×'
    Star,

    /// '/', '÷'
    Slash,

    /// '%', 'mod'
    Percent,

    /// '^', '**', 'x^y'
    Caret,

    /// '('
    LParen,

    /// ')'
    RParen,

    /// ','
    Comma,

    /// 'π', 'pi', 'e', 'EE'
    Constant(Constant),

    /// A function name together with its opening parenthesis.
    Call(Function),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Number(num) => write!(f, "number {num}"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Percent => write!(f, "'%'"),
            Token::Caret => write!(f, "'^'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Constant(Constant::Pi) => write!(f, "'π'"),
            Token::Constant(Constant::E) => write!(f, "'e'"),
            Token::Call(function) => write!(f, "'{}('", function.name()),
        }
    }
}

/// Fixed symbols, checked in order before numbers and words. Longer
/// fragments come first where one is a prefix of another.
const SYMBOLS: &[(&str, Token)] = &[
    ("1/x(", Token::Call(Function::Reciprocal)),
    ("|x|(", Token::Call(Function::Abs)),
    ("x^2(", Token::Call(Function::Square)),
    ("x^3(", Token::Call(Function::Cube)),
    ("x^y", Token::Caret),
    ("n!(", Token::Call(Function::Factorial)),
    ("√(", Token::Call(Function::Sqrt)),
    ("**", Token::Caret),
    ("π", Token::Constant(Constant::Pi)),
    ("×", Token::Star),
    ("÷", Token::Slash),
    ("+", Token::Plus),
    ("-", Token::Minus),
    ("*", Token::Star),
    ("/", Token::Slash),
    ("%", Token::Percent),
    ("^", Token::Caret),
    ("(", Token::LParen),
    (")", Token::RParen),
    (",", Token::Comma),
];

/// Iterator over the tokens of an expression.
pub struct Lexer<'a> {
    input: &'a str,
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Start lexing at the beginning of `input`.
    pub fn new(input: &'a str) -> Self {
        Self { input, offset: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.offset..]
    }

    /// Character position of the current byte offset, for error messages.
    fn char_offset(&self) -> usize {
        self.input[..self.offset].chars().count()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.offset += rest.len() - rest.trim_start().len();
    }

    fn lex_number(&mut self) -> Option<Result<Token, EvalError>> {
        let literal = NUMBER.find(self.rest())?.as_str();
        let position = self.char_offset();
        self.offset += literal.len();

        // Rust's float parser only knows the single-letter exponent
        let normalized = literal.replacen("EE", "e", 1);
        Some(match normalized.parse::<f64>() {
            Ok(num) => Ok(Token::Number(num)),
            Err(_) => Err(EvalError::UnknownToken {
                token: literal.to_string(),
                position,
            }),
        })
    }

    fn lex_word(&mut self) -> Option<Result<Token, EvalError>> {
        let word = WORD.find(self.rest())?.as_str();
        let position = self.char_offset();
        self.offset += word.len();

        let token = match word {
            "mod" => Token::Percent,
            "pi" => Token::Constant(Constant::Pi),
            "e" | "EE" => Token::Constant(Constant::E),
            _ => {
                let Some(function) = Function::from_word(word) else {
                    return Some(Err(EvalError::UnknownToken {
                        token: word.to_string(),
                        position,
                    }));
                };

                // A function name is only meaningful with its opener
                self.skip_whitespace();
                if !self.rest().starts_with('(') {
                    return Some(Err(EvalError::Syntax {
                        expected: "'(' after function name",
                        found: word.to_string(),
                    }));
                }
                self.offset += 1;
                Token::Call(function)
            }
        };

        Some(Ok(token))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let rest = self.rest();
        if rest.is_empty() {
            return None;
        }

        if let Some((symbol, token)) = SYMBOLS.iter().find(|(s, _)| rest.starts_with(s)) {
            self.offset += symbol.len();
            return Some(Ok(*token));
        }

        if let Some(number) = self.lex_number() {
            return Some(number);
        }

        if let Some(word) = self.lex_word() {
            return Some(word);
        }

        let position = self.char_offset();
        let ch = rest.chars().next()?;
        self.offset += ch.len_utf8();
        Some(Err(EvalError::UnknownToken {
            token: ch.to_string(),
            position,
        }))
    }
}

/// Split an expression into tokens, failing on the first unknown one.
pub fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    Lexer::new(input).collect()
}
