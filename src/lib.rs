//! Keypad calculator with a restricted scientific expression evaluator.
//!
//! The core is [`calculator::evaluate`], which turns calculator notation such
//! as `sin(90)+n!(3)` into a number for a given [`calculator::AngleMode`].
//! [`keypad::Keypad`] builds expressions from key presses the way the basic
//! and scientific keypads do.

pub mod calculator;
pub mod config;
pub mod keypad;
