use scicalc::calculator::{AngleMode, EvalError, evaluate, evaluate_expression};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_basic_arithmetic_follows_precedence() {
    let cases = [
        ("2+3*4", 14.0),
        ("2*3+4", 10.0),
        ("8-2-1", 5.0),
        ("1+2*3-4/2", 5.0),
        ("9÷3×2", 6.0),
        ("(1+2)*(3+4)", 21.0),
        ("0.5+0.25", 0.75),
    ];
    for (expr, expected) in cases {
        assert_eq!(evaluate(expr, AngleMode::Degrees), Ok(expected), "{expr}");
    }
}

#[test]
fn test_pi_constant() {
    let value = evaluate("π", AngleMode::Radians).unwrap();
    assert!(approx(value, 3.14159265358979));
    assert!(approx(evaluate("2*π", AngleMode::Degrees).unwrap(), std::f64::consts::TAU));
}

#[test]
fn test_trig_respects_angle_mode() {
    assert!(approx(evaluate("sin(90)", AngleMode::Degrees).unwrap(), 1.0));
    assert!(approx(evaluate("sin(π/2)", AngleMode::Radians).unwrap(), 1.0));
    assert!(approx(evaluate("cos(0)", AngleMode::Degrees).unwrap(), 1.0));
    assert!(approx(evaluate("tan(π/4)", AngleMode::Radians).unwrap(), 1.0));
    // Only trig arguments are converted
    assert!(approx(evaluate("sin(30)+30", AngleMode::Degrees).unwrap(), 30.5));
}

#[test]
fn test_factorial() {
    assert_eq!(evaluate("n!(5)", AngleMode::Degrees), Ok(120.0));
    assert!(evaluate("n!(-1)", AngleMode::Degrees).is_err());
    assert!(evaluate("n!(1.5)", AngleMode::Degrees).is_err());
}

#[test]
fn test_division_by_zero_is_a_failure_not_infinity() {
    assert_eq!(evaluate("1/x(0)", AngleMode::Degrees), Err(EvalError::DivisionByZero));
    assert_eq!(evaluate("5/0", AngleMode::Degrees), Err(EvalError::DivisionByZero));
}

#[test]
fn test_keypad_tokens() {
    let cases = [
        ("2x^y3", 8.0),
        ("2^10", 1024.0),
        ("x^2(3)", 9.0),
        ("x^3(3)", 27.0),
        ("pow(2, 0.5)*pow(2, 0.5)", 2.0),
        ("|x|(-4.5)", 4.5),
        ("1/x(8)", 0.125),
        ("√(2)^2", 2.0),
        ("10 mod 4", 2.0),
        ("2EE3", 2000.0),
        ("log(100)+ln(1)", 2.0),
    ];
    for (expr, expected) in cases {
        let value = evaluate(expr, AngleMode::Degrees).unwrap();
        assert!(approx(value, expected), "{expr} = {value}, expected {expected}");
    }
}

#[test]
fn test_malformed_input_always_fails() {
    let cases = [
        "(2+3", "2+3)", "2+", "2*", "((1)", "sin(", "n!(5", ")", "1..2", "2 + + ", "pow(1,)",
    ];
    for expr in cases {
        assert!(evaluate(expr, AngleMode::Degrees).is_err(), "{expr} should fail");
    }
}

#[test]
fn test_namespace_is_restricted() {
    let cases = [
        "__import__('os').system('ls')",
        "open('/etc/passwd')",
        "math.pi",
        "exit()",
        "x",
        "Ans",
    ];
    for expr in cases {
        assert!(
            matches!(
                evaluate(expr, AngleMode::Degrees),
                Err(EvalError::UnknownToken { .. })
            ),
            "{expr} should be rejected"
        );
    }
}

#[test]
fn test_formatted_results() {
    let result = evaluate_expression("2+3*4", AngleMode::Degrees, false);
    assert_eq!(result.display(), "14");

    let result = evaluate_expression("1/4", AngleMode::Degrees, false);
    assert_eq!(result.display(), "0.25");

    let result = evaluate_expression("2+", AngleMode::Degrees, false);
    assert_eq!(result.display(), "Error");
}
