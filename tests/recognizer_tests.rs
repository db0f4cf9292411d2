// Integration tests for the calculator recognizer

use calcparse::parser::{
    recognize, recognize_from, recognize_with, Diagnostic, LexError, Lexer, NonTerminal, Parser,
    RecoveryMode, SyntaxError, SourceLocation, Token,
};
use calcparse::trace::{TraceEvent, TraceLog};
use std::fs;
use std::path::Path;

fn demo(name: &str) -> String {
    let path = Path::new("demos").join(name);
    fs::read_to_string(path).expect("Failed to read demo file")
}

fn matched_eof(trace: &TraceLog) -> usize {
    trace
        .events()
        .iter()
        .filter(|e| matches!(e, TraceEvent::Match { token } if token.token == Token::Eof))
        .count()
}

#[test]
fn test_demo_programs_are_accepted() {
    for name in ["default.calc", "gcd.calc"] {
        let source = demo(name);
        let outcome = recognize(&source);
        assert!(
            outcome.is_accepted(),
            "{} rejected: {:?}",
            name,
            outcome.diagnostics
        );

        let mut parser = Parser::with_lexer(Lexer::new(&source), (), RecoveryMode::Strict);
        assert!(parser.parse().is_ok(), "{} rejected in strict mode", name);
    }
}

#[test]
fn test_error_demo_reports_every_error() {
    let (outcome, trace) = recognize_with(&demo("errors.calc"), TraceLog::new());

    assert_eq!(outcome.lexical_errors(), 2);
    assert_eq!(outcome.syntax_errors(), 4);

    let lines: Vec<usize> = outcome
        .diagnostics
        .iter()
        .map(|d| d.location().line)
        .collect();
    assert_eq!(lines, vec![2, 2, 3, 3, 5, 6]);
    assert_eq!(trace.diagnostics_on_line(1), 0);
    assert_eq!(trace.diagnostics_on_line(3), 2);
    assert_eq!(trace.diagnostics_on_line(4), 0);

    // `read real;` is missing its identifier
    assert_eq!(
        outcome.diagnostics[4],
        Diagnostic::Syntax(SyntaxError::Mismatch {
            expected: Token::Id,
            found: Token::Semicolon,
            location: SourceLocation::new(5, 10),
        })
    );
    assert_eq!(matched_eof(&trace), 1);
}

#[test]
fn test_strict_mode_stops_on_error_demo() {
    let source = demo("errors.calc");
    let mut parser = Parser::with_lexer(Lexer::new(&source), TraceLog::new(), RecoveryMode::Strict);
    let err = parser.parse().unwrap_err();
    assert!(err.diagnostic.is_lexical());
    assert_eq!(err.diagnostic.location().line, 2);
    assert_eq!(parser.listener().events().iter().filter(|e| e.is_diagnostic()).count(), 1);
}

#[test]
fn test_trailing_end_is_a_single_mismatch() {
    let outcome = recognize("int x := 1 + 2 * 3 ; write x ; end");
    assert_eq!(outcome.diagnostics.len(), 1);
    assert!(matches!(
        outcome.diagnostics[0],
        Diagnostic::Syntax(SyntaxError::Mismatch {
            expected: Token::Eof,
            found: Token::End,
            ..
        })
    ));
}

#[test]
fn test_recovery_always_reaches_eof() {
    let inputs = [
        ")))))",
        "end end end ;;;",
        ":= := :=",
        "if then do end while",
        "int int int 1 2 3",
        "write ( ( ( ( 1",
        "x := 1 +",
        "read 3;",
        "float(trunc()) := ;",
        "@ # $ % ^ & ! ? ~ `",
        "while while while do do",
        "1.e 2.3e+ : = <> <= >=",
    ];
    for source in inputs {
        let (outcome, trace) = recognize_with(source, TraceLog::new());
        assert!(!outcome.is_accepted(), "accepted garbage: {:?}", source);
        assert_eq!(matched_eof(&trace), 1, "eof not matched once for {:?}", source);
        assert!(
            matches!(trace.events().last(), Some(TraceEvent::Match { token }) if token.token == Token::Eof),
            "trace of {:?} does not end at eof",
            source
        );
    }
}

#[test]
fn test_recognition_is_repeatable() {
    let source = demo("errors.calc");
    let (first, first_trace) = recognize_with(&source, TraceLog::new());
    let (second, second_trace) = recognize_with(&source, TraceLog::new());
    assert_eq!(first, second);
    assert_eq!(first_trace.lines(), second_trace.lines());
}

#[test]
fn test_every_factor_form() {
    let source = "write 1 + 2.5 * x / (y - trunc(3.0e-1)) - float(4);";
    let (outcome, trace) = recognize_with(source, TraceLog::new());
    assert!(outcome.is_accepted());

    let productions: Vec<String> = trace.productions().map(|p| p.to_string()).collect();
    for expected in [
        "factor --> i_num",
        "factor --> r_num",
        "factor --> id",
        "factor --> ( expr )",
        "factor --> trunc ( expr )",
        "factor --> float ( expr )",
        "add_op --> +",
        "add_op --> -",
        "mul_op --> *",
        "mul_op --> /",
    ] {
        assert!(
            productions.iter().any(|p| p == expected),
            "missing prediction {}",
            expected
        );
    }
}

#[test]
fn test_every_relational_operator() {
    for op in ["==", "<>", "<", ">", "<=", ">="] {
        let source = format!("if a {} b then write a; end;", op);
        assert!(recognize(&source).is_accepted(), "rejected {}", op);
    }
}

#[test]
fn test_condition_without_operator() {
    let outcome = recognize("while x do x := x - 1; end;");
    assert!(matches!(
        outcome.diagnostics[0],
        Diagnostic::Syntax(SyntaxError::Unexpected {
            nonterminal: NonTerminal::Ro,
            found: Token::Do,
            ..
        })
    ));
}

#[test]
fn test_long_statement_list() {
    let source = "x := 1;\n".repeat(100_000);
    let (outcome, trace) = recognize_with(&source, TraceLog::new());
    assert!(outcome.is_accepted());
    assert_eq!(matched_eof(&trace), 1);
}

#[test]
fn test_long_sum_and_product() {
    let operands = vec!["1"; 100_000];
    for op in [" + ", " * "] {
        let source = format!("write {};", operands.join(op));
        assert!(recognize(&source).is_accepted(), "rejected long {:?} chain", op);
    }
}

#[test]
fn test_long_run_of_errors_terminates() {
    let source = "int ".repeat(100_000);
    let (outcome, trace) = recognize_with(&source, TraceLog::new());
    assert!(outcome.syntax_errors() >= 100_000);
    assert_eq!(matched_eof(&trace), 1);
}

#[test]
fn test_non_utf8_byte_is_a_lexical_error() {
    let input = b"x := 1;\xe9\n";
    let (outcome, trace) = recognize_from(
        Lexer::with_input(input.iter().copied()),
        TraceLog::new(),
        RecoveryMode::Resilient,
    );

    assert_eq!(outcome.lexical_errors(), 1);
    assert_eq!(outcome.syntax_errors(), 0);
    match &outcome.diagnostics[0] {
        Diagnostic::Lexical(err @ LexError::UnexpectedChar { location, .. }) => {
            assert_eq!(*location, SourceLocation::new(1, 8));
            assert!(err.to_string().contains("'\\xe9' (0xe9)"), "{}", err);
        }
        other => panic!("expected an unexpected character, got {:?}", other),
    }
    assert_eq!(matched_eof(&trace), 1);
}
