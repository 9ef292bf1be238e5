//! Top-level driver tests: comments, reporting and fail-fast behaviour

use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

use rexp::runtime::{run_forms, EvalConfig, LispEvaluator, Session, Value};
use rexp::{parse_program, Environment, Error};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

/// Runs `source` with `input` as stdin; returns the outcome and everything printed
fn run_captured(source: &str, input: &str) -> (rexp::Result<Vec<Value>>, String) {
    let out = SharedBuffer::default();
    let evaluator = LispEvaluator::with_io(
        EvalConfig::default(),
        Box::new(Cursor::new(input.to_string())),
        Box::new(out.clone()),
    );
    let result = Session::with_evaluator(evaluator).run_source(source);
    (result, out.contents())
}

#[test]
fn test_prints_each_result_in_order() {
    let (result, output) = run_captured(
        r#"
        (define double (fun (x) (* 2 x)))
        (double 21)
        (list 1 2 3)
        "done"
        (/ 1 2)
        empty
        #true
        "#,
        "",
    );
    assert_eq!(result.unwrap().len(), 7);
    assert_eq!(output, "42\n(list 1 2 3)\n\"done\"\n0.5\nempty\n#true\n");
}

#[test]
fn test_comments_are_ignored() {
    let (result, output) = run_captured(
        r#"
        ; line comment (+ 1 1)
        (+ 1 2) ; trailing comment
        #| block comment
           spanning lines (error "never") |#
        "a ; string with semicolon"
        "#,
        "",
    );
    assert!(result.is_ok());
    assert_eq!(output, "3\n\"a ; string with semicolon\"\n");
}

#[test]
fn test_display_and_read_share_sinks() {
    let (result, output) = run_captured(
        r#"
        (define n (read))
        (display "got ")
        (display (+ n 1))
        (read)
        "#,
        "41\nhello\n",
    );
    assert!(result.is_ok());
    assert_eq!(output, "got 42\"hello\"\n");
}

#[test]
fn test_fails_fast_after_printing_earlier_results() {
    let (result, output) = run_captured("(+ 1 1) (undefined-proc 1) (+ 2 2)", "");
    assert_eq!(result, Err(Error::unbound("undefined-proc")));
    assert_eq!(output, "2\n");
}

#[test]
fn test_syntax_error_prints_nothing() {
    let (result, output) = run_captured("(+ 1 1) (+ 1", "");
    assert_eq!(result, Err(Error::UnexpectedEof));
    assert_eq!(output, "");

    let (result, _) = run_captured("(+ 1 1))", "");
    assert!(matches!(result, Err(Error::SyntaxError { .. })));
}

#[test]
fn test_check_expect_passes_silently() {
    let (result, output) = run_captured(
        "(check-expect (reverse (list 1 2)) (list 2 1)) (check-expect 1 2) 3",
        "",
    );
    assert!(matches!(result, Err(Error::CheckFailed { .. })));
    assert_eq!(output, "");
}

#[test]
fn test_run_forms_threads_environment() {
    let program = parse_program("(define a 1) (define b (+ a 1)) (list a b)").unwrap();
    let mut env = Environment::top_level();
    let mut evaluator =
        LispEvaluator::with_io(EvalConfig::default(), Box::new(io::empty()), Box::new(io::sink()));

    let values = run_forms(&mut evaluator, &program.forms, &mut env).unwrap();
    assert_eq!(values[2], vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(env.lookup("b").unwrap(), Value::Int(2));
}

#[test]
fn test_evaluate_returns_snapshot_for_fun() {
    let program = parse_program("(define a 1) (fun (x) a)").unwrap();
    let mut evaluator = LispEvaluator::new();
    let env = Environment::top_level();

    let (_, env) = evaluator.evaluate(&program.forms[0], env).unwrap();
    let (closure, snapshot) = evaluator.evaluate(&program.forms[1], env).unwrap();
    assert!(closure.is_procedure());
    assert_eq!(snapshot.lookup("a").unwrap(), Value::Int(1));
}

#[test]
fn test_determinism_across_fresh_environments() {
    let source = r#"
        (define xs (build-list 10 (fun (i) (* i i))))
        (foldl + 0 (filter even? xs))
    "#;
    let (first, _) = run_captured(source, "");
    let (second, _) = run_captured(source, "");
    assert_eq!(first.unwrap(), second.unwrap());
}

#[test]
fn test_deeply_nested_program_reports_instead_of_aborting() {
    let depth = 50_000;
    let source = format!("{}1{}", "(add1 ".repeat(depth), ")".repeat(depth));
    let (result, output) = run_captured(&source, "");
    assert_eq!(result.unwrap(), vec![Value::Int(depth as i64 + 1)]);
    assert_eq!(output, format!("{}\n", depth + 1));

    let quoted = format!("(length '{}1{})", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(run_captured(&quoted, "").0.unwrap(), vec![Value::Int(1)]);

    let evaluator = LispEvaluator::with_io(
        EvalConfig { max_depth: 1_000 },
        Box::new(io::empty()),
        Box::new(io::sink()),
    );
    assert_eq!(
        Session::with_evaluator(evaluator).run_source(&source),
        Err(Error::StackExhausted { limit: 1_000 })
    );
}
