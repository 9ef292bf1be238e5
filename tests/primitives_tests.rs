//! Primitive library exercised through whole programs

use std::io;

use rexp::runtime::{EvalConfig, LispEvaluator, Session, Value};
use rexp::{Builtin, CallContext, Environment, Error, PrimitiveRegistry};

fn execute(source: &str) -> rexp::Result<Value> {
    let evaluator =
        LispEvaluator::with_io(EvalConfig::default(), Box::new(io::empty()), Box::new(io::sink()));
    Session::with_evaluator(evaluator).eval_str(source)
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|n| Value::Int(*n)).collect()
}

#[test]
fn test_arithmetic_is_variadic() {
    assert_eq!(execute("(+ 1 2 3 4)").unwrap(), Value::Int(10));
    assert_eq!(execute("(- 10 1 2)").unwrap(), Value::Int(7));
    assert_eq!(execute("(* 1.5 2)").unwrap(), Value::Float(3.0));
    assert_eq!(execute("(/ 9 3)").unwrap(), Value::Float(3.0));
}

#[test]
fn test_printed_forms() {
    assert_eq!(rexp::run("(/ 9 3)").unwrap(), "3.0");
    assert_eq!(rexp::run("(list \"a\" 1 #false)").unwrap(), "(list \"a\" 1 #false)");
    assert_eq!(rexp::run("(rest (list 1))").unwrap(), "empty");
    assert_eq!(rexp::run("add1").unwrap(), "#<procedure:add1>");
    assert_eq!(rexp::run("(fun (a b) a)").unwrap(), "#<procedure:fun/2>");
}

#[test]
fn test_list_operations() {
    assert_eq!(execute("(cons 1 (cons 2 empty))").unwrap(), ints(&[1, 2]));
    assert_eq!(execute("(empty? (rest (list 1)))").unwrap(), Value::Bool(true));
    assert_eq!(execute("(length (list 1 2 3))").unwrap(), Value::Int(3));
    assert_eq!(execute("(list-ref (list 4 5 6) 2)").unwrap(), Value::Int(6));
    assert_eq!(
        execute("(second (list 1 2 3))").unwrap(),
        execute("(list-ref (list 1 2 3) 1)").unwrap()
    );
    assert!(matches!(
        execute("(first empty)"),
        Err(Error::EmptyCollection { .. })
    ));
}

#[test]
fn test_strings_and_characters() {
    assert_eq!(
        execute("(list->string (reverse (explode \"abc\")))").unwrap(),
        Value::string("cba")
    );
    assert_eq!(
        execute("(list->string (map integer->char (list 104 105)))").unwrap(),
        Value::string("hi")
    );
    assert_eq!(execute("(< \"abc\" \"abd\")").unwrap(), Value::Bool(true));
}

#[test]
fn test_higher_order_with_closures() {
    assert_eq!(
        execute("(foldl (fun (x acc) (+ acc (* x x))) 0 (list 1 2 3))").unwrap(),
        Value::Int(14)
    );
    assert_eq!(
        execute("(map (fun (a b) (list a b)) (list 1 2) (list 3 4))").unwrap(),
        vec![Value::list(ints(&[1, 3])), Value::list(ints(&[2, 4]))]
    );
    assert_eq!(
        execute("(ormap (fun (s) (equal? s \"b\")) (quote a b c))").unwrap(),
        Value::Bool(true)
    );
    assert_eq!(execute("(andmap odd? (list 1 3 5))").unwrap(), Value::Bool(true));
}

#[test]
fn test_logic_is_eager() {
    assert!(matches!(
        execute("(and #false (error \"evaluated\"))"),
        Err(Error::UserError(_))
    ));
    assert_eq!(execute("(or 0 \"\" (list 1))").unwrap(), Value::Bool(true));
    assert_eq!(execute("(not empty)").unwrap(), Value::Bool(true));
}

#[test]
fn test_begin_returns_last() {
    assert_eq!(execute("(begin 1 2 3)").unwrap(), Value::Int(3));
    assert_eq!(execute("(begin)").unwrap(), Value::Void);
}

#[test]
fn test_fixed_arity_primitives_check_argument_count() {
    assert!(matches!(
        execute("(add1 1 2)"),
        Err(Error::InvalidArguments { .. })
    ));
    assert!(matches!(
        execute("(cons 1)"),
        Err(Error::InvalidArguments { .. })
    ));
}

#[test]
fn test_custom_registry() {
    fn twice(args: &[Value], ctx: &mut dyn CallContext) -> rexp::Result<Value> {
        let once = ctx.apply(&args[0], vec![args[1].clone()])?;
        ctx.apply(&args[0], vec![once])
    }

    fn succ(args: &[Value], _ctx: &mut dyn CallContext) -> rexp::Result<Value> {
        Ok(Value::Int(args[0].as_int()? + 1))
    }

    let mut registry = PrimitiveRegistry::empty();
    registry.register(Builtin::fixed("twice", "Apply a procedure twice", 2, twice));
    registry.register(Builtin::fixed("succ", "Successor", 1, succ));
    let mut env = Environment::with_primitives(&registry);
    assert!(!env.contains("+"));

    let mut evaluator = LispEvaluator::new();
    let expr = rexp::parse("(twice (fun (x) (succ x)) 5)").unwrap();
    assert_eq!(evaluator.eval(&expr, &mut env).unwrap(), Value::Int(7));

    let primitive = registry.get("twice").unwrap();
    assert_eq!(primitive.arity(), Some(2));
    assert_eq!(primitive.description(), "Apply a procedure twice");
}

#[test]
fn test_build_list_with_huge_count_reports_error() {
    assert!(matches!(
        execute("(build-list 1000000000000000 (fun (i) (if0 (> i 2) (error \"stop at\" i) i)))"),
        Err(Error::UserError(message)) if message == "stop at 3"
    ));
}
