//! Comparison and logic primitives

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::primitives::{expect_at_least, Builtin, CallContext, PrimitiveRegistry};
use crate::runtime::Value;

/// Register comparison and logic primitives
pub fn register(registry: &mut PrimitiveRegistry) {
    registry.register(Builtin::variadic("<", "Strictly increasing", less));
    registry.register(Builtin::variadic(">", "Strictly decreasing", greater));
    registry.register(Builtin::variadic("<=", "Non-decreasing", less_equal));
    registry.register(Builtin::variadic(">=", "Non-increasing", greater_equal));
    registry.register(Builtin::fixed(
        "equal?",
        "Structural equality; numbers compare by value",
        2,
        equal,
    ));
    registry.register(Builtin::variadic("and", "True when every argument is truthy", and));
    registry.register(Builtin::variadic("or", "True when any argument is truthy", or));
    registry.register(Builtin::fixed("not", "Logical negation", 1, not));
}

/// Orders two numbers or two strings
fn compare(op: &str, lhs: &Value, rhs: &Value) -> Result<Ordering> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => lhs
            .as_float()?
            .partial_cmp(&rhs.as_float()?)
            .ok_or_else(|| Error::invalid_args(op, "cannot order NaN")),
        (Value::Int(_) | Value::Float(_) | Value::String(_), other) => Err(Error::TypeError {
            expected: lhs.type_name(),
            got: other.type_name(),
        }),
        (other, _) => Err(Error::TypeError {
            expected: "number or string".to_string(),
            got: other.type_name(),
        }),
    }
}

/// True when every adjacent pair satisfies `holds`
fn chain(op: &str, args: &[Value], holds: fn(Ordering) -> bool) -> Result<Value> {
    expect_at_least(op, args, 1)?;
    for pair in args.windows(2) {
        if !holds(compare(op, &pair[0], &pair[1])?) {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn less(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    chain("<", args, Ordering::is_lt)
}

fn greater(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    chain(">", args, Ordering::is_gt)
}

fn less_equal(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    chain("<=", args, Ordering::is_le)
}

fn greater_equal(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    chain(">=", args, Ordering::is_ge)
}

fn equal(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    Ok(Value::Bool(args[0] == args[1]))
}

fn and(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    Ok(Value::Bool(args.iter().all(Value::is_truthy)))
}

fn or(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    Ok(Value::Bool(args.iter().any(Value::is_truthy)))
}

fn not(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    Ok(Value::Bool(!args[0].is_truthy()))
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::primitives::testing::call;
    use crate::runtime::Value;

    #[test]
    fn test_numeric_comparisons() {
        assert_eq!(call(">", vec![Value::Int(5), Value::Int(3)]).unwrap(), Value::Bool(true));
        assert_eq!(call("<", vec![Value::Int(5), Value::Int(3)]).unwrap(), Value::Bool(false));
        assert_eq!(
            call("<=", vec![Value::Int(1), Value::Float(1.0), Value::Int(2)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("<", vec![Value::Int(1), Value::Int(3), Value::Int(2)]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_string_comparisons() {
        assert_eq!(
            call("<", vec![Value::string("apple"), Value::string("banana")]).unwrap(),
            Value::Bool(true)
        );
        assert!(matches!(
            call("<", vec![Value::string("a"), Value::Int(1)]),
            Err(Error::TypeError { .. })
        ));
    }

    #[test]
    fn test_equal() {
        assert_eq!(call("equal?", vec![Value::Int(1), Value::Int(1)]).unwrap(), Value::Bool(true));
        assert_eq!(
            call("equal?", vec![Value::Int(1), Value::Float(1.0)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("equal?", vec![Value::Int(1), Value::string("1")]).unwrap(),
            Value::Bool(false)
        );
        let list = Value::list(vec![Value::Int(1), Value::string("a")]);
        assert_eq!(call("equal?", vec![list.clone(), list]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_logic() {
        assert_eq!(
            call("and", vec![Value::Bool(true), Value::Int(1)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("and", vec![Value::Bool(true), Value::Bool(false)]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            call("or", vec![Value::Bool(false), Value::Int(0)]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(call("not", vec![Value::Bool(false)]).unwrap(), Value::Bool(true));
        assert_eq!(call("and", vec![]).unwrap(), Value::Bool(true));
    }
}
