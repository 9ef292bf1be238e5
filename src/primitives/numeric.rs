//! Arithmetic primitives
//!
//! Integers stay integers until a float joins in; integer overflow is an error
//! rather than a silent wrap.

use crate::error::{Error, Result};
use crate::primitives::{expect_at_least, Builtin, CallContext, PrimitiveRegistry};
use crate::runtime::Value;

/// Register arithmetic primitives
pub fn register(registry: &mut PrimitiveRegistry) {
    registry.register(Builtin::variadic("+", "Sum of the arguments", add));
    registry.register(Builtin::variadic(
        "-",
        "Negation, or the first argument minus the rest",
        subtract,
    ));
    registry.register(Builtin::variadic("*", "Product of the arguments", multiply));
    registry.register(Builtin::variadic(
        "/",
        "Reciprocal, or the first argument divided by the rest (always a float)",
        divide,
    ));
    registry.register(Builtin::fixed("add1", "Argument plus one", 1, add1));
    registry.register(Builtin::fixed("sub1", "Argument minus one", 1, sub1));
    registry.register(Builtin::fixed(
        "modulo",
        "Remainder taking the sign of the divisor",
        2,
        modulo,
    ));
    registry.register(Builtin::fixed("odd?", "True for odd integers", 1, is_odd));
    registry.register(Builtin::fixed("even?", "True for even integers", 1, is_even));
}

fn number(value: &Value) -> Result<&Value> {
    match value {
        Value::Int(_) | Value::Float(_) => Ok(value),
        other => Err(Error::TypeError {
            expected: "number".to_string(),
            got: other.type_name(),
        }),
    }
}

/// Combines two numbers, using `int_op` when both are integers
fn combine(
    op: &str,
    lhs: &Value,
    rhs: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (number(lhs)?, number(rhs)?) {
        (Value::Int(a), Value::Int(b)) => int_op(*a, *b)
            .map(Value::Int)
            .ok_or_else(|| Error::ArithmeticOverflow { op: op.to_string() }),
        (a, b) => Ok(Value::Float(float_op(a.as_float()?, b.as_float()?))),
    }
}

fn add(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    args.iter().try_fold(Value::Int(0), |acc, arg| {
        combine("+", &acc, arg, i64::checked_add, |a, b| a + b)
    })
}

fn subtract(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    expect_at_least("-", args, 1)?;
    if args.len() == 1 {
        return combine("-", &Value::Int(0), &args[0], i64::checked_sub, |a, b| a - b);
    }
    args[1..].iter().try_fold(number(&args[0])?.clone(), |acc, arg| {
        combine("-", &acc, arg, i64::checked_sub, |a, b| a - b)
    })
}

fn multiply(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    args.iter().try_fold(Value::Int(1), |acc, arg| {
        combine("*", &acc, arg, i64::checked_mul, |a, b| a * b)
    })
}

fn divide(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    expect_at_least("/", args, 1)?;
    let (mut acc, divisors) = if args.len() == 1 {
        (1.0, args)
    } else {
        (number(&args[0])?.as_float()?, &args[1..])
    };

    for divisor in divisors {
        let divisor = number(divisor)?.as_float()?;
        if divisor == 0.0 {
            return Err(Error::DivisionByZero);
        }
        acc /= divisor;
    }
    Ok(Value::Float(acc))
}

fn add1(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    combine("add1", &args[0], &Value::Int(1), i64::checked_add, |a, b| a + b)
}

fn sub1(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    combine("sub1", &args[0], &Value::Int(1), i64::checked_sub, |a, b| a - b)
}

fn modulo(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    match (number(&args[0])?, number(&args[1])?) {
        (Value::Int(_), Value::Int(0)) => Err(Error::DivisionByZero),
        (Value::Int(a), Value::Int(b)) => {
            let rem = a.checked_rem(*b).ok_or_else(|| Error::ArithmeticOverflow {
                op: "modulo".to_string(),
            })?;
            // floor semantics: a nonzero result carries the divisor's sign
            if rem != 0 && (rem < 0) != (*b < 0) {
                Ok(Value::Int(rem + b))
            } else {
                Ok(Value::Int(rem))
            }
        }
        (a, b) => {
            let (a, b) = (a.as_float()?, b.as_float()?);
            if b == 0.0 {
                return Err(Error::DivisionByZero);
            }
            let rem = a % b;
            if rem != 0.0 && (rem < 0.0) != (b < 0.0) {
                Ok(Value::Float(rem + b))
            } else {
                Ok(Value::Float(rem))
            }
        }
    }
}

fn is_odd(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    Ok(Value::Bool(args[0].as_int()? % 2 != 0))
}

fn is_even(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    Ok(Value::Bool(args[0].as_int()? % 2 == 0))
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::primitives::testing::call;
    use crate::runtime::Value;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|n| Value::Int(*n)).collect()
    }

    #[test]
    fn test_add_and_multiply() {
        assert_eq!(call("+", ints(&[1, 2])).unwrap(), Value::Int(3));
        assert_eq!(call("+", vec![]).unwrap(), Value::Int(0));
        assert_eq!(call("*", ints(&[2, 3, 4])).unwrap(), Value::Int(24));
        assert_eq!(
            call("+", vec![Value::Int(1), Value::Float(0.5)]).unwrap(),
            Value::Float(1.5)
        );
    }

    #[test]
    fn test_subtract() {
        assert_eq!(call("-", ints(&[1, 1])).unwrap(), Value::Int(0));
        assert_eq!(call("-", ints(&[5])).unwrap(), Value::Int(-5));
        assert_eq!(call("-", ints(&[10, 3, 2])).unwrap(), Value::Int(5));
        assert!(matches!(
            call("-", vec![]),
            Err(Error::InvalidArguments { .. })
        ));
    }

    #[test]
    fn test_divide_is_float() {
        assert_eq!(call("/", ints(&[6, 3])).unwrap(), Value::Float(2.0));
        assert_eq!(call("/", ints(&[1, 4])).unwrap(), Value::Float(0.25));
        assert_eq!(call("/", ints(&[4])).unwrap(), Value::Float(0.25));
        assert_eq!(call("/", ints(&[1, 0])), Err(Error::DivisionByZero));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            call("+", ints(&[i64::MAX, 1])),
            Err(Error::ArithmeticOverflow {
                op: "+".to_string()
            })
        );
        assert!(call("add1", ints(&[i64::MAX])).is_err());
    }

    #[test]
    fn test_type_error() {
        assert!(matches!(
            call("+", vec![Value::string("hello"), Value::Int(5)]),
            Err(Error::TypeError { .. })
        ));
    }

    #[test]
    fn test_modulo_sign_follows_divisor() {
        assert_eq!(call("modulo", ints(&[7, 3])).unwrap(), Value::Int(1));
        assert_eq!(call("modulo", ints(&[-7, 3])).unwrap(), Value::Int(2));
        assert_eq!(call("modulo", ints(&[7, -3])).unwrap(), Value::Int(-2));
        assert_eq!(call("modulo", ints(&[6, 3])).unwrap(), Value::Int(0));
        assert_eq!(call("modulo", ints(&[1, 0])), Err(Error::DivisionByZero));
        assert_eq!(
            call("modulo", vec![Value::Float(-1.5), Value::Int(1)]).unwrap(),
            Value::Float(0.5)
        );
    }

    #[test]
    fn test_parity_and_steps() {
        assert_eq!(call("odd?", ints(&[3])).unwrap(), Value::Bool(true));
        assert_eq!(call("even?", ints(&[3])).unwrap(), Value::Bool(false));
        assert_eq!(call("even?", ints(&[-4])).unwrap(), Value::Bool(true));
        assert_eq!(call("add1", ints(&[1])).unwrap(), Value::Int(2));
        assert_eq!(call("sub1", vec![Value::Float(1.5)]).unwrap(), Value::Float(0.5));
    }
}
