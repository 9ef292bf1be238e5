//! Higher-order primitives
//!
//! These call back into the evaluator through [`CallContext::apply`], so the
//! procedure argument may be a closure or another primitive.

use crate::error::{Error, Result};
use crate::primitives::{expect_at_least, expect_procedure, Builtin, CallContext, PrimitiveRegistry};
use crate::runtime::value::List;
use crate::runtime::Value;

/// Register higher-order primitives
pub fn register(registry: &mut PrimitiveRegistry) {
    registry.register(Builtin::variadic(
        "map",
        "Apply a procedure across one or more equal-length lists",
        map,
    ));
    registry.register(Builtin::fixed(
        "filter",
        "Elements for which the predicate is truthy",
        2,
        filter,
    ));
    registry.register(Builtin::fixed(
        "foldl",
        "Fold from the left, calling (f element accumulator)",
        3,
        foldl,
    ));
    registry.register(Builtin::fixed(
        "foldr",
        "Fold from the right, calling (f element accumulator)",
        3,
        foldr,
    ));
    registry.register(Builtin::fixed(
        "ormap",
        "True when the predicate holds for some element",
        2,
        ormap,
    ));
    registry.register(Builtin::fixed(
        "andmap",
        "True when the predicate holds for every element",
        2,
        andmap,
    ));
}

fn map(args: &[Value], ctx: &mut dyn CallContext) -> Result<Value> {
    expect_at_least("map", args, 2)?;
    let f = expect_procedure(&args[0])?;
    let lists = args[1..]
        .iter()
        .map(Value::as_list)
        .collect::<Result<Vec<&List>>>()?;

    let len = lists[0].len();
    if lists.iter().any(|list| list.len() != len) {
        return Err(Error::invalid_args("map", "all lists must have the same length"));
    }

    let mut iters: Vec<_> = lists.iter().map(|list| list.iter()).collect();
    let mut results = Vec::with_capacity(len);
    for _ in 0..len {
        let row: Vec<Value> = iters.iter_mut().filter_map(|it| it.next().cloned()).collect();
        results.push(ctx.apply(f, row)?);
    }
    Ok(Value::list(results))
}

fn filter(args: &[Value], ctx: &mut dyn CallContext) -> Result<Value> {
    let pred = expect_procedure(&args[0])?;
    let mut kept = Vec::new();
    for item in args[1].as_list()? {
        if ctx.apply(pred, vec![item.clone()])?.is_truthy() {
            kept.push(item.clone());
        }
    }
    Ok(Value::list(kept))
}

fn foldl(args: &[Value], ctx: &mut dyn CallContext) -> Result<Value> {
    let f = expect_procedure(&args[0])?;
    let mut acc = args[1].clone();
    for item in args[2].as_list()? {
        acc = ctx.apply(f, vec![item.clone(), acc])?;
    }
    Ok(acc)
}

fn foldr(args: &[Value], ctx: &mut dyn CallContext) -> Result<Value> {
    let f = expect_procedure(&args[0])?;
    let mut acc = args[1].clone();
    for item in args[2].as_list()?.reversed().iter() {
        acc = ctx.apply(f, vec![item.clone(), acc])?;
    }
    Ok(acc)
}

fn ormap(args: &[Value], ctx: &mut dyn CallContext) -> Result<Value> {
    let pred = expect_procedure(&args[0])?;
    for item in args[1].as_list()? {
        if ctx.apply(pred, vec![item.clone()])?.is_truthy() {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

fn andmap(args: &[Value], ctx: &mut dyn CallContext) -> Result<Value> {
    let pred = expect_procedure(&args[0])?;
    for item in args[1].as_list()? {
        if !ctx.apply(pred, vec![item.clone()])?.is_truthy() {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::primitives::testing::{call, procedure};
    use crate::runtime::Value;

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().map(|n| Value::Int(*n)).collect())
    }

    #[test]
    fn test_map() {
        assert_eq!(
            call("map", vec![procedure("add1"), ints(&[1, 2, 3])]).unwrap(),
            ints(&[2, 3, 4])
        );
        assert_eq!(
            call("map", vec![procedure("+"), ints(&[1, 2]), ints(&[10, 20])]).unwrap(),
            ints(&[11, 22])
        );
        assert!(matches!(
            call("map", vec![procedure("+"), ints(&[1, 2]), ints(&[10])]),
            Err(Error::InvalidArguments { .. })
        ));
        assert!(matches!(
            call("map", vec![Value::Int(1), ints(&[1])]),
            Err(Error::TypeError { .. })
        ));
    }

    #[test]
    fn test_filter() {
        assert_eq!(
            call("filter", vec![procedure("odd?"), ints(&[1, 2, 3, 4, 5])]).unwrap(),
            ints(&[1, 3, 5])
        );
    }

    #[test]
    fn test_folds_call_element_then_accumulator() {
        assert_eq!(
            call("foldl", vec![procedure("+"), Value::Int(0), ints(&[1, 2, 3])]).unwrap(),
            Value::Int(6)
        );
        assert_eq!(
            call("foldl", vec![procedure("cons"), ints(&[]), ints(&[1, 2, 3])]).unwrap(),
            ints(&[3, 2, 1])
        );
        assert_eq!(
            call("foldr", vec![procedure("cons"), ints(&[]), ints(&[1, 2, 3])]).unwrap(),
            ints(&[1, 2, 3])
        );
        assert_eq!(
            call("foldr", vec![procedure("-"), Value::Int(0), ints(&[1, 2, 3])]).unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn test_ormap_andmap() {
        assert_eq!(
            call("ormap", vec![procedure("even?"), ints(&[1, 3, 4])]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("andmap", vec![procedure("even?"), ints(&[2, 3])]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            call("andmap", vec![procedure("even?"), ints(&[])]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("ormap", vec![procedure("even?"), ints(&[])]).unwrap(),
            Value::Bool(false)
        );
    }
}
