//! List primitives
//!
//! Lists are persistent cons-lists: `cons` and `rest` share structure, and a list
//! never changes after construction. Characters are one-character strings.

use crate::error::{Error, Result};
use crate::primitives::{expect_procedure, Builtin, CallContext, PrimitiveRegistry};
use crate::runtime::value::List;
use crate::runtime::Value;

/// Register list primitives
pub fn register(registry: &mut PrimitiveRegistry) {
    registry.register(Builtin::variadic("list", "List of the arguments", list));
    registry.register(Builtin::fixed("cons", "Prepend a value to a list", 2, cons));
    registry.register(Builtin::fixed("empty?", "True for the empty list", 1, is_empty));
    registry.register(Builtin::fixed("first", "First element", 1, first));
    registry.register(Builtin::fixed("second", "Second element", 1, second));
    registry.register(Builtin::fixed("third", "Third element", 1, third));
    registry.register(Builtin::fixed("rest", "All but the first element", 1, rest));
    registry.register(Builtin::fixed("reverse", "Elements in reverse order", 1, reverse));
    registry.register(Builtin::fixed("length", "Number of elements", 1, length));
    registry.register(Builtin::fixed("list-ref", "Element at a zero-based index", 2, list_ref));
    registry.register(Builtin::fixed(
        "build-list",
        "List of (f 0) ... (f n-1)",
        2,
        build_list,
    ));
    registry.register(Builtin::fixed(
        "explode",
        "String to a list of one-character strings",
        1,
        explode,
    ));
    registry.register(Builtin::fixed(
        "list->string",
        "Concatenate a list of strings",
        1,
        list_to_string,
    ));
    registry.register(Builtin::fixed(
        "integer->char",
        "Character with the given code point",
        1,
        integer_to_char,
    ));
}

fn list(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    Ok(Value::list(args.to_vec()))
}

fn cons(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    let tail = args[1].as_list()?;
    Ok(Value::List(List::cons(args[0].clone(), tail.clone())))
}

fn is_empty(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    Ok(Value::Bool(args[0].as_list()?.is_empty()))
}

fn nth(op: &str, value: &Value, index: usize) -> Result<Value> {
    let list = value.as_list()?;
    if list.is_empty() {
        return Err(Error::EmptyCollection {
            operation: op.to_string(),
        });
    }
    list.get(index).cloned().ok_or(Error::IndexOutOfBounds {
        index: index as i64,
        length: list.len(),
    })
}

fn first(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    nth("first", &args[0], 0)
}

fn second(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    nth("second", &args[0], 1)
}

fn third(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    nth("third", &args[0], 2)
}

fn rest(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    args[0]
        .as_list()?
        .rest()
        .map(Value::List)
        .ok_or_else(|| Error::EmptyCollection {
            operation: "rest".to_string(),
        })
}

fn reverse(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    Ok(Value::List(args[0].as_list()?.reversed()))
}

fn length(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    let len = args[0].as_list()?.len();
    Ok(Value::Int(len as i64))
}

fn list_ref(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    let list = args[0].as_list()?;
    let index = args[1].as_int()?;
    usize::try_from(index)
        .ok()
        .and_then(|i| list.get(i))
        .cloned()
        .ok_or(Error::IndexOutOfBounds {
            index,
            length: list.len(),
        })
}

fn build_list(args: &[Value], ctx: &mut dyn CallContext) -> Result<Value> {
    let count = args[0].as_int()?;
    let count = usize::try_from(count).map_err(|_| {
        Error::invalid_args("build-list", format!("expected a non-negative count, got {}", count))
    })?;
    let f = expect_procedure(&args[1])?;

    // grows with the results; the count alone is untrusted
    let mut items = Vec::new();
    for i in 0..count {
        items.push(ctx.apply(f, vec![Value::Int(i as i64)])?);
    }
    Ok(Value::list(items))
}

fn explode(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    let s = args[0].as_string()?;
    Ok(Value::List(s.chars().map(|c| Value::String(c.to_string())).collect()))
}

fn list_to_string(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    let mut out = String::new();
    for item in args[0].as_list()? {
        out.push_str(item.as_string()?);
    }
    Ok(Value::String(out))
}

fn integer_to_char(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    let code = args[0].as_int()?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|c| Value::String(c.to_string()))
        .ok_or_else(|| {
            Error::invalid_args("integer->char", format!("{} is not a valid code point", code))
        })
}
