//! Effectful primitives: output, input, sequencing, user errors and checks

use crate::error::{Error, Result};
use crate::primitives::{Builtin, CallContext, PrimitiveRegistry};
use crate::runtime::Value;

/// Register effect primitives
pub fn register(registry: &mut PrimitiveRegistry) {
    registry.register(Builtin::fixed(
        "display",
        "Write a value to the output (strings unquoted)",
        1,
        display,
    ));
    registry.register(Builtin::variadic("begin", "Last argument, or void", begin));
    registry.register(Builtin::fixed("read", "Read one line of input", 0, read));
    registry.register(Builtin::variadic("error", "Raise a user error", error));
    registry.register(Builtin::fixed(
        "check-expect",
        "Fail unless the two values are equal",
        2,
        check_expect,
    ));
}

fn display(args: &[Value], ctx: &mut dyn CallContext) -> Result<Value> {
    ctx.write_output(&args[0].display_string())?;
    Ok(Value::Void)
}

fn begin(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    Ok(args.last().cloned().unwrap_or(Value::Void))
}

/// Numeric text becomes a number, anything else a string; end of input is void
fn read(_args: &[Value], ctx: &mut dyn CallContext) -> Result<Value> {
    let Some(line) = ctx.read_line()? else {
        return Ok(Value::Void);
    };
    let text = line.trim_end_matches(['\n', '\r']);
    let trimmed = text.trim();

    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Value::Int(n));
    }
    if let Ok(x) = trimmed.parse::<f64>() {
        if trimmed.chars().any(|c| c.is_ascii_digit()) {
            return Ok(Value::Float(x));
        }
    }
    Ok(Value::string(text))
}

fn error(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    let message: Vec<String> = args.iter().map(Value::display_string).collect();
    Err(Error::UserError(message.join(" ")))
}

fn check_expect(args: &[Value], _ctx: &mut dyn CallContext) -> Result<Value> {
    let (actual, expected) = (&args[0], &args[1]);
    if actual == expected {
        Ok(Value::Void)
    } else {
        Err(Error::CheckFailed {
            actual: actual.to_string(),
            expected: expected.to_string(),
        })
    }
}
