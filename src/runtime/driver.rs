//! Top-level driver: runs a sequence of forms against one environment.

use crate::error::Result;
use crate::parser::{parse, parse_program, Expression};
use crate::primitives::CallContext;
use crate::runtime::{Environment, LispEvaluator, Value};

/// Evaluates `forms` in order against `env`, reporting each non-void result.
///
/// `define`/`set` at top level mutate `env`, so later forms see earlier
/// definitions. Stops at the first error; results reported before it stay printed.
pub fn run_forms(
    evaluator: &mut LispEvaluator,
    forms: &[Expression],
    env: &mut Environment,
) -> Result<Vec<Value>> {
    let mut results = Vec::with_capacity(forms.len());

    for (index, form) in forms.iter().enumerate() {
        let span = tracing::debug_span!("form", index);
        let _enter = span.enter();

        let value = evaluator.eval(form, env).map_err(|err| {
            tracing::debug!(error = %err, "form failed");
            err
        })?;
        evaluator.report(&value)?;
        results.push(value);
    }

    tracing::debug!(forms = forms.len(), "program finished");
    Ok(results)
}

/// A top-level environment plus the evaluator that runs against it.
///
/// Each call sees the definitions made by earlier calls, which is what the REPL
/// needs.
pub struct Session {
    evaluator: LispEvaluator,
    env: Environment,
}

impl Session {
    /// Session on stdin/stdout with the standard primitives
    pub fn new() -> Self {
        Self::with_evaluator(LispEvaluator::new())
    }

    /// Session around a configured evaluator
    pub fn with_evaluator(evaluator: LispEvaluator) -> Self {
        Session {
            evaluator,
            env: Environment::top_level(),
        }
    }

    /// The accumulated top-level environment
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Evaluates every form in `source` without reporting; returns the last value
    pub fn eval_str(&mut self, source: &str) -> Result<Value> {
        let program = parse_program(source)?;
        let values = self.eval_forms(&program.forms)?;
        Ok(values.into_iter().last().unwrap_or(Value::Void))
    }

    /// Evaluates `forms` in order without reporting them
    pub fn eval_forms(&mut self, forms: &[Expression]) -> Result<Vec<Value>> {
        forms
            .iter()
            .map(|form| self.evaluator.eval(form, &mut self.env))
            .collect()
    }

    /// Reads a line from the evaluator's input, sharing its buffer with `read`
    pub fn read_line(&mut self) -> Result<Option<String>> {
        CallContext::read_line(&mut self.evaluator)
    }

    /// Evaluates every form in `source`, reporting results as they are produced
    pub fn run_source(&mut self, source: &str) -> Result<Vec<Value>> {
        let program = parse_program(source)?;
        run_forms(&mut self.evaluator, &program.forms, &mut self.env)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluates a single form in a fresh top-level environment and returns its
/// printed representation
pub fn run(source: &str) -> Result<String> {
    let expr = parse(source)?;
    let mut env = Environment::top_level();
    let value = LispEvaluator::new().eval(&expr, &mut env)?;
    Ok(value.to_string())
}

/// Runs a whole program in a fresh top-level environment, printing each non-void
/// result to stdout, and returns the printed results
pub fn run_program(source: &str) -> Result<Vec<String>> {
    let values = Session::new().run_source(source)?;
    Ok(values
        .iter()
        .filter(|value| !matches!(value, Value::Void))
        .map(Value::to_string)
        .collect())
}
