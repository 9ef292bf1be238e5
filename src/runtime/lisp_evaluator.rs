use std::io::{self, BufRead, BufReader, Write};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::parser::{Expression, Number};
use crate::primitives::CallContext;
use crate::runtime::stack::ensure_sufficient_stack;
use crate::runtime::value::Closure;
use crate::runtime::{Environment, Value};

/// Evaluator configuration
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Maximum nesting of `evaluate` calls before failing with `StackExhausted`
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig { max_depth: 100_000 }
    }
}

/// Recursive evaluator and applier.
///
/// Special forms:
/// - `(if0 c t e)` - branch on the truthiness of `c`
/// - `(fun (params...) body)` - closure over a snapshot of the current frame
/// - `(define x v)` / `(set x v)` - bind in the current frame, yield void
/// - `(with (x v) body)` - evaluate `v` and `body` in a snapshot with `x` bound
/// - `(seqn a b)` - `a` for effect, then `b` in the same frame
/// - `(quote d...)` - literal structure
///
/// The evaluator holds no bindings of its own; callers pass the environment in,
/// and the driver threads the top-level one across forms.
pub struct LispEvaluator {
    config: EvalConfig,
    /// Current nesting of `eval` calls
    depth: usize,
    /// Sink for `display` and reported results
    output: Box<dyn Write>,
    /// Source for `read`
    input: Box<dyn BufRead>,
}

impl LispEvaluator {
    /// Creates an evaluator wired to stdin/stdout
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    /// Creates an evaluator wired to stdin/stdout with custom limits
    pub fn with_config(config: EvalConfig) -> Self {
        Self::with_io(
            config,
            Box::new(BufReader::new(io::stdin())),
            Box::new(io::stdout()),
        )
    }

    /// Creates an evaluator with explicit I/O sinks
    pub fn with_io(config: EvalConfig, input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        LispEvaluator {
            config,
            depth: 0,
            output,
            input,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluates `expr` in `env` and hands back the environment to use next.
    ///
    /// `define`/`set` changes are visible in the returned environment. For a `fun`
    /// form the returned environment is the snapshot captured by the closure.
    pub fn evaluate(&mut self, expr: &Expression, mut env: Environment) -> Result<(Value, Environment)> {
        if let Expression::Fun { params, body } = expr {
            let snapshot = env.snapshot();
            let closure = Self::make_closure(params, body, snapshot.snapshot())?;
            return Ok((closure, snapshot));
        }

        let value = self.eval(expr, &mut env)?;
        Ok((value, env))
    }

    /// Evaluates `expr`, mutating `env` in place for `define`/`set`
    pub fn eval(&mut self, expr: &Expression, env: &mut Environment) -> Result<Value> {
        if self.depth >= self.config.max_depth {
            tracing::warn!(limit = self.config.max_depth, "evaluation depth exhausted");
            return Err(Error::StackExhausted {
                limit: self.config.max_depth,
            });
        }

        self.depth += 1;
        let result = ensure_sufficient_stack(|| self.eval_form(expr, env));
        self.depth -= 1;
        result
    }

    fn eval_form(&mut self, expr: &Expression, env: &mut Environment) -> Result<Value> {
        match expr {
            Expression::Number(Number::Int(n)) => Ok(Value::Int(*n)),
            Expression::Number(Number::Float(x)) => Ok(Value::Float(*x)),
            Expression::StringLiteral(s) => Ok(Value::String(s.clone())),

            Expression::Identifier(name) => env.lookup(name),

            Expression::Quote(datum) => Ok(Value::from_datum(datum)),

            Expression::If0 {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval(condition, env)?.is_truthy() {
                    self.eval(then_branch, env)
                } else {
                    self.eval(else_branch, env)
                }
            }

            Expression::Fun { params, body } => Self::make_closure(params, body, env.snapshot()),

            Expression::Define { name, value } | Expression::Set { name, value } => {
                check_name(name, "define/set target")?;
                let val = self.eval(value, env)?;
                tracing::trace!(name = %name, value = %val, "bind");
                env.bind(name.clone(), val);
                Ok(Value::Void)
            }

            Expression::With { name, bound, body } => {
                check_name(name, "with binding")?;
                let mut scope = env.snapshot();
                let val = self.eval(bound, &mut scope)?;
                scope.bind(name.clone(), val);
                self.eval(body, &mut scope)
            }

            Expression::Seqn { first, second } => {
                self.eval(first, env)?;
                self.eval(second, env)
            }

            Expression::Application { operator, operands } => {
                let procedure = self.eval(operator, env)?;
                let mut args = Vec::with_capacity(operands.len());
                for operand in operands {
                    args.push(self.eval(operand, env)?);
                }
                self.apply(&procedure, args)
            }
        }
    }

    /// Applies a procedure to already-evaluated arguments.
    ///
    /// Closure parameters are zipped with the arguments and the shorter side wins:
    /// extra arguments are dropped and unmatched parameters stay unbound, so they
    /// only fail (as unbound variables) if the body reads them.
    pub fn apply(&mut self, procedure: &Value, args: Vec<Value>) -> Result<Value> {
        match procedure {
            Value::Native(native) => {
                let native = native.clone();
                tracing::trace!(primitive = native.name(), argc = args.len(), "apply native");
                native.call(&args, self)
            }
            Value::Closure(closure) => {
                let closure = Arc::clone(closure);
                if args.len() != closure.params.len() {
                    tracing::debug!(
                        params = closure.params.len(),
                        args = args.len(),
                        "arity mismatch, truncating"
                    );
                }

                let mut scope = closure.env.snapshot();
                for (param, arg) in closure.params.iter().zip(args) {
                    scope.bind(param.clone(), arg);
                }
                self.eval(&closure.body, &mut scope)
            }
            other => Err(Error::NotCallable {
                type_name: other.type_name(),
            }),
        }
    }

    /// Writes a top-level result, one per line; void results print nothing
    pub fn report(&mut self, value: &Value) -> Result<()> {
        if matches!(value, Value::Void) {
            return Ok(());
        }
        writeln!(self.output, "{}", value)?;
        self.output.flush()?;
        Ok(())
    }

    fn make_closure(params: &[String], body: &Arc<Expression>, env: Environment) -> Result<Value> {
        for param in params {
            check_name(param, "fun parameter")?;
        }
        Ok(Value::Closure(Arc::new(Closure {
            params: params.to_vec(),
            body: Arc::clone(body),
            env,
        })))
    }
}

impl Default for LispEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl CallContext for LispEvaluator {
    fn apply(&mut self, procedure: &Value, args: Vec<Value>) -> Result<Value> {
        LispEvaluator::apply(self, procedure, args)
    }

    fn write_output(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes())?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

/// Binding positions must hold a real identifier; the parser never produces an
/// empty one, so seeing it means the node was built outside the parser contract.
fn check_name(name: &str, position: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::MalformedNode {
            message: format!("empty identifier in {}", position),
        });
    }
    Ok(())
}
