//! Runtime for rexp programs: values, environments and the evaluator

mod driver;
mod environment;
mod lisp_evaluator;
pub mod stack;
pub mod value;

pub use driver::{run, run_forms, run_program, Session};
pub use environment::Environment;
pub use lisp_evaluator::{EvalConfig, LispEvaluator};
pub use value::{Closure, List, NativeProcedure, Value};
