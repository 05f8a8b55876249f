//! ssir-interp: a tracing interpreter framework for ssir IR.
//!
//! Trace items ([`TraceItem`]) are a sum type consumed by [`TraceSink`]
//! implementations: [`Tracer`] formats them with call-depth indentation and
//! can record the stream, [`DummyTracer`] discards them. The interpreter
//! ([`run_function`]) executes a module function over constant values and
//! feeds the sink as it goes.

pub mod error;
pub mod interp;
pub mod trace;

pub use error::ExecError;
pub use interp::run_function;
pub use trace::{format_item, DummyTracer, TraceItem, TraceSink, TraceValue, Tracer};
