//! Execution trace items and their sinks.
//!
//! Trace items are a plain sum type; sinks decide what happens to them, so
//! execution is never coupled to output formatting. [`Tracer`] writes an
//! indented line per item (indentation tracks call depth) and can keep the
//! raw stream for inspection; [`DummyTracer`] drops everything.

use std::io::Write;

use ssir_core::{ConstValue, Opcode};

/// An argument value as it appears in a trace: a concrete constant, a bare
/// name (op results not yet computed, globals, block labels), or a nested
/// list mirroring the op's operand structure.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceValue {
    Const(ConstValue),
    Name(String),
    List(Vec<TraceValue>),
}

/// One step of an execution trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceItem {
    /// Entering a function with the given argument values.
    Call {
        function: String,
        args: Vec<TraceValue>,
    },
    /// About to evaluate an op.
    Op {
        name: String,
        opcode: Opcode,
        args: Vec<TraceValue>,
    },
    /// An op produced a result.
    Res {
        name: String,
        opcode: Opcode,
        args: Vec<TraceValue>,
        result: ConstValue,
    },
    /// Returning from the current function.
    Ret { result: Option<ConstValue> },
    /// An exception is unwinding out of the current function.
    Exc { kind: String },
}

/// Flattens a trace value into comma-separated parts; nested lists are
/// walked recursively, so structured args never fail to format.
fn push_parts(value: &TraceValue, parts: &mut Vec<String>) {
    match value {
        TraceValue::Const(c) => parts.push(c.to_string()),
        TraceValue::Name(n) => parts.push(n.clone()),
        TraceValue::List(items) => {
            for item in items {
                push_parts(item, parts);
            }
        }
    }
}

fn fmt_args(args: &[TraceValue]) -> String {
    let mut parts = Vec::new();
    for arg in args {
        push_parts(arg, &mut parts);
    }
    parts.join(", ")
}

/// Formats a single item, without indentation.
pub fn format_item(item: &TraceItem) -> String {
    match item {
        TraceItem::Call { function, args } => {
            format!("call {function}({})", fmt_args(args))
        }
        TraceItem::Op { name, opcode, args } => {
            format!("op {name} = {opcode} {}", fmt_args(args))
        }
        TraceItem::Res { name, opcode, args, result } => {
            format!("res {name} = {opcode} {} -> {result}", fmt_args(args))
        }
        TraceItem::Ret { result } => match result {
            Some(v) => format!("ret {v}"),
            None => "ret".to_string(),
        },
        TraceItem::Exc { kind } => format!("exc {kind}"),
    }
}

/// Where trace items go.
pub trait TraceSink {
    fn trace(&mut self, item: TraceItem);
}

/// A formatting sink: one indented line per item, with the indentation
/// following call depth. Optionally records the raw stream.
pub struct Tracer<W: Write> {
    out: W,
    depth: usize,
    record: bool,
    items: Vec<TraceItem>,
}

impl<W: Write> Tracer<W> {
    pub fn new(out: W) -> Self {
        Tracer { out, depth: 0, record: false, items: Vec::new() }
    }

    /// A tracer that also keeps every item for later inspection.
    pub fn recording(out: W) -> Self {
        Tracer { record: true, ..Tracer::new(out) }
    }

    pub fn recorded(&self) -> &[TraceItem] {
        &self.items
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TraceSink for Tracer<W> {
    fn trace(&mut self, item: TraceItem) {
        let line = format_item(&item);
        let indent = "    ".repeat(self.depth);
        let _ = writeln!(self.out, "{indent}{line}");
        match item {
            TraceItem::Call { .. } => self.depth += 1,
            TraceItem::Ret { .. } | TraceItem::Exc { .. } => {
                self.depth = self.depth.saturating_sub(1);
            }
            _ => {}
        }
        if self.record {
            self.items.push(item);
        }
    }
}

/// The no-op sink used when tracing is disabled.
#[derive(Debug, Default)]
pub struct DummyTracer;

impl TraceSink for DummyTracer {
    fn trace(&mut self, _item: TraceItem) {}
}
