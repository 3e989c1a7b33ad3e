//! Window functions: `row_number`, `rank` and a running `avg`.
//!
//! Each is registered as a window overload, so it only wins resolution
//! inside a window clause. The frame is fed through [`Accumulator`].

use std::cell::Cell;
use std::sync::Arc;

use sqlfn_core::{
    Accumulator, Args, BoxedFunction, ColumnType, ExecutionContext, Function, FunctionKind,
    Record, ResolveError, ResolverConfig, Span, Value,
};
use sqlfn_registry::FunctionFactory;

/// `row_number()`: 1-based position within the partition.
#[derive(Debug, Default)]
pub struct RowNumberFunction {
    row: Cell<i64>,
}

impl Accumulator for RowNumberFunction {
    fn compute_first(&self, _record: &dyn Record) {
        self.row.set(1);
    }

    fn compute_next(&self, _record: &dyn Record) {
        self.row.set(self.row.get() + 1);
    }
}

impl Function for RowNumberFunction {
    fn name(&self) -> &str {
        "row_number"
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::LONG
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        Value::Long(self.row.get())
    }

    fn kind(&self) -> FunctionKind {
        FunctionKind::Window
    }

    fn accumulator(&self) -> Option<&dyn Accumulator> {
        Some(self)
    }
}

/// `rank()` without an ordering: every row of a partition is a peer.
#[derive(Debug)]
pub struct RankFunction;

impl Accumulator for RankFunction {
    fn compute_first(&self, _record: &dyn Record) {}

    fn compute_next(&self, _record: &dyn Record) {}
}

impl Function for RankFunction {
    fn name(&self) -> &str {
        "rank"
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::LONG
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        Value::Long(1)
    }

    fn kind(&self) -> FunctionKind {
        FunctionKind::Window
    }

    fn accumulator(&self) -> Option<&dyn Accumulator> {
        Some(self)
    }
}

/// `avg(x) over (...)`: average of the frame seen so far, nulls skipped.
#[derive(Debug)]
pub struct RunningAvgFunction {
    arg: BoxedFunction,
    sum: Cell<f64>,
    count: Cell<i64>,
}

impl RunningAvgFunction {
    fn add(&self, record: &dyn Record) {
        if let Some(v) = self.arg.eval(record).as_f64().filter(|v| !v.is_nan()) {
            self.sum.set(self.sum.get() + v);
            self.count.set(self.count.get() + 1);
        }
    }
}

impl Accumulator for RunningAvgFunction {
    fn compute_first(&self, record: &dyn Record) {
        self.sum.set(0.0);
        self.count.set(0);
        self.add(record);
    }

    fn compute_next(&self, record: &dyn Record) {
        self.add(record);
    }
}

impl Function for RunningAvgFunction {
    fn name(&self) -> &str {
        "avg"
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::DOUBLE
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        match self.count.get() {
            0 => Value::Null,
            count => Value::double(self.sum.get() / count as f64),
        }
    }

    fn kind(&self) -> FunctionKind {
        FunctionKind::Window
    }

    fn args(&self) -> Vec<&dyn Function> {
        vec![self.arg.as_ref()]
    }

    fn accumulator(&self) -> Option<&dyn Accumulator> {
        Some(self)
    }
}

#[derive(Clone, Copy)]
enum Window {
    RowNumber,
    Rank,
    Avg,
}

struct WindowFactory {
    signature: &'static str,
    window: Window,
}

impl FunctionFactory for WindowFactory {
    fn signature(&self) -> &str {
        self.signature
    }

    fn is_window(&self) -> bool {
        true
    }

    fn new_instance(
        &self,
        position: Span,
        args: Args,
        _config: &ResolverConfig,
        _ctx: &dyn ExecutionContext,
    ) -> Result<Option<BoxedFunction>, ResolveError> {
        let function: BoxedFunction = match self.window {
            Window::RowNumber => Box::new(RowNumberFunction::default()),
            Window::Rank => Box::new(RankFunction),
            Window::Avg => {
                let Some([arg]) = args.into_array::<1>() else {
                    return Err(ResolveError::factory(position, "expected one argument"));
                };
                Box::new(RunningAvgFunction {
                    arg,
                    sum: Cell::new(0.0),
                    count: Cell::new(0),
                })
            }
        };
        Ok(Some(function))
    }
}

pub fn factories() -> Vec<Arc<dyn FunctionFactory>> {
    [
        ("row_number()", Window::RowNumber),
        ("rank()", Window::Rank),
        ("avg(double)", Window::Avg),
    ]
    .into_iter()
    .map(|(signature, window)| {
        Arc::new(WindowFactory { signature, window }) as Arc<dyn FunctionFactory>
    })
    .collect()
}
