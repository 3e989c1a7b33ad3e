//! Group-by aggregates: `count`, `sum` and `avg`.
//!
//! Aggregates keep their running state in a [`Cell`], fed row by row
//! through [`Accumulator`]. `eval` reads the state of the current group.

use std::cell::Cell;
use std::sync::Arc;

use sqlfn_core::{
    Accumulator, Args, BoxedFunction, ColumnType, ExecutionContext, Function, FunctionKind,
    FunctionTraits, Record, ResolveError, ResolverConfig, Span, Value,
};
use sqlfn_registry::FunctionFactory;

/// `count()`: rows in the group.
#[derive(Debug, Default)]
pub struct CountFunction {
    count: Cell<i64>,
}

impl Accumulator for CountFunction {
    fn compute_first(&self, _record: &dyn Record) {
        self.count.set(1);
    }

    fn compute_next(&self, _record: &dyn Record) {
        self.count.set(self.count.get() + 1);
    }
}

impl Function for CountFunction {
    fn name(&self) -> &str {
        "count"
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::LONG
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        Value::Long(self.count.get())
    }

    fn kind(&self) -> FunctionKind {
        FunctionKind::GroupBy
    }

    fn accumulator(&self) -> Option<&dyn Accumulator> {
        Some(self)
    }
}

/// Which total a [`SumFunction`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Total {
    SumLong,
    SumDouble,
    Avg,
}

/// Null-skipping sum or average of one argument.
///
/// A group with no non-null values reports null.
#[derive(Debug)]
pub struct SumFunction {
    arg: BoxedFunction,
    total: Total,
    long_sum: Cell<i64>,
    double_sum: Cell<f64>,
    count: Cell<i64>,
}

impl SumFunction {
    fn new(arg: BoxedFunction, total: Total) -> Self {
        Self {
            arg,
            total,
            long_sum: Cell::new(0),
            double_sum: Cell::new(0.0),
            count: Cell::new(0),
        }
    }

    fn add(&self, record: &dyn Record) {
        let value = self.arg.eval(record);
        if value.is_null() {
            return;
        }
        match self.total {
            Total::SumLong => {
                if let Some(v) = value.as_i64() {
                    self.long_sum.set(self.long_sum.get().wrapping_add(v));
                    self.count.set(self.count.get() + 1);
                }
            }
            Total::SumDouble | Total::Avg => {
                if let Some(v) = value.as_f64() {
                    self.double_sum.set(self.double_sum.get() + v);
                    self.count.set(self.count.get() + 1);
                }
            }
        }
    }
}

impl Accumulator for SumFunction {
    fn compute_first(&self, record: &dyn Record) {
        self.long_sum.set(0);
        self.double_sum.set(0.0);
        self.count.set(0);
        self.add(record);
    }

    fn compute_next(&self, record: &dyn Record) {
        self.add(record);
    }
}

impl Function for SumFunction {
    fn name(&self) -> &str {
        match self.total {
            Total::SumLong | Total::SumDouble => "sum",
            Total::Avg => "avg",
        }
    }

    fn column_type(&self) -> ColumnType {
        match self.total {
            Total::SumLong => ColumnType::LONG,
            Total::SumDouble | Total::Avg => ColumnType::DOUBLE,
        }
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        let count = self.count.get();
        if count == 0 {
            return Value::Null;
        }
        match self.total {
            Total::SumLong => Value::Long(self.long_sum.get()),
            Total::SumDouble => Value::double(self.double_sum.get()),
            Total::Avg => Value::double(self.double_sum.get() / count as f64),
        }
    }

    fn traits(&self) -> FunctionTraits {
        self.arg.traits() & FunctionTraits::NON_DETERMINISTIC
    }

    fn kind(&self) -> FunctionKind {
        FunctionKind::GroupBy
    }

    fn args(&self) -> Vec<&dyn Function> {
        vec![self.arg.as_ref()]
    }

    fn accumulator(&self) -> Option<&dyn Accumulator> {
        Some(self)
    }
}

#[derive(Clone, Copy)]
enum Aggregate {
    Count,
    Sum(Total),
}

struct AggregateFactory {
    signature: &'static str,
    aggregate: Aggregate,
}

impl FunctionFactory for AggregateFactory {
    fn signature(&self) -> &str {
        self.signature
    }

    fn new_instance(
        &self,
        position: Span,
        args: Args,
        _config: &ResolverConfig,
        _ctx: &dyn ExecutionContext,
    ) -> Result<Option<BoxedFunction>, ResolveError> {
        let function: BoxedFunction = match self.aggregate {
            Aggregate::Count => Box::new(CountFunction::default()),
            Aggregate::Sum(total) => {
                let Some([arg]) = args.into_array::<1>() else {
                    return Err(ResolveError::factory(position, "expected one argument"));
                };
                Box::new(SumFunction::new(arg, total))
            }
        };
        Ok(Some(function))
    }
}

pub fn factories() -> Vec<Arc<dyn FunctionFactory>> {
    [
        ("count()", Aggregate::Count),
        ("sum(long)", Aggregate::Sum(Total::SumLong)),
        ("sum(double)", Aggregate::Sum(Total::SumDouble)),
        ("avg(double)", Aggregate::Sum(Total::Avg)),
    ]
    .into_iter()
    .map(|(signature, aggregate)| {
        Arc::new(AggregateFactory {
            signature,
            aggregate,
        }) as Arc<dyn FunctionFactory>
    })
    .collect()
}
