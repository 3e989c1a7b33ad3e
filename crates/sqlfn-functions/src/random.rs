//! Non-deterministic and per-execution functions.

use std::cell::RefCell;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlfn_core::{
    Args, BoxedFunction, ColumnType, ExecutionContext, Function, FunctionTraits, Record,
    ResolveError, ResolverConfig, Span, Value,
};
use sqlfn_registry::FunctionFactory;

/// `rnd_int()`: a fresh random int per evaluation.
///
/// Opts into memoization so one row sees one value however many times the
/// expression is referenced.
#[derive(Debug)]
pub struct RndIntFunction {
    rng: RefCell<StdRng>,
}

impl Function for RndIntFunction {
    fn name(&self) -> &str {
        "rnd_int"
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::INT
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        Value::Int(self.rng.borrow_mut().r#gen())
    }

    fn traits(&self) -> FunctionTraits {
        FunctionTraits::NON_DETERMINISTIC | FunctionTraits::MEMOIZE
    }
}

/// `rnd_double()`: uniform in `[0, 1)`, not memoized.
#[derive(Debug)]
pub struct RndDoubleFunction {
    rng: RefCell<StdRng>,
}

impl Function for RndDoubleFunction {
    fn name(&self) -> &str {
        "rnd_double"
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::DOUBLE
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        Value::double(self.rng.borrow_mut().r#gen::<f64>())
    }

    fn traits(&self) -> FunctionTraits {
        FunctionTraits::NON_DETERMINISTIC
    }
}

/// `now()`: the execution start time, fixed for one execution.
#[derive(Debug)]
pub struct NowFunction {
    now: i64,
}

impl Function for NowFunction {
    fn name(&self) -> &str {
        "now"
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::TIMESTAMP
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        Value::Timestamp(self.now)
    }

    fn traits(&self) -> FunctionTraits {
        FunctionTraits::RUNTIME_CONSTANT
    }
}

#[derive(Clone, Copy)]
enum Builtin {
    RndInt,
    RndDouble,
    Now,
}

struct NullaryFactory {
    signature: &'static str,
    builtin: Builtin,
}

impl FunctionFactory for NullaryFactory {
    fn signature(&self) -> &str {
        self.signature
    }

    fn new_instance(
        &self,
        _position: Span,
        _args: Args,
        _config: &ResolverConfig,
        ctx: &dyn ExecutionContext,
    ) -> Result<Option<BoxedFunction>, ResolveError> {
        let function: BoxedFunction = match self.builtin {
            Builtin::RndInt => Box::new(RndIntFunction {
                rng: RefCell::new(StdRng::from_entropy()),
            }),
            Builtin::RndDouble => Box::new(RndDoubleFunction {
                rng: RefCell::new(StdRng::from_entropy()),
            }),
            Builtin::Now => Box::new(NowFunction { now: ctx.now() }),
        };
        Ok(Some(function))
    }
}

pub fn factories() -> Vec<Arc<dyn FunctionFactory>> {
    [
        ("rnd_int()", Builtin::RndInt),
        ("rnd_double()", Builtin::RndDouble),
        ("now()", Builtin::Now),
    ]
    .into_iter()
    .map(|(signature, builtin)| {
        Arc::new(NullaryFactory { signature, builtin }) as Arc<dyn FunctionFactory>
    })
    .collect()
}
