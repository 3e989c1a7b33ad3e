//! Comparison and boolean operators.

use std::cmp::Ordering;
use std::sync::Arc;

use sqlfn_compiler::create_implicit_cast;
use sqlfn_core::{
    Args, BoxedFunction, ColumnType, ExecutionContext, ResolveError, ResolverConfig, Span, Value,
};
use sqlfn_registry::FunctionFactory;

use crate::scalar::{Kernel, ScalarFunction, any_null, scalar};

// =============================================================================
// ORDERING
// =============================================================================

/// Total order between two non-null values of compatible kinds.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
        (Value::Double(_) | Value::Float(_), _) | (_, Value::Double(_) | Value::Float(_)) => {
            left.as_f64()?.partial_cmp(&right.as_f64()?)
        }
        _ => Some(left.as_i64()?.cmp(&right.as_i64()?)),
    }
}

fn predicate(values: &[Value], test: fn(Ordering) -> bool) -> Value {
    if any_null(values) {
        return Value::Null;
    }
    compare(&values[0], &values[1]).map_or(Value::Null, |o| Value::Boolean(test(o)))
}

fn eq(values: &[Value]) -> Value {
    predicate(values, Ordering::is_eq)
}

fn lt(values: &[Value]) -> Value {
    predicate(values, Ordering::is_lt)
}

// =============================================================================
// BOOLEAN LOGIC
// =============================================================================

/// Three-valued `and`: false wins over null.
fn and(values: &[Value]) -> Value {
    match (values[0].as_bool(), values[1].as_bool()) {
        (Some(false), _) | (_, Some(false)) => Value::Boolean(false),
        (Some(true), Some(true)) => Value::Boolean(true),
        _ => Value::Null,
    }
}

/// Three-valued `or`: true wins over null.
fn or(values: &[Value]) -> Value {
    match (values[0].as_bool(), values[1].as_bool()) {
        (Some(true), _) | (_, Some(true)) => Value::Boolean(true),
        (Some(false), Some(false)) => Value::Boolean(false),
        _ => Value::Null,
    }
}

fn not(values: &[Value]) -> Value {
    values[0].as_bool().map_or(Value::Null, |v| Value::Boolean(!v))
}

// =============================================================================
// COERCING FACTORY
// =============================================================================

/// Comparison over a type that text operands convert to, such as `UUID` or
/// `TIMESTAMP`. Operands of another type are wrapped in an implicit cast.
struct CoercingCompareFactory {
    signature: &'static str,
    name: &'static str,
    operand: ColumnType,
    kernel: Kernel,
}

impl FunctionFactory for CoercingCompareFactory {
    fn signature(&self) -> &str {
        self.signature
    }

    fn new_instance(
        &self,
        _position: Span,
        args: Args,
        _config: &ResolverConfig,
        _ctx: &dyn ExecutionContext,
    ) -> Result<Option<BoxedFunction>, ResolveError> {
        let (functions, positions) = args.into_parts();
        let mut operands = Vec::with_capacity(functions.len());
        for (function, position) in functions.into_iter().zip(positions) {
            let tag = function.column_type().tag();
            if tag == self.operand.tag() || function.column_type().is_null() {
                operands.push(function);
            } else {
                operands.push(create_implicit_cast(position, function, self.operand)?.into_inner());
            }
        }
        Ok(Some(Box::new(ScalarFunction::new(
            self.name,
            ColumnType::BOOLEAN,
            operands,
            self.kernel,
        ))))
    }
}

fn coercing(
    signature: &'static str,
    name: &'static str,
    operand: ColumnType,
    kernel: Kernel,
) -> Arc<dyn FunctionFactory> {
    Arc::new(CoercingCompareFactory {
        signature,
        name,
        operand,
        kernel,
    })
}

// =============================================================================
// REGISTRATION
// =============================================================================

pub fn factories() -> Vec<Arc<dyn FunctionFactory>> {
    vec![
        scalar("=(int, int)", "eq_int", ColumnType::BOOLEAN, eq),
        scalar("=(long, long)", "eq_long", ColumnType::BOOLEAN, eq),
        scalar("=(double, double)", "eq_double", ColumnType::BOOLEAN, eq),
        scalar("=(char, char)", "eq_char", ColumnType::BOOLEAN, eq),
        scalar("=(string, string)", "eq_str", ColumnType::BOOLEAN, eq),
        scalar("=(boolean, boolean)", "eq_bool", ColumnType::BOOLEAN, eq),
        coercing("=(timestamp, timestamp)", "eq_timestamp", ColumnType::TIMESTAMP, eq),
        coercing("=(uuid, uuid)", "eq_uuid", ColumnType::UUID, eq),
        scalar("<(int, int)", "lt_int", ColumnType::BOOLEAN, lt),
        scalar("<(long, long)", "lt_long", ColumnType::BOOLEAN, lt),
        scalar("<(double, double)", "lt_double", ColumnType::BOOLEAN, lt),
        scalar("<(string, string)", "lt_str", ColumnType::BOOLEAN, lt),
        coercing("<(timestamp, timestamp)", "lt_timestamp", ColumnType::TIMESTAMP, lt),
        coercing("<(uuid, uuid)", "lt_uuid", ColumnType::UUID, lt),
        scalar("and(boolean, boolean)", "and", ColumnType::BOOLEAN, and),
        scalar("or(boolean, boolean)", "or", ColumnType::BOOLEAN, or),
        scalar("not(boolean)", "not", ColumnType::BOOLEAN, not),
    ]
}
