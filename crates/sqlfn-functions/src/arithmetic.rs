//! Arithmetic operators and `abs`.
//!
//! Every operator is null-propagating. Integer overflow and division by
//! zero yield null.

use std::sync::Arc;

use sqlfn_core::{ColumnType, Value};
use sqlfn_registry::FunctionFactory;

use crate::scalar::{any_null, scalar};

// =============================================================================
// KERNEL HELPERS
// =============================================================================

fn int_op(values: &[Value], op: fn(i32, i32) -> Option<i32>) -> Value {
    if any_null(values) {
        return Value::Null;
    }
    let operands = (
        values[0].as_i64().and_then(|v| i32::try_from(v).ok()),
        values[1].as_i64().and_then(|v| i32::try_from(v).ok()),
    );
    match operands {
        (Some(a), Some(b)) => op(a, b).map_or(Value::Null, Value::Int),
        _ => Value::Null,
    }
}

fn long_op(values: &[Value], op: fn(i64, i64) -> Option<i64>) -> Value {
    if any_null(values) {
        return Value::Null;
    }
    match (values[0].as_i64(), values[1].as_i64()) {
        (Some(a), Some(b)) => op(a, b).map_or(Value::Null, Value::Long),
        _ => Value::Null,
    }
}

fn double_op(values: &[Value], op: fn(f64, f64) -> f64) -> Value {
    if any_null(values) {
        return Value::Null;
    }
    match (values[0].as_f64(), values[1].as_f64()) {
        (Some(a), Some(b)) => Value::double(op(a, b)),
        _ => Value::Null,
    }
}

fn unary_long(values: &[Value], op: fn(i64) -> Option<i64>) -> Option<i64> {
    if any_null(values) {
        return None;
    }
    values[0].as_i64().and_then(op)
}

fn unary_double(values: &[Value], op: fn(f64) -> f64) -> Value {
    if any_null(values) {
        return Value::Null;
    }
    values[0].as_f64().map_or(Value::Null, |v| Value::double(op(v)))
}

fn narrow_int(value: Option<i64>) -> Value {
    value
        .and_then(|v| i32::try_from(v).ok())
        .map_or(Value::Null, Value::Int)
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Factories in registration order: int before long before double, so the
/// narrowest type wins ties.
pub fn factories() -> Vec<Arc<dyn FunctionFactory>> {
    vec![
        scalar("+(int, int)", "add_int", ColumnType::INT, |v| int_op(v, i32::checked_add)),
        scalar("+(long, long)", "add_long", ColumnType::LONG, |v| long_op(v, i64::checked_add)),
        scalar("+(double, double)", "add_double", ColumnType::DOUBLE, |v| {
            double_op(v, |a, b| a + b)
        }),
        scalar("-(int, int)", "sub_int", ColumnType::INT, |v| int_op(v, i32::checked_sub)),
        scalar("-(long, long)", "sub_long", ColumnType::LONG, |v| long_op(v, i64::checked_sub)),
        scalar("-(double, double)", "sub_double", ColumnType::DOUBLE, |v| {
            double_op(v, |a, b| a - b)
        }),
        scalar("*(int, int)", "mul_int", ColumnType::INT, |v| int_op(v, i32::checked_mul)),
        scalar("*(long, long)", "mul_long", ColumnType::LONG, |v| long_op(v, i64::checked_mul)),
        scalar("*(double, double)", "mul_double", ColumnType::DOUBLE, |v| {
            double_op(v, |a, b| a * b)
        }),
        scalar("/(int, int)", "div_int", ColumnType::INT, |v| int_op(v, i32::checked_div)),
        scalar("/(long, long)", "div_long", ColumnType::LONG, |v| long_op(v, i64::checked_div)),
        scalar("/(double, double)", "div_double", ColumnType::DOUBLE, |v| {
            double_op(v, |a, b| a / b)
        }),
        scalar("-(int)", "neg_int", ColumnType::INT, |v| {
            narrow_int(unary_long(v, i64::checked_neg))
        }),
        scalar("-(long)", "neg_long", ColumnType::LONG, |v| {
            unary_long(v, i64::checked_neg).map_or(Value::Null, Value::Long)
        }),
        scalar("-(double)", "neg_double", ColumnType::DOUBLE, |v| unary_double(v, |a| -a)),
        scalar("abs(int)", "abs_int", ColumnType::INT, |v| {
            narrow_int(unary_long(v, i64::checked_abs))
        }),
        scalar("abs(long)", "abs_long", ColumnType::LONG, |v| {
            unary_long(v, i64::checked_abs).map_or(Value::Null, Value::Long)
        }),
        scalar("abs(double)", "abs_double", ColumnType::DOUBLE, |v| {
            unary_double(v, f64::abs)
        }),
    ]
}
