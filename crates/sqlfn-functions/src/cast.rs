//! Explicit `cast(x as T)`.
//!
//! One overload is registered per supported (source, target) pair. The
//! second argument is the type constant naming the target. A null operand
//! resolves to a typed null constant of the target type.

use std::sync::Arc;

use chrono::DateTime;
use sqlfn_compiler::temporal::{format_timestamp, parse_date, parse_floor_partial_timestamp};
use sqlfn_core::{
    Args, BoxedFunction, ColumnType, Constant, ExecutionContext, Function, FunctionTraits, Record,
    ResolveError, ResolverConfig, Span, TypeTag, Value,
};
use sqlfn_registry::FunctionFactory;

/// Types `cast` converts between, in registration order.
const CASTABLE: &[ColumnType] = &[
    ColumnType::BOOLEAN,
    ColumnType::BYTE,
    ColumnType::SHORT,
    ColumnType::CHAR,
    ColumnType::INT,
    ColumnType::LONG,
    ColumnType::FLOAT,
    ColumnType::DOUBLE,
    ColumnType::STRING,
    ColumnType::VARCHAR,
    ColumnType::SYMBOL,
    ColumnType::DATE,
    ColumnType::TIMESTAMP,
    ColumnType::UUID,
];

fn is_numeric(tag: TypeTag) -> bool {
    matches!(
        tag,
        TypeTag::Byte | TypeTag::Short | TypeTag::Int | TypeTag::Long | TypeTag::Float | TypeTag::Double
    )
}

fn is_text(tag: TypeTag) -> bool {
    matches!(tag, TypeTag::String | TypeTag::Varchar | TypeTag::Symbol)
}

fn is_temporal(tag: TypeTag) -> bool {
    matches!(tag, TypeTag::Date | TypeTag::Timestamp)
}

/// Whether a `cast` overload exists from `from` to `to`.
fn supported(from: TypeTag, to: TypeTag) -> bool {
    if from == to || is_text(from) || is_text(to) {
        return true;
    }
    match to {
        TypeTag::Boolean => is_numeric(from),
        TypeTag::Char => matches!(from, TypeTag::Byte | TypeTag::Short | TypeTag::Int),
        TypeTag::Date | TypeTag::Timestamp => is_temporal(from) || from == TypeTag::Long,
        TypeTag::Uuid => false,
        _ if is_numeric(to) => {
            is_numeric(from)
                || from == TypeTag::Boolean
                || from == TypeTag::Char
                || (to == TypeTag::Long && is_temporal(from))
        }
        _ => false,
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

/// Render a double with at most `scale` fractional digits, keeping one.
fn format_double(value: f64, scale: usize) -> String {
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let mut text = format!("{value:.scale$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').len();
        text.truncate(trimmed);
        if text.ends_with('.') {
            text.push('0');
        }
    } else {
        text.push_str(".0");
    }
    text
}

fn format_date(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        None => millis.to_string(),
    }
}

pub(crate) fn to_text(value: &Value, scales: (usize, usize)) -> Option<String> {
    Some(match value {
        Value::Str(s) => s.clone(),
        Value::Char(c) => c.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Double(v) => format_double(v.0, scales.0),
        Value::Float(v) => format_double(f64::from(v.0), scales.1),
        Value::Date(millis) => format_date(*millis),
        Value::Timestamp(micros) => format_timestamp(*micros),
        Value::Uuid(_) => value.to_string(),
        other => other.as_i64()?.to_string(),
    })
}

fn to_integral(value: &Value) -> Option<i64> {
    match value {
        Value::Boolean(b) => Some(i64::from(*b)),
        Value::Char(c) => c.to_digit(10).map(i64::from),
        Value::Str(s) => s.trim().parse().ok(),
        Value::Float(_) | Value::Double(_) => {
            let v = value.as_f64()?;
            (v >= i64::MIN as f64 && v <= i64::MAX as f64).then(|| v as i64)
        }
        other => other.as_i64(),
    }
}

fn to_floating(value: &Value) -> Option<f64> {
    match value {
        Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Char(c) => c.to_digit(10).map(f64::from),
        Value::Str(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

fn convert(value: &Value, to: TypeTag, scales: (usize, usize)) -> Option<Value> {
    Some(match to {
        TypeTag::Boolean => match value {
            Value::Boolean(b) => Value::Boolean(*b),
            Value::Str(s) => Value::Boolean(s.eq_ignore_ascii_case("true")),
            other => Value::Boolean(other.as_f64()? != 0.0),
        },
        TypeTag::Byte => Value::Byte(i8::try_from(to_integral(value)?).ok()?),
        TypeTag::Short => Value::Short(i16::try_from(to_integral(value)?).ok()?),
        TypeTag::Int => Value::Int(i32::try_from(to_integral(value)?).ok()?),
        TypeTag::Long => Value::Long(to_integral(value)?),
        TypeTag::Float => Value::float(to_floating(value)? as f32),
        TypeTag::Double => Value::double(to_floating(value)?),
        TypeTag::Char => match value {
            Value::Str(s) => Value::Char(s.chars().next()?),
            Value::Char(c) => Value::Char(*c),
            other => Value::Char(char::from_u32(u32::try_from(other.as_i64()?).ok()?)?),
        },
        TypeTag::String | TypeTag::Varchar | TypeTag::Symbol => Value::Str(to_text(value, scales)?),
        TypeTag::Date => match value {
            Value::Str(s) => Value::Date(parse_date(s)?),
            Value::Timestamp(micros) => Value::Date(micros.div_euclid(1000)),
            other => Value::Date(other.as_i64()?),
        },
        TypeTag::Timestamp => match value {
            Value::Str(s) => Value::Timestamp(parse_floor_partial_timestamp(s)?),
            Value::Date(millis) => Value::Timestamp(millis.checked_mul(1000)?),
            other => Value::Timestamp(other.as_i64()?),
        },
        TypeTag::Uuid => match value {
            Value::Uuid(v) => Value::Uuid(*v),
            Value::Str(s) => Value::Uuid(uuid::Uuid::parse_str(s.trim()).ok()?.as_u128()),
            _ => return None,
        },
        _ => return None,
    })
}

// =============================================================================
// EVALUATOR
// =============================================================================

#[derive(Debug)]
pub struct CastFunction {
    arg: BoxedFunction,
    to: ColumnType,
    scales: (usize, usize),
}

impl Function for CastFunction {
    fn name(&self) -> &str {
        "cast"
    }

    fn column_type(&self) -> ColumnType {
        self.to
    }

    /// Unconvertible input yields null.
    fn eval(&self, record: &dyn Record) -> Value {
        let value = self.arg.eval(record);
        if value.is_null() {
            return Value::Null;
        }
        convert(&value, self.to.tag(), self.scales).unwrap_or(Value::Null)
    }

    fn traits(&self) -> FunctionTraits {
        self.arg.traits()
            & (FunctionTraits::CONSTANT
                | FunctionTraits::RUNTIME_CONSTANT
                | FunctionTraits::NON_DETERMINISTIC)
    }

    fn args(&self) -> Vec<&dyn Function> {
        vec![self.arg.as_ref()]
    }
}

struct CastFactory {
    signature: String,
    to: ColumnType,
}

impl FunctionFactory for CastFactory {
    fn signature(&self) -> &str {
        &self.signature
    }

    fn new_instance(
        &self,
        position: Span,
        args: Args,
        config: &ResolverConfig,
        _ctx: &dyn ExecutionContext,
    ) -> Result<Option<BoxedFunction>, ResolveError> {
        let Some([arg, _target]) = args.into_array::<2>() else {
            return Err(ResolveError::factory(position, "cast takes an operand and a type"));
        };
        if arg.column_type().is_null() || arg.as_constant().is_some_and(Constant::is_null) {
            return Ok(Some(Box::new(Constant::null(self.to))));
        }
        Ok(Some(Box::new(CastFunction {
            arg,
            to: self.to,
            scales: (config.double_to_str_scale, config.float_to_str_scale),
        })))
    }
}

pub fn factories() -> Vec<Arc<dyn FunctionFactory>> {
    let mut factories: Vec<Arc<dyn FunctionFactory>> = Vec::new();
    for &to in CASTABLE {
        for &from in CASTABLE {
            if supported(from.tag(), to.tag()) {
                factories.push(Arc::new(CastFactory {
                    signature: format!("cast({}, {} const)", type_name(from), type_name(to)),
                    to,
                }));
            }
        }
    }
    factories
}

/// Lower-case name accepted by the signature parser.
fn type_name(column_type: ColumnType) -> String {
    column_type.to_string().to_ascii_lowercase()
}
