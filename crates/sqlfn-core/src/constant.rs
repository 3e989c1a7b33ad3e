//! Immutable typed values usable as evaluators.

use std::fmt;

use crate::column_type::ColumnType;
use crate::function::{Function, FunctionTraits, Record};
use crate::value::Value;

/// A constant evaluator: one value of one type.
///
/// A constant whose value is [`Value::Null`] is a typed null. Folding turns
/// any constant-foldable evaluator into one of these.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    column_type: ColumnType,
    value: Value,
}

impl Constant {
    pub fn new(column_type: ColumnType, value: Value) -> Self {
        Self { column_type, value }
    }

    /// A null of the given type.
    pub fn null(column_type: ColumnType) -> Self {
        Self::new(column_type, Value::Null)
    }

    /// The untyped `NULL` literal.
    pub fn untyped_null() -> Self {
        Self::null(ColumnType::NULL)
    }

    pub fn boolean(value: bool) -> Self {
        Self::new(ColumnType::BOOLEAN, Value::Boolean(value))
    }

    pub fn char(value: char) -> Self {
        Self::new(ColumnType::CHAR, Value::Char(value))
    }

    pub fn int(value: i32) -> Self {
        Self::new(ColumnType::INT, Value::Int(value))
    }

    pub fn long(value: i64) -> Self {
        Self::new(ColumnType::LONG, Value::Long(value))
    }

    pub fn float(value: f32) -> Self {
        Self::new(ColumnType::FLOAT, Value::float(value))
    }

    pub fn double(value: f64) -> Self {
        Self::new(ColumnType::DOUBLE, Value::double(value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::new(ColumnType::STRING, Value::str(value))
    }

    pub fn varchar(value: impl Into<String>) -> Self {
        Self::new(ColumnType::VARCHAR, Value::str(value))
    }

    pub fn symbol(value: impl Into<String>) -> Self {
        Self::new(ColumnType::SYMBOL, Value::str(value))
    }

    /// Microseconds since the epoch.
    pub fn timestamp(micros: i64) -> Self {
        Self::new(ColumnType::TIMESTAMP, Value::Timestamp(micros))
    }

    /// Milliseconds since the epoch.
    pub fn date(millis: i64) -> Self {
        Self::new(ColumnType::DATE, Value::Date(millis))
    }

    pub fn uuid(value: u128) -> Self {
        Self::new(ColumnType::UUID, Value::Uuid(value))
    }

    pub fn long256(limbs: [u64; 4]) -> Self {
        Self::new(ColumnType::LONG256, Value::Long256(limbs))
    }

    pub fn geohash(bits: u8, value: i64) -> Self {
        Self::new(ColumnType::geohash(bits), Value::GeoHash(value))
    }

    #[inline]
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// True for nulls and floating point NaN.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Str(s) => write!(f, "'{s}'"),
            Value::Char(c) => write!(f, "'{c}'"),
            other => write!(f, "{other}"),
        }
    }
}

impl Function for Constant {
    fn name(&self) -> &str {
        "constant"
    }

    fn column_type(&self) -> ColumnType {
        self.column_type
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        self.value.clone()
    }

    fn traits(&self) -> FunctionTraits {
        FunctionTraits::CONSTANT
    }

    fn as_constant(&self) -> Option<&Constant> {
        Some(self)
    }
}

/// A type name appearing as a value, e.g. the `int` in `cast(x as int)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeConstant {
    column_type: ColumnType,
}

impl TypeConstant {
    pub fn new(column_type: ColumnType) -> Self {
        Self { column_type }
    }
}

impl Function for TypeConstant {
    fn name(&self) -> &str {
        self.column_type.tag().name()
    }

    fn column_type(&self) -> ColumnType {
        self.column_type
    }

    fn eval(&self, _record: &dyn Record) -> Value {
        Value::Null
    }

    fn traits(&self) -> FunctionTraits {
        FunctionTraits::CONSTANT | FunctionTraits::TYPE_CONSTANT
    }
}
