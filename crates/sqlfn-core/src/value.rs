//! Runtime values produced by evaluators.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::column_type::{ColumnType, TypeTag};

/// A single scalar (or array) value.
///
/// Text kinds (string, varchar, symbol) share [`Value::Str`]; the evaluator's
/// [`ColumnType`] tells them apart. `Null` is untyped; a typed null is a
/// `Null` produced by an evaluator of a concrete type. Floating point NaN is
/// also treated as null, matching the engine's storage convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(char),
    Int(i32),
    Long(i64),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    /// Microseconds since the Unix epoch.
    Timestamp(i64),
    Float(OrderedFloat<f32>),
    Double(OrderedFloat<f64>),
    Str(String),
    Binary(Vec<u8>),
    Uuid(u128),
    IPv4(u32),
    Long128(i128),
    /// Four 64-bit limbs, least significant first.
    Long256([u64; 4]),
    Interval {
        lo: i64,
        hi: i64,
    },
    /// Geohash bits, right aligned. Precision lives in the column type.
    GeoHash(i64),
    Array(ArrayValue),
}

impl Value {
    #[inline]
    pub fn double(value: f64) -> Self {
        Value::Double(OrderedFloat(value))
    }

    #[inline]
    pub fn float(value: f32) -> Self {
        Value::Float(OrderedFloat(value))
    }

    #[inline]
    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    /// True for `Null` and for floating point NaN.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Double(v) => v.is_nan(),
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Whether this value is a valid representation for `column_type`.
    ///
    /// Null conforms to every type.
    pub fn conforms_to(&self, column_type: ColumnType) -> bool {
        match (self, column_type.tag()) {
            (Value::Null, _) => true,
            (Value::Boolean(_), TypeTag::Boolean)
            | (Value::Byte(_), TypeTag::Byte)
            | (Value::Short(_), TypeTag::Short)
            | (Value::Char(_), TypeTag::Char)
            | (Value::Int(_), TypeTag::Int)
            | (Value::Long(_), TypeTag::Long)
            | (Value::Date(_), TypeTag::Date)
            | (Value::Timestamp(_), TypeTag::Timestamp)
            | (Value::Float(_), TypeTag::Float)
            | (Value::Double(_), TypeTag::Double)
            | (Value::Str(_), TypeTag::String | TypeTag::Varchar | TypeTag::Symbol)
            | (Value::Binary(_), TypeTag::Binary)
            | (Value::Uuid(_), TypeTag::Uuid)
            | (Value::IPv4(_), TypeTag::IPv4)
            | (Value::Long128(_), TypeTag::Long128)
            | (Value::Long256(_), TypeTag::Long256)
            | (Value::Interval { .. }, TypeTag::Interval) => true,
            (Value::GeoHash(_), tag) => tag.is_geohash(),
            (Value::Array(array), TypeTag::Array) => {
                array.element == column_type.element_tag()
            }
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of any integral or temporal value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) | Value::Date(v) | Value::Timestamp(v) => Some(*v),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            _ => None,
        }
    }

    /// Floating point view of any numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(v.0)),
            Value::Double(v) => Some(v.0),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) | Value::Date(v) | Value::Timestamp(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{}", v.0),
            Value::Double(v) => write!(f, "{}", v.0),
            Value::Str(v) => f.write_str(v),
            Value::Binary(v) => write!(f, "[binary len={}]", v.len()),
            Value::Uuid(v) => write_uuid(f, *v),
            Value::IPv4(v) => {
                let [a, b, c, d] = v.to_be_bytes();
                write!(f, "{a}.{b}.{c}.{d}")
            }
            Value::Long128(v) => write!(f, "{v}"),
            Value::Long256(limbs) => {
                f.write_str("0x")?;
                let mut leading = true;
                for limb in limbs.iter().rev() {
                    if leading {
                        if *limb == 0 {
                            continue;
                        }
                        write!(f, "{limb:x}")?;
                        leading = false;
                    } else {
                        write!(f, "{limb:016x}")?;
                    }
                }
                if leading {
                    f.write_str("0")?;
                }
                Ok(())
            }
            Value::Interval { lo, hi } => write!(f, "('{lo}', '{hi}')"),
            Value::GeoHash(v) => write!(f, "#{v:x}"),
            Value::Array(array) => write!(f, "{array}"),
        }
    }
}

fn write_uuid(f: &mut fmt::Formatter<'_>, v: u128) -> fmt::Result {
    write!(
        f,
        "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
        (v >> 96) as u32,
        (v >> 80) as u16,
        (v >> 64) as u16,
        (v >> 48) as u16,
        (v & 0xffff_ffff_ffff) as u64
    )
}

/// A dense, row-major array value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayValue {
    element: TypeTag,
    shape: Vec<u32>,
    values: Vec<Value>,
}

impl ArrayValue {
    /// A one-dimensional array.
    pub fn vector(element: TypeTag, values: Vec<Value>) -> Self {
        let len = values.len() as u32;
        Self {
            element,
            shape: vec![len],
            values,
        }
    }

    /// A multi-dimensional array; returns `None` when the shape does not
    /// cover exactly `values.len()` elements.
    pub fn with_shape(element: TypeTag, shape: Vec<u32>, values: Vec<Value>) -> Option<Self> {
        let expected: u64 = shape.iter().map(|d| u64::from(*d)).product();
        (expected == values.len() as u64).then_some(Self {
            element,
            shape,
            values,
        })
    }

    pub fn element(&self) -> TypeTag {
        self.element
    }

    pub fn dims(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[u32] {
        &self.shape
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn column_type(&self) -> ColumnType {
        ColumnType::array(self.element, self.shape.len() as u8)
    }
}

impl fmt::Display for ArrayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str("]")
    }
}
