//! Implicit cast synthesis.
//!
//! Maps a (source type, target type) pair to an adapter evaluator that
//! converts values on the fly:
//!
//! | From | To |
//! |------|----|
//! | `STRING`, `SYMBOL` | `UUID`, `TIMESTAMP`, `DOUBLE[]`, geohash |
//! | `VARCHAR` | `UUID`, `TIMESTAMP`, geohash |
//! | `UUID` | `STRING`, `VARCHAR` |
//! | `CHAR` | `SYMBOL` |
//! | geohash | narrower geohash |
//!
//! Adapters yield null for input they cannot convert, except that constant
//! text bound for a geohash is parsed up front and rejected with
//! [`ResolveError::InvalidGeoHash`].

use sqlfn_core::{
    ArrayValue, BoxedFunction, ColumnType, Constant, EmptyRecord, Function, FunctionTraits,
    Record, ResolveError, Span, TypeTag, Value,
};

use crate::fold::function_to_constant;
use crate::geohash;
use crate::temporal::{format_timestamp, parse_floor_partial_timestamp};

type Result<T> = std::result::Result<T, ResolveError>;

/// The conversion an [`ImplicitCast`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CastKind {
    StrToUuid,
    StrToTimestamp,
    StrToDoubleArray,
    StrToGeoHash,
    VarcharToUuid,
    VarcharToTimestamp,
    VarcharToGeoHash,
    UuidToStr,
    UuidToVarchar,
    CharToSymbol,
    GeoHashToGeoHash,
    IntervalToStr,
}

impl CastKind {
    pub fn name(self) -> &'static str {
        match self {
            CastKind::StrToUuid => "str_to_uuid",
            CastKind::StrToTimestamp => "str_to_timestamp",
            CastKind::StrToDoubleArray => "str_to_double_array",
            CastKind::StrToGeoHash => "str_to_geohash",
            CastKind::VarcharToUuid => "varchar_to_uuid",
            CastKind::VarcharToTimestamp => "varchar_to_timestamp",
            CastKind::VarcharToGeoHash => "varchar_to_geohash",
            CastKind::UuidToStr => "uuid_to_str",
            CastKind::UuidToVarchar => "uuid_to_varchar",
            CastKind::CharToSymbol => "char_to_symbol",
            CastKind::GeoHashToGeoHash => "geohash_to_geohash",
            CastKind::IntervalToStr => "interval_to_str",
        }
    }

    fn parses_geohash(self) -> bool {
        matches!(self, CastKind::StrToGeoHash | CastKind::VarcharToGeoHash)
    }
}

/// The implicit conversion from `from` to `to`, if one exists.
///
/// `INTERVAL` to `STRING` is not listed: it is only inserted when an
/// interval argument lands in a string parameter.
pub fn implicit_cast_kind(from: ColumnType, to: ColumnType) -> Option<CastKind> {
    let sized_geohash = to.is_geohash() && to.geohash_bits() > 0;
    match from.tag() {
        TypeTag::String | TypeTag::Symbol => match to.tag() {
            TypeTag::Uuid => Some(CastKind::StrToUuid),
            TypeTag::Timestamp => Some(CastKind::StrToTimestamp),
            TypeTag::Array if to.element_tag() == TypeTag::Double => {
                Some(CastKind::StrToDoubleArray)
            }
            _ if sized_geohash => Some(CastKind::StrToGeoHash),
            _ => None,
        },
        TypeTag::Varchar => match to.tag() {
            TypeTag::Uuid => Some(CastKind::VarcharToUuid),
            TypeTag::Timestamp => Some(CastKind::VarcharToTimestamp),
            _ if sized_geohash => Some(CastKind::VarcharToGeoHash),
            _ => None,
        },
        TypeTag::Uuid => match to.tag() {
            TypeTag::String => Some(CastKind::UuidToStr),
            TypeTag::Varchar => Some(CastKind::UuidToVarchar),
            _ => None,
        },
        TypeTag::Char if to.tag() == TypeTag::Symbol => Some(CastKind::CharToSymbol),
        tag if tag.is_geohash()
            && sized_geohash
            && to.geohash_bits() < from.geohash_bits() =>
        {
            Some(CastKind::GeoHashToGeoHash)
        }
        _ => None,
    }
}

/// An adapter evaluator converting its argument to another type.
#[derive(Debug)]
pub struct ImplicitCast {
    kind: CastKind,
    arg: BoxedFunction,
    from: ColumnType,
    to: ColumnType,
}

impl ImplicitCast {
    pub fn new(kind: CastKind, arg: BoxedFunction, to: ColumnType) -> Self {
        let from = arg.column_type();
        Self {
            kind,
            arg,
            from,
            to,
        }
    }

    /// Render a `UUID` argument as text.
    pub fn uuid_to_str(arg: BoxedFunction) -> Self {
        Self::new(CastKind::UuidToStr, arg, ColumnType::STRING)
    }

    /// Render an `INTERVAL` argument as text.
    pub fn interval_to_str(arg: BoxedFunction) -> Self {
        Self::new(CastKind::IntervalToStr, arg, ColumnType::STRING)
    }

    pub fn kind(&self) -> CastKind {
        self.kind
    }

    fn convert(&self, value: Value) -> Value {
        match (self.kind, value) {
            (CastKind::StrToUuid | CastKind::VarcharToUuid, Value::Str(text)) => {
                uuid::Uuid::parse_str(&text).map_or(Value::Null, |u| Value::Uuid(u.as_u128()))
            }
            (CastKind::StrToTimestamp | CastKind::VarcharToTimestamp, Value::Str(text)) => {
                parse_floor_partial_timestamp(&text).map_or(Value::Null, Value::Timestamp)
            }
            (CastKind::StrToDoubleArray, Value::Str(text)) => {
                parse_double_array(&text, self.to.dims()).map_or(Value::Null, Value::Array)
            }
            (CastKind::StrToGeoHash | CastKind::VarcharToGeoHash, Value::Str(text)) => {
                geohash::from_string(&text, self.to.geohash_bits())
                    .map_or(Value::Null, Value::GeoHash)
            }
            (CastKind::UuidToStr | CastKind::UuidToVarchar, Value::Uuid(u)) => {
                Value::Str(uuid::Uuid::from_u128(u).hyphenated().to_string())
            }
            (CastKind::CharToSymbol, Value::Char(c)) => Value::Str(c.to_string()),
            (CastKind::GeoHashToGeoHash, Value::GeoHash(v)) => Value::GeoHash(geohash::narrow(
                v,
                self.from.geohash_bits(),
                self.to.geohash_bits(),
            )),
            (CastKind::IntervalToStr, Value::Interval { lo, hi }) => Value::Str(format!(
                "('{}', '{}')",
                format_timestamp(lo),
                format_timestamp(hi)
            )),
            _ => Value::Null,
        }
    }
}

impl Function for ImplicitCast {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn column_type(&self) -> ColumnType {
        self.to
    }

    fn eval(&self, record: &dyn Record) -> Value {
        let value = self.arg.eval(record);
        if value.is_null() {
            return Value::Null;
        }
        self.convert(value)
    }

    fn traits(&self) -> FunctionTraits {
        let inherited = self.arg.traits()
            & (FunctionTraits::CONSTANT
                | FunctionTraits::RUNTIME_CONSTANT
                | FunctionTraits::NON_DETERMINISTIC);
        inherited | FunctionTraits::IMPLICIT_CAST
    }

    fn args(&self) -> Vec<&dyn Function> {
        vec![self.arg.as_ref()]
    }
}

/// Result of an implicit cast request.
///
/// The input evaluator is handed back when no conversion exists, so the
/// caller keeps ownership and decides whether that is an error.
#[derive(Debug)]
pub enum CastOutcome {
    Cast(BoxedFunction),
    Unavailable(BoxedFunction),
}

impl CastOutcome {
    pub fn is_cast(&self) -> bool {
        matches!(self, CastOutcome::Cast(_))
    }

    /// The resulting evaluator, converted or not.
    pub fn into_inner(self) -> BoxedFunction {
        match self {
            CastOutcome::Cast(f) | CastOutcome::Unavailable(f) => f,
        }
    }
}

/// Wrap `function` in an adapter converting it to `to`.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn create_implicit_cast_or_none(
    position: Span,
    function: BoxedFunction,
    to: ColumnType,
) -> Result<CastOutcome> {
    let Some(kind) = implicit_cast_kind(function.column_type(), to) else {
        return Ok(CastOutcome::Unavailable(function));
    };

    if kind.parses_geohash() && function.is_constant() {
        let bits = to.geohash_bits();
        let value = function.eval(&EmptyRecord);
        let constant = match value.as_str() {
            None => Constant::null(to),
            Some(text) => match geohash::from_string(text, bits) {
                Some(hash) => Constant::new(to, Value::GeoHash(hash)),
                None => {
                    return Err(ResolveError::InvalidGeoHash {
                        value: text.to_string(),
                        bits,
                        span: position,
                    });
                }
            },
        };
        return Ok(CastOutcome::Cast(Box::new(constant)));
    }

    Ok(CastOutcome::Cast(Box::new(ImplicitCast::new(kind, function, to))))
}

/// Like [`create_implicit_cast_or_none`], folding the adapter when its
/// input is constant.
pub fn create_implicit_cast(
    position: Span,
    function: BoxedFunction,
    to: ColumnType,
) -> Result<CastOutcome> {
    Ok(match create_implicit_cast_or_none(position, function, to)? {
        CastOutcome::Cast(cast) if cast.is_constant() => {
            CastOutcome::Cast(function_to_constant(cast))
        }
        other => other,
    })
}

/// Parse `{1,2}` / `[1,2]` text, nested to `dims` levels, into a double
/// array. Nested rows must all have the same length; nesting deeper than
/// `dims` is rejected before descending.
fn parse_double_array(text: &str, dims: u8) -> Option<ArrayValue> {
    let dims = usize::from(dims.max(1));
    let mut shape = Vec::new();
    let mut values = Vec::new();
    let rest = parse_level(text.trim(), 0, dims, &mut shape, &mut values)?;
    if !rest.trim().is_empty() || shape.len() != dims {
        return None;
    }
    ArrayValue::with_shape(TypeTag::Double, shape, values)
}

fn parse_level<'a>(
    text: &'a str,
    depth: usize,
    dims: usize,
    shape: &mut Vec<u32>,
    values: &mut Vec<Value>,
) -> Option<&'a str> {
    let close = match text.chars().next()? {
        '{' => '}',
        '[' => ']',
        _ => return None,
    };
    let mut rest = text[1..].trim_start();
    let mut count = 0u32;
    if let Some(after) = rest.strip_prefix(close) {
        rest = after;
    } else {
        loop {
            let after_item = if rest.starts_with(['{', '[']) {
                if depth + 1 >= dims {
                    return None;
                }
                parse_level(rest, depth + 1, dims, shape, values)?
            } else {
                let end = rest.find([',', close])?;
                values.push(Value::double(rest[..end].trim().parse().ok()?));
                &rest[end..]
            };
            rest = after_item.trim_start();
            count += 1;
            if let Some(after) = rest.strip_prefix(',') {
                rest = after.trim_start();
            } else {
                rest = rest.strip_prefix(close)?;
                break;
            }
        }
    }
    match shape.get(depth) {
        Some(&expected) if expected != count => return None,
        Some(_) => {}
        None => shape.push(count),
    }
    Some(rest)
}
