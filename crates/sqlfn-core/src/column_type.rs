//! Column types understood by the function resolver.
//!
//! A [`TypeTag`] names the storage kind of a value. A [`ColumnType`] refines
//! it with the parameters some kinds need: geohash precision in bits, and
//! element kind plus dimensionality for arrays.

use std::fmt;

/// Storage kind of a column or evaluator result.
///
/// Declaration order follows the engine's type ordinals; the range from
/// [`TypeTag::Boolean`] to [`TypeTag::Binary`] is contiguous and is relied
/// upon by [`TypeTag::is_castable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Undefined,
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Date,
    Timestamp,
    Float,
    Double,
    String,
    Symbol,
    Long256,
    GeoByte,
    GeoShort,
    GeoInt,
    GeoLong,
    Binary,
    Uuid,
    Cursor,
    VarArg,
    Record,
    /// Geohash of unspecified width, used in signatures.
    GeoHash,
    Long128,
    IPv4,
    Varchar,
    ArrayString,
    Interval,
    Array,
    RegClass,
    RegProcedure,
    Null,
}

impl TypeTag {
    /// Upper-case display name of the tag.
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::Undefined => "UNDEFINED",
            TypeTag::Boolean => "BOOLEAN",
            TypeTag::Byte => "BYTE",
            TypeTag::Short => "SHORT",
            TypeTag::Char => "CHAR",
            TypeTag::Int => "INT",
            TypeTag::Long => "LONG",
            TypeTag::Date => "DATE",
            TypeTag::Timestamp => "TIMESTAMP",
            TypeTag::Float => "FLOAT",
            TypeTag::Double => "DOUBLE",
            TypeTag::String => "STRING",
            TypeTag::Symbol => "SYMBOL",
            TypeTag::Long256 => "LONG256",
            TypeTag::GeoByte
            | TypeTag::GeoShort
            | TypeTag::GeoInt
            | TypeTag::GeoLong
            | TypeTag::GeoHash => "GEOHASH",
            TypeTag::Binary => "BINARY",
            TypeTag::Uuid => "UUID",
            TypeTag::Cursor => "CURSOR",
            TypeTag::VarArg => "VARARG",
            TypeTag::Record => "RECORD",
            TypeTag::Long128 => "LONG128",
            TypeTag::IPv4 => "IPv4",
            TypeTag::Varchar => "VARCHAR",
            TypeTag::ArrayString => "STRING[]",
            TypeTag::Interval => "INTERVAL",
            TypeTag::Array => "ARRAY",
            TypeTag::RegClass => "REGCLASS",
            TypeTag::RegProcedure => "REGPROCEDURE",
            TypeTag::Null => "NULL",
        }
    }

    /// Look up a tag by its SQL type name (case-insensitive).
    ///
    /// Geohash and array types are parameterized and handled by
    /// [`ColumnType::parse`].
    pub fn from_name(name: &str) -> Option<TypeTag> {
        let tag = match name.to_ascii_lowercase().as_str() {
            "boolean" => TypeTag::Boolean,
            "byte" => TypeTag::Byte,
            "short" => TypeTag::Short,
            "char" => TypeTag::Char,
            "int" => TypeTag::Int,
            "long" => TypeTag::Long,
            "date" => TypeTag::Date,
            "timestamp" => TypeTag::Timestamp,
            "float" => TypeTag::Float,
            "double" => TypeTag::Double,
            "string" => TypeTag::String,
            "symbol" => TypeTag::Symbol,
            "long256" => TypeTag::Long256,
            "binary" => TypeTag::Binary,
            "uuid" => TypeTag::Uuid,
            "cursor" => TypeTag::Cursor,
            "record" => TypeTag::Record,
            "geohash" => TypeTag::GeoHash,
            "long128" => TypeTag::Long128,
            "ipv4" => TypeTag::IPv4,
            "varchar" => TypeTag::Varchar,
            "interval" => TypeTag::Interval,
            "regclass" => TypeTag::RegClass,
            "regprocedure" => TypeTag::RegProcedure,
            "null" => TypeTag::Null,
            _ => return None,
        };
        Some(tag)
    }

    /// True for the four fixed-width geohash tags and the generic one.
    pub const fn is_geohash(self) -> bool {
        matches!(
            self,
            TypeTag::GeoByte
                | TypeTag::GeoShort
                | TypeTag::GeoInt
                | TypeTag::GeoLong
                | TypeTag::GeoHash
        )
    }

    /// True for tags that may appear as the target of `cast(x as T)`.
    pub const fn is_castable(self) -> bool {
        matches!(
            self,
            TypeTag::Boolean
                | TypeTag::Byte
                | TypeTag::Short
                | TypeTag::Char
                | TypeTag::Int
                | TypeTag::Long
                | TypeTag::Date
                | TypeTag::Timestamp
                | TypeTag::Float
                | TypeTag::Double
                | TypeTag::String
                | TypeTag::Symbol
                | TypeTag::Long256
                | TypeTag::GeoByte
                | TypeTag::GeoShort
                | TypeTag::GeoInt
                | TypeTag::GeoLong
                | TypeTag::Binary
                | TypeTag::RegClass
                | TypeTag::RegProcedure
                | TypeTag::ArrayString
                | TypeTag::Uuid
                | TypeTag::IPv4
                | TypeTag::Varchar
                | TypeTag::Interval
                | TypeTag::Array
        )
    }

    /// Integer and floating point tags.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            TypeTag::Byte
                | TypeTag::Short
                | TypeTag::Int
                | TypeTag::Long
                | TypeTag::Float
                | TypeTag::Double
        )
    }

    /// Tags whose values are text.
    pub const fn is_text(self) -> bool {
        matches!(
            self,
            TypeTag::String | TypeTag::Varchar | TypeTag::Symbol | TypeTag::Char
        )
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Maximum precision of a geohash, in bits.
pub const GEOHASH_MAX_BITS: u8 = 60;

/// A fully parameterized column type.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnType {
    tag: TypeTag,
    /// Geohash precision; zero for every other tag and for the generic geohash.
    bits: u8,
    /// Array element kind; [`TypeTag::Undefined`] for non-arrays.
    element: TypeTag,
    dims: u8,
}

impl ColumnType {
    pub const UNDEFINED: ColumnType = ColumnType::of(TypeTag::Undefined);
    pub const BOOLEAN: ColumnType = ColumnType::of(TypeTag::Boolean);
    pub const BYTE: ColumnType = ColumnType::of(TypeTag::Byte);
    pub const SHORT: ColumnType = ColumnType::of(TypeTag::Short);
    pub const CHAR: ColumnType = ColumnType::of(TypeTag::Char);
    pub const INT: ColumnType = ColumnType::of(TypeTag::Int);
    pub const LONG: ColumnType = ColumnType::of(TypeTag::Long);
    pub const DATE: ColumnType = ColumnType::of(TypeTag::Date);
    pub const TIMESTAMP: ColumnType = ColumnType::of(TypeTag::Timestamp);
    pub const FLOAT: ColumnType = ColumnType::of(TypeTag::Float);
    pub const DOUBLE: ColumnType = ColumnType::of(TypeTag::Double);
    pub const STRING: ColumnType = ColumnType::of(TypeTag::String);
    pub const SYMBOL: ColumnType = ColumnType::of(TypeTag::Symbol);
    pub const LONG256: ColumnType = ColumnType::of(TypeTag::Long256);
    pub const BINARY: ColumnType = ColumnType::of(TypeTag::Binary);
    pub const UUID: ColumnType = ColumnType::of(TypeTag::Uuid);
    pub const CURSOR: ColumnType = ColumnType::of(TypeTag::Cursor);
    pub const VAR_ARG: ColumnType = ColumnType::of(TypeTag::VarArg);
    pub const RECORD: ColumnType = ColumnType::of(TypeTag::Record);
    pub const GEOHASH: ColumnType = ColumnType::of(TypeTag::GeoHash);
    pub const LONG128: ColumnType = ColumnType::of(TypeTag::Long128);
    pub const IPV4: ColumnType = ColumnType::of(TypeTag::IPv4);
    pub const VARCHAR: ColumnType = ColumnType::of(TypeTag::Varchar);
    pub const ARRAY_STRING: ColumnType = ColumnType::of(TypeTag::ArrayString);
    pub const INTERVAL: ColumnType = ColumnType::of(TypeTag::Interval);
    pub const REGCLASS: ColumnType = ColumnType::of(TypeTag::RegClass);
    pub const REGPROCEDURE: ColumnType = ColumnType::of(TypeTag::RegProcedure);
    pub const NULL: ColumnType = ColumnType::of(TypeTag::Null);

    /// An unparameterized type for `tag`.
    pub const fn of(tag: TypeTag) -> Self {
        Self {
            tag,
            bits: 0,
            element: TypeTag::Undefined,
            dims: 0,
        }
    }

    /// A geohash type of the given precision.
    ///
    /// The storage width is chosen from the precision. Precision is clamped
    /// to [`GEOHASH_MAX_BITS`]; zero yields the generic geohash.
    pub const fn geohash(bits: u8) -> Self {
        let bits = if bits > GEOHASH_MAX_BITS {
            GEOHASH_MAX_BITS
        } else {
            bits
        };
        let tag = match bits {
            0 => TypeTag::GeoHash,
            1..=7 => TypeTag::GeoByte,
            8..=15 => TypeTag::GeoShort,
            16..=31 => TypeTag::GeoInt,
            _ => TypeTag::GeoLong,
        };
        Self {
            tag,
            bits,
            element: TypeTag::Undefined,
            dims: 0,
        }
    }

    /// An array of `element` with `dims` dimensions.
    pub const fn array(element: TypeTag, dims: u8) -> Self {
        Self {
            tag: TypeTag::Array,
            bits: 0,
            element,
            dims,
        }
    }

    #[inline]
    pub const fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Geohash precision in bits, zero when not a sized geohash.
    #[inline]
    pub const fn geohash_bits(&self) -> u8 {
        self.bits
    }

    /// Element kind of an array type.
    #[inline]
    pub const fn element_tag(&self) -> TypeTag {
        self.element
    }

    /// Number of array dimensions, zero for non-arrays.
    #[inline]
    pub const fn dims(&self) -> u8 {
        self.dims
    }

    #[inline]
    pub const fn is_geohash(&self) -> bool {
        self.tag.is_geohash()
    }

    #[inline]
    pub const fn is_array(&self) -> bool {
        matches!(self.tag, TypeTag::Array)
    }

    #[inline]
    pub const fn is_undefined(&self) -> bool {
        matches!(self.tag, TypeTag::Undefined)
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self.tag, TypeTag::Null)
    }

    /// Parse a SQL type name such as `int`, `double[][]` or `geohash(5c)`.
    ///
    /// `string[]` names the dedicated string-array type rather than an array
    /// of strings.
    pub fn parse(name: &str) -> Option<ColumnType> {
        let name = name.trim();
        let mut base = name;
        let mut dims = 0u8;
        while let Some(stripped) = base.strip_suffix("[]") {
            base = stripped.trim_end();
            dims = dims.checked_add(1)?;
        }

        if dims == 1 && (base.eq_ignore_ascii_case("string") || base.eq_ignore_ascii_case("text")) {
            return Some(ColumnType::ARRAY_STRING);
        }

        let lower = base.to_ascii_lowercase();
        let column_type = if let Some(rest) = lower.strip_prefix("geohash(") {
            ColumnType::geohash(parse_geohash_precision(rest.strip_suffix(')')?)?)
        } else {
            ColumnType::of(TypeTag::from_name(&lower)?)
        };

        if dims == 0 {
            Some(column_type)
        } else if column_type.tag.is_numeric() || column_type.tag == TypeTag::Boolean {
            Some(ColumnType::array(column_type.tag, dims))
        } else {
            None
        }
    }
}

/// Parse a geohash precision suffix: `<n>c` (chars of 5 bits) or `<n>b`.
pub fn parse_geohash_precision(text: &str) -> Option<u8> {
    let (digits, unit) = text.split_at(text.len().checked_sub(1)?);
    let n: u8 = digits.parse().ok()?;
    let bits = match unit {
        "c" | "C" => n.checked_mul(5)?,
        "b" | "B" => n,
        _ => return None,
    };
    (1..=GEOHASH_MAX_BITS).contains(&bits).then_some(bits)
}

impl Default for ColumnType {
    fn default() -> Self {
        ColumnType::UNDEFINED
    }
}

impl From<TypeTag> for ColumnType {
    fn from(tag: TypeTag) -> Self {
        ColumnType::of(tag)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_geohash() && self.bits > 0 {
            if self.bits % 5 == 0 {
                write!(f, "GEOHASH({}c)", self.bits / 5)
            } else {
                write!(f, "GEOHASH({}b)", self.bits)
            }
        } else if self.is_array() {
            f.write_str(self.element.name())?;
            for _ in 0..self.dims {
                f.write_str("[]")?;
            }
            Ok(())
        } else {
            f.write_str(self.tag.name())
        }
    }
}

impl fmt::Debug for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names_round_trip() {
        for tag in [
            TypeTag::Boolean,
            TypeTag::Int,
            TypeTag::Timestamp,
            TypeTag::Varchar,
            TypeTag::Uuid,
            TypeTag::IPv4,
        ] {
            assert_eq!(TypeTag::from_name(tag.name()), Some(tag));
        }
    }

    #[test]
    fn geohash_width_follows_precision() {
        assert_eq!(ColumnType::geohash(5).tag(), TypeTag::GeoByte);
        assert_eq!(ColumnType::geohash(8).tag(), TypeTag::GeoShort);
        assert_eq!(ColumnType::geohash(20).tag(), TypeTag::GeoInt);
        assert_eq!(ColumnType::geohash(60).tag(), TypeTag::GeoLong);
        assert_eq!(ColumnType::geohash(61).geohash_bits(), 60);
    }

    #[test]
    fn display_parameterized_types() {
        assert_eq!(ColumnType::geohash(25).to_string(), "GEOHASH(5c)");
        assert_eq!(ColumnType::geohash(7).to_string(), "GEOHASH(7b)");
        assert_eq!(
            ColumnType::array(TypeTag::Double, 2).to_string(),
            "DOUBLE[][]"
        );
        assert_eq!(ColumnType::INT.to_string(), "INT");
    }

    #[test]
    fn parse_type_names() {
        assert_eq!(ColumnType::parse("INT"), Some(ColumnType::INT));
        assert_eq!(
            ColumnType::parse("double[]"),
            Some(ColumnType::array(TypeTag::Double, 1))
        );
        assert_eq!(ColumnType::parse("string[]"), Some(ColumnType::ARRAY_STRING));
        assert_eq!(ColumnType::parse("geohash(3c)"), Some(ColumnType::geohash(15)));
        assert_eq!(ColumnType::parse("geohash(0c)"), None);
        assert_eq!(ColumnType::parse("uuid[]"), None);
        assert_eq!(ColumnType::parse("nope"), None);
    }

    #[test]
    fn castable_range() {
        assert!(TypeTag::Boolean.is_castable());
        assert!(TypeTag::Binary.is_castable());
        assert!(TypeTag::Interval.is_castable());
        assert!(!TypeTag::Cursor.is_castable());
        assert!(!TypeTag::Null.is_castable());
    }
}
