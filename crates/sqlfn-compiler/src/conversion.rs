//! Type compatibility oracle.
//!
//! Answers "can a value of type A be passed where type B is expected, and at
//! what cost?" for overload scoring. Costs come from a fixed priority table:
//! each source type lists the targets it may coerce to, most preferred
//! first, and the cost is the 1-based position in that list.
//!
//! ## Special rows
//!
//! - Identity costs 0.
//! - `NULL` costs 0 to every target.
//! - `UNDEFINED` (an untyped bind variable) lists the order in which a
//!   parameter type is preferred when it fixes the variable's type.
//!
//! Everything else is unreachable and costs [`OVERLOAD_NONE`].

use sqlfn_core::TypeTag;

/// Distance meaning "no implicit coercion exists".
pub const OVERLOAD_NONE: u32 = 10_000;

/// A permitted coercion and its cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversion {
    pub from: TypeTag,
    pub to: TypeTag,
    pub kind: ConversionKind,
    /// Lower is better.
    pub cost: u32,
}

/// Why a coercion is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    /// Same type.
    Identity,
    /// The `NULL` literal, which fits every type.
    Null,
    /// Listed in the priority table.
    Priority,
}

impl Conversion {
    pub const COST_IDENTITY: u32 = 0;

    #[inline]
    pub fn is_identity(&self) -> bool {
        matches!(self.kind, ConversionKind::Identity)
    }
}

/// Targets each source tag may coerce to, most preferred first.
fn priority(from: TypeTag) -> &'static [TypeTag] {
    use TypeTag::*;
    match from {
        Undefined => &[
            Double, Float, String, Varchar, Long, Timestamp, Date, Int, Char, Short, Byte, Boolean,
        ],
        Byte => &[Short, Int, Long, Float, Double],
        Short => &[Int, Long, Float, Double],
        Char => &[String, Varchar],
        Int => &[Long, Float, Double],
        Long => &[Double, Float],
        Date => &[Timestamp, Long],
        Timestamp => &[Long, Date],
        Float => &[Double],
        String => &[
            Varchar, Char, Double, Long, Int, Float, Short, Byte, Timestamp, Date, Symbol, Uuid,
        ],
        Symbol => &[
            String, Varchar, Char, Double, Long, Int, Float, Short, Byte, Timestamp, Date,
        ],
        Varchar => &[
            String, Char, Double, Long, Int, Float, Short, Byte, Timestamp, Date, Symbol, Uuid,
        ],
        GeoLong => &[GeoInt, GeoShort, GeoByte],
        GeoInt => &[GeoShort, GeoByte],
        GeoShort => &[GeoByte],
        Uuid => &[String, Varchar],
        Interval => &[String],
        Boolean | Double | Long256 | GeoByte | Binary | Cursor | VarArg | Record | GeoHash
        | Long128 | IPv4 | ArrayString | Array | RegClass | RegProcedure | Null => &[],
    }
}

/// Coercion distance from `from` to `to`; [`OVERLOAD_NONE`] when impossible.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn overload_distance(from: TypeTag, to: TypeTag) -> u32 {
    find_conversion(from, to).map_or(OVERLOAD_NONE, |c| c.cost)
}

/// Find the coercion from `from` to `to`, if one exists.
pub fn find_conversion(from: TypeTag, to: TypeTag) -> Option<Conversion> {
    if from == to {
        return Some(Conversion {
            from,
            to,
            kind: ConversionKind::Identity,
            cost: Conversion::COST_IDENTITY,
        });
    }
    if from == TypeTag::Null {
        return Some(Conversion {
            from,
            to,
            kind: ConversionKind::Null,
            cost: 0,
        });
    }
    priority(from)
        .iter()
        .position(|&target| target == to)
        .map(|i| Conversion {
            from,
            to,
            kind: ConversionKind::Priority,
            cost: i as u32 + 1,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_free() {
        assert_eq!(overload_distance(TypeTag::Int, TypeTag::Int), 0);
        assert!(find_conversion(TypeTag::Uuid, TypeTag::Uuid).unwrap().is_identity());
    }

    #[test]
    fn null_fits_everything() {
        for to in [TypeTag::Int, TypeTag::String, TypeTag::Uuid, TypeTag::Boolean] {
            assert_eq!(overload_distance(TypeTag::Null, to), 0);
        }
    }

    #[test]
    fn widening_prefers_nearest() {
        assert!(
            overload_distance(TypeTag::Int, TypeTag::Long)
                < overload_distance(TypeTag::Int, TypeTag::Double)
        );
        assert!(
            overload_distance(TypeTag::Byte, TypeTag::Short)
                < overload_distance(TypeTag::Byte, TypeTag::Long)
        );
    }

    #[test]
    fn narrowing_is_impossible() {
        assert_eq!(overload_distance(TypeTag::Long, TypeTag::Int), OVERLOAD_NONE);
        assert_eq!(overload_distance(TypeTag::Double, TypeTag::Float), OVERLOAD_NONE);
        assert_eq!(overload_distance(TypeTag::Boolean, TypeTag::Int), OVERLOAD_NONE);
    }

    #[test]
    fn char_widens_to_string_more_cheaply_than_string_narrows() {
        assert!(
            overload_distance(TypeTag::Char, TypeTag::String)
                < overload_distance(TypeTag::String, TypeTag::Char)
        );
    }

    #[test]
    fn undefined_prefers_double() {
        assert_eq!(overload_distance(TypeTag::Undefined, TypeTag::Double), 1);
        assert!(
            overload_distance(TypeTag::Undefined, TypeTag::Double)
                < overload_distance(TypeTag::Undefined, TypeTag::Int)
        );
    }

    #[test]
    fn text_reaches_temporal_and_uuid() {
        assert_ne!(overload_distance(TypeTag::String, TypeTag::Timestamp), OVERLOAD_NONE);
        assert_ne!(overload_distance(TypeTag::Varchar, TypeTag::Uuid), OVERLOAD_NONE);
        assert_ne!(overload_distance(TypeTag::Uuid, TypeTag::String), OVERLOAD_NONE);
    }
}
