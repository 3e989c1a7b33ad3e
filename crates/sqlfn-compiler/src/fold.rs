//! Constant folding.

use sqlfn_core::{BoxedFunction, Constant, EmptyRecord, Function, FunctionTraits, TypeTag};
use tracing::trace;

/// Whether evaluators of `tag` have a constant representation.
fn is_foldable(tag: TypeTag) -> bool {
    matches!(
        tag,
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
            | TypeTag::Varchar
            | TypeTag::Symbol
            | TypeTag::Uuid
            | TypeTag::IPv4
            | TypeTag::Long256
            | TypeTag::GeoByte
            | TypeTag::GeoShort
            | TypeTag::GeoInt
            | TypeTag::GeoLong
            | TypeTag::Null
    )
}

/// Evaluate a constant evaluator once and replace it with a [`Constant`].
///
/// The caller has established that `function` is constant. Evaluators that
/// already are constants, type constants, and types without a constant
/// representation (binary, long128, interval, record, cursor) come back
/// unchanged. Arrays fold only when they are array literals.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn function_to_constant(function: BoxedFunction) -> BoxedFunction {
    if function.as_constant().is_some()
        || function.traits().contains(FunctionTraits::TYPE_CONSTANT)
    {
        return function;
    }

    let column_type = function.column_type();
    let tag = column_type.tag();
    let foldable = is_foldable(tag)
        || (tag == TypeTag::Array && function.traits().contains(FunctionTraits::ARRAY_LITERAL));
    if !foldable {
        return function;
    }

    let value = function.eval(&EmptyRecord);
    if !value.conforms_to(column_type) {
        trace!(function = function.name(), %column_type, "fold skipped, value does not conform");
        return function;
    }
    trace!(function = function.name(), %column_type, "folded to constant");
    Box::new(Constant::new(column_type, value))
}
