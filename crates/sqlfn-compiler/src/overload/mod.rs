//! Overload resolution for function calls.
//!
//! This module selects the overload of a function name that best fits the
//! resolved arguments, adjusts the arguments to it, and constructs the
//! evaluator through the winning factory.
//!
//! ## Algorithm
//!
//! 1. `cast(x, T)` where `x` already has type `T` resolves to `x` itself
//! 2. A zero-argument call takes the first zero-parameter overload whose
//!    window-ness matches the context
//! 3. Every arity-compatible candidate is scored (see [`matching`]) and the
//!    best one is tracked (see [`ranking`])
//! 4. The winner's argument list is adjusted: variadic constants are
//!    checked, undefined bind variables are typed, and text constants in
//!    date/timestamp slots are parsed
//! 5. The factory builds the evaluator, which is then folded or memoized

mod diagnostics;
mod matching;
mod ranking;

pub use diagnostics::{no_matching_overload, unknown_function};
pub use matching::{CandidateScore, MatchLevel, WINDOW_BONUS, score_candidate};
pub use ranking::{CandidateTracker, Offer};

use sqlfn_core::{
    Args, BoxedFunction, ColumnType, Constant, EmptyRecord, ExecutionContext, Function,
    FunctionKind, FunctionTraits, ResolveError, ResolverConfig, Span, TypeTag,
};
use sqlfn_registry::{OverloadCatalog, SignatureDescriptor};
use tracing::{debug, error, trace};

use crate::cast::ImplicitCast;
use crate::fold::function_to_constant;
use crate::memoize::memoize;
use crate::temporal::{parse_date, parse_floor_partial_timestamp};

type Result<T> = std::result::Result<T, ResolveError>;

/// Resolve a call of `name` with already-resolved `args`.
///
/// `args` is consumed: on success it is owned by the new evaluator, on
/// failure every argument has been dropped.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_function(
    catalog: &OverloadCatalog,
    name: &str,
    position: Span,
    mut args: Args,
    ctx: &dyn ExecutionContext,
    config: &ResolverConfig,
) -> Result<BoxedFunction> {
    let Some(overloads) = catalog.overloads(name) else {
        return Err(unknown_function(name, &args, position));
    };

    let arg_count = args.len();
    let window_ctx = ctx.is_window_context();
    let is_cast =
        name.eq_ignore_ascii_case("cast") && arg_count == 2 && args.get(1).is_some_and(|a| a.is_constant());

    if is_cast && try_elide_cast(&mut args)? {
        return args
            .into_vec()
            .into_iter()
            .next()
            .ok_or_else(|| ResolveError::internal("cast lost its operand"));
    }

    let undefined: Vec<usize> = args
        .iter()
        .enumerate()
        .filter(|(_, arg)| arg.is_undefined())
        .map(|(index, _)| index)
        .collect();

    let mut tracker = CandidateTracker::new();
    for (index, descriptor) in overloads.iter().enumerate() {
        let fixed = descriptor.fixed_arg_count();

        if arg_count == 0 && fixed == 0 {
            if descriptor.is_window() == window_ctx || overloads.len() == 1 {
                let function = check_and_create(descriptor, name, position, args, ctx, config)?;
                return Ok(finish(function, config));
            }
            continue;
        }

        if !descriptor.accepts_arity(arg_count) {
            continue;
        }

        let result = score_candidate(descriptor, &args, is_cast, window_ctx);
        trace!(
            signature = descriptor.signature(),
            level = ?result.level,
            score = result.score,
            "overload candidate"
        );
        let window_match = descriptor.is_window() == window_ctx;
        if tracker.offer(index, result, descriptor.is_variadic(), window_match) == Offer::Stop {
            break;
        }
    }

    let Some(winner) = tracker.winner() else {
        let single = (overloads.len() == 1).then(|| &overloads[0]);
        return Err(no_matching_overload(catalog, name, position, &args, single));
    };
    let descriptor = &overloads[winner];
    debug!(
        function = name,
        signature = descriptor.signature(),
        level = ?tracker.best_level(),
        "overload selected"
    );

    adjust_arguments(descriptor, name, &mut args, &undefined)?;
    let function = check_and_create(descriptor, name, position, args, ctx, config)?;
    Ok(finish(function, config))
}

/// `cast(x, T)` needs no cast function when `x` already has type `T`, or
/// when `x` is an untyped bind variable that can simply be given type `T`.
///
/// Returns true when `args[0]` should be returned as the result.
fn try_elide_cast(args: &mut Args) -> Result<bool> {
    let (Some(operand), Some(target)) = (args.get(0), args.get(1)) else {
        return Ok(false);
    };
    let target = target.column_type();
    if operand.column_type() == target {
        return Ok(true);
    }
    if !operand.is_undefined() {
        return Ok(false);
    }

    let assign = match target.tag() {
        TypeTag::Varchar | TypeTag::String | TypeTag::Char => ColumnType::STRING,
        TypeTag::Byte
        | TypeTag::Short
        | TypeTag::Int
        | TypeTag::Long
        | TypeTag::Float
        | TypeTag::Double => ColumnType::DOUBLE,
        TypeTag::Array => target,
        _ => return Ok(false),
    };
    if let Some(operand) = args.get_mut(0) {
        operand.assign_type(assign)?;
    }
    Ok(assign == target)
}

/// Prepare the winner's arguments for its factory.
fn adjust_arguments(
    descriptor: &SignatureDescriptor,
    name: &str,
    args: &mut Args,
    undefined: &[usize],
) -> Result<()> {
    let fixed = descriptor.fixed_arg_count();

    if descriptor.variadic_requires_constant() {
        for index in fixed..args.len() {
            if args
                .get(index)
                .is_some_and(|arg| !arg.is_constant_or_runtime_constant())
            {
                return Err(ResolveError::ConstantExpected {
                    span: args.position(index),
                });
            }
        }
    }

    for &index in undefined {
        let column_type = match descriptor.arg(index) {
            Some(spec) => spec.column_type(),
            None => descriptor
                .factory()
                .preferred_variadic_type(index, args)
                .ok_or_else(|| ResolveError::UnresolvedVariadicType {
                    function: name.to_string(),
                    index,
                    span: args.position(index),
                })?,
        };
        if let Some(arg) = args.get_mut(index) {
            arg.assign_type(column_type)?;
        }
    }

    for (index, spec) in descriptor.args().iter().enumerate() {
        let sig_tag = spec.tag();
        args.map_at(index, |arg, position| rewrite_argument(arg, sig_tag, position))?;
    }
    Ok(())
}

/// Coerce one fixed argument into the form its parameter expects.
fn rewrite_argument(arg: BoxedFunction, sig_tag: TypeTag, position: Span) -> Result<BoxedFunction> {
    let arg_tag = arg.column_type().tag();

    if arg_tag == TypeTag::Double && arg.is_constant() {
        if arg.eval(&EmptyRecord).is_null() {
            match sig_tag {
                TypeTag::Long => return Ok(Box::new(Constant::null(ColumnType::LONG))),
                TypeTag::Int => return Ok(Box::new(Constant::null(ColumnType::INT))),
                _ => {}
            }
        }
        return Ok(arg);
    }

    if matches!(arg_tag, TypeTag::String | TypeTag::Symbol | TypeTag::Varchar) && arg.is_constant() {
        if sig_tag != TypeTag::Timestamp && sig_tag != TypeTag::Date {
            return Ok(arg);
        }
        let value = arg.eval(&EmptyRecord);
        let Some(text) = value.as_str() else {
            return Ok(Box::new(Constant::null(ColumnType::of(sig_tag))));
        };
        let parsed = if sig_tag == TypeTag::Timestamp {
            parse_floor_partial_timestamp(text).map(Constant::timestamp)
        } else {
            parse_date(text).map(Constant::date)
        };
        return match parsed {
            Some(constant) => Ok(Box::new(constant)),
            None => Err(ResolveError::InvalidDate {
                value: text.to_string(),
                span: position,
            }),
        };
    }

    if sig_tag == TypeTag::String {
        match arg_tag {
            TypeTag::Uuid => return Ok(Box::new(ImplicitCast::uuid_to_str(arg))),
            TypeTag::Interval => return Ok(Box::new(ImplicitCast::interval_to_str(arg))),
            _ => {}
        }
    }
    Ok(arg)
}

/// Run the factory and vet what it built.
fn check_and_create(
    descriptor: &SignatureDescriptor,
    name: &str,
    position: Span,
    args: Args,
    ctx: &dyn ExecutionContext,
    config: &ResolverConfig,
) -> Result<BoxedFunction> {
    debug!(call = name, signature = descriptor.signature(), "call node -> signature");

    let Some(function) = descriptor
        .factory()
        .new_instance(position, args, config, ctx)?
    else {
        error!(signature = descriptor.signature(), "function factory returned no function");
        return Err(ResolveError::BadFactory {
            signature: descriptor.signature().to_string(),
            span: position,
        });
    };

    if !ctx.allow_non_deterministic_functions() && function.is_non_deterministic() {
        return Err(ResolveError::NonDeterministicNotAllowed {
            name: name.to_string(),
            span: position,
        });
    }
    Ok(function)
}

/// Fold a constant evaluator or memoize a cacheable one.
pub fn finish(function: BoxedFunction, config: &ResolverConfig) -> BoxedFunction {
    if config.constant_folding
        && function.is_constant()
        && !function.traits().contains(FunctionTraits::EXTENDED_OPS)
    {
        return function_to_constant(function);
    }
    if config.memoization && function.kind() == FunctionKind::Scalar && function.should_memoize() {
        return memoize(function);
    }
    function
}
