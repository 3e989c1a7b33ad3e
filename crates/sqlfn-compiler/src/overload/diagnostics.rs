//! Resolution failure messages.
//!
//! When only one overload exists the message describes how the call departs
//! from it. Otherwise the message lists the supplied argument types, in
//! operator form for registered operator tokens.

use std::fmt::Write;

use sqlfn_core::{Args, ColumnType, ResolveError, Span};
use sqlfn_registry::{OverloadCatalog, SignatureDescriptor};

/// `unknown function name: f(INT,STRING)`
pub fn unknown_function(name: &str, args: &Args, span: Span) -> ResolveError {
    let types: Vec<String> = args.types().map(|t| t.to_string()).collect();
    ResolveError::UnknownFunction {
        name: name.to_string(),
        signature: format!("{name}({})", types.join(",")),
        span,
    }
}

/// Expected type and constness of declared slot `index`.
fn expected_slot(descriptor: &SignatureDescriptor, index: usize) -> (ColumnType, bool) {
    match descriptor.arg(index) {
        Some(spec) => (spec.column_type(), spec.is_constant()),
        None => (ColumnType::VAR_ARG, descriptor.variadic_requires_constant()),
    }
}

/// Build the error for a call no overload accepts.
///
/// `single` is the only overload registered under `name`, if there is
/// exactly one.
pub fn no_matching_overload(
    catalog: &OverloadCatalog,
    name: &str,
    span: Span,
    args: &Args,
    single: Option<&SignatureDescriptor>,
) -> ResolveError {
    let actual_count = args.len();
    let mismatch = |message: String, expected_count, argument, span| {
        ResolveError::ArgumentMismatch {
            function: name.to_string(),
            message,
            expected_count,
            actual_count,
            argument,
            span,
        }
    };

    if let Some(descriptor) = single {
        let declared = descriptor.declared_arg_count();

        if args.is_empty() {
            let mut message = format!("function `{name}` requires arguments: {name}(");
            for index in 0..declared {
                if index > 0 {
                    message.push_str(", ");
                }
                let (column_type, constant) = expected_slot(descriptor, index);
                let _ = write!(message, "{column_type}");
                if constant {
                    message.push_str(" constant");
                }
            }
            message.push(')');
            return mismatch(message, Some(declared), None, span);
        }

        if actual_count != declared {
            let message = format!(
                "wrong number of arguments for function `{name}`; expected: {declared}, provided: {actual_count}"
            );
            return mismatch(message, Some(declared), None, span);
        }

        let mut message = if actual_count == 2 {
            String::from("expression type mismatch,")
        } else {
            format!("argument type mismatch for function `{name}`")
        };
        let mut argument = None;
        let mut at = span;
        for (index, arg) in args.iter().enumerate() {
            let (expected, expected_constant) = expected_slot(descriptor, index);
            let actual = arg.column_type();
            if expected != actual || (expected_constant && !arg.is_constant()) {
                if actual_count != 2 {
                    let _ = write!(message, " at #{}", index + 1);
                }
                let _ = write!(message, " expected: {expected}");
                if expected == actual {
                    message.push_str(" constant");
                }
                let _ = write!(message, ", actual: {actual}");
                argument = Some(index);
                at = args.position(index);
                break;
            }
        }
        return mismatch(message, Some(declared), argument, at);
    }

    if !catalog.is_operator(name) {
        let message = if args.is_empty() {
            format!("function `{name}` requires arguments")
        } else {
            let types: Vec<String> = args.types().map(|t| t.to_string()).collect();
            format!(
                "there is no matching function `{name}` with the argument types: ({})",
                types.join(", ")
            )
        };
        return mismatch(message, None, None, span);
    }

    let mut types = args.types();
    let message = match (types.next(), types.next()) {
        (Some(left), Some(right)) if actual_count == 2 => format!(
            "there is no matching operator `{name}` with the argument types: {left} {name} {right}"
        ),
        (Some(operand), _) => {
            format!("there is no matching operator `{name}` with the argument type: {operand}")
        }
        (None, _) => format!("function `{name}` requires arguments"),
    };
    mismatch(message, None, None, span)
}
