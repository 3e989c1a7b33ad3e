//! Error types for function resolution.
//!
//! This module provides structured error types for each layer:
//! - [`ResolveError`] - Errors turning an expression tree into evaluators
//! - [`RegistrationError`] - Errors building an overload catalog
//!
//! Every [`ResolveError`] except [`ResolveError::Internal`] carries the span
//! of the node or argument it concerns.

use thiserror::Error;

use crate::column_type::ColumnType;
use crate::span::Span;

// ============================================================================
// Resolution Errors
// ============================================================================

/// Errors that occur while resolving an expression tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    /// A column reference names no column in the row schema.
    #[error("at {span}: invalid column: {name}")]
    ColumnNotFound {
        /// The column name as written.
        name: String,
        /// Location of the reference.
        span: Span,
    },

    /// A column has a type no evaluator exists for.
    #[error("at {span}: unsupported column type: {column_type}")]
    UnsupportedColumnType {
        /// The offending type.
        column_type: ColumnType,
        /// Location of the reference.
        span: Span,
    },

    /// No overload list exists for a function name.
    #[error("at {span}: unknown function name: {signature}")]
    UnknownFunction {
        /// The function name.
        name: String,
        /// The call rendered with its argument types, e.g. `f(INT,STRING)`.
        signature: String,
        /// Location of the call.
        span: Span,
    },

    /// Overloads exist but none accepts the supplied arguments.
    #[error("at {span}: {message}")]
    ArgumentMismatch {
        /// The function name.
        function: String,
        /// Fully formatted diagnostic.
        message: String,
        /// Declared argument count, when a single candidate exists.
        expected_count: Option<usize>,
        /// Number of arguments supplied.
        actual_count: usize,
        /// Index of the first mismatching argument, when known.
        argument: Option<usize>,
        /// Location of the call or the mismatching argument.
        span: Span,
    },

    /// A variadic slot requiring constants received a non-constant.
    #[error("at {span}: constant expected")]
    ConstantExpected {
        /// Location of the offending argument.
        span: Span,
    },

    /// A non-deterministic function was used where the context forbids it.
    #[error("at {span}: non-deterministic function cannot be used here: {name}")]
    NonDeterministicNotAllowed {
        /// The function name.
        name: String,
        /// Location of the call.
        span: Span,
    },

    /// A factory produced no evaluator. Indicates a registration bug.
    #[error("at {span}: bad function factory (NULL), check log")]
    BadFactory {
        /// The signature of the factory at fault.
        signature: String,
        /// Location of the call.
        span: Span,
    },

    /// A factory rejected its arguments.
    #[error("at {span}: exception in function factory: {message}")]
    FactoryFailure {
        /// The factory's own explanation.
        message: String,
        /// Location of the call.
        span: Span,
    },

    /// A literal token could not be parsed by any constant rule.
    #[error("at {span}: invalid constant: {token}")]
    InvalidConstant {
        /// The token as written.
        token: String,
        /// Location of the token.
        span: Span,
    },

    /// A text constant destined for a date or timestamp slot did not parse.
    #[error("at {span}: invalid date [str={value}]")]
    InvalidDate {
        /// The text that failed to parse.
        value: String,
        /// Location of the constant.
        span: Span,
    },

    /// A text constant destined for a geohash slot did not parse.
    #[error("at {span}: invalid geohash [str={value}, bits={bits}]")]
    InvalidGeoHash {
        /// The text that failed to parse.
        value: String,
        /// The requested precision.
        bits: u8,
        /// Location of the constant.
        span: Span,
    },

    /// A named bind variable is not present in the variable table.
    #[error("at {span}: undefined bind variable: {name}")]
    UndefinedBindVariable {
        /// The variable token, including its colon.
        name: String,
        /// Location of the variable.
        span: Span,
    },

    /// A positional bind variable index is non-numeric or below 1.
    #[error("at {span}: invalid bind variable index [value={value}]")]
    InvalidBindVariableIndex {
        /// The offending index text.
        value: String,
        /// Location of the variable.
        span: Span,
    },

    /// The execution context has no bind variable table.
    #[error("at {span}: bind variable service is not provided")]
    BindVariablesUnavailable {
        /// Location of the variable.
        span: Span,
    },

    /// An aggregate evaluator was passed as a plain function argument.
    #[error("at {span}: Aggregate function cannot be passed as an argument")]
    AggregateAsArgument {
        /// Location of the aggregate argument.
        span: Span,
    },

    /// An undefined bind variable landed in a variadic tail whose factory
    /// declares no preferred type.
    #[error("at {span}: cannot infer type of variadic argument #{index} of {function}")]
    UnresolvedVariadicType {
        /// The function name.
        function: String,
        /// Argument index.
        index: usize,
        /// Location of the argument.
        span: Span,
    },

    /// Internal consistency failure.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the broken invariant.
        message: String,
    },
}

impl ResolveError {
    /// Get the span where this error occurred, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            ResolveError::ColumnNotFound { span, .. }
            | ResolveError::UnsupportedColumnType { span, .. }
            | ResolveError::UnknownFunction { span, .. }
            | ResolveError::ArgumentMismatch { span, .. }
            | ResolveError::ConstantExpected { span }
            | ResolveError::NonDeterministicNotAllowed { span, .. }
            | ResolveError::BadFactory { span, .. }
            | ResolveError::FactoryFailure { span, .. }
            | ResolveError::InvalidConstant { span, .. }
            | ResolveError::InvalidDate { span, .. }
            | ResolveError::InvalidGeoHash { span, .. }
            | ResolveError::UndefinedBindVariable { span, .. }
            | ResolveError::InvalidBindVariableIndex { span, .. }
            | ResolveError::BindVariablesUnavailable { span }
            | ResolveError::AggregateAsArgument { span }
            | ResolveError::UnresolvedVariadicType { span, .. } => Some(*span),
            ResolveError::Internal { .. } => None,
        }
    }

    /// Shorthand for [`ResolveError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        ResolveError::Internal {
            message: message.into(),
        }
    }

    /// Shorthand for [`ResolveError::FactoryFailure`], for use by factories.
    pub fn factory(span: Span, message: impl Into<String>) -> Self {
        ResolveError::FactoryFailure {
            message: message.into(),
            span,
        }
    }
}

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors that occur while building an overload catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The name is a SQL control symbol or contains a forbidden character.
    #[error("invalid function name: '{0}'")]
    InvalidFunctionName(String),

    /// The signature text is malformed.
    #[error("invalid signature '{signature}': {reason}")]
    InvalidSignature {
        /// The signature text.
        signature: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A signature names a type that does not exist.
    #[error("invalid signature '{signature}': unknown type '{type_name}'")]
    UnknownType {
        /// The signature text.
        signature: String,
        /// The unrecognized type name.
        type_name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_error_display() {
        let err = ResolveError::ColumnNotFound {
            name: "price".to_string(),
            span: Span::new(7, 5),
        };
        assert_eq!(format!("{err}"), "at 7: invalid column: price");
    }

    #[test]
    fn resolve_error_span() {
        let span = Span::new(5, 8);
        let err = ResolveError::ConstantExpected { span };
        assert_eq!(err.span(), Some(span));
        assert_eq!(ResolveError::internal("broken").span(), None);
    }

    #[test]
    fn bad_factory_display() {
        let err = ResolveError::BadFactory {
            signature: "f(INT)".to_string(),
            span: Span::point(3),
        };
        assert_eq!(format!("{err}"), "at 3: bad function factory (NULL), check log");
    }

    #[test]
    fn registration_error_display() {
        let err = RegistrationError::UnknownType {
            signature: "f(nope)".to_string(),
            type_name: "nope".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "invalid signature 'f(nope)': unknown type 'nope'"
        );
    }
}
